//! Single-slot inventory and the same-value merge rule.

use crate::token::{SpriteKey, Token, TokenId, crafted_entry};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    slot: Option<Token>,
}

impl Inventory {
    pub fn new(slot: Option<Token>) -> Self {
        Self { slot }
    }

    pub fn held(&self) -> Option<&Token> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Replace the slot, handing back whatever was held before.
    pub fn swap(&mut self, token: Token) -> Option<Token> {
        self.slot.replace(token)
    }

    pub fn take(&mut self) -> Option<Token> {
        self.slot.take()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

fn merged_value(held: &Token, target: &Token) -> Option<u32> {
    (held.value == target.value).then(|| held.value.checked_add(target.value)).flatten()
}

/// Equal values whose sum still fits in a coin.
pub fn can_craft(held: &Token, target: &Token) -> bool {
    merged_value(held, target).is_some()
}

/// Merge two equal-valued coins into one worth their sum, placed where
/// `target` was. Inputs that cannot merge are handed back untouched.
pub fn craft(held: Token, target: Token) -> Result<Token, (Token, Token)> {
    let Some(value) = merged_value(&held, &target) else {
        return Err((held, target));
    };
    let id = TokenId::crafted(&held.id, &target.id);
    let mut history = held.history;
    history.extend(target.history);
    history.push(crafted_entry(value));

    Ok(Token {
        id,
        value,
        position: target.position,
        cell: target.cell,
        history,
        sprite: SpriteKey::for_value(value),
    })
}
