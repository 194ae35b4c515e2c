//! Coins, their durable mementos, and the history entries they accumulate.

use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::hex::HexGrid;
use crate::types::{GeoPoint, HexCoord};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn spawned(cell: HexCoord) -> Self {
        Self(format!("coin:{cell}"))
    }

    pub fn crafted(held: &TokenId, target: &TokenId) -> Self {
        let digest = xxh3_64(format!("{}|{}", held.0, target.0).as_bytes());
        Self(format!("craft:{digest:016x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque key the renderer maps to an image.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpriteKey(pub String);

impl SpriteKey {
    pub fn for_value(value: u32) -> Self {
        Self(format!("coin-{value}"))
    }
}

/// The cell a spawned id was generated for, if `id` has the spawned form.
pub fn spawn_origin(id: &str) -> Option<HexCoord> {
    id.strip_prefix("coin:")?.parse().ok()
}

pub fn spawned_entry(cell: HexCoord) -> String {
    format!("spawned in cell {cell}")
}

pub fn picked_up_entry(cell: HexCoord) -> String {
    format!("picked up from cell {cell}")
}

pub fn placed_entry(cell: HexCoord) -> String {
    format!("placed in cell {cell}")
}

pub fn crafted_entry(value: u32) -> String {
    format!("crafted new coin with value {value}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub id: TokenId,
    pub value: u32,
    pub position: GeoPoint,
    pub cell: HexCoord,
    pub history: Vec<String>,
    pub sprite: SpriteKey,
}

impl Token {
    pub fn new(
        id: TokenId,
        value: u32,
        cell: HexCoord,
        history: Vec<String>,
        grid: &HexGrid,
    ) -> Self {
        Self {
            id,
            value,
            position: grid.center(cell),
            cell,
            history,
            sprite: SpriteKey::for_value(value),
        }
    }

    /// True once anything beyond the initial spawn entry has happened to it.
    pub fn was_interacted(&self) -> bool {
        self.history.len() > 1
    }

    /// Rebind to another cell, appending the placement entry.
    pub fn move_to(&mut self, cell: HexCoord, grid: &HexGrid) {
        self.cell = cell;
        self.position = grid.center(cell);
        self.history.push(placed_entry(cell));
    }

    pub fn to_memento(&self) -> TokenMemento {
        TokenMemento {
            id: self.id.0.clone(),
            value: self.value,
            lat: self.position.lat,
            lng: self.position.lng,
            q: self.cell.q,
            r: self.cell.r,
            history: self.history.clone(),
        }
    }
}

/// Durable snapshot of a token, matching the persisted JSON shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenMemento {
    pub id: String,
    pub value: u32,
    pub lat: f64,
    pub lng: f64,
    pub q: i32,
    pub r: i32,
    pub history: Vec<String>,
}

impl TokenMemento {
    pub fn cell(&self) -> HexCoord {
        HexCoord { q: self.q, r: self.r }
    }

    /// Rebuild the live token. Position comes from the coordinate, not the
    /// stored lat/lng, so a memento can never place a coin off its cell.
    pub fn restore(&self, grid: &HexGrid) -> Token {
        Token::new(TokenId(self.id.clone()), self.value, self.cell(), self.history.clone(), grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CELL_SIZE_DEGREES;

    fn grid() -> HexGrid {
        HexGrid::new(GeoPoint::new(0.0, 0.0), DEFAULT_CELL_SIZE_DEGREES)
    }

    #[test]
    fn memento_restores_an_identical_token() {
        let grid = grid();
        let cell = HexCoord::new(4, -1);
        let mut token =
            Token::new(TokenId::spawned(cell), 6, cell, vec![spawned_entry(cell)], &grid);
        token.history.push(picked_up_entry(cell));

        let restored = token.to_memento().restore(&grid);
        assert_eq!(restored, token);
    }

    #[test]
    fn move_to_rebinds_position_and_records_placement() {
        let grid = grid();
        let from = HexCoord::new(0, 0);
        let to = HexCoord::new(2, 3);
        let mut token =
            Token::new(TokenId::spawned(from), 3, from, vec![spawned_entry(from)], &grid);

        token.move_to(to, &grid);

        assert_eq!(token.cell, to);
        assert_eq!(token.position, grid.center(to));
        assert_eq!(token.history.last().map(String::as_str), Some("placed in cell 2,3"));
        assert!(token.was_interacted());
    }

    #[test]
    fn crafted_ids_are_deterministic_and_order_sensitive() {
        let a = TokenId("coin:1,2".to_string());
        let b = TokenId("coin:3,4".to_string());
        assert_eq!(TokenId::crafted(&a, &b), TokenId::crafted(&a, &b));
        assert_ne!(TokenId::crafted(&a, &b), TokenId::crafted(&b, &a));
        assert!(TokenId::crafted(&a, &b).as_str().starts_with("craft:"));
    }
}
