//! Sliding window of active cells around the player.
//!
//! Cells entering the window are filled from a remembered memento when one
//! exists, otherwise from the deterministic generator. Cells leaving the
//! window are forgotten unless the player touched them, in which case their
//! exact state (including "empty") is remembered until the cell is re-entered.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::SpawnConfig;
use crate::hex::{HexGrid, distance_m, window};
use crate::spawn::spawn_decision;
use crate::token::{Token, TokenId, TokenMemento};
use crate::types::{GeoPoint, HexCoord};

/// What a window update changed, so callers can redraw incrementally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowDelta {
    pub entered: Vec<HexCoord>,
    pub exited: Vec<HexCoord>,
    pub spawned: Vec<HexCoord>,
    pub restored: Vec<HexCoord>,
    pub remembered: Vec<HexCoord>,
    pub reach_changed: Vec<HexCoord>,
}

impl WindowDelta {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty() && self.reach_changed.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct World {
    grid: HexGrid,
    spawn: SpawnConfig,
    active: HashSet<HexCoord>,
    tokens: HashMap<HexCoord, Token>,
    touched: HashSet<HexCoord>,
    remembered: HashMap<HexCoord, Option<TokenMemento>>,
    reachable: HashSet<HexCoord>,
}

impl World {
    pub fn new(grid: HexGrid, spawn: SpawnConfig) -> Self {
        Self {
            grid,
            spawn,
            active: HashSet::new(),
            tokens: HashMap::new(),
            touched: HashSet::new(),
            remembered: HashMap::new(),
            reachable: HashSet::new(),
        }
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Seed the remembered store, typically from a saved game.
    pub fn remember(&mut self, cell: HexCoord, memento: Option<TokenMemento>) {
        if let Some(memento) = &memento {
            assert_eq!(
                memento.cell(),
                cell,
                "memento {} is keyed under cell {cell} but references another cell",
                memento.id
            );
        }
        self.remembered.insert(cell, memento);
    }

    pub fn update_window(
        &mut self,
        center: HexCoord,
        range: u32,
        player: GeoPoint,
        reach_m: f64,
    ) -> WindowDelta {
        let target: HashSet<HexCoord> = window(center, range).collect();
        let mut delta = WindowDelta::default();

        let mut leaving: Vec<HexCoord> =
            self.active.iter().filter(|cell| !target.contains(cell)).copied().collect();
        leaving.sort_unstable();
        for cell in leaving {
            self.evict(cell, &mut delta);
        }

        for cell in window(center, range) {
            if self.active.insert(cell) {
                self.activate(cell, &mut delta);
            }
        }

        delta.reach_changed = self.refresh_reach(player, reach_m);
        debug!(
            center = %center,
            entered = delta.entered.len(),
            exited = delta.exited.len(),
            spawned = delta.spawned.len(),
            restored = delta.restored.len(),
            remembered = delta.remembered.len(),
            "window updated"
        );
        delta
    }

    fn activate(&mut self, cell: HexCoord, delta: &mut WindowDelta) {
        delta.entered.push(cell);
        if let Some(memory) = self.remembered.remove(&cell) {
            self.touched.insert(cell);
            if let Some(memento) = memory {
                assert_eq!(memento.cell(), cell, "remembered memento {} moved cells", memento.id);
                self.tokens.insert(cell, memento.restore(&self.grid));
            }
            delta.restored.push(cell);
            return;
        }
        if let Some(token) = spawn_decision(cell, &self.spawn, &self.grid) {
            self.tokens.insert(cell, token);
            delta.spawned.push(cell);
        }
    }

    fn evict(&mut self, cell: HexCoord, delta: &mut WindowDelta) {
        self.active.remove(&cell);
        self.reachable.remove(&cell);
        let token = self.tokens.remove(&cell);
        let touched = self.touched.remove(&cell);
        let interacted = token.as_ref().is_some_and(Token::was_interacted);
        if touched || interacted {
            self.remembered.insert(cell, token.as_ref().map(Token::to_memento));
            delta.remembered.push(cell);
        }
        delta.exited.push(cell);
    }

    /// Recompute reachability flags; returns the cells whose flag flipped.
    pub fn refresh_reach(&mut self, player: GeoPoint, reach_m: f64) -> Vec<HexCoord> {
        let now: HashSet<HexCoord> = self
            .tokens
            .iter()
            .filter(|(_, token)| distance_m(player, token.position) <= reach_m)
            .map(|(cell, _)| *cell)
            .collect();
        let mut changed: Vec<HexCoord> =
            now.symmetric_difference(&self.reachable).copied().collect();
        changed.sort_unstable();
        self.reachable = now;
        changed
    }

    pub fn is_active(&self, cell: HexCoord) -> bool {
        self.active.contains(&cell)
    }

    pub fn active_cells(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.active.iter().copied()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn token_at(&self, cell: HexCoord) -> Option<&Token> {
        self.tokens.get(&cell)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn find_token(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.values().find(|token| &token.id == id)
    }

    pub fn is_reachable(&self, cell: HexCoord) -> bool {
        self.reachable.contains(&cell)
    }

    pub fn is_touched(&self, cell: HexCoord) -> bool {
        self.touched.contains(&cell)
    }

    /// Remove the coin from an active cell. The cell now counts as touched.
    pub fn take_token(&mut self, cell: HexCoord) -> Option<Token> {
        if !self.active.contains(&cell) {
            return None;
        }
        let token = self.tokens.remove(&cell)?;
        self.touched.insert(cell);
        self.reachable.remove(&cell);
        Some(token)
    }

    /// Put a coin into its (active, empty) cell. Refused coins are handed back.
    pub fn place_token(&mut self, token: Token) -> Result<(), Token> {
        let cell = token.cell;
        if !self.active.contains(&cell) || self.tokens.contains_key(&cell) {
            return Err(token);
        }
        self.touched.insert(cell);
        self.tokens.insert(cell, token);
        Ok(())
    }

    pub fn remembered(&self, cell: HexCoord) -> Option<&Option<TokenMemento>> {
        self.remembered.get(&cell)
    }

    pub fn remembered_len(&self) -> usize {
        self.remembered.len()
    }

    /// Everything worth persisting: the remembered store plus the state of
    /// every active cell that would be remembered if it were evicted now.
    pub fn remembered_snapshot(&self) -> Vec<(HexCoord, Option<TokenMemento>)> {
        let mut entries: Vec<(HexCoord, Option<TokenMemento>)> =
            self.remembered.iter().map(|(cell, memento)| (*cell, memento.clone())).collect();
        for cell in &self.active {
            let token = self.tokens.get(cell);
            let interacted = token.is_some_and(Token::was_interacted);
            if self.touched.contains(cell) || interacted {
                entries.push((*cell, token.map(Token::to_memento)));
            }
        }
        entries.sort_by_key(|(cell, _)| *cell);
        entries
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.tokens.clear();
        self.touched.clear();
        self.remembered.clear();
        self.reachable.clear();
    }
}
