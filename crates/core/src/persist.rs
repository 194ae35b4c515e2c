//! Save format, load validation, and the store/debounce plumbing around it.
//!
//! A save is a single camelCase JSON document. Loading is all-or-nothing: any
//! validation failure discards the whole document and the caller starts fresh.

use std::collections::HashSet;
use std::io;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::game::Game;
use crate::hex::HexGrid;
use crate::inventory::Inventory;
use crate::player::Player;
use crate::token::{TokenMemento, spawn_origin};
use crate::types::{GeoPoint, HexCoord, MovementMode};
use crate::world::World;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub config: SavedConfig,
    pub player: GeoPoint,
    pub remembered_tokens: Vec<RememberedEntry>,
    pub inventory_token: Option<TokenMemento>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfig {
    pub stepped_mode: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RememberedEntry {
    pub cell_id: String,
    pub memento: Option<TokenMemento>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("save is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cell id `{0}` is not a coordinate")]
    BadCellId(String),
    #[error("cell {cell} holds a memento for cell {memento_cell}")]
    CellMismatch { cell: HexCoord, memento_cell: HexCoord },
    #[error("cell {0} is listed more than once")]
    DuplicateCell(HexCoord),
    #[error("coin `{0}` appears more than once")]
    DuplicateToken(String),
    #[error("coin `{0}` has value 0")]
    ZeroValue(String),
    #[error("coin `{0}` has no history")]
    EmptyHistory(String),
    #[error("coin `{id}` comes from cell {cell}, which the save does not remember")]
    OriginNotRemembered { id: String, cell: HexCoord },
    #[error("non-finite coordinates in save")]
    NonFinite,
}

/// Where save documents live. Implementations decide durability.
pub trait Store {
    fn read(&self) -> Result<Option<String>, StoreError>;
    fn write(&mut self, contents: &str) -> Result<(), StoreError>;
}

/// Keeps the document in memory. Used by tests and headless tools.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub contents: Option<String>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self { contents: Some(contents.into()), fail_writes: false }
    }
}

impl Store for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io(io::Error::other("memory store refuses writes")));
        }
        self.contents = Some(contents.to_string());
        Ok(())
    }
}

fn check_memento(memento: &TokenMemento) -> Result<(), LoadError> {
    if memento.value == 0 {
        return Err(LoadError::ZeroValue(memento.id.clone()));
    }
    if memento.history.is_empty() {
        return Err(LoadError::EmptyHistory(memento.id.clone()));
    }
    if !(memento.lat.is_finite() && memento.lng.is_finite()) {
        return Err(LoadError::NonFinite);
    }
    Ok(())
}

impl SavedGame {
    pub fn from_json(contents: &str) -> Result<Self, LoadError> {
        let saved: Self = serde_json::from_str(contents)?;
        saved.validate()?;
        Ok(saved)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if !self.player.is_finite() {
            return Err(LoadError::NonFinite);
        }
        let mut cells = HashSet::new();
        let mut ids = HashSet::new();
        for entry in &self.remembered_tokens {
            let cell: HexCoord = entry
                .cell_id
                .parse()
                .map_err(|_| LoadError::BadCellId(entry.cell_id.clone()))?;
            if !cells.insert(cell) {
                return Err(LoadError::DuplicateCell(cell));
            }
            if let Some(memento) = &entry.memento {
                check_memento(memento)?;
                if memento.cell() != cell {
                    return Err(LoadError::CellMismatch { cell, memento_cell: memento.cell() });
                }
                if !ids.insert(memento.id.as_str()) {
                    return Err(LoadError::DuplicateToken(memento.id.clone()));
                }
            }
        }
        if let Some(memento) = &self.inventory_token {
            check_memento(memento)?;
            if ids.contains(memento.id.as_str()) {
                return Err(LoadError::DuplicateToken(memento.id.clone()));
            }
        }
        // A spawned coin away from its origin would be generated there again.
        let mementos = self.remembered_tokens.iter().filter_map(|entry| entry.memento.as_ref());
        for memento in mementos.chain(&self.inventory_token) {
            if let Some(cell) = spawn_origin(&memento.id)
                && !cells.contains(&cell)
            {
                return Err(LoadError::OriginNotRemembered { id: memento.id.clone(), cell });
            }
        }
        Ok(())
    }
}

impl Game {
    pub fn snapshot(&self) -> SavedGame {
        let remembered_tokens = self
            .world
            .remembered_snapshot()
            .into_iter()
            .map(|(cell, memento)| RememberedEntry { cell_id: cell.to_string(), memento })
            .collect();
        SavedGame {
            config: SavedConfig { stepped_mode: self.player.mode() == MovementMode::Stepped },
            player: self.player.position(),
            remembered_tokens,
            inventory_token: self.inventory.held().map(|token| token.to_memento()),
        }
    }

    /// Rebuild a game from a validated save. The remembered store is seeded
    /// first so cells inside the restored window come back from memory.
    pub fn restore(config: GameConfig, saved: &SavedGame) -> Result<Self, LoadError> {
        saved.validate()?;
        let grid = HexGrid::from_config(&config);
        let mode =
            if saved.config.stepped_mode { MovementMode::Stepped } else { MovementMode::Live };
        let player = Player::new(&grid, saved.player, config.reach_meters, mode);

        let mut world = World::new(grid, config.spawn.clone());
        let mut best = 0;
        for entry in &saved.remembered_tokens {
            let cell: HexCoord = entry
                .cell_id
                .parse()
                .map_err(|_| LoadError::BadCellId(entry.cell_id.clone()))?;
            if let Some(memento) = &entry.memento {
                best = best.max(memento.value);
            }
            world.remember(cell, entry.memento.clone());
        }
        let held = saved.inventory_token.as_ref().map(|memento| memento.restore(&grid));
        if let Some(token) = &held {
            best = best.max(token.value);
        }

        let mut game = Game::from_parts(config, grid, world, player, Inventory::new(held));
        game.won = best >= game.config.win_value;
        game.update_window();
        check_unique_ids(&game)?;
        info!(
            cell = %game.player.cell(),
            remembered = saved.remembered_tokens.len(),
            "restored saved game"
        );
        Ok(game)
    }
}

fn check_unique_ids(game: &Game) -> Result<(), LoadError> {
    let mut ids = HashSet::new();
    let held = game.inventory.held().into_iter();
    for token in game.world.tokens().chain(held) {
        if !ids.insert(&token.id) {
            return Err(LoadError::DuplicateToken(token.id.to_string()));
        }
    }
    Ok(())
}

/// Read and validate a save. `Ok(None)` means the store is empty.
pub fn try_load(store: &impl Store, config: GameConfig) -> Result<Option<Game>, LoadError> {
    let Some(contents) = store.read()? else {
        return Ok(None);
    };
    let saved = SavedGame::from_json(&contents)?;
    Game::restore(config, &saved).map(Some)
}

/// Load the saved game or start fresh. A malformed save is logged and ignored.
pub fn load_game(store: &impl Store, config: GameConfig) -> Game {
    match try_load(store, config.clone()) {
        Ok(Some(game)) => game,
        Ok(None) => Game::new(config),
        Err(err) => {
            warn!(error = %err, "discarding unreadable save");
            Game::new(config)
        }
    }
}

/// Write the current state. Failures are logged and skipped; returns whether
/// the write went through.
pub fn save_game(store: &mut impl Store, game: &Game) -> bool {
    let result = game.snapshot().to_json().and_then(|json| store.write(&json));
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "failed to save game");
            false
        }
    }
}

/// Coalesces bursts of changes into one save after a quiet period.
#[derive(Clone, Debug)]
pub struct SaveDebounce {
    quiet: Duration,
    last_change: Option<Instant>,
}

impl SaveDebounce {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, last_change: None }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(Duration::from_millis(config.save_debounce_ms))
    }

    pub fn is_dirty(&self) -> bool {
        self.last_change.is_some()
    }

    /// Each change restarts the quiet period.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    /// True once, when the quiet period has elapsed since the last change.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.last_change {
            Some(at) if now.saturating_duration_since(at) >= self.quiet => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }

    /// Clear any pending change, reporting whether one was pending.
    pub fn flush(&mut self) -> bool {
        self.last_change.take().is_some()
    }
}
