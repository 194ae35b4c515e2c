//! Top-level assembly: owns the world, the player and the inventory, and is
//! the single dispatcher for every command the front-end sends.
//!
//! Each `apply` call runs to completion before the next one starts, so token
//! moves between the world and the inventory never interleave.

mod hash;

use std::collections::VecDeque;

use tracing::info;

use crate::config::{GameConfig, WinPolicy};
use crate::hex::{HexGrid, distance_m};
use crate::inventory::{Inventory, can_craft, craft};
use crate::player::{CellChange, Player};
use crate::token::{Token, TokenId, picked_up_entry};
use crate::types::{Direction, GeoPoint, HexCoord, MovementMode};
use crate::world::{WindowDelta, World};

const LOG_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Step(Direction),
    LiveFix(GeoPoint),
    SetMode(MovementMode),
    ToggleMode,
    /// Pick up, swap, or craft with the coin in this cell.
    Interact(HexCoord),
    /// Drop the held coin into this empty cell.
    Place(HexCoord),
    NewGame,
    Refresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    NotActive,
    NoToken,
    OutOfReach,
    CellOccupied,
    EmptyHand,
    WrongMode,
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Moved { from: HexCoord, to: HexCoord },
    WindowUpdated(WindowDelta),
    ModeChanged(MovementMode),
    PickedUp { id: TokenId, value: u32, cell: HexCoord },
    Placed { id: TokenId, value: u32, cell: HexCoord },
    Crafted { id: TokenId, value: u32, cell: HexCoord },
    Won { value: u32 },
    Ignored(IgnoreReason),
    NewGame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SaveUrgency {
    None,
    Debounced,
    Immediate,
}

impl GameEvent {
    pub fn save_urgency(&self) -> SaveUrgency {
        match self {
            GameEvent::PickedUp { .. }
            | GameEvent::Placed { .. }
            | GameEvent::Crafted { .. }
            | GameEvent::Won { .. }
            | GameEvent::ModeChanged(_)
            | GameEvent::NewGame => SaveUrgency::Immediate,
            GameEvent::Moved { .. } => SaveUrgency::Debounced,
            GameEvent::WindowUpdated(_) | GameEvent::Ignored(_) => SaveUrgency::None,
        }
    }
}

/// Highest urgency among a batch of events.
pub fn save_urgency(events: &[GameEvent]) -> SaveUrgency {
    events.iter().map(GameEvent::save_urgency).max().unwrap_or(SaveUrgency::None)
}

pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) grid: HexGrid,
    pub(crate) world: World,
    pub(crate) player: Player,
    pub(crate) inventory: Inventory,
    pub(crate) won: bool,
    log: VecDeque<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let grid = HexGrid::from_config(&config);
        let player =
            Player::new(&grid, config.start_position, config.reach_meters, config.start_mode);
        let world = World::new(grid, config.spawn.clone());
        let mut game = Self::from_parts(config, grid, world, player, Inventory::default());
        game.update_window();
        game
    }

    /// Assemble without touching the window; callers run `update_window`.
    pub(crate) fn from_parts(
        config: GameConfig,
        grid: HexGrid,
        world: World,
        player: Player,
        inventory: Inventory,
    ) -> Self {
        Self {
            config,
            grid,
            world,
            player,
            inventory,
            won: false,
            log: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    /// Most recent events, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &GameEvent> {
        self.log.iter()
    }

    pub fn apply(&mut self, command: Command) -> Vec<GameEvent> {
        let events = match command {
            Command::Step(direction) => {
                if self.player.mode() != MovementMode::Stepped {
                    vec![GameEvent::Ignored(IgnoreReason::WrongMode)]
                } else {
                    let change = self.player.step(&self.grid, direction);
                    self.after_move(change)
                }
            }
            Command::LiveFix(fix) => {
                if self.player.mode() != MovementMode::Live {
                    vec![GameEvent::Ignored(IgnoreReason::WrongMode)]
                } else {
                    let change = self.player.apply_fix(&self.grid, fix);
                    self.after_move(change)
                }
            }
            Command::SetMode(mode) => self.set_mode(mode),
            Command::ToggleMode => self.set_mode(self.player.mode().toggled()),
            Command::Interact(cell) => self.interact(cell),
            Command::Place(cell) => self.place(cell),
            Command::NewGame => self.new_game(),
            Command::Refresh => vec![GameEvent::WindowUpdated(self.update_window())],
        };
        self.check_exclusive();
        for event in &events {
            if self.log.len() == LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(event.clone());
        }
        events
    }

    fn set_mode(&mut self, mode: MovementMode) -> Vec<GameEvent> {
        if self.player.set_mode(mode) {
            info!(?mode, "movement mode changed");
            vec![GameEvent::ModeChanged(mode)]
        } else {
            Vec::new()
        }
    }

    fn after_move(&mut self, change: Option<CellChange>) -> Vec<GameEvent> {
        let Some(change) = change else {
            return Vec::new();
        };
        let delta = self.update_window();
        vec![GameEvent::Moved { from: change.from, to: change.to }, GameEvent::WindowUpdated(delta)]
    }

    pub(crate) fn update_window(&mut self) -> WindowDelta {
        self.world.update_window(
            self.player.cell(),
            self.config.window_range,
            self.player.position(),
            self.player.reach_m(),
        )
    }

    fn refresh_reach(&mut self) {
        self.world.refresh_reach(self.player.position(), self.player.reach_m());
    }

    fn within_reach(&self, point: GeoPoint) -> bool {
        distance_m(self.player.position(), point) <= self.player.reach_m()
    }

    fn interact(&mut self, cell: HexCoord) -> Vec<GameEvent> {
        let ignored = |reason| vec![GameEvent::Ignored(reason)];
        if !self.world.is_active(cell) {
            return ignored(IgnoreReason::NotActive);
        }
        let Some(target) = self.world.token_at(cell) else {
            return ignored(IgnoreReason::NoToken);
        };
        if !self.within_reach(target.position) {
            return ignored(IgnoreReason::OutOfReach);
        }
        let crafting = self.inventory.held().is_some_and(|held| can_craft(held, target));
        if crafting && self.won && self.config.win_policy == WinPolicy::LockCrafting {
            return ignored(IgnoreReason::GameOver);
        }

        let Some(mut target) = self.world.take_token(cell) else {
            return ignored(IgnoreReason::NoToken);
        };
        let mut events = Vec::new();
        if crafting && let Some(held) = self.inventory.take() {
            match craft(held, target) {
                Ok(crafted) => {
                    info!(id = %crafted.id, value = crafted.value, cell = %cell, "crafted coin");
                    events.push(GameEvent::Crafted {
                        id: crafted.id.clone(),
                        value: crafted.value,
                        cell,
                    });
                    if crafted.value >= self.config.win_value && !self.won {
                        self.won = true;
                        info!(value = crafted.value, "win condition reached");
                        events.push(GameEvent::Won { value: crafted.value });
                    }
                    self.inventory.swap(crafted);
                }
                Err((held, target)) => {
                    self.inventory.swap(held);
                    self.put_back(target);
                }
            }
        } else {
            target.history.push(picked_up_entry(cell));
            events.push(GameEvent::PickedUp { id: target.id.clone(), value: target.value, cell });
            if let Some(mut previous) = self.inventory.swap(target) {
                previous.move_to(cell, &self.grid);
                events.push(GameEvent::Placed {
                    id: previous.id.clone(),
                    value: previous.value,
                    cell,
                });
                self.put_back(previous);
            }
        }
        self.refresh_reach();
        events
    }

    fn place(&mut self, cell: HexCoord) -> Vec<GameEvent> {
        let ignored = |reason| vec![GameEvent::Ignored(reason)];
        if self.inventory.is_empty() {
            return ignored(IgnoreReason::EmptyHand);
        }
        if !self.world.is_active(cell) {
            return ignored(IgnoreReason::NotActive);
        }
        if self.world.token_at(cell).is_some() {
            return ignored(IgnoreReason::CellOccupied);
        }
        if !self.within_reach(self.grid.center(cell)) {
            return ignored(IgnoreReason::OutOfReach);
        }
        let Some(mut token) = self.inventory.take() else {
            return ignored(IgnoreReason::EmptyHand);
        };
        token.move_to(cell, &self.grid);
        let event = GameEvent::Placed { id: token.id.clone(), value: token.value, cell };
        self.put_back(token);
        self.refresh_reach();
        vec![event]
    }

    /// The cell was emptied earlier in the same command, so it must accept the coin.
    fn put_back(&mut self, token: Token) {
        if let Err(token) = self.world.place_token(token) {
            panic!("cell {} refused coin {} it just released", token.cell, token.id);
        }
    }

    fn new_game(&mut self) -> Vec<GameEvent> {
        self.world.clear();
        self.inventory.clear();
        self.won = false;
        let (start, _) = self.grid.snap(self.config.start_position);
        self.player.teleport(&self.grid, start);
        info!(start = %start, "new game");
        let delta = self.update_window();
        vec![GameEvent::NewGame, GameEvent::WindowUpdated(delta)]
    }

    fn check_exclusive(&self) {
        if let Some(held) = self.inventory.held() {
            assert!(
                self.world.find_token(&held.id).is_none(),
                "coin {} is both held and placed in the world",
                held.id
            );
        }
    }
}
