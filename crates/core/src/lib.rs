pub mod config;
pub mod game;
pub mod hex;
pub mod inventory;
pub mod persist;
pub mod player;
pub mod spawn;
pub mod tiers;
pub mod token;
pub mod types;
pub mod world;

pub use config::{ConfigError, GameConfig, SpawnConfig, TierConfig, WinPolicy};
pub use game::{Command, Game, GameEvent, IgnoreReason, SaveUrgency, save_urgency};
pub use hex::{Cell, HexGrid};
pub use persist::{
    LoadError, MemoryStore, SaveDebounce, SavedGame, Store, StoreError, load_game, save_game,
    try_load,
};
pub use player::PositionSource;
pub use tiers::{MarkerStyle, Renderer, SceneSync};
pub use token::{SpriteKey, Token, TokenId, TokenMemento};
pub use types::*;
