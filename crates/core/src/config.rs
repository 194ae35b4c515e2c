//! Game configuration passed explicitly into `Game::new`.
//! Loaded from TOML; every field has a default so partial files are valid.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::de::Error as TomlError;

use crate::types::{GeoPoint, MovementMode};

/// Approximately 0.0001 degrees across for a flat-top cell.
pub const DEFAULT_CELL_SIZE_DEGREES: f64 = 0.000_05;
pub const DEFAULT_WINDOW_RANGE: u32 = 8;
pub const DEFAULT_REACH_METERS: f64 = 50.0;
pub const DEFAULT_WIN_VALUE: u32 = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] TomlError),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What happens once a crafted coin reaches the win value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinPolicy {
    /// Signal the win once and keep playing.
    #[default]
    Notify,
    /// Signal the win and refuse any further crafting until a new game.
    LockCrafting,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub spawn_probability: f64,
    pub min_value: u32,
    pub max_value: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self { spawn_probability: 0.1, min_value: 1, max_value: 10 }
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::Invalid {
                field: "spawn.spawn_probability",
                reason: format!("{} is outside [0, 1]", self.spawn_probability),
            });
        }
        if self.min_value == 0 {
            return Err(ConfigError::Invalid {
                field: "spawn.min_value",
                reason: "coin values must be positive".to_string(),
            });
        }
        if self.min_value > self.max_value {
            return Err(ConfigError::Invalid {
                field: "spawn.max_value",
                reason: format!("{} is below min_value {}", self.max_value, self.min_value),
            });
        }
        Ok(())
    }
}

/// Near-tier styling band: opacity and line weight fade linearly from
/// `band_min_m` to `band_max_m`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    pub band_min_m: f64,
    pub band_max_m: f64,
    pub max_opacity: f32,
    pub min_opacity: f32,
    pub max_line_weight: f32,
    pub min_line_weight: f32,
    /// Extra rings drawn around the window in the far-tier batch.
    pub far_margin: u32,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            band_min_m: 5.0,
            band_max_m: DEFAULT_REACH_METERS,
            max_opacity: 0.6,
            min_opacity: 0.15,
            max_line_weight: 2.0,
            min_line_weight: 0.5,
            far_margin: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub origin: GeoPoint,
    pub cell_size_degrees: f64,
    pub window_range: u32,
    pub reach_meters: f64,
    pub win_value: u32,
    pub win_policy: WinPolicy,
    pub start_position: GeoPoint,
    pub start_mode: MovementMode,
    pub save_debounce_ms: u64,
    pub spawn: SpawnConfig,
    pub tiers: TierConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            origin: GeoPoint::new(0.0, 0.0),
            cell_size_degrees: DEFAULT_CELL_SIZE_DEGREES,
            window_range: DEFAULT_WINDOW_RANGE,
            reach_meters: DEFAULT_REACH_METERS,
            win_value: DEFAULT_WIN_VALUE,
            win_policy: WinPolicy::Notify,
            start_position: GeoPoint::new(36.997_9, -122.057),
            start_mode: MovementMode::Stepped,
            save_debounce_ms: 750,
            spawn: SpawnConfig::default(),
            tiers: TierConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size_degrees.is_finite() && self.cell_size_degrees > 0.0) {
            return Err(ConfigError::Invalid {
                field: "cell_size_degrees",
                reason: "must be a positive number".to_string(),
            });
        }
        if !(self.reach_meters.is_finite() && self.reach_meters >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "reach_meters",
                reason: "must be a non-negative number".to_string(),
            });
        }
        if !self.origin.is_finite() || !self.start_position.is_finite() {
            return Err(ConfigError::Invalid {
                field: "origin",
                reason: "coordinates must be finite".to_string(),
            });
        }
        if self.win_value < 2 {
            return Err(ConfigError::Invalid {
                field: "win_value",
                reason: "a crafted coin is always at least 2".to_string(),
            });
        }
        if self.tiers.band_max_m <= self.tiers.band_min_m {
            return Err(ConfigError::Invalid {
                field: "tiers.band_max_m",
                reason: "must be greater than band_min_m".to_string(),
            });
        }
        self.spawn.validate()
    }
}
