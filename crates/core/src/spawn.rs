//! Deterministic coin placement keyed only by cell coordinate.
//!
//! Nothing here may read the clock, the player, or any mutable state: the same
//! coordinate must produce the same coin in every process, forever.

use xxhash_rust::xxh3::xxh3_64;

use crate::config::SpawnConfig;
use crate::hex::HexGrid;
use crate::token::{Token, TokenId, spawned_entry};
use crate::types::HexCoord;

const UNIT_SCALE: f64 = (1_u64 << 53) as f64;

/// Uniform value in `[0, 1)` derived from the key's xxh3 digest.
pub fn luck(key: &str) -> f64 {
    (xxh3_64(key.as_bytes()) >> 11) as f64 / UNIT_SCALE
}

pub fn spawns_at(coord: HexCoord, config: &SpawnConfig) -> bool {
    luck(&coord.to_string()) < config.spawn_probability
}

/// Value the coin at `coord` would have, whether or not one spawns there.
pub fn value_at(coord: HexCoord, config: &SpawnConfig) -> u32 {
    let span = u64::from(config.max_value - config.min_value) + 1;
    let roll = luck(&format!("{coord},value"));
    let offset = ((roll * span as f64) as u64).min(span - 1);
    config.min_value + offset as u32
}

pub fn spawn_decision(coord: HexCoord, config: &SpawnConfig, grid: &HexGrid) -> Option<Token> {
    if !spawns_at(coord, config) {
        return None;
    }
    Some(Token::new(
        TokenId::spawned(coord),
        value_at(coord, config),
        coord,
        vec![spawned_entry(coord)],
        grid,
    ))
}
