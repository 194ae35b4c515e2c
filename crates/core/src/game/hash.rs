//! Stable snapshot hashing for deterministic verification.
//! Two games fed the same commands from the same config must hash equal.

use std::hash::Hasher;

use super::*;
use xxhash_rust::xxh3::Xxh3;

impl Game {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        let player = &self.player;
        hasher.write_i32(player.cell().q);
        hasher.write_i32(player.cell().r);
        hasher.write_u8(match player.mode() {
            MovementMode::Live => 0,
            MovementMode::Stepped => 1,
        });
        hasher.write_u8(u8::from(self.won));

        match self.inventory.held() {
            Some(token) => write_token(&mut hasher, token),
            None => hasher.write_u8(0),
        }

        let mut cells: Vec<HexCoord> = self.world.active_cells().collect();
        cells.sort_unstable();
        for cell in cells {
            hasher.write_i32(cell.q);
            hasher.write_i32(cell.r);
            match self.world.token_at(cell) {
                Some(token) => write_token(&mut hasher, token),
                None => hasher.write_u8(0),
            }
        }

        for (cell, memento) in self.world.remembered_snapshot() {
            hasher.write_i32(cell.q);
            hasher.write_i32(cell.r);
            match memento {
                Some(memento) => {
                    hasher.write(memento.id.as_bytes());
                    hasher.write_u32(memento.value);
                    hasher.write_usize(memento.history.len());
                }
                None => hasher.write_u8(0),
            }
        }
        hasher.finish()
    }
}

fn write_token(hasher: &mut Xxh3, token: &Token) {
    hasher.write_u8(1);
    hasher.write(token.id.as_str().as_bytes());
    hasher.write_u32(token.value);
    hasher.write_i32(token.cell.q);
    hasher.write_i32(token.cell.r);
    for entry in &token.history {
        hasher.write(entry.as_bytes());
    }
}
