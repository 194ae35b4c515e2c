//! Player position, reach, and the live/stepped movement state machine.

use crate::hex::HexGrid;
use crate::types::{Direction, GeoPoint, HexCoord, MovementMode};

/// Supplies raw location fixes while the player is in live mode.
pub trait PositionSource {
    fn poll(&mut self) -> Option<GeoPoint>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellChange {
    pub from: HexCoord,
    pub to: HexCoord,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    cell: HexCoord,
    position: GeoPoint,
    reach_m: f64,
    mode: MovementMode,
}

impl Player {
    /// Start at the cell containing `start`; the position is snapped to its center.
    pub fn new(grid: &HexGrid, start: GeoPoint, reach_m: f64, mode: MovementMode) -> Self {
        let (cell, position) = grid.snap(start);
        Self { cell, position, reach_m, mode }
    }

    pub fn cell(&self) -> HexCoord {
        self.cell
    }

    pub fn position(&self) -> GeoPoint {
        self.position
    }

    pub fn reach_m(&self) -> f64 {
        self.reach_m
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    /// Returns true when the mode actually changed.
    pub fn set_mode(&mut self, mode: MovementMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    /// Apply a live location fix. Ignored in stepped mode; only reports a
    /// change when the snapped cell differs from the current one.
    pub fn apply_fix(&mut self, grid: &HexGrid, fix: GeoPoint) -> Option<CellChange> {
        if self.mode != MovementMode::Live || !fix.is_finite() {
            return None;
        }
        let (cell, _) = grid.snap(fix);
        self.relocate(grid, cell)
    }

    /// Move exactly one step. Ignored in live mode.
    pub fn step(&mut self, grid: &HexGrid, direction: Direction) -> Option<CellChange> {
        if self.mode != MovementMode::Stepped {
            return None;
        }
        let (dq, dr) = direction.delta();
        self.relocate(grid, self.cell.offset(dq, dr))
    }

    /// Jump to a cell regardless of mode, e.g. when restoring a save.
    pub fn teleport(&mut self, grid: &HexGrid, cell: HexCoord) -> Option<CellChange> {
        self.relocate(grid, cell)
    }

    fn relocate(&mut self, grid: &HexGrid, cell: HexCoord) -> Option<CellChange> {
        if cell == self.cell {
            return None;
        }
        let change = CellChange { from: self.cell, to: cell };
        self.cell = cell;
        self.position = grid.center(cell);
        Some(change)
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
    fn start_position_is_snapped_to_a_center() {
        let grid = grid();
        let start = GeoPoint::new(0.000_31, 0.000_52);
        let player = Player::new(&grid, start, 50.0, MovementMode::Live);
        assert_eq!(player.position(), grid.center(player.cell()));
    }

    #[test]
    fn steps_apply_direction_deltas() {
        let grid = grid();
        let mut player = Player::new(&grid, GeoPoint::new(0.0, 0.0), 50.0, MovementMode::Stepped);

        let change = player.step(&grid, Direction::North).expect("north moves");
        assert_eq!(change, CellChange { from: HexCoord::ORIGIN, to: HexCoord::new(0, 1) });
        player.step(&grid, Direction::East);
        player.step(&grid, Direction::SouthWest);
        assert_eq!(player.cell(), HexCoord::new(0, 0));
        assert!(player.step(&grid, Direction::Stay).is_none());
        assert_eq!(player.position(), grid.center(HexCoord::ORIGIN));
    }

    #[test]
    fn live_fixes_only_report_cell_changes() {
        let grid = grid();
        let mut player = Player::new(&grid, GeoPoint::new(0.0, 0.0), 50.0, MovementMode::Live);
        let same_cell = GeoPoint::new(grid.size * 0.2, grid.size * 0.1);
        assert!(player.apply_fix(&grid, same_cell).is_none());

        let target = HexCoord::new(2, -1);
        let change = player.apply_fix(&grid, grid.center(target)).expect("new cell");
        assert_eq!(change.to, target);
        assert_eq!(player.position(), grid.center(target));
    }

    #[test]
    fn modes_are_exclusive() {
        let grid = grid();
        let mut player = Player::new(&grid, GeoPoint::new(0.0, 0.0), 50.0, MovementMode::Live);
        assert!(player.step(&grid, Direction::East).is_none());

        assert!(player.set_mode(MovementMode::Stepped));
        assert!(player.apply_fix(&grid, grid.center(HexCoord::new(5, 5))).is_none());
        assert!(player.step(&grid, Direction::East).is_some());
        assert!(!player.set_mode(MovementMode::Stepped));
    }
}
