use std::fmt;
use std::str::FromStr;

use hexx::Hex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axial hex coordinate. The only stable identity a cell has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn offset(self, dq: i32, dr: i32) -> Self {
        Self { q: self.q + dq, r: self.r + dr }
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cell id '{0}' is not of the form q,r")]
pub struct ParseCoordError(pub String);

impl FromStr for HexCoord {
    type Err = ParseCoordError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordError(raw.to_string());
        let (q, r) = raw.split_once(',').ok_or_else(err)?;
        let q = q.trim().parse::<i32>().map_err(|_| err())?;
        let r = r.trim().parse::<i32>().map_err(|_| err())?;
        Ok(Self { q, r })
    }
}

impl From<Hex> for HexCoord {
    fn from(hex: Hex) -> Self {
        Self { q: hex.x, r: hex.y }
    }
}

impl From<HexCoord> for Hex {
    fn from(coord: HexCoord) -> Self {
        Hex::new(coord.q, coord.r)
    }
}

/// A geographic point in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Axis-aligned geographic rectangle, inclusive on every edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoRect {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoRect {
    pub fn around(points: &[GeoPoint]) -> Self {
        let mut rect = Self {
            south: f64::INFINITY,
            west: f64::INFINITY,
            north: f64::NEG_INFINITY,
            east: f64::NEG_INFINITY,
        };
        for point in points {
            rect.include(*point);
        }
        rect
    }

    pub fn include(&mut self, point: GeoPoint) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }

    pub fn contains_rect(&self, other: &Self) -> bool {
        other.south >= self.south
            && other.north <= self.north
            && other.west >= self.west
            && other.east <= self.east
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

/// Compass direction for stepped movement. `Stay` is the no-op step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Stay,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::Stay,
    ];

    /// Axial `(dq, dr)` applied by one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
            Direction::Stay => (0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementMode {
    #[default]
    Live,
    Stepped,
}

impl MovementMode {
    pub fn toggled(self) -> Self {
        match self {
            MovementMode::Live => MovementMode::Stepped,
            MovementMode::Stepped => MovementMode::Live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_id_string_round_trips() {
        let coord = HexCoord::new(-3, 7);
        assert_eq!(coord.to_string(), "-3,7");
        assert_eq!("-3,7".parse::<HexCoord>(), Ok(coord));
        assert_eq!(" 4 , -2 ".parse::<HexCoord>(), Ok(HexCoord::new(4, -2)));
    }

    #[test]
    fn malformed_cell_ids_are_rejected() {
        for raw in ["", "3", "3;4", "a,b", "1,2,3", "1.5,2"] {
            assert!(raw.parse::<HexCoord>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn rect_containment_is_inclusive() {
        let outer = GeoRect { south: 0.0, west: 0.0, north: 1.0, east: 1.0 };
        assert!(outer.contains_rect(&outer));
        assert!(outer.contains(GeoPoint::new(1.0, 0.0)));
        let wider = GeoRect { east: 1.5, ..outer };
        assert!(!outer.contains_rect(&wider));
        assert!(wider.contains_rect(&outer));
    }

    #[test]
    fn every_direction_but_stay_moves() {
        for direction in Direction::ALL {
            let moves = direction.delta() != (0, 0);
            assert_eq!(moves, direction != Direction::Stay, "{direction:?}");
        }
    }
}
