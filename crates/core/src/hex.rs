//! Flat-top axial hex grid projected directly onto latitude/longitude degrees.
//! This module is pure math: it owns no state beyond the grid origin and size.
//!
//! `to_hex` rounds each axial component independently. That is a nearest-center
//! approximation rather than an exact point-in-hexagon test, so points close to
//! a shared edge may land in either neighbour.

use std::array;

use hexx::{Hex, shapes};

use crate::config::GameConfig;
use crate::types::{GeoPoint, GeoRect, HexCoord};

const SQRT_3: f64 = 1.732_050_807_568_877_2;
/// Mean earth radius used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A cell, derived entirely from its coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub coord: HexCoord,
    pub center: GeoPoint,
    pub corners: [GeoPoint; 6],
    pub bounds: GeoRect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexGrid {
    pub origin: GeoPoint,
    pub size: f64,
}

impl HexGrid {
    pub fn new(origin: GeoPoint, size: f64) -> Self {
        Self { origin, size }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.origin, config.cell_size_degrees)
    }

    pub fn center(&self, coord: HexCoord) -> GeoPoint {
        let q = f64::from(coord.q);
        let r = f64::from(coord.r);
        GeoPoint {
            lat: self.origin.lat + self.size * (SQRT_3 / 2.0 * q + SQRT_3 * r),
            lng: self.origin.lng + self.size * (1.5 * q),
        }
    }

    pub fn corners(&self, coord: HexCoord) -> [GeoPoint; 6] {
        let center = self.center(coord);
        array::from_fn(|i| {
            let angle = (60.0 * i as f64).to_radians();
            GeoPoint {
                lat: center.lat + self.size * angle.sin(),
                lng: center.lng + self.size * angle.cos(),
            }
        })
    }

    pub fn bounds(&self, coord: HexCoord) -> GeoRect {
        GeoRect::around(&self.corners(coord))
    }

    pub fn cell(&self, coord: HexCoord) -> Cell {
        let corners = self.corners(coord);
        Cell { coord, center: self.center(coord), corners, bounds: GeoRect::around(&corners) }
    }

    pub fn to_hex(&self, point: GeoPoint) -> HexCoord {
        let x = point.lng - self.origin.lng;
        let y = point.lat - self.origin.lat;
        let q = (2.0 / 3.0) * x / self.size;
        let r = (-1.0 / 3.0 * x + SQRT_3 / 3.0 * y) / self.size;
        HexCoord { q: q.round() as i32, r: r.round() as i32 }
    }

    /// Snap an arbitrary point to the center of the cell it rounds into.
    pub fn snap(&self, point: GeoPoint) -> (HexCoord, GeoPoint) {
        let coord = self.to_hex(point);
        (coord, self.center(coord))
    }

    pub fn window_bounds(&self, center: HexCoord, range: u32) -> GeoRect {
        window(center, range)
            .map(|coord| self.bounds(coord))
            .reduce(GeoRect::union)
            .unwrap_or_else(|| self.bounds(center))
    }
}

pub fn hex_distance(a: HexCoord, b: HexCoord) -> u32 {
    Hex::from(a).unsigned_distance_to(Hex::from(b))
}

/// Every coordinate within `range` grid steps of `center`.
pub fn window(center: HexCoord, range: u32) -> impl ExactSizeIterator<Item = HexCoord> {
    shapes::hexagon(Hex::from(center), range).map(HexCoord::from)
}

pub fn window_len(range: u32) -> usize {
    let range = range as usize;
    3 * range * (range + 1) + 1
}

/// Haversine great-circle distance in meters.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CELL_SIZE_DEGREES;

    fn grid() -> HexGrid {
        HexGrid::new(GeoPoint::new(0.0, 0.0), DEFAULT_CELL_SIZE_DEGREES)
    }

    #[test]
    fn origin_cell_is_centered_on_origin() {
        assert_eq!(grid().center(HexCoord::ORIGIN), GeoPoint::new(0.0, 0.0));
    }

    #[test]
    fn centers_round_trip_through_to_hex() {
        let grid = grid();
        for q in -20..=20 {
            for r in -20..=20 {
                let coord = HexCoord::new(q, r);
                assert_eq!(grid.to_hex(grid.center(coord)), coord);
            }
        }
    }

    #[test]
    fn corners_sit_one_size_from_center() {
        let grid = grid();
        let coord = HexCoord::new(3, -5);
        let center = grid.center(coord);
        for corner in grid.corners(coord) {
            let d = ((corner.lat - center.lat).powi(2) + (corner.lng - center.lng).powi(2)).sqrt();
            assert!((d - grid.size).abs() < 1e-12);
        }
    }

    #[test]
    fn flat_top_bounds_are_about_a_ten_thousandth_of_a_degree_wide() {
        let bounds = grid().bounds(HexCoord::new(7, 2));
        assert!((bounds.width() - 0.0001).abs() < 1e-12);
        assert!((bounds.height() - SQRT_3 * DEFAULT_CELL_SIZE_DEGREES).abs() < 1e-12);
    }

    #[test]
    fn cell_bundles_the_derived_geometry() {
        let coord = HexCoord::new(-3, 5);
        let cell = grid().cell(coord);
        assert_eq!(cell.coord, coord);
        assert_eq!(cell.center, grid().center(coord));
        assert_eq!(cell.corners, grid().corners(coord));
        assert_eq!(cell.bounds, grid().bounds(coord));
        assert!(cell.bounds.contains(cell.center));
    }

    #[test]
    fn points_near_a_center_snap_to_it() {
        let grid = grid();
        let coord = HexCoord::new(-4, 9);
        let center = grid.center(coord);
        let nudged = GeoPoint::new(center.lat + grid.size * 0.3, center.lng - grid.size * 0.3);
        assert_eq!(grid.snap(nudged), (coord, center));
    }

    #[test]
    fn hex_distance_matches_axial_formula() {
        let a = HexCoord::new(2, -1);
        let b = HexCoord::new(-3, 4);
        let dq = (a.q - b.q).abs();
        let dr = (a.r - b.r).abs();
        let ds = (a.q + a.r - b.q - b.r).abs();
        assert_eq!(hex_distance(a, b), ((dq + dr + ds) / 2) as u32);
        assert_eq!(hex_distance(a, a), 0);
    }

    #[test]
    fn window_contains_exactly_the_cells_in_range() {
        let center = HexCoord::new(10, -3);
        for range in 0..5 {
            let cells: Vec<HexCoord> = window(center, range).collect();
            assert_eq!(cells.len(), window_len(range));
            assert!(cells.iter().all(|cell| hex_distance(*cell, center) <= range));
        }
    }

    #[test]
    fn great_circle_distance_of_one_degree_on_equator() {
        let d = distance_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn window_bounds_cover_every_cell() {
        let grid = grid();
        let center = HexCoord::new(1, 1);
        let bounds = grid.window_bounds(center, 3);
        for coord in window(center, 3) {
            assert!(bounds.contains_rect(&grid.bounds(coord)));
        }
    }
}
