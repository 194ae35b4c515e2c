//! Equirectangular projection between map coordinates and screen pixels,
//! centered on a camera that eases toward the player.

use geocoin_core::GeoPoint;
use macroquad::math::{Vec2, vec2};

pub const DEFAULT_PIXELS_PER_DEGREE: f64 = 600_000.0;
const MIN_PIXELS_PER_DEGREE: f64 = 100_000.0;
const MAX_PIXELS_PER_DEGREE: f64 = 4_000_000.0;
/// Fraction of the remaining distance the camera covers per second.
const FOLLOW_RATE: f64 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapView {
    pub center: GeoPoint,
    pub pixels_per_degree: f64,
    pub width: f32,
    pub height: f32,
}

impl MapView {
    pub fn new(center: GeoPoint) -> Self {
        Self { center, pixels_per_degree: DEFAULT_PIXELS_PER_DEGREE, width: 1.0, height: 1.0 }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn to_screen(&self, point: GeoPoint) -> Vec2 {
        let dx = (point.lng - self.center.lng) * self.pixels_per_degree;
        let dy = (point.lat - self.center.lat) * self.pixels_per_degree;
        vec2(self.width / 2.0 + dx as f32, self.height / 2.0 - dy as f32)
    }

    pub fn to_geo(&self, screen: Vec2) -> GeoPoint {
        let dx = f64::from(screen.x - self.width / 2.0);
        let dy = f64::from(self.height / 2.0 - screen.y);
        GeoPoint::new(
            self.center.lat + dy / self.pixels_per_degree,
            self.center.lng + dx / self.pixels_per_degree,
        )
    }

    /// Ease the camera toward `target`; `dt` in seconds.
    pub fn follow(&mut self, target: GeoPoint, dt: f32) {
        let t = (f64::from(dt) * FOLLOW_RATE).clamp(0.0, 1.0);
        if t >= 1.0 {
            self.center = target;
            return;
        }
        self.center.lat += (target.lat - self.center.lat) * t;
        self.center.lng += (target.lng - self.center.lng) * t;
    }

    pub fn zoom(&mut self, factor: f64) {
        self.pixels_per_degree =
            (self.pixels_per_degree * factor).clamp(MIN_PIXELS_PER_DEGREE, MAX_PIXELS_PER_DEGREE);
    }

    /// Screen length of `degrees`, for sizing markers with the zoom.
    pub fn scale(&self, degrees: f64) -> f32 {
        (degrees * self.pixels_per_degree) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        let mut view = MapView::new(GeoPoint::new(10.0, 20.0));
        view.resize(800.0, 600.0);
        view
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let view = view();
        let center = view.to_screen(view.center);
        assert_eq!(center, vec2(400.0, 300.0));
        assert!(view.to_screen(GeoPoint::new(10.0001, 20.0)).y < center.y);
        assert!(view.to_screen(GeoPoint::new(10.0, 20.0001)).x > center.x);
    }

    #[test]
    fn screen_to_geo_inverts_projection() {
        let view = view();
        let point = GeoPoint::new(10.000_3, 19.999_6);
        let back = view.to_geo(view.to_screen(point));
        assert!((back.lat - point.lat).abs() < 1e-8);
        assert!((back.lng - point.lng).abs() < 1e-8);
    }

    #[test]
    fn follow_converges_without_overshoot() {
        let mut view = view();
        let target = GeoPoint::new(10.001, 20.001);
        view.follow(target, 0.05);
        assert!(view.center.lat > 10.0 && view.center.lat < target.lat);
        view.follow(target, 10.0);
        assert_eq!(view.center, target);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = view();
        view.zoom(1000.0);
        assert_eq!(view.pixels_per_degree, MAX_PIXELS_PER_DEGREE);
        view.zoom(0.0);
        assert_eq!(view.pixels_per_degree, MIN_PIXELS_PER_DEGREE);
    }
}
