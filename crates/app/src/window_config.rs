//! Window configuration for the desktop app. The window opens large enough to
//! show the whole active window of cells at the default zoom.

use app::APP_NAME;
use geocoin_core::{GameConfig, HexCoord, HexGrid};
use macroquad::window::Conf;

use crate::map_view::DEFAULT_PIXELS_PER_DEGREE;

const MIN_WINDOW_SIZE: (i32, i32) = (800, 600);
const MAX_WINDOW_SIZE: (i32, i32) = (1600, 1000);
/// Room around the active cells for the HUD lines.
const PADDING_PX: f64 = 96.0;

/// Pixel size that fits `config.window_range` cells around the player.
pub fn window_size(config: &GameConfig) -> (i32, i32) {
    let grid = HexGrid::from_config(config);
    let bounds = grid.window_bounds(HexCoord::ORIGIN, config.window_range);
    let fit = |degrees: f64, min: i32, max: i32| {
        let pixels = (degrees * DEFAULT_PIXELS_PER_DEGREE + PADDING_PX).ceil();
        (pixels.min(f64::from(max)) as i32).max(min)
    };
    (
        fit(bounds.width(), MIN_WINDOW_SIZE.0, MAX_WINDOW_SIZE.0),
        fit(bounds.height(), MIN_WINDOW_SIZE.1, MAX_WINDOW_SIZE.1),
    )
}

pub fn build_window_conf() -> Conf {
    let (window_width, window_height) = window_size(&GameConfig::default());
    Conf {
        window_title: APP_NAME.to_owned(),
        window_width,
        window_height,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}
