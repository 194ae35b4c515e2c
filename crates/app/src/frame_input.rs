//! Keyboard and mouse input collection for one rendered frame.

use crate::map_view::MapView;
use app::app_loop::{FrameActions, STEP_KEYS};
use geocoin_core::{GeoPoint, HexGrid};
use macroquad::prelude::{
    KeyCode, MouseButton, is_key_pressed, is_mouse_button_pressed, mouse_position, mouse_wheel,
    vec2,
};

const ACTION_KEYS: [KeyCode; 5] = [KeyCode::G, KeyCode::L, KeyCode::N, KeyCode::R, KeyCode::H];
const ZOOM_STEP: f64 = 1.15;

pub fn capture_frame_input(view: &MapView, grid: &HexGrid, fix: Option<GeoPoint>) -> FrameActions {
    let mut keys_pressed = Vec::with_capacity(STEP_KEYS.len() + ACTION_KEYS.len());
    for key in STEP_KEYS.iter().map(|(key, _)| *key).chain(ACTION_KEYS) {
        if is_key_pressed(key) {
            keys_pressed.push(key);
        }
    }

    let cursor_cell = || {
        let (x, y) = mouse_position();
        grid.to_hex(view.to_geo(vec2(x, y)))
    };
    let interact = is_mouse_button_pressed(MouseButton::Left).then(cursor_cell);
    let place = is_mouse_button_pressed(MouseButton::Right).then(cursor_cell);

    FrameActions { keys_pressed, interact, place, fix }
}

/// Zoom factor requested by the mouse wheel this frame, if any.
pub fn capture_zoom() -> Option<f64> {
    let (_, wheel) = mouse_wheel();
    if wheel > 0.0 {
        Some(ZOOM_STEP)
    } else if wheel < 0.0 {
        Some(1.0 / ZOOM_STEP)
    } else {
        None
    }
}
