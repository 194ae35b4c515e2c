//! Macroquad implementation of the engine's renderer seam.
//!
//! The engine pushes changes; this side keeps the retained scene and redraws
//! it every frame through the current `MapView`.

use crate::map_view::MapView;
use geocoin_core::tiers::{FarTierBatch, NearCellStyle};
use geocoin_core::{GeoPoint, MarkerStyle, Renderer, SpriteKey, Token, TokenId};
use macroquad::prelude::*;
use std::collections::HashMap;

const FAR_LINE_COLOR: Color = Color { r: 0.35, g: 0.38, b: 0.42, a: 0.6 };
const NEAR_FILL: Color = Color { r: 0.98, g: 0.78, b: 0.2, a: 1.0 };
const NEAR_LINE: Color = Color { r: 0.95, g: 0.6, b: 0.1, a: 1.0 };
const REACHABLE_COLOR: Color = Color { r: 1.0, g: 0.84, b: 0.0, a: 1.0 };
/// Tints handed out to sprite keys in the order they are first seen.
const COIN_TINTS: [Color; 5] = [
    REACHABLE_COLOR,
    Color { r: 0.96, g: 0.55, b: 0.2, a: 1.0 },
    Color { r: 0.45, g: 0.85, b: 0.45, a: 1.0 },
    Color { r: 0.85, g: 0.45, b: 0.9, a: 1.0 },
    Color { r: 0.4, g: 0.8, b: 0.95, a: 1.0 },
];
const UNREACHABLE_COLOR: Color = Color { r: 0.55, g: 0.55, b: 0.6, a: 1.0 };
const POPUP_BACKGROUND: Color = Color { r: 0.08, g: 0.08, b: 0.1, a: 0.9 };
const PLAYER_COLOR: Color = Color { r: 0.2, g: 0.6, b: 1.0, a: 1.0 };
/// Marker radius as a share of the cell size.
const MARKER_RADIUS_CELLS: f64 = 0.45;

#[derive(Clone, Debug, PartialEq)]
struct Marker {
    position: GeoPoint,
    value: u32,
    tint: Color,
    style: MarkerStyle,
}

#[derive(Debug, Default)]
pub struct MapRenderer {
    far: Vec<[GeoPoint; 6]>,
    near: Vec<NearCellStyle>,
    markers: HashMap<TokenId, Marker>,
    tints: HashMap<SpriteKey, Color>,
    popup: Option<(GeoPoint, String)>,
}

impl Renderer for MapRenderer {
    fn draw_far_tier(&mut self, batch: &FarTierBatch) {
        self.far = batch.outlines.clone();
    }

    fn draw_near_tier(&mut self, cells: &[NearCellStyle]) {
        self.near = cells.to_vec();
    }

    fn add_marker(&mut self, token: &Token, style: MarkerStyle) {
        let tint = self.tint_for(&token.sprite);
        let marker = Marker { position: token.position, value: token.value, tint, style };
        self.markers.insert(token.id.clone(), marker);
    }

    fn update_marker(&mut self, id: &TokenId, style: MarkerStyle) {
        if let Some(marker) = self.markers.get_mut(id) {
            marker.style = style;
        }
    }

    fn remove_marker(&mut self, id: &TokenId) {
        self.markers.remove(id);
    }

    fn open_popup(&mut self, at: GeoPoint, text: &str) {
        self.popup = Some((at, text.to_string()));
    }

    fn close_popup(&mut self) {
        self.popup = None;
    }
}

impl MapRenderer {
    fn tint_for(&mut self, sprite: &SpriteKey) -> Color {
        let next = COIN_TINTS[self.tints.len() % COIN_TINTS.len()];
        *self.tints.entry(sprite.clone()).or_insert(next)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn popup_text(&self) -> Option<&str> {
        self.popup.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn draw(&self, view: &MapView, player: GeoPoint, cell_size: f64) {
        for outline in &self.far {
            draw_outline(view, outline, 1.0, FAR_LINE_COLOR);
        }
        for cell in &self.near {
            let points = cell.corners.map(|corner| view.to_screen(corner));
            let center = points.iter().fold(Vec2::ZERO, |sum, p| sum + *p) / 6.0;
            let fill = Color { a: cell.fill_opacity, ..NEAR_FILL };
            for i in 0..6 {
                draw_triangle(center, points[i], points[(i + 1) % 6], fill);
            }
            draw_outline(view, &cell.corners, cell.line_weight, NEAR_LINE);
        }

        let radius = view.scale(cell_size * MARKER_RADIUS_CELLS).max(3.0);
        let mut markers: Vec<&Marker> = self.markers.values().collect();
        markers.sort_by(|a, b| a.position.lat.total_cmp(&b.position.lat).reverse());
        for marker in markers {
            let at = view.to_screen(marker.position);
            let color = match marker.style {
                MarkerStyle::Reachable => marker.tint,
                MarkerStyle::Unreachable => UNREACHABLE_COLOR,
            };
            draw_circle(at.x, at.y, radius, color);
            draw_circle_lines(at.x, at.y, radius, 1.5, BLACK);
            let label = marker.value.to_string();
            let size = measure_text(&label, None, 16, 1.0);
            draw_text(&label, at.x - size.width / 2.0, at.y + size.height / 2.0, 16.0, BLACK);
        }

        let me = view.to_screen(player);
        draw_circle(me.x, me.y, radius * 0.6, PLAYER_COLOR);
        draw_circle_lines(me.x, me.y, radius * 0.6, 2.0, WHITE);

        if let Some((at, text)) = &self.popup {
            let anchor = view.to_screen(*at);
            let size = measure_text(text, None, 18, 1.0);
            let (w, h) = (size.width + 16.0, size.height + 14.0);
            let (x, y) = (anchor.x - w / 2.0, anchor.y - radius - h - 6.0);
            draw_rectangle(x, y, w, h, POPUP_BACKGROUND);
            draw_rectangle_lines(x, y, w, h, 1.0, REACHABLE_COLOR);
            draw_text(text, x + 8.0, y + 7.0 + size.offset_y, 18.0, WHITE);
        }
    }
}

fn draw_outline(view: &MapView, corners: &[GeoPoint; 6], thickness: f32, color: Color) {
    for i in 0..6 {
        let a = view.to_screen(corners[i]);
        let b = view.to_screen(corners[(i + 1) % 6]);
        draw_line(a.x, a.y, b.x, b.y, thickness, color);
    }
}
