//! Two-tier visual treatment of the grid and the renderer collaborator seam.
//!
//! Near tier: cells within reach, drawn filled with opacity and line weight
//! fading linearly with distance. Far tier: every cell of the window (plus a
//! margin) drawn as bare outlines in one batch, regenerated only when the
//! player has moved far enough that the batch no longer covers the window.

use std::collections::HashMap;

use crate::config::TierConfig;
use crate::game::{Game, GameEvent};
use crate::hex::{Cell, HexGrid, distance_m, window};
use crate::token::{Token, TokenId};
use crate::types::{GeoPoint, GeoRect, HexCoord};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerStyle {
    Reachable,
    Unreachable,
}

impl MarkerStyle {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable { MarkerStyle::Reachable } else { MarkerStyle::Unreachable }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NearCellStyle {
    pub coord: HexCoord,
    pub corners: [GeoPoint; 6],
    pub fill_opacity: f32,
    pub line_weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FarTierBatch {
    pub bounds: GeoRect,
    pub outlines: Vec<[GeoPoint; 6]>,
}

/// The map/drawing collaborator. Implementations own every visual resource;
/// the engine only tells them what changed.
pub trait Renderer {
    fn draw_far_tier(&mut self, batch: &FarTierBatch);
    fn draw_near_tier(&mut self, cells: &[NearCellStyle]);
    fn add_marker(&mut self, token: &Token, style: MarkerStyle);
    fn update_marker(&mut self, id: &TokenId, style: MarkerStyle);
    fn remove_marker(&mut self, id: &TokenId);
    fn open_popup(&mut self, at: GeoPoint, text: &str);
    fn close_popup(&mut self);
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Fraction of the way through the fade band, clamped to `[0, 1]`.
pub fn band_fraction(distance_m: f64, config: &TierConfig) -> f32 {
    let span = config.band_max_m - config.band_min_m;
    ((distance_m - config.band_min_m) / span).clamp(0.0, 1.0) as f32
}

pub fn near_cell_style(cell: Cell, d: f64, config: &TierConfig) -> NearCellStyle {
    let t = band_fraction(d, config);
    NearCellStyle {
        coord: cell.coord,
        corners: cell.corners,
        fill_opacity: lerp(config.max_opacity, config.min_opacity, t),
        line_weight: lerp(config.max_line_weight, config.min_line_weight, t),
    }
}

/// Styles for every active cell whose center is within reach, sorted by coordinate.
pub fn near_tier(game: &Game) -> Vec<NearCellStyle> {
    let grid = game.grid();
    let player = game.player().position();
    let reach = game.player().reach_m();
    let mut cells: Vec<NearCellStyle> = game
        .world()
        .active_cells()
        .map(|coord| grid.cell(coord))
        .filter_map(|cell| {
            let d = distance_m(player, cell.center);
            (d <= reach).then(|| near_cell_style(cell, d, &game.config().tiers))
        })
        .collect();
    cells.sort_by_key(|style| style.coord);
    cells
}

pub fn plan_far_tier(grid: &HexGrid, center: HexCoord, range: u32) -> FarTierBatch {
    let outlines: Vec<[GeoPoint; 6]> =
        window(center, range).map(|coord| grid.corners(coord)).collect();
    FarTierBatch { bounds: grid.window_bounds(center, range), outlines }
}

/// Remembers what the last far-tier batch covered.
#[derive(Clone, Debug, Default)]
pub struct FarTierCache {
    covered: Option<GeoRect>,
}

impl FarTierCache {
    pub fn needs_redraw(&self, required: &GeoRect) -> bool {
        match &self.covered {
            Some(covered) => !covered.contains_rect(required),
            None => true,
        }
    }

    pub fn record(&mut self, covered: GeoRect) {
        self.covered = Some(covered);
    }
}

#[derive(Clone, Debug, PartialEq)]
struct DisplayedMarker {
    style: MarkerStyle,
    cell: HexCoord,
    value: u32,
}

/// Keeps a renderer in step with the game, issuing only the calls needed.
#[derive(Debug, Default)]
pub struct SceneSync {
    markers: HashMap<TokenId, DisplayedMarker>,
    far: FarTierCache,
    near: Vec<NearCellStyle>,
    popup_open: bool,
}

impl SceneSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, game: &Game, renderer: &mut impl Renderer) {
        self.sync_far_tier(game, renderer);
        self.sync_near_tier(game, renderer);
        self.sync_markers(game, renderer);
    }

    /// Open or close the info popup in response to what just happened.
    pub fn announce(&mut self, game: &Game, events: &[GameEvent], renderer: &mut impl Renderer) {
        for event in events {
            let popup = match event {
                GameEvent::Moved { .. } | GameEvent::NewGame => None,
                GameEvent::Crafted { value, cell, .. } => {
                    Some((*cell, format!("Crafted a coin worth {value}")))
                }
                GameEvent::Won { value } => {
                    Some((game.player().cell(), format!("You made a {value} coin. You win!")))
                }
                GameEvent::PickedUp { value, cell, .. } => {
                    Some((*cell, format!("Picked up a coin worth {value}")))
                }
                GameEvent::Placed { value, cell, .. } => {
                    Some((*cell, format!("Placed a coin worth {value}")))
                }
                _ => continue,
            };
            match popup {
                Some((cell, text)) => {
                    renderer.open_popup(game.grid().center(cell), &text);
                    self.popup_open = true;
                }
                None if self.popup_open => {
                    renderer.close_popup();
                    self.popup_open = false;
                }
                None => {}
            }
        }
    }

    fn sync_far_tier(&mut self, game: &Game, renderer: &mut impl Renderer) {
        let grid = game.grid();
        let center = game.player().cell();
        let range = game.config().window_range;
        let required = grid.window_bounds(center, range);
        if !self.far.needs_redraw(&required) {
            return;
        }
        let batch = plan_far_tier(grid, center, range + game.config().tiers.far_margin);
        renderer.draw_far_tier(&batch);
        self.far.record(batch.bounds);
    }

    fn sync_near_tier(&mut self, game: &Game, renderer: &mut impl Renderer) {
        let near = near_tier(game);
        if near != self.near {
            renderer.draw_near_tier(&near);
            self.near = near;
        }
    }

    fn sync_markers(&mut self, game: &Game, renderer: &mut impl Renderer) {
        let world = game.world();
        let mut desired: Vec<(&Token, DisplayedMarker)> = world
            .tokens()
            .map(|token| {
                let style = MarkerStyle::from_reachable(world.is_reachable(token.cell));
                (token, DisplayedMarker { style, cell: token.cell, value: token.value })
            })
            .collect();
        desired.sort_by(|a, b| a.0.id.cmp(&b.0.id));

        let mut stale: Vec<TokenId> = self
            .markers
            .keys()
            .filter(|id| world.find_token(id).is_none())
            .cloned()
            .collect();
        stale.sort();
        for id in stale {
            renderer.remove_marker(&id);
            self.markers.remove(&id);
        }

        for (token, marker) in desired {
            match self.markers.get(&token.id) {
                None => {
                    renderer.add_marker(token, marker.style);
                }
                Some(shown) if shown.cell != marker.cell || shown.value != marker.value => {
                    renderer.remove_marker(&token.id);
                    renderer.add_marker(token, marker.style);
                }
                Some(shown) if shown.style != marker.style => {
                    renderer.update_marker(&token.id, marker.style);
                }
                Some(_) => continue,
            }
            self.markers.insert(token.id.clone(), marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, SpawnConfig};
    use crate::game::Command;
    use crate::types::{Direction, MovementMode};

    #[derive(Default)]
    struct RecordingRenderer {
        far_draws: usize,
        near_draws: usize,
        added: Vec<TokenId>,
        updated: Vec<(TokenId, MarkerStyle)>,
        removed: Vec<TokenId>,
        popups: Vec<String>,
        closed: usize,
    }

    impl Renderer for RecordingRenderer {
        fn draw_far_tier(&mut self, _batch: &FarTierBatch) {
            self.far_draws += 1;
        }
        fn draw_near_tier(&mut self, _cells: &[NearCellStyle]) {
            self.near_draws += 1;
        }
        fn add_marker(&mut self, token: &Token, _style: MarkerStyle) {
            self.added.push(token.id.clone());
        }
        fn update_marker(&mut self, id: &TokenId, style: MarkerStyle) {
            self.updated.push((id.clone(), style));
        }
        fn remove_marker(&mut self, id: &TokenId) {
            self.removed.push(id.clone());
        }
        fn open_popup(&mut self, _at: GeoPoint, text: &str) {
            self.popups.push(text.to_string());
        }
        fn close_popup(&mut self) {
            self.closed += 1;
        }
    }

    fn stepped_game(spawn_probability: f64, window_range: u32) -> Game {
        Game::new(GameConfig {
            start_position: GeoPoint::new(0.0, 0.0),
            start_mode: MovementMode::Stepped,
            window_range,
            spawn: SpawnConfig { spawn_probability, ..SpawnConfig::default() },
            ..GameConfig::default()
        })
    }

    #[test]
    fn fade_is_clamped_and_monotone() {
        let config = TierConfig::default();
        assert_eq!(band_fraction(0.0, &config), 0.0);
        assert_eq!(band_fraction(1_000.0, &config), 1.0);
        let grid = HexGrid::new(GeoPoint::new(0.0, 0.0), 0.000_05);
        let close = near_cell_style(grid.cell(HexCoord::ORIGIN), 10.0, &config);
        let far = near_cell_style(grid.cell(HexCoord::ORIGIN), 40.0, &config);
        assert!(close.fill_opacity > far.fill_opacity);
        assert!(close.line_weight > far.line_weight);
        let edge = near_cell_style(grid.cell(HexCoord::ORIGIN), 0.0, &config);
        assert_eq!(edge.fill_opacity, config.max_opacity);
    }

    #[test]
    fn near_tier_only_includes_cells_within_reach() {
        let game = stepped_game(0.0, 8);
        let cells = near_tier(&game);
        assert!(!cells.is_empty());
        let player = game.player().position();
        for cell in cells {
            let d = distance_m(player, game.grid().center(cell.coord));
            assert!(d <= game.player().reach_m());
        }
    }

    #[test]
    fn far_tier_is_redrawn_only_after_leaving_coverage() {
        let mut game = stepped_game(0.0, 4);
        let mut sync = SceneSync::new();
        let mut renderer = RecordingRenderer::default();

        sync.sync(&game, &mut renderer);
        assert_eq!(renderer.far_draws, 1);

        game.apply(Command::Step(Direction::North));
        sync.sync(&game, &mut renderer);
        assert_eq!(renderer.far_draws, 1, "one step stays inside the margin");

        for _ in 0..10 {
            game.apply(Command::Step(Direction::North));
            sync.sync(&game, &mut renderer);
        }
        assert!(renderer.far_draws > 1, "walking far away regenerates the batch");
    }

    #[test]
    fn markers_follow_world_tokens() {
        let mut game = stepped_game(1.0, 4);
        let mut sync = SceneSync::new();
        let mut renderer = RecordingRenderer::default();

        sync.sync(&game, &mut renderer);
        assert_eq!(renderer.added.len(), game.world().tokens().count());

        let events = game.apply(Command::Interact(HexCoord::ORIGIN));
        sync.announce(&game, &events, &mut renderer);
        sync.sync(&game, &mut renderer);
        assert_eq!(renderer.removed, vec![TokenId::spawned(HexCoord::ORIGIN)]);
        assert_eq!(renderer.popups.len(), 1);

        let before = renderer.added.len();
        sync.sync(&game, &mut renderer);
        assert_eq!(renderer.added.len(), before, "an unchanged world issues no calls");
        assert!(renderer.updated.is_empty());
    }

    #[test]
    fn moving_restyles_markers_that_cross_the_reach_edge() {
        let mut game = stepped_game(1.0, 8);
        let mut sync = SceneSync::new();
        let mut renderer = RecordingRenderer::default();
        sync.sync(&game, &mut renderer);

        let events = game.apply(Command::Step(Direction::East));
        sync.announce(&game, &events, &mut renderer);
        sync.sync(&game, &mut renderer);

        assert!(renderer.updated.iter().any(|(_, style)| *style == MarkerStyle::Reachable));
        assert!(renderer.updated.iter().any(|(_, style)| *style == MarkerStyle::Unreachable));
    }
}
