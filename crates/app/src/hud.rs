//! Status text drawn over the map.

use app::app_loop::AppState;
use app::{format_position, format_snapshot_hash};
use geocoin_core::{Game, MovementMode};
use macroquad::prelude::*;

const HUD_FONT_SIZE: f32 = 18.0;
const HUD_LINE_STEP: f32 = 20.0;
const HUD_PAD: f32 = 12.0;

const HELP_LINES: [&str; 7] = [
    "W/X/A/D or arrows: step N/S/W/E   Q/E/Z/C: diagonals",
    "Left click: pick up, swap or merge a coin in reach",
    "Right click: drop the held coin into an empty cell",
    "G: toggle live/stepped   L: live mode",
    "N: new game   R: refresh   mouse wheel: zoom",
    "H: hide help",
    "Esc: save and quit",
];

pub fn hud_lines(game: &Game, app: &AppState) -> Vec<String> {
    let player = game.player();
    let mode = match player.mode() {
        MovementMode::Live => "live",
        MovementMode::Stepped => "stepped",
    };
    let holding = match game.inventory().held() {
        Some(token) => format!("Holding: coin worth {}", token.value),
        None => "Holding: nothing".to_string(),
    };
    let world = game.world();
    let nearby = world.tokens().filter(|token| world.is_reachable(token.cell)).count();
    let goal = if game.has_won() {
        "You crafted the winning coin! Keep merging or press N".to_string()
    } else {
        format!("Goal: craft a coin worth {}", game.config().win_value)
    };

    let mut lines = vec![
        format!("Mode: {mode} (G to toggle, H for help)"),
        format!(
            "Position: {}  cell {}",
            format_position(player.position().lat, player.position().lng),
            player.cell()
        ),
        holding,
        format!("Coins in reach: {nearby}"),
        goal,
    ];
    if app.has_unsaved_changes() {
        lines.push("Saving...".to_string());
    }
    if app.show_help {
        lines.push(format!("state {}", format_snapshot_hash(game.snapshot_hash())));
        lines.extend(HELP_LINES.iter().map(|line| line.to_string()));
    }
    lines
}

pub fn draw_hud(lines: &[String]) {
    let height = HUD_PAD * 2.0 + HUD_LINE_STEP * lines.len() as f32;
    draw_rectangle(0.0, 0.0, screen_width(), height, Color { r: 0.0, g: 0.0, b: 0.0, a: 0.55 });
    let mut y = HUD_PAD + HUD_FONT_SIZE;
    for line in lines {
        draw_text(line, HUD_PAD, y, HUD_FONT_SIZE, WHITE);
        y += HUD_LINE_STEP;
    }
}
