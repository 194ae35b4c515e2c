mod frame_input;
mod hud;
mod map_view;
mod render;
mod window_config;

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use app::app_loop::AppState;
use app::save_file::JsonFileStore;
use app::track::TrackSource;
use clap::Parser;
use geocoin_core::{
    GameConfig, MovementMode, PositionSource, SaveDebounce, SceneSync, load_game, save_game,
};
use macroquad::prelude::{
    Color, KeyCode, clear_background, get_frame_time, is_key_pressed, next_frame, screen_height,
    screen_width,
};
use macroquad::input::{is_quit_requested, prevent_quit};
use macroquad::window::Conf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::frame_input::{capture_frame_input, capture_zoom};
use crate::map_view::MapView;
use crate::render::MapRenderer;

const BACKGROUND: Color = Color { r: 0.09, g: 0.11, b: 0.13, a: 1.0 };

#[derive(Parser, Debug)]
#[command(name = "geocoin", about = "Collect and merge coins on a hex grid laid over the map")]
struct Args {
    /// TOML game configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Save file (defaults to the platform data directory)
    #[arg(long)]
    save: Option<PathBuf>,
    /// Discard any existing save before starting
    #[arg(long)]
    fresh: bool,
    /// Start in stepped mode regardless of config
    #[arg(long)]
    stepped: bool,
    /// JSON track of location fixes to replay in live mode
    #[arg(long)]
    track: Option<PathBuf>,
    /// Frames between replayed track fixes
    #[arg(long, default_value_t = 30)]
    track_interval: u32,
}

fn window_conf() -> Conf {
    window_config::build_window_conf()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[macroquad::main(window_conf)]
async fn main() {
    init_tracing();
    let args = Args::parse();
    if let Err(err) = run(args).await {
        error!("{err:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if args.stepped {
        config.start_mode = MovementMode::Stepped;
    } else if args.track.is_some() {
        config.start_mode = MovementMode::Live;
    }

    let save_path = args
        .save
        .clone()
        .or_else(JsonFileStore::get_default_path)
        .context("no data directory available; pass --save")?;
    let mut store = JsonFileStore::new(save_path);
    if args.fresh {
        store.remove().with_context(|| format!("removing {}", store.path().display()))?;
    }
    info!(path = %store.path().display(), "using save file");

    let mut source = match &args.track {
        Some(path) => Some(
            TrackSource::load(path, args.track_interval)
                .with_context(|| format!("loading track {}", path.display()))?,
        ),
        None => None,
    };

    let mut game = load_game(&store, config.clone());
    let mut app = AppState::new(SaveDebounce::from_config(&config));
    let mut scene = SceneSync::new();
    let mut renderer = MapRenderer::default();
    let mut view = MapView::new(game.player().position());
    scene.sync(&game, &mut renderer);
    prevent_quit();

    loop {
        if is_quit_requested() || is_key_pressed(KeyCode::Escape) {
            break;
        }
        view.resize(screen_width(), screen_height());
        if let Some(factor) = capture_zoom() {
            view.zoom(factor);
        }

        let fix = source.as_mut().and_then(PositionSource::poll);
        let frame = capture_frame_input(&view, game.grid(), fix);
        let outcome = app.tick(&mut game, &frame, Instant::now());
        if !outcome.events.is_empty() {
            scene.announce(&game, &outcome.events, &mut renderer);
            scene.sync(&game, &mut renderer);
        }
        if outcome.save_now {
            save_game(&mut store, &game);
        }

        view.follow(game.player().position(), get_frame_time());
        clear_background(BACKGROUND);
        renderer.draw(&view, game.player().position(), game.config().cell_size_degrees);
        hud::draw_hud(&hud::hud_lines(&game, &app));
        next_frame().await;
    }

    app.flush();
    if save_game(&mut store, &game) {
        info!("saved on exit");
    }
    Ok(())
}
