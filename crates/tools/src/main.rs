use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use geocoin_core::hex::window;
use geocoin_core::spawn::spawn_decision;
use geocoin_core::{Game, GameConfig, HexCoord, HexGrid, SavedGame};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Inspect geocoin worlds and save files", long_about = None)]
struct Args {
    /// TOML game configuration; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Tool,
}

#[derive(Subcommand)]
enum Tool {
    /// List the coins that spawn around a cell
    Spawns {
        /// Center cell as `q,r`
        #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
        at: HexCoord,
        #[arg(short, long, default_value_t = 4)]
        range: u32,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check a save file and summarize what it restores to
    Validate { save: PathBuf },
}

#[derive(Debug, PartialEq, Serialize)]
struct SpawnRow {
    cell: String,
    id: String,
    value: u32,
}

#[derive(Debug, Serialize)]
struct SpawnReport {
    center: String,
    range: u32,
    cells: usize,
    coins: Vec<SpawnRow>,
}

fn spawn_report(config: &GameConfig, at: HexCoord, range: u32) -> SpawnReport {
    let grid = HexGrid::from_config(config);
    let mut cells: Vec<HexCoord> = window(at, range).collect();
    cells.sort_unstable();
    let coins = cells
        .iter()
        .filter_map(|cell| spawn_decision(*cell, &config.spawn, &grid))
        .map(|token| SpawnRow {
            cell: token.cell.to_string(),
            id: token.id.to_string(),
            value: token.value,
        })
        .collect();
    SpawnReport { center: at.to_string(), range, cells: cells.len(), coins }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn validate(config: GameConfig, path: &Path) -> Result<()> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read save file: {}", path.display()))?;
    let saved = match SavedGame::from_json(&data) {
        Ok(saved) => saved,
        Err(err) => bail!("Save file is invalid and would be discarded: {err}"),
    };
    let game = Game::restore(config, &saved).context("Save failed to restore")?;

    println!("Save is valid.");
    println!("Player cell: {}", game.player().cell());
    println!("Mode: {:?}", game.player().mode());
    println!("Remembered cells: {}", saved.remembered_tokens.len());
    match game.inventory().held() {
        Some(token) => println!("Holding: {} (value {})", token.id, token.value),
        None => println!("Holding: nothing"),
    }
    println!("Won: {}", game.has_won());
    println!("Snapshot Hash: 0x{:016x}", game.snapshot_hash());
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Tool::Spawns { at, range, json } => {
            let report = spawn_report(&config, at, range);
            info!(center = %at, range, coins = report.coins.len(), "spawn report");
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{} coins in {} cells around {}", report.coins.len(), report.cells, at);
                for row in &report.coins {
                    println!("{:>10}  {:>3}  {}", row.cell, row.value, row.id);
                }
            }
        }
        Tool::Validate { save } => validate(config, &save)?,
    }
    Ok(())
}
