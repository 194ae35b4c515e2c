use anyhow::{Result, bail};
use clap::Parser;
use geocoin_core::hex::{window, window_len};
use geocoin_core::{
    Command, Direction, Game, GameConfig, GameEvent, GeoPoint, SaveUrgency, SpawnConfig,
    save_urgency,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use std::collections::HashSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    steps: u32,
    /// Chance that any given cell spawns a coin
    #[arg(long, default_value_t = 0.3)]
    density: f64,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn check(game: &Game) -> Result<()> {
    let world = game.world();
    let expected = window_len(game.config().window_range);
    if world.active_len() != expected {
        bail!("Invariant failed: {} active cells, expected {expected}", world.active_len());
    }
    let mut ids = HashSet::new();
    for token in world.tokens() {
        if !world.is_active(token.cell) || token.position != game.grid().center(token.cell) {
            bail!("Invariant failed: {} is not on an active cell center", token.id);
        }
        if !ids.insert(&token.id) {
            bail!("Invariant failed: {} is in two cells", token.id);
        }
    }
    if let Some(held) = game.inventory().held()
        && ids.contains(&held.id)
    {
        bail!("Invariant failed: {} is held and placed", held.id);
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    println!("Starting fuzz walk on seed {} for {} steps...", args.seed, args.steps);
    let config = GameConfig {
        start_position: GeoPoint::new(0.0, 0.0),
        spawn: SpawnConfig { spawn_probability: args.density, ..SpawnConfig::default() },
        ..GameConfig::default()
    };
    config.validate()?;
    let mut game = Game::new(config.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let (mut crafts, mut saves, mut best) = (0u32, 0u32, 0u32);
    for step in 0..args.steps {
        let nearby: Vec<_> = window(game.player().cell(), 4).collect();
        let command = match rng.next_u64() % 10 {
            0..=5 => Command::Step(choose(&mut rng, &Direction::ALL)),
            6..=8 => Command::Interact(choose(&mut rng, &nearby)),
            _ => Command::Place(choose(&mut rng, &nearby)),
        };
        let events = game.apply(command);
        for event in &events {
            if let GameEvent::Crafted { value, .. } = event {
                crafts += 1;
                best = best.max(*value);
            }
        }
        if save_urgency(&events) != SaveUrgency::None {
            saves += 1;
        }
        check(&game)?;

        if step % 100 == 99 {
            let restored = Game::restore(config.clone(), &game.snapshot())?;
            if restored.snapshot_hash() != game.snapshot_hash() {
                warn!(step, "restored game diverged");
                bail!("Invariant failed: reload diverged at step {step}");
            }
        }
    }

    info!(crafts, saves, best, "fuzz walk finished");
    println!("Crafts: {crafts}, best coin: {best}, save points: {saves}");
    println!("Final Hash: 0x{:016x}", game.snapshot_hash());
    println!("Fuzzing completed successfully.");
    Ok(())
}
