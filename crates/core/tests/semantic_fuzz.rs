use std::collections::HashSet;

use geocoin_core::hex::{distance_m, window, window_len};
use geocoin_core::{Command, Direction, Game, GameConfig, GeoPoint, MovementMode, SpawnConfig};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_command(rng: &mut ChaCha8Rng, game: &Game) -> Command {
    let nearby: Vec<_> = window(game.player().cell(), 6).collect();
    match rng.next_u64() % 20 {
        0..=9 => Command::Step(choose(rng, &Direction::ALL)),
        10..=13 => Command::Interact(choose(rng, &nearby)),
        14..=15 => Command::Place(choose(rng, &nearby)),
        16 => Command::ToggleMode,
        17..=18 => {
            let here = game.player().position();
            let jitter = |rng: &mut ChaCha8Rng| (rng.next_u64() % 21) as f64 * 0.000_05 - 0.000_5;
            Command::LiveFix(GeoPoint::new(here.lat + jitter(rng), here.lng + jitter(rng)))
        }
        _ => Command::Refresh,
    }
}

fn check_invariants(game: &Game) -> Result<(), String> {
    let world = game.world();
    let range = game.config().window_range;
    if world.active_len() != window_len(range) {
        return Err(format!("Invariant failed: {} active cells", world.active_len()));
    }

    let mut ids = HashSet::new();
    for token in world.tokens() {
        if !world.is_active(token.cell) {
            return Err(format!("Invariant failed: {} outside the window", token.id));
        }
        if token.position != game.grid().center(token.cell) {
            return Err(format!("Invariant failed: {} is off its cell center", token.id));
        }
        if token.value == 0 || token.history.is_empty() {
            return Err(format!("Invariant failed: {} has no value or history", token.id));
        }
        let in_reach =
            distance_m(game.player().position(), token.position) <= game.config().reach_meters;
        if world.is_reachable(token.cell) != in_reach {
            return Err(format!("Invariant failed: stale reach flag on {}", token.cell));
        }
        if !ids.insert(token.id.clone()) {
            return Err(format!("Invariant failed: {} appears twice", token.id));
        }
    }
    if let Some(held) = game.inventory().held()
        && ids.contains(&held.id)
    {
        return Err(format!("Invariant failed: {} is held and placed", held.id));
    }
    Ok(())
}

fn run_fuzz_simulation(seed: u64, steps: u32) -> Result<(), String> {
    let config = GameConfig {
        start_position: GeoPoint::new(0.0, 0.0),
        start_mode: MovementMode::Stepped,
        window_range: 5,
        spawn: SpawnConfig { spawn_probability: 0.4, min_value: 1, max_value: 3 },
        ..GameConfig::default()
    };
    let mut game = Game::new(config.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for step in 0..steps {
        let command = random_command(&mut rng, &game);
        game.apply(command);
        check_invariants(&game)?;

        if step % 50 == 49 {
            let restored = Game::restore(config.clone(), &game.snapshot())
                .map_err(|err| format!("Invariant failed: own save rejected: {err}"))?;
            if restored.snapshot_hash() != game.snapshot_hash() {
                return Err(format!("Invariant failed: reload diverged on seed {seed}"));
            }
        }
    }
    Ok(())
}

#[test]
fn test_fuzz_random_walks_keep_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(20));

    runner
        .run(&any::<u64>(), |seed| {
            run_fuzz_simulation(seed, 400).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("semantic fuzz simulation should preserve invariants");
}
