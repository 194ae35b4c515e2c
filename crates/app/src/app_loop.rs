use geocoin_core::{
    Command, Direction, Game, GameEvent, GeoPoint, HexCoord, MovementMode, SaveDebounce,
    SaveUrgency, save_urgency,
};
use macroquad::prelude::KeyCode;
use std::collections::VecDeque;
use std::time::Instant;

/// Keys that queue a stepped move, in the order they are checked.
pub const STEP_KEYS: [(KeyCode, Direction); 12] = [
    (KeyCode::W, Direction::North),
    (KeyCode::Up, Direction::North),
    (KeyCode::X, Direction::South),
    (KeyCode::Down, Direction::South),
    (KeyCode::D, Direction::East),
    (KeyCode::Right, Direction::East),
    (KeyCode::A, Direction::West),
    (KeyCode::Left, Direction::West),
    (KeyCode::E, Direction::NorthEast),
    (KeyCode::Q, Direction::NorthWest),
    (KeyCode::C, Direction::SouthEast),
    (KeyCode::Z, Direction::SouthWest),
];

/// Queued steps beyond this are dropped rather than replayed late.
const MAX_PENDING_STEPS: usize = 8;

/// Everything the front-end collected during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameActions {
    pub keys_pressed: Vec<KeyCode>,
    /// Cell under a primary click.
    pub interact: Option<HexCoord>,
    /// Cell under a secondary click.
    pub place: Option<HexCoord>,
    /// Fix delivered by the position source this frame.
    pub fix: Option<GeoPoint>,
}

/// What the caller has to do after a frame.
#[derive(Debug, Default, PartialEq)]
pub struct FrameOutcome {
    pub events: Vec<GameEvent>,
    pub save_now: bool,
}

pub struct AppState {
    pending_steps: VecDeque<Direction>,
    debounce: SaveDebounce,
    pub show_help: bool,
}

impl AppState {
    pub fn new(debounce: SaveDebounce) -> Self {
        Self { pending_steps: VecDeque::new(), debounce, show_help: false }
    }

    pub fn pending_steps(&self) -> usize {
        self.pending_steps.len()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.debounce.is_dirty()
    }

    /// Process one frame of input. At most one queued step is applied per
    /// frame so the map can animate between cells.
    pub fn tick(&mut self, game: &mut Game, frame: &FrameActions, now: Instant) -> FrameOutcome {
        let mut events = Vec::new();
        let keys = &frame.keys_pressed;

        if keys.contains(&KeyCode::H) {
            self.show_help = !self.show_help;
        }
        if keys.contains(&KeyCode::G) {
            events.extend(game.apply(Command::ToggleMode));
        }
        if keys.contains(&KeyCode::L) {
            events.extend(game.apply(Command::SetMode(MovementMode::Live)));
        }
        if keys.contains(&KeyCode::N) {
            self.pending_steps.clear();
            events.extend(game.apply(Command::NewGame));
        }
        if keys.contains(&KeyCode::R) {
            events.extend(game.apply(Command::Refresh));
        }
        if events.iter().any(|event| matches!(event, GameEvent::ModeChanged(_))) {
            self.pending_steps.clear();
        }

        if game.player().mode() == MovementMode::Stepped {
            for (key, direction) in STEP_KEYS {
                if keys.contains(&key) && self.pending_steps.len() < MAX_PENDING_STEPS {
                    self.pending_steps.push_back(direction);
                }
            }
            if let Some(direction) = self.pending_steps.pop_front() {
                events.extend(game.apply(Command::Step(direction)));
            }
        } else if let Some(fix) = frame.fix {
            events.extend(game.apply(Command::LiveFix(fix)));
        }

        if let Some(cell) = frame.interact {
            events.extend(game.apply(Command::Interact(cell)));
        }
        if let Some(cell) = frame.place {
            events.extend(game.apply(Command::Place(cell)));
        }

        let save_now = match save_urgency(&events) {
            SaveUrgency::Immediate => {
                self.debounce.flush();
                true
            }
            SaveUrgency::Debounced => {
                self.debounce.mark_dirty(now);
                false
            }
            SaveUrgency::None => self.debounce.take_due(now),
        };
        FrameOutcome { events, save_now }
    }

    /// Called once on teardown; true when a final save is owed.
    pub fn flush(&mut self) -> bool {
        self.debounce.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocoin_core::GameConfig;
    use std::time::Duration;

    fn setup(mode: MovementMode) -> (Game, AppState) {
        let config = GameConfig {
            start_position: GeoPoint::new(0.0, 0.0),
            start_mode: mode,
            ..GameConfig::default()
        };
        let app = AppState::new(SaveDebounce::from_config(&config));
        (Game::new(config), app)
    }

    fn keys(keys: &[KeyCode]) -> FrameActions {
        FrameActions { keys_pressed: keys.to_vec(), ..FrameActions::default() }
    }

    #[test]
    fn steps_are_queued_and_applied_one_per_frame() {
        let (mut game, mut app) = setup(MovementMode::Stepped);
        let now = Instant::now();

        app.tick(&mut game, &keys(&[KeyCode::W, KeyCode::D]), now);
        assert_eq!(game.player().cell(), HexCoord::new(0, 1));
        assert_eq!(app.pending_steps(), 1);

        app.tick(&mut game, &FrameActions::default(), now);
        assert_eq!(game.player().cell(), HexCoord::new(1, 1));
        assert_eq!(app.pending_steps(), 0);
    }

    #[test]
    fn movement_saves_after_the_quiet_period() {
        let (mut game, mut app) = setup(MovementMode::Stepped);
        let start = Instant::now();

        let outcome = app.tick(&mut game, &keys(&[KeyCode::W]), start);
        assert!(!outcome.save_now);
        assert!(app.has_unsaved_changes());

        let idle = FrameActions::default();
        let early = app.tick(&mut game, &idle, start + Duration::from_millis(100));
        assert!(!early.save_now);
        let later = app.tick(&mut game, &idle, start + Duration::from_secs(1));
        assert!(later.save_now);
        assert!(!app.has_unsaved_changes());
    }

    #[test]
    fn mode_toggle_saves_immediately_and_drops_queued_steps() {
        let (mut game, mut app) = setup(MovementMode::Stepped);
        let now = Instant::now();
        app.tick(&mut game, &keys(&[KeyCode::W, KeyCode::D, KeyCode::A]), now);
        assert_eq!(app.pending_steps(), 2);

        let outcome = app.tick(&mut game, &keys(&[KeyCode::G]), now);
        assert!(outcome.save_now);
        assert_eq!(outcome.events, vec![GameEvent::ModeChanged(MovementMode::Live)]);
        assert_eq!(app.pending_steps(), 0);
    }

    #[test]
    fn live_mode_follows_fixes_and_ignores_step_keys() {
        let (mut game, mut app) = setup(MovementMode::Live);
        let target = HexCoord::new(3, -1);
        let frame = FrameActions {
            keys_pressed: vec![KeyCode::W],
            fix: Some(game.grid().center(target)),
            ..FrameActions::default()
        };

        app.tick(&mut game, &frame, Instant::now());
        assert_eq!(game.player().cell(), target);
        assert_eq!(app.pending_steps(), 0);
    }

    #[test]
    fn teardown_flush_reports_pending_movement() {
        let (mut game, mut app) = setup(MovementMode::Stepped);
        app.tick(&mut game, &keys(&[KeyCode::X]), Instant::now());
        assert!(app.flush());
        assert!(!app.flush());
    }
}
