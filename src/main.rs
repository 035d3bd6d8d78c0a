/// Entry point and game loop.

mod config;
mod domain;
mod gesture;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::GameConfig;
use gesture::replay::ReplayFeed;
use gesture::Detection;
use sim::event::GameEvent;
use sim::game::Game;
use sim::level::load_level;
use ui::input::InputState;
use ui::renderer::Renderer;

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_START: &[KeyCode] = &[KeyCode::Enter];

/// Where detector frames come from.
enum HandSource {
    Keyboard,
    Replay(ReplayFeed),
    Broken(String),
}

impl HandSource {
    fn open(config: &GameConfig) -> Self {
        let Some(path) = &config.replay_file else {
            return HandSource::Keyboard;
        };
        match ReplayFeed::open(path) {
            Ok(feed) => {
                info!(path = %path.display(), frames = feed.len(), "replaying recorded hand frames");
                HandSource::Replay(feed)
            }
            Err(e) => {
                error!(path = %path.display(), "replay unavailable: {e}");
                HandSource::Broken(e.to_string())
            }
        }
    }

    /// `None` when there is nothing new this frame.
    fn poll(&mut self, kb: &InputState, now: Instant) -> Option<Detection> {
        match self {
            HandSource::Keyboard => Some(kb.hand_detection()),
            HandSource::Replay(feed) if feed.is_finished() => None,
            HandSource::Replay(feed) => feed.poll(now),
            HandSource::Broken(reason) => Some(Detection::Unavailable(reason.clone())),
        }
    }
}

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    let level = load_level(config.level_file.as_deref());
    let mut game = Game::new(level, &config);
    let mut hands = HandSource::open(&config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut kb = InputState::new();
    let enhanced = enable_key_release(&mut kb);

    let result = game_loop(&mut game, &mut hands, &mut kb, &mut renderer, &config);

    if enhanced {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Gesture Maze!");
    println!(
        "Final Score: {}   Time: {}s   Lives: {}",
        game.state.score, game.state.elapsed_secs, game.state.lives
    );
}

/// File logger; the terminal belongs to the renderer.
fn init_logging(config: &GameConfig) {
    let Some(path) = &config.log_file else { return };
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("could not open log file {}: {e}", path.display());
            return;
        }
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_maze=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
}

/// Ask for Release events so held keys end exactly when let go.
fn enable_key_release(kb: &mut InputState) -> bool {
    if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
        return false;
    }
    let pushed = execute!(
        std::io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    );
    kb.honor_release = pushed.is_ok();
    kb.honor_release
}

fn game_loop(
    game: &mut Game,
    hands: &mut HandSource,
    kb: &mut InputState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> std::io::Result<()> {
    loop {
        kb.drain_events();
        let now = Instant::now();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            info!("quit");
            return Ok(());
        }
        if kb.any_pressed(KEYS_RESTART) {
            log_events(&game.restart(now));
        } else if kb.any_pressed(KEYS_START) {
            log_events(&game.start(now));
        }

        if let Some(detection) = hands.poll(kb, now) {
            log_events(&game.on_detection(&detection, now));
        }
        log_events(&game.advance(now));

        renderer.render(game, now)?;
        std::thread::sleep(config.timing.frame);
    }
}

fn log_events(events: &[GameEvent]) {
    for ev in events {
        match ev {
            GameEvent::TimerTick(_) => {}
            GameEvent::PlayerHit { lives_left } => warn!(lives_left, "player hit"),
            other => debug!(event = ?other, "game event"),
        }
    }
}
