/// Game: wires detector frames, the hold tracker, the rules and the clock.
///
/// ```text
///   Detection ─▶ classify ─▶ HoldTracker ─▶ confirmed label
///                                               │
///                     not running + FIRE ◀──────┤──────▶ step::apply_player_action
///                     (start / restart)                       │ wakes_enemy
///                                                             ▼
///   advance(now) ◀── Scheduler ◀── EnemyStep @ now + enemy_delay
///                          ▲
///                          └────── TimerTick every timer_interval while running
/// ```
///
/// All time comes in through `now` arguments; nothing here sleeps or
/// reads the clock, so the render loop and tests drive it the same way.

use std::time::Instant;

use tracing::{debug, warn};

use crate::config::{GameConfig, TimingConfig};
use crate::gesture::classifier::{classify, GestureLabel};
use crate::gesture::hold::HoldTracker;
use crate::gesture::Detection;
use super::event::GameEvent;
use super::level::LevelDef;
use super::scheduler::Scheduler;
use super::step;
use super::world::{GameState, Phase};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheduled {
    EnemyStep,
    TimerTick,
}

pub struct Game {
    pub state: GameState,
    tracker: HoldTracker,
    scheduler: Scheduler<Scheduled>,
    timing: TimingConfig,
    open_margin: f32,
    /// Latest per-frame label, for the HUD.
    label: GestureLabel,
    detector_down: bool,
}

impl Game {
    pub fn new(level: LevelDef, config: &GameConfig) -> Self {
        Game {
            state: GameState::new(level, config.rules.clone()),
            tracker: HoldTracker::new(config.timing.hold),
            scheduler: Scheduler::new(),
            timing: config.timing.clone(),
            open_margin: config.gesture.open_margin,
            label: GestureLabel::None,
            detector_down: false,
        }
    }

    // ── Queries for the front-end ──

    pub fn gesture_label(&self) -> GestureLabel {
        self.label
    }

    pub fn hold_progress(&self, now: Instant) -> f32 {
        self.tracker.progress(now)
    }

    /// Whole seconds until the current hold confirms, rounded up.
    /// The full hold time when nothing is being held.
    pub fn hold_seconds_left(&self, now: Instant) -> u64 {
        let hold = self.tracker.threshold().as_secs_f32();
        let left = (1.0 - self.hold_progress(now)) * hold;
        left.max(0.0).ceil() as u64
    }

    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    // ── Commands ──

    /// Intro → Running. Ignored in any other phase.
    pub fn start(&mut self, now: Instant) -> Vec<GameEvent> {
        let events = step::start(&mut self.state);
        if !events.is_empty() {
            self.scheduler.clear();
            self.schedule_timer(now);
        }
        events
    }

    /// The external restart command. Cancels all pending work.
    pub fn restart(&mut self, now: Instant) -> Vec<GameEvent> {
        self.scheduler.clear();
        let events = step::restart(&mut self.state);
        self.schedule_timer(now);
        events
    }

    // ── Input ──

    /// Feed one detector result.
    pub fn on_detection(&mut self, detection: &Detection, now: Instant) -> Vec<GameEvent> {
        let classified = match detection {
            Detection::Hand(hand) => Some(classify(hand, self.open_margin)),
            Detection::NoHand => None,
            Detection::Unavailable(reason) => {
                if !self.detector_down {
                    warn!(%reason, "hand detector unavailable");
                    self.detector_down = true;
                }
                self.tracker.reset();
                self.label = GestureLabel::None;
                self.state.set_status(format!("Hand detector unavailable: {reason}"));
                return vec![];
            }
        };
        if self.detector_down {
            self.detector_down = false;
            self.state.set_status("Hand detector back online.");
        }
        self.label = classified.unwrap_or_default();

        match self.tracker.update(classified, now) {
            Some(confirmed) => {
                let mut events = vec![GameEvent::GestureConfirmed(confirmed)];
                events.extend(self.on_confirmed(confirmed, now));
                events
            }
            None => vec![],
        }
    }

    fn on_confirmed(&mut self, label: GestureLabel, now: Instant) -> Vec<GameEvent> {
        match (self.state.phase, label) {
            (Phase::Intro, GestureLabel::Fire) => self.start(now),
            (Phase::Won | Phase::Lost, GestureLabel::Fire) => self.restart(now),
            (Phase::Running, _) => {
                let outcome = step::apply_player_action(&mut self.state, label);
                if outcome.wakes_enemy {
                    self.scheduler.schedule_at(now + self.timing.enemy_delay, Scheduled::EnemyStep);
                    debug!(pending = self.pending(), "enemy step scheduled");
                }
                outcome.events
            }
            _ => {
                debug!(gesture = label.as_str(), "ignored, game not running");
                vec![]
            }
        }
    }

    // ── Clock ──

    /// Run every scheduled event due at or before `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<GameEvent> {
        let mut events = vec![];
        while let Some((due, what)) = self.scheduler.pop_due(now) {
            match what {
                Scheduled::EnemyStep => events.extend(step::enemy_step(&mut self.state)),
                Scheduled::TimerTick => {
                    events.extend(step::timer_tick(&mut self.state));
                    if self.state.is_running() {
                        // from the due time, so a slow frame doesn't drift the clock
                        self.scheduler.schedule_at(due + self.timing.timer_interval, Scheduled::TimerTick);
                    }
                }
            }
        }
        events
    }

    fn schedule_timer(&mut self, now: Instant) {
        self.scheduler.schedule_at(now + self.timing.timer_interval, Scheduled::TimerTick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::entity::{Direction, Pos};
    use crate::domain::maze::from_ascii;
    use crate::gesture::landmarks::HandLandmarks;
    use crate::sim::event::BlockReason;
    use crate::sim::level::canonical_level;

    const UP: [bool; 4] = [true, false, false, false];
    const RIGHT: [bool; 4] = [true, true, false, false];
    const FIRE: [bool; 4] = [true, true, true, true];

    fn hand(open: [bool; 4]) -> Detection {
        Detection::Hand(HandLandmarks::with_open_fingers(open))
    }

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    /// Hold a pose from `from_ms` until it confirms once.
    fn hold(g: &mut Game, t0: Instant, open: [bool; 4], from_ms: u64) -> Vec<GameEvent> {
        let mut events = g.on_detection(&hand(open), at(t0, from_ms));
        events.extend(g.on_detection(&hand(open), at(t0, from_ms + 3000)));
        events
    }

    fn game() -> Game {
        Game::new(canonical_level(), &GameConfig::default())
    }

    #[test]
    fn held_fire_starts_from_intro() {
        let t0 = Instant::now();
        let mut g = game();
        let ev = hold(&mut g, t0, FIRE, 0);
        assert_eq!(ev, vec![GameEvent::GestureConfirmed(GestureLabel::Fire), GameEvent::Started]);
        assert!(g.state.is_running());
    }

    #[test]
    fn other_gestures_do_nothing_before_start() {
        let t0 = Instant::now();
        let mut g = game();
        let ev = hold(&mut g, t0, RIGHT, 0);
        assert_eq!(ev, vec![GameEvent::GestureConfirmed(GestureLabel::Right)]);
        assert_eq!(g.state.phase, Phase::Intro);
        assert_eq!(g.state.player.pos, Pos::new(1, 1));
    }

    #[test]
    fn enemy_reacts_after_delay() {
        let t0 = Instant::now();
        let mut g = game();
        g.start(t0);
        let ev = hold(&mut g, t0, RIGHT, 0);
        assert!(ev.contains(&GameEvent::Moved { to: Pos::new(2, 1), facing: Direction::Right }));

        // confirmed at 3000, enemy due at 6000
        let ev = g.advance(at(t0, 5999));
        assert!(!ev.iter().any(|e| matches!(e, GameEvent::EnemyMoved { .. })));
        assert_eq!(g.state.enemy.pos, Pos::new(18, 1));

        let ev = g.advance(at(t0, 6000));
        assert!(ev.iter().any(|e| matches!(e, GameEvent::EnemyMoved { .. })));
        assert_ne!(g.state.enemy.pos, Pos::new(18, 1));
    }

    #[test]
    fn each_action_gets_its_own_enemy_step() {
        let t0 = Instant::now();
        let mut g = game();
        g.start(t0);
        hold(&mut g, t0, RIGHT, 0);
        // the hold re-armed at 3000 and confirms again at 6000
        let ev = g.on_detection(&hand(RIGHT), at(t0, 6000));
        assert!(ev.contains(&GameEvent::Moved { to: Pos::new(3, 1), facing: Direction::Right }));

        let enemy_moves = |ev: &[GameEvent]| {
            ev.iter().filter(|e| matches!(e, GameEvent::EnemyMoved { .. })).count()
        };

        let spawn = g.state.enemy.pos;
        assert_eq!(enemy_moves(&g.advance(at(t0, 6000))), 1);
        let first = g.state.enemy.pos;
        assert_eq!(first.manhattan(spawn), 1);

        assert_eq!(enemy_moves(&g.advance(at(t0, 8999))), 0);
        assert_eq!(g.state.enemy.pos, first);

        assert_eq!(enemy_moves(&g.advance(at(t0, 9000))), 1);
        assert_eq!(g.state.enemy.pos.manhattan(first), 1);
        assert_eq!(g.state.enemy.pos.manhattan(spawn), 2);
    }

    #[test]
    fn blocked_move_schedules_nothing() {
        let t0 = Instant::now();
        let mut g = game();
        g.start(t0);
        let before = g.pending();
        let ev = hold(&mut g, t0, UP, 0);
        assert_eq!(g.state.status, "Blocked by brick");
        assert!(ev.contains(&GameEvent::Blocked { reason: BlockReason::Wall }));
        assert_eq!(g.pending(), before);
        g.advance(at(t0, 60_000));
        assert_eq!(g.state.enemy.pos, Pos::new(18, 1));
    }

    #[test]
    fn fire_miss_still_schedules_enemy() {
        let t0 = Instant::now();
        let mut g = game();
        g.start(t0);
        let before = g.pending();
        hold(&mut g, t0, FIRE, 0);
        assert_eq!(g.state.status, "Nothing to fire at.");
        assert_eq!(g.pending(), before + 1);
    }

    #[test]
    fn timer_counts_seconds_while_running() {
        let t0 = Instant::now();
        let mut g = game();
        g.start(t0);
        let ev = g.advance(at(t0, 3500));
        assert_eq!(ev, vec![GameEvent::TimerTick(1), GameEvent::TimerTick(2), GameEvent::TimerTick(3)]);
        assert_eq!(g.state.elapsed_secs, 3);
        g.advance(at(t0, 4000));
        assert_eq!(g.state.elapsed_secs, 4);
    }

    #[test]
    fn win_before_enemy_step_makes_it_a_no_op() {
        let t0 = Instant::now();
        let level = LevelDef {
            name: "short".into(),
            maze: from_ascii(&["#######", "#S.G..#", "#######"]),
            enemy_spawn: Pos::new(5, 1),
        };
        let mut g = Game::new(level, &GameConfig::default());
        g.start(t0);
        hold(&mut g, t0, RIGHT, 0);
        // re-armed at 3000, second confirm at 6000 reaches the goal
        let ev = g.on_detection(&hand(RIGHT), at(t0, 6000));
        assert!(ev.iter().any(|e| matches!(e, GameEvent::Won { score: 0, lives: 3, .. })));
        assert_eq!(g.state.phase, Phase::Won);

        let seconds = g.state.elapsed_secs;
        let ev = g.advance(at(t0, 20_000));
        assert!(ev.is_empty());
        assert_eq!(g.state.enemy.pos, Pos::new(5, 1));
        assert_eq!(g.state.elapsed_secs, seconds);
    }

    #[test]
    fn every_pending_enemy_step_is_void_after_a_win() {
        let t0 = Instant::now();
        let level = LevelDef {
            name: "corridor".into(),
            maze: from_ascii(&["###########", "#S..G.....#", "###########"]),
            enemy_spawn: Pos::new(9, 1),
        };
        let mut g = Game::new(level, &GameConfig::default());
        g.start(t0);
        hold(&mut g, t0, RIGHT, 0);
        g.on_detection(&hand(RIGHT), at(t0, 6000));
        g.advance(at(t0, 6000));
        assert_eq!(g.state.enemy.pos, Pos::new(8, 1));

        // the third move reaches the goal with two enemy steps still queued
        let ev = g.on_detection(&hand(RIGHT), at(t0, 9000));
        assert!(ev.iter().any(|e| matches!(e, GameEvent::Won { .. })));

        let ev = g.advance(at(t0, 30_000));
        assert!(ev.is_empty());
        assert_eq!(g.state.enemy.pos, Pos::new(8, 1));
        assert_eq!(g.state.player.pos, Pos::new(4, 1));
        assert_eq!(g.pending(), 0);
    }

    #[test]
    fn hold_countdown_rounds_up() {
        let t0 = Instant::now();
        let mut g = game();
        assert_eq!(g.hold_seconds_left(t0), 3);
        g.on_detection(&hand(UP), t0);
        assert_eq!(g.hold_seconds_left(t0), 3);
        assert_eq!(g.hold_seconds_left(at(t0, 1200)), 2);
        assert_eq!(g.hold_seconds_left(at(t0, 2999)), 1);
        assert_eq!(g.hold_seconds_left(at(t0, 4000)), 0);
    }

    #[test]
    fn restart_cancels_pending_enemy_step() {
        let t0 = Instant::now();
        let mut g = game();
        g.start(t0);
        hold(&mut g, t0, RIGHT, 0);
        assert_eq!(g.restart(at(t0, 3500)), vec![GameEvent::Restarted]);
        assert_eq!(g.pending(), 1);
        g.advance(at(t0, 6500));
        assert_eq!(g.state.enemy.pos, Pos::new(18, 1));
        assert_eq!(g.state.player.pos, Pos::new(1, 1));
        assert_eq!(g.state.elapsed_secs, 3);
    }

    #[test]
    fn held_fire_restarts_after_loss() {
        let t0 = Instant::now();
        let mut g = game();
        g.start(t0);
        g.state.phase = Phase::Lost;
        g.state.lives = 0;
        let ev = hold(&mut g, t0, FIRE, 0);
        assert!(ev.contains(&GameEvent::Restarted));
        assert!(g.state.is_running());
        assert_eq!(g.state.lives, 3);
    }

    #[test]
    fn unavailable_detector_resets_hold() {
        let t0 = Instant::now();
        let mut g = game();
        g.on_detection(&hand(FIRE), t0);
        assert!(g.hold_progress(at(t0, 1500)) > 0.0);
        assert_eq!(g.gesture_label(), GestureLabel::Fire);

        let ev = g.on_detection(&Detection::Unavailable("no camera".into()), at(t0, 1500));
        assert!(ev.is_empty());
        assert_eq!(g.hold_progress(at(t0, 1500)), 0.0);
        assert_eq!(g.gesture_label(), GestureLabel::None);
        assert_eq!(g.state.status, "Hand detector unavailable: no camera");

        // the interrupted hold never confirms
        assert!(g.on_detection(&hand(FIRE), at(t0, 3000)).is_empty());
        assert_eq!(g.state.phase, Phase::Intro);
    }

    #[test]
    fn losing_the_hand_drops_the_hold() {
        let t0 = Instant::now();
        let mut g = game();
        g.on_detection(&hand(FIRE), t0);
        g.on_detection(&Detection::NoHand, at(t0, 2000));
        assert!(g.on_detection(&hand(FIRE), at(t0, 3000)).is_empty());
        assert_eq!(g.state.phase, Phase::Intro);
    }
}
