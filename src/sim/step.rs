/// Game rules: what a confirmed action, an enemy step or a timer tick does.
///
/// Every entry point mutates `GameState` in place and returns the events
/// it produced. None of them look at the clock; pacing lives in `game.rs`.
///
/// Player action resolution (Running only):
///   FIRE  → blast a Destructible in the facing direction (+destroy_score),
///           otherwise "Nothing to fire at." Always wakes the enemy.
///   move  → border / Wall / Destructible block (status only, facing kept,
///           enemy not woken); otherwise step, turn, and take whatever is
///           there: Coin (+coin_score), Goal (Won).
///
/// Enemy step (Running only):
///   1. one step toward the player (A*, greedy fallback)
///   2. same cell as the player → lose a life; 0 lives → Lost,
///      else the player goes back to the start (enemy stays)

use tracing::{debug, info};

use crate::domain::ai;
use crate::domain::entity::Direction;
use crate::domain::tile::Tile;
use crate::gesture::classifier::GestureLabel;
use super::event::{BlockReason, GameEvent};
use super::world::{GameState, Phase};

/// Result of one confirmed player action.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub events: Vec<GameEvent>,
    /// Whether the enemy's reaction should be scheduled.
    pub wakes_enemy: bool,
}

// ══════════════════════════════════════════════════════════════
// Session lifecycle
// ══════════════════════════════════════════════════════════════

/// Intro → Running.
pub fn start(state: &mut GameState) -> Vec<GameEvent> {
    if state.phase != Phase::Intro {
        return vec![];
    }
    state.reset_session();
    state.phase = Phase::Running;
    state.set_status("Game started! Hold a gesture for 3 seconds to move.");
    info!(level = %state.level_name, "game started");
    vec![GameEvent::Started]
}

/// Any phase → Running with a fresh board.
pub fn restart(state: &mut GameState) -> Vec<GameEvent> {
    state.reset_session();
    state.phase = Phase::Running;
    state.set_status("Restarted.");
    info!("game restarted");
    vec![GameEvent::Restarted]
}

pub fn timer_tick(state: &mut GameState) -> Vec<GameEvent> {
    if !state.is_running() {
        return vec![];
    }
    state.elapsed_secs += 1;
    vec![GameEvent::TimerTick(state.elapsed_secs)]
}

// ══════════════════════════════════════════════════════════════
// Player actions
// ══════════════════════════════════════════════════════════════

pub fn apply_player_action(state: &mut GameState, label: GestureLabel) -> ActionOutcome {
    if !state.is_running() {
        return ActionOutcome::default();
    }
    if label == GestureLabel::Fire {
        return fire(state);
    }
    match label.direction() {
        Some(dir) => move_player(state, dir),
        None => ActionOutcome::default(),
    }
}

fn fire(state: &mut GameState) -> ActionOutcome {
    let target = state.maze.step(state.player.pos, state.player.facing);
    let mut events = vec![];

    match target {
        Some(at) if state.maze.get(at) == Some(Tile::Destructible) => {
            // `at` came from a bounds-checked step
            if state.maze.set_tile(at, Tile::Empty).is_ok() {
                state.score += state.rules.destroy_score;
                state.set_status("Destroyed obstacle!");
                events.push(GameEvent::ObstacleDestroyed { at, score: state.score });
            }
        }
        _ => {
            state.set_status("Nothing to fire at.");
            events.push(GameEvent::FiredAtNothing);
        }
    }

    ActionOutcome { events, wakes_enemy: true }
}

fn move_player(state: &mut GameState, dir: Direction) -> ActionOutcome {
    let blocked = |state: &mut GameState, reason: BlockReason| {
        state.set_status(reason.status_text());
        ActionOutcome { events: vec![GameEvent::Blocked { reason }], wakes_enemy: false }
    };

    let Some(to) = state.maze.step(state.player.pos, dir) else {
        return blocked(state, BlockReason::Border);
    };
    let tile = match state.maze.get(to) {
        Some(Tile::Wall) => return blocked(state, BlockReason::Wall),
        Some(Tile::Destructible) => return blocked(state, BlockReason::Destructible),
        Some(t) => t,
        None => return blocked(state, BlockReason::Border),
    };

    state.player.pos = to;
    state.player.facing = dir;
    let mut events = vec![GameEvent::Moved { to, facing: dir }];

    match tile {
        Tile::Coin => {
            if state.maze.set_tile(to, Tile::Empty).is_ok() {
                state.score += state.rules.coin_score;
                state.set_status(format!("Collected coin! Score: {}", state.score));
                events.push(GameEvent::CoinCollected { at: to, score: state.score });
            }
        }
        Tile::Goal => {
            state.phase = Phase::Won;
            state.set_status("You reached the goal!");
            info!(seconds = state.elapsed_secs, score = state.score, lives = state.lives, "won");
            events.push(GameEvent::Won {
                seconds: state.elapsed_secs,
                score: state.score,
                lives: state.lives,
            });
        }
        _ => state.set_status(format!("Moved {}", dir.as_str())),
    }

    // the goal case still schedules; the enemy step finds the game over
    ActionOutcome { events, wakes_enemy: true }
}

// ══════════════════════════════════════════════════════════════
// Enemy reaction
// ══════════════════════════════════════════════════════════════

/// Deferred enemy move. A no-op once the game has left `Running`.
pub fn enemy_step(state: &mut GameState) -> Vec<GameEvent> {
    if !state.is_running() {
        debug!("enemy step dropped, game not running");
        return vec![];
    }

    let mut events = vec![];
    let from = state.enemy.pos;
    let to = ai::next_step(&state.maze, from, state.player.pos);
    if to != from {
        state.enemy.pos = to;
        events.push(GameEvent::EnemyMoved { from, to });
    }

    if state.enemy.pos == state.player.pos {
        resolve_hit(state, &mut events);
    }
    events
}

fn resolve_hit(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.lives = state.lives.saturating_sub(1);
    events.push(GameEvent::PlayerHit { lives_left: state.lives });

    if state.lives == 0 {
        state.phase = Phase::Lost;
        state.set_status("Game Over. Hold FIRE or press R to restart.");
        info!(score = state.score, seconds = state.elapsed_secs, "lost");
        events.push(GameEvent::Lost);
    } else {
        state.set_status(format!("Enemy hit you! Lives left: {}", state.lives));
        state.player.pos = state.maze.start();
    }
}
