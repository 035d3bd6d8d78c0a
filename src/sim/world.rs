/// GameState: the complete snapshot of a session.
///
/// One owned struct, passed explicitly to every rule in `step.rs`.
/// Nothing here knows about wall-clock time; `game.rs` decides *when*
/// rules run, this module and `step.rs` decide *what* they do.
///
/// ## Phases
///   Intro ──FIRE──▶ Running ──goal──▶ Won
///                      │
///                      └──lives 0──▶ Lost
///   Won / Lost ──restart──▶ Running

use crate::config::RulesConfig;
use crate::domain::entity::{Enemy, Player};
use crate::domain::maze::Maze;

use super::level::LevelDef;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Intro,
    Running,
    Won,
    Lost,
}

#[derive(Clone, Debug)]
pub struct GameState {
    // ── Board ──
    pub level_name: String,
    pub maze: Maze,
    pub player: Player,
    pub enemy: Enemy,

    // ── Session ──
    pub phase: Phase,
    pub score: u32,
    pub lives: u32,
    pub elapsed_secs: u64,

    // ── UI ──
    pub status: String,

    pub rules: RulesConfig,
}

impl GameState {
    pub fn new(level: LevelDef, rules: RulesConfig) -> Self {
        let LevelDef { name, maze, enemy_spawn } = level;
        GameState {
            level_name: name,
            player: Player::new(maze.start()),
            enemy: Enemy::new(enemy_spawn),
            maze,
            phase: Phase::Intro,
            score: 0,
            lives: rules.lives,
            elapsed_secs: 0,
            status: "Hold FIRE (open palm) to start".to_string(),
            rules,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Fresh board and counters. Phase is left to the caller.
    pub fn reset_session(&mut self) {
        let start = self.maze.reset();
        self.player = Player::new(start);
        self.enemy.pos = self.enemy.spawn;
        self.score = 0;
        self.lives = self.rules.lives;
        self.elapsed_secs = 0;
    }
}
