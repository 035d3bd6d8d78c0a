/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::gesture::classifier::DEFAULT_OPEN_MARGIN;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gesture: GestureConfig,
    pub rules: RulesConfig,
    /// Custom level file; `None` = built-in maze.
    pub level_file: Option<PathBuf>,
    /// Recorded detector frames; `None` = keyboard hand simulator.
    pub replay_file: Option<PathBuf>,
    /// `None` disables logging.
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub hold: Duration,         // continuous hold before a gesture confirms
    pub enemy_delay: Duration,  // player action → hunter reaction
    pub timer_interval: Duration,
    pub frame: Duration,        // main loop sleep, rendering only
}

#[derive(Clone, Debug)]
pub struct GestureConfig {
    pub open_margin: f32,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub lives: u32,
    pub coin_score: u32,
    pub destroy_score: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            lives: default_lives(),
            coin_score: default_coin_score(),
            destroy_score: default_destroy_score(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gesture: TomlGesture,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_hold_ms")]
    hold_ms: u64,
    #[serde(default = "default_enemy_delay_ms")]
    enemy_delay_ms: u64,
    #[serde(default = "default_timer_interval_ms")]
    timer_interval_ms: u64,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGesture {
    #[serde(default = "default_open_margin")]
    open_margin: f32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_lives")]
    lives: u32,
    #[serde(default = "default_coin_score")]
    coin_score: u32,
    #[serde(default = "default_destroy_score")]
    destroy_score: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    level_file: String,
    #[serde(default)]
    replay_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_hold_ms() -> u64 { 3000 }
fn default_enemy_delay_ms() -> u64 { 3000 }
fn default_timer_interval_ms() -> u64 { 1000 }
fn default_frame_ms() -> u64 { 16 }
fn default_open_margin() -> f32 { DEFAULT_OPEN_MARGIN }
fn default_lives() -> u32 { 3 }
fn default_coin_score() -> u32 { 10 }
fn default_destroy_score() -> u32 { 5 }
fn default_log_file() -> String { "gesture-maze.log".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            hold_ms: default_hold_ms(),
            enemy_delay_ms: default_enemy_delay_ms(),
            timer_interval_ms: default_timer_interval_ms(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for TomlGesture {
    fn default() -> Self {
        TomlGesture { open_margin: default_open_margin() }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            lives: default_lives(),
            coin_score: default_coin_score(),
            destroy_score: default_destroy_score(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            level_file: String::new(),
            replay_file: String::new(),
            log_file: default_log_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly. Relative paths stay relative.
    #[allow(dead_code)]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg, &[]))
    }

    fn from_toml(t: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        GameConfig {
            timing: TimingConfig {
                hold: Duration::from_millis(t.timing.hold_ms),
                enemy_delay: Duration::from_millis(t.timing.enemy_delay_ms),
                timer_interval: Duration::from_millis(t.timing.timer_interval_ms.max(1)),
                frame: Duration::from_millis(t.timing.frame_ms),
            },
            gesture: GestureConfig { open_margin: t.gesture.open_margin },
            rules: RulesConfig {
                lives: t.rules.lives.max(1),
                coin_score: t.rules.coin_score,
                destroy_score: t.rules.destroy_score,
            },
            level_file: resolve_path(&t.general.level_file, search_dirs),
            replay_file: resolve_path(&t.general.replay_file, search_dirs),
            // the log is written, not searched for
            log_file: (!t.general.log_file.is_empty()).then(|| PathBuf::from(&t.general.log_file)),
        }
    }
}

/// Empty = unset. Relative paths are looked up in the candidate dirs,
/// falling back to relative-to-CWD.
fn resolve_path(raw: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    if raw.is_empty() {
        return None;
    }
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return Some(path);
    }
    Some(
        search_dirs.iter()
            .map(|d| d.join(raw))
            .find(|p| p.is_file())
            .unwrap_or(path),
    )
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/gesture-maze)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/gesture-maze");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warn!(path = %path.display(), "config.toml parse error, using defaults: {e}");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.timing.hold, Duration::from_millis(3000));
        assert_eq!(cfg.timing.enemy_delay, Duration::from_millis(3000));
        assert_eq!(cfg.timing.timer_interval, Duration::from_secs(1));
        assert_eq!(cfg.gesture.open_margin, 0.03);
        assert_eq!(cfg.rules.lives, 3);
        assert_eq!(cfg.rules.coin_score, 10);
        assert_eq!(cfg.rules.destroy_score, 5);
        assert_eq!(cfg.level_file, None);
        assert_eq!(cfg.replay_file, None);
        assert_eq!(cfg.log_file, Some(PathBuf::from("gesture-maze.log")));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[timing]\nhold_ms = 1500\n\n[rules]\nlives = 5\n\n[general]\nlog_file = \"\"\nreplay_file = \"session.jsonl\"\n",
        )
        .unwrap();
        assert_eq!(cfg.timing.hold, Duration::from_millis(1500));
        assert_eq!(cfg.timing.enemy_delay, Duration::from_millis(3000));
        assert_eq!(cfg.rules.lives, 5);
        assert_eq!(cfg.rules.coin_score, 10);
        assert_eq!(cfg.log_file, None);
        assert_eq!(cfg.replay_file, Some(PathBuf::from("session.jsonl")));
    }

    #[test]
    fn zero_lives_is_clamped() {
        let cfg = GameConfig::from_toml_str("[rules]\nlives = 0\n").unwrap();
        assert_eq!(cfg.rules.lives, 1);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::from_toml_str("[timing]\nhold_ms = \"soon\"\n").is_err());
    }
}
