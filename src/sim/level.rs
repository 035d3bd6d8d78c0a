/// Level loader.
///
/// ## Sources (priority order):
///   1. `level_file` from config (custom level, text format below)
///   2. The built-in canonical maze
///
/// ## Level file format (`.txt`):
///   ```text
///   # Level Name
///   @ enemy 18,1
///   1 1 1 1 1
///   1 2 0 3 1
///   1 1 1 1 1
///   ```
///   Line 1: `# Level Name` (optional)
///   Optional: `@ enemy X,Y` (hunter spawn)
///   Lines: map rows of tile codes; spaces and commas between codes are ignored.
///
/// ## Tile codes:
///   0 = Empty       1 = Wall         2 = Start marker
///   3 = Goal        4 = Coin         5 = Destructible
///
/// The hunter must spawn on open ground (no wall, no obstacle). Without an
/// `@ enemy` line it takes the open tile farthest (Manhattan) from the start.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entity::Pos;
use crate::domain::maze::{Maze, MazeError};

pub const CANONICAL_WIDTH: usize = 20;
pub const CANONICAL_HEIGHT: usize = 11;

/// The built-in maze. Goal sits in the bottom border at (18,10).
#[rustfmt::skip]
pub const CANONICAL_LAYOUT: [[u8; CANONICAL_WIDTH]; CANONICAL_HEIGHT] = [
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,2,0,0,0,1,0,5,0,4,0,1,0,4,0,0,0,0,0,1],
    [1,0,1,1,0,1,0,1,1,1,0,1,0,1,0,1,1,0,1,1],
    [1,0,0,1,0,0,0,0,4,0,5,0,0,1,0,0,0,0,0,1],
    [1,1,0,1,1,1,0,1,1,1,1,0,1,1,0,1,1,1,0,1],
    [1,0,0,0,4,0,0,0,0,1,0,0,0,0,0,4,0,0,0,1],
    [1,0,1,1,1,1,1,1,0,1,0,1,1,1,1,1,0,1,0,1],
    [1,0,0,0,0,0,0,1,0,0,0,1,0,0,0,0,0,1,0,1],
    [1,1,1,1,1,1,0,1,1,1,0,1,0,1,1,1,1,1,0,1],
    [1,4,0,0,0,0,0,0,0,4,0,0,0,4,0,0,5,0,4,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,3,1],
];

pub const CANONICAL_ENEMY_SPAWN: Pos = Pos::new(18, 1);

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("line {line}: unexpected character {ch:?} in map row")]
    BadChar { line: usize, ch: char },
    #[error("line {line}: malformed metadata, expected `@ enemy X,Y`")]
    BadMeta { line: usize },
    #[error("enemy spawn ({}, {}) is outside the maze or on a wall or obstacle", .0.x, .0.y)]
    BadEnemySpawn(Pos),
    #[error("maze has no open tile for the enemy")]
    NoEnemySpawn,
    #[error(transparent)]
    Maze(#[from] MazeError),
}

/// A parsed, validated level.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub maze: Maze,
    pub enemy_spawn: Pos,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

pub fn canonical_maze() -> Maze {
    let rows: Vec<&[u8]> = CANONICAL_LAYOUT.iter().map(|r| r.as_slice()).collect();
    match Maze::from_codes(&rows) {
        Ok(m) => m,
        // the embedded layout is covered by tests
        Err(e) => unreachable!("built-in maze is invalid: {e}"),
    }
}

pub fn canonical_level() -> LevelDef {
    LevelDef {
        name: "Gesture Maze".to_string(),
        maze: canonical_maze(),
        enemy_spawn: CANONICAL_ENEMY_SPAWN,
    }
}

/// Load the configured level, or the built-in one.
/// A broken custom level is logged and replaced by the built-in one.
pub fn load_level(path: Option<&Path>) -> LevelDef {
    let Some(path) = path else {
        return canonical_level();
    };
    match load_level_file(path) {
        Ok(def) => {
            info!(name = %def.name, path = %path.display(), "loaded level");
            def
        }
        Err(e) => {
            warn!("{e}; falling back to the built-in maze");
            canonical_level()
        }
    }
}

pub fn load_level_file(path: &Path) -> Result<LevelDef, LevelError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
    parse_level(&content)
}

// ══════════════════════════════════════════════════════════════
// Level file parsing
// ══════════════════════════════════════════════════════════════

pub fn parse_level(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut spawn = None;
    let mut rows: Vec<Vec<u8>> = vec![];

    for (i, raw) in content.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            if name.is_empty() {
                name = rest.trim().to_string();
            }
        } else if let Some(rest) = line.strip_prefix('@') {
            spawn = Some(parse_enemy_meta(rest).ok_or(LevelError::BadMeta { line: line_no })?);
        } else {
            rows.push(parse_row(line, line_no)?);
        }
    }

    let maze = Maze::from_codes(&rows)?;
    let enemy_spawn = match spawn {
        Some(p) if can_spawn_enemy(&maze, p) => p,
        Some(p) => return Err(LevelError::BadEnemySpawn(p)),
        None => farthest_open_tile(&maze).ok_or(LevelError::NoEnemySpawn)?,
    };

    if name.is_empty() {
        name = "Unnamed Maze".to_string();
    }

    Ok(LevelDef { name, maze, enemy_spawn })
}

/// `enemy X,Y` after the `@`.
fn parse_enemy_meta(rest: &str) -> Option<Pos> {
    let coords = rest.trim().strip_prefix("enemy")?;
    let (x, y) = coords.trim().split_once(',')?;
    Some(Pos::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn parse_row(line: &str, line_no: usize) -> Result<Vec<u8>, LevelError> {
    line.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|ch| match ch.to_digit(10) {
            Some(d) => Ok(d as u8),
            None => Err(LevelError::BadChar { line: line_no, ch }),
        })
        .collect()
}

/// The hunter starts on open ground: not a wall, not an unbroken obstacle.
fn can_spawn_enemy(maze: &Maze, p: Pos) -> bool {
    maze.get(p).is_some_and(|t| !t.blocks_player())
}

fn farthest_open_tile(maze: &Maze) -> Option<Pos> {
    let start = maze.start();
    let mut best: Option<(u32, Pos)> = None;
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            let p = Pos::new(x, y);
            if p == start || !can_spawn_enemy(maze, p) {
                continue;
            }
            let d = p.manhattan(start);
            if best.map_or(true, |(bd, _)| d > bd) {
                best = Some((d, p));
            }
        }
    }
    best.map(|(_, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    #[test]
    fn canonical_layout_round_trips() {
        let m = canonical_maze();
        assert_eq!(m.width(), CANONICAL_WIDTH);
        assert_eq!(m.height(), CANONICAL_HEIGHT);
        let codes = m.to_codes();
        for (row, expected) in codes.iter().zip(CANONICAL_LAYOUT.iter()) {
            assert_eq!(row.as_slice(), expected.as_slice());
        }
    }

    #[test]
    fn canonical_start_is_extracted() {
        let m = canonical_maze();
        assert_eq!(m.start(), Pos::new(1, 1));
        assert_eq!(m.get(Pos::new(1, 1)), Some(Tile::Empty));
        assert_eq!(m.count(Tile::StartMarker), 0);
        assert_eq!(m.get(Pos::new(18, 10)), Some(Tile::Goal));
        assert_eq!(m.count(Tile::Destructible), 3);
    }

    #[test]
    fn canonical_enemy_spawn_is_open_floor() {
        let lvl = canonical_level();
        assert_eq!(lvl.maze.get(lvl.enemy_spawn), Some(Tile::Empty));
    }

    #[test]
    fn parses_named_level_with_enemy() {
        let text = "# Tiny\n@ enemy 3,1\n1,1,1,1,1\n1,2,0,0,1\n1,1,1,3,1\n";
        let lvl = parse_level(text).unwrap();
        assert_eq!(lvl.name, "Tiny");
        assert_eq!(lvl.enemy_spawn, Pos::new(3, 1));
        assert_eq!(lvl.maze.start(), Pos::new(1, 1));
        assert_eq!(lvl.maze.get(Pos::new(3, 2)), Some(Tile::Goal));
    }

    #[test]
    fn default_enemy_spawn_is_farthest_open_tile() {
        let text = "11111\n12001\n10041\n11111\n";
        let lvl = parse_level(text).unwrap();
        assert_eq!(lvl.name, "Unnamed Maze");
        assert_eq!(lvl.enemy_spawn, Pos::new(3, 2));
    }

    #[test]
    fn enemy_cannot_spawn_inside_an_obstacle() {
        let text = "@ enemy 3,1\n11111\n12051\n11111\n";
        assert!(matches!(parse_level(text), Err(LevelError::BadEnemySpawn(p)) if p == Pos::new(3, 1)));

        // same rule without the meta line: the obstacle is skipped
        let lvl = parse_level("11111\n12051\n11111\n").unwrap();
        assert_eq!(lvl.enemy_spawn, Pos::new(2, 1));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(parse_level("12x1\n"), Err(LevelError::BadChar { line: 1, ch: 'x' })));
        assert!(matches!(parse_level("@ foe 1,1\n121\n"), Err(LevelError::BadMeta { line: 1 })));
        assert!(matches!(
            parse_level("@ enemy 0,0\n111\n121\n101\n"),
            Err(LevelError::BadEnemySpawn(_))
        ));
        assert!(matches!(
            parse_level("111\n101\n"),
            Err(LevelError::Maze(MazeError::StartMarkers(0)))
        ));
        assert!(matches!(parse_level("1111\n121\n"), Err(LevelError::Maze(MazeError::Ragged { .. }))));
        assert!(matches!(parse_level("1\n1\n1\n"), Err(LevelError::Maze(_))));
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let lvl = load_level(Some(Path::new("/nonexistent/level.txt")));
        assert_eq!(lvl.enemy_spawn, CANONICAL_ENEMY_SPAWN);
        assert_eq!(lvl.maze.start(), Pos::new(1, 1));
    }
}
