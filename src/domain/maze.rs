/// The maze grid.
///
/// ## Tile layers
///
/// Two layers, like a level as loaded vs. a level being played:
///   - `base`  : the layout as given, StartMarker included. **Never mutated.**
///   - `tiles` : the effective grid (coins taken, obstacles blasted).
///
/// All runtime changes go through `set_tile()`. `reset()` rebuilds `tiles`
/// from `base` and re-extracts the start marker, so a restart reproduces
/// the loaded layout exactly.
///
/// Queries that take a `Pos` outside the grid fail with
/// `MazeError::OutOfBounds`; movement code checks `step()` first and never
/// relies on that error.

use thiserror::Error;

use super::entity::{Direction, Pos};
use super::tile::Tile;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("position ({x}, {y}) is outside the {width}x{height} maze")]
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
    #[error("maze has no tiles")]
    Empty,
    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("unknown tile code {code} at ({x}, {y})")]
    UnknownCode { code: u8, x: usize, y: usize },
    #[error("maze needs exactly one start marker, found {0}")]
    StartMarkers(usize),
}

#[derive(Clone, Debug)]
pub struct Maze {
    base: Vec<Vec<Tile>>,
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
    start: Pos,
}

// ── Construction ──

impl Maze {
    /// Validate a rectangular layout with exactly one start marker.
    pub fn new(rows: Vec<Vec<Tile>>) -> Result<Self, MazeError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if height == 0 || width == 0 {
            return Err(MazeError::Empty);
        }
        for (row, r) in rows.iter().enumerate() {
            if r.len() != width {
                return Err(MazeError::Ragged { row, expected: width, found: r.len() });
            }
        }
        let markers = rows.iter().flatten().filter(|t| **t == Tile::StartMarker).count();
        if markers != 1 {
            return Err(MazeError::StartMarkers(markers));
        }

        let mut maze = Maze {
            base: rows,
            tiles: vec![],
            width,
            height,
            start: Pos::new(0, 0),
        };
        maze.reset();
        Ok(maze)
    }

    /// Build from numeric layout codes (`0`..=`5`).
    pub fn from_codes<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, MazeError> {
        let mut tiles = Vec::with_capacity(rows.len());
        for (y, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.as_ref().len());
            for (x, &code) in row.as_ref().iter().enumerate() {
                let tile = Tile::from_code(code).ok_or(MazeError::UnknownCode { code, x, y })?;
                out.push(tile);
            }
            tiles.push(out);
        }
        Maze::new(tiles)
    }

    /// Restore the effective layer from the base layout.
    /// Returns the freshly extracted start position.
    pub fn reset(&mut self) -> Pos {
        self.tiles = self.base.clone();
        for (y, row) in self.tiles.iter_mut().enumerate() {
            for (x, tile) in row.iter_mut().enumerate() {
                if *tile == Tile::StartMarker {
                    *tile = Tile::Empty;
                    self.start = Pos::new(x, y);
                }
            }
        }
        self.start
    }
}

// ── Queries ──

impl Maze {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Where the start marker was.
    pub fn start(&self) -> Pos {
        self.start
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn out_of_bounds(&self, pos: Pos) -> MazeError {
        MazeError::OutOfBounds { x: pos.x, y: pos.y, width: self.width, height: self.height }
    }

    #[allow(dead_code)]
    pub fn tile_at(&self, pos: Pos) -> Result<Tile, MazeError> {
        self.get(pos).ok_or_else(|| self.out_of_bounds(pos))
    }

    /// Non-failing lookup for code that has already bounds-checked.
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<Tile> {
        if self.contains(pos) { Some(self.tiles[pos.y][pos.x]) } else { None }
    }

    /// False outside the grid.
    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.get(pos).is_some_and(Tile::is_walkable)
    }

    /// False outside the grid.
    pub fn is_passable_for_pathing(&self, pos: Pos) -> bool {
        self.get(pos).is_some_and(Tile::is_passable_for_pathing)
    }

    /// Bounds-checked neighbour by signed delta.
    pub fn neighbor(&self, pos: Pos, dx: i32, dy: i32) -> Option<Pos> {
        pos.offset(dx, dy).filter(|p| self.contains(*p))
    }

    /// Bounds-checked neighbour in a direction.
    pub fn step(&self, pos: Pos, dir: Direction) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        self.neighbor(pos, dx, dy)
    }

    /// Rows of the effective layer, for rendering.
    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.tiles
    }

    pub fn count(&self, kind: Tile) -> usize {
        self.tiles.iter().flatten().filter(|t| **t == kind).count()
    }

    /// The base layout as numeric codes, start marker included.
    #[allow(dead_code)]
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.base.iter().map(|r| r.iter().map(|t| t.code()).collect()).collect()
    }
}

// ── Mutation ──

impl Maze {
    pub fn set_tile(&mut self, pos: Pos, tile: Tile) -> Result<(), MazeError> {
        if !self.contains(pos) {
            return Err(self.out_of_bounds(pos));
        }
        self.tiles[pos.y][pos.x] = tile;
        Ok(())
    }
}

/// Build a maze from an ASCII diagram.
/// Legend: '#'=Wall  'S'=Start  'G'=Goal  '$'=Coin  'X'=Destructible  else Empty
#[cfg(test)]
pub fn from_ascii(rows: &[&str]) -> Maze {
    let tiles = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|ch| match ch {
                    '#' => Tile::Wall,
                    'S' => Tile::StartMarker,
                    'G' => Tile::Goal,
                    '$' => Tile::Coin,
                    'X' => Tile::Destructible,
                    _ => Tile::Empty,
                })
                .collect()
        })
        .collect();
    Maze::new(tiles).expect("test diagram must be a valid maze")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_marker_is_consumed() {
        let m = from_ascii(&[
            "#####",
            "#S.G#",
            "#####",
        ]);
        assert_eq!(m.start(), Pos::new(1, 1));
        assert_eq!(m.tile_at(Pos::new(1, 1)), Ok(Tile::Empty));
        assert_eq!(m.count(Tile::StartMarker), 0);
        // base layer keeps it
        assert_eq!(m.to_codes()[1][1], 2);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut m = from_ascii(&["S."]);
        assert_eq!(
            m.tile_at(Pos::new(2, 0)),
            Err(MazeError::OutOfBounds { x: 2, y: 0, width: 2, height: 1 })
        );
        assert!(m.set_tile(Pos::new(0, 1), Tile::Coin).is_err());
        assert!(!m.is_walkable(Pos::new(5, 5)));
    }

    #[test]
    fn walkable_and_pathing_rules() {
        let m = from_ascii(&["S#X$"]);
        assert!(m.is_walkable(Pos::new(0, 0)));
        assert!(!m.is_walkable(Pos::new(1, 0)));
        assert!(m.is_walkable(Pos::new(2, 0)));
        assert!(!m.is_passable_for_pathing(Pos::new(1, 0)));
        assert!(m.is_passable_for_pathing(Pos::new(2, 0)));
    }

    #[test]
    fn reset_restores_mutations() {
        let mut m = from_ascii(&["S$X"]);
        m.set_tile(Pos::new(1, 0), Tile::Empty).unwrap();
        m.set_tile(Pos::new(2, 0), Tile::Empty).unwrap();
        assert_eq!(m.count(Tile::Coin), 0);
        let start = m.reset();
        assert_eq!(start, Pos::new(0, 0));
        assert_eq!(m.tile_at(Pos::new(1, 0)), Ok(Tile::Coin));
        assert_eq!(m.tile_at(Pos::new(2, 0)), Ok(Tile::Destructible));
    }

    #[test]
    fn rejects_bad_layouts() {
        assert_eq!(Maze::new(vec![]).unwrap_err(), MazeError::Empty);
        assert_eq!(
            Maze::from_codes(&[vec![2u8, 0], vec![0]]).unwrap_err(),
            MazeError::Ragged { row: 1, expected: 2, found: 1 }
        );
        assert_eq!(Maze::from_codes(&[[0u8, 0]]).unwrap_err(), MazeError::StartMarkers(0));
        assert_eq!(Maze::from_codes(&[[2u8, 2]]).unwrap_err(), MazeError::StartMarkers(2));
        assert_eq!(
            Maze::from_codes(&[[2u8, 9]]).unwrap_err(),
            MazeError::UnknownCode { code: 9, x: 1, y: 0 }
        );
    }

    #[test]
    fn step_is_bounds_checked() {
        let m = from_ascii(&["S.", ".."]);
        assert_eq!(m.step(Pos::new(0, 0), Direction::Left), None);
        assert_eq!(m.step(Pos::new(0, 0), Direction::Up), None);
        assert_eq!(m.step(Pos::new(1, 1), Direction::Right), None);
        assert_eq!(m.step(Pos::new(0, 0), Direction::Down), Some(Pos::new(0, 1)));
    }
}
