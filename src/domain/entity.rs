/// Entities: grid positions, facing, the player and the hunter.

/// A grid cell, `x` = column, `y` = row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Shift by a signed delta. `None` if either axis would go negative;
    /// the upper bound is the maze's business.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Pos> {
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        Some(Pos { x, y })
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        (self.x.abs_diff(other.x) + self.y.abs_diff(other.y)) as u32
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Pos,
    /// Persists across moves; decides where Fire aims.
    pub facing: Direction,
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Player { pos, facing: Direction::Right }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub pos: Pos,
    pub spawn: Pos,
}

impl Enemy {
    pub fn new(spawn: Pos) -> Self {
        Enemy { pos: spawn, spawn }
    }
}
