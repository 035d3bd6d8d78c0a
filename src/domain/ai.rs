/// Hunter AI: A* pathfinding over weighted terrain.
///
/// Two modes:
///   1. **Chase**: A* from hunter to player; take the second cell of the path.
///   2. **Fallback**: when A* finds nothing, a greedy single step toward the
///      player, then any non-wall neighbour so the hunter never freezes.
///
/// Cost of entering a tile: Wall = never, Destructible = 100, else 1.
/// Heuristic: Manhattan distance (admissible, every step costs at least 1).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use super::entity::Pos;
use super::maze::Maze;
use super::tile::Tile;

/// Neighbour expansion order, also the last-resort order of the fallback.
const DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Open-set entry. Ordered so `BinaryHeap` pops the lowest `f` first.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Frontier {
    f: u32,
    g: u32,
    pos: Pos,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── Chase mode ──

/// Minimum-cost path from `start` to `target`, both inclusive.
/// `None` when the target cannot be reached without crossing a wall.
pub fn find_path(maze: &Maze, start: Pos, target: Pos) -> Option<Vec<Pos>> {
    if !maze.contains(start) || !maze.is_passable_for_pathing(target) {
        return None;
    }

    let (w, h) = (maze.width(), maze.height());
    let mut g_score = vec![vec![u32::MAX; w]; h];
    let mut came_from: Vec<Vec<Option<Pos>>> = vec![vec![None; w]; h];
    let mut open = BinaryHeap::with_capacity(64);

    g_score[start.y][start.x] = 0;
    open.push(Frontier { f: start.manhattan(target), g: 0, pos: start });

    while let Some(Frontier { g, pos, .. }) = open.pop() {
        if pos == target {
            return Some(reconstruct(&came_from, pos));
        }
        // Stale entry: a cheaper route to `pos` was already expanded.
        if g > g_score[pos.y][pos.x] {
            continue;
        }

        for &(dx, dy) in &DIRS {
            let Some(next) = maze.neighbor(pos, dx, dy) else { continue };
            let Some(cost) = maze.get(next).and_then(Tile::path_cost) else { continue };
            let tentative = g + cost;
            if tentative < g_score[next.y][next.x] {
                g_score[next.y][next.x] = tentative;
                came_from[next.y][next.x] = Some(pos);
                open.push(Frontier {
                    f: tentative + next.manhattan(target),
                    g: tentative,
                    pos: next,
                });
            }
        }
    }

    None
}

fn reconstruct(came_from: &[Vec<Option<Pos>>], end: Pos) -> Vec<Pos> {
    let mut path = vec![end];
    let mut cur = end;
    while let Some(prev) = came_from[cur.y][cur.x] {
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    path
}

/// Sum of entry costs along a path, start excluded.
pub fn path_cost(maze: &Maze, path: &[Pos]) -> Option<u32> {
    path.iter()
        .skip(1)
        .map(|p| maze.get(*p).and_then(Tile::path_cost))
        .sum()
}

/// Where the hunter goes next. Never onto a wall.
pub fn next_step(maze: &Maze, hunter: Pos, player: Pos) -> Pos {
    if hunter == player {
        return hunter;
    }
    match find_path(maze, hunter, player) {
        Some(path) if path.len() > 1 => {
            debug!(
                from = ?hunter, to = ?path[1], remaining = path.len() - 1,
                cost = ?path_cost(maze, &path), "hunter follows path"
            );
            path[1]
        }
        _ => {
            let next = fallback_step(maze, hunter, player);
            debug!(from = ?hunter, to = ?next, "hunter has no path, using fallback");
            next
        }
    }
}

// ── Fallback mode ──

/// Greedy single step: the axis with the larger gap first (ties go to x),
/// then the other axis; neither may land on a wall or destructible.
/// Failing both, the first non-wall neighbour in `+x, -x, +y, -y` order.
/// Stays put only when boxed in by walls.
pub fn fallback_step(maze: &Maze, hunter: Pos, player: Pos) -> Pos {
    let dx = player.x as i64 - hunter.x as i64;
    let dy = player.y as i64 - hunter.y as i64;
    let step_x = (dx.signum() as i32, 0);
    let step_y = (0, dy.signum() as i32);

    let mut candidates = Vec::with_capacity(2);
    if dx.abs() >= dy.abs() {
        candidates.push(step_x);
        if dy != 0 { candidates.push(step_y); }
    } else {
        candidates.push(step_y);
        if dx != 0 { candidates.push(step_x); }
    }

    for (cx, cy) in candidates {
        if (cx, cy) == (0, 0) { continue; }
        if let Some(next) = maze.neighbor(hunter, cx, cy) {
            if maze.get(next).is_some_and(|t| !t.blocks_player()) {
                return next;
            }
        }
    }

    DIRS.iter()
        .filter_map(|&(ddx, ddy)| maze.neighbor(hunter, ddx, ddy))
        .find(|p| maze.is_walkable(*p))
        .unwrap_or(hunter)
}
