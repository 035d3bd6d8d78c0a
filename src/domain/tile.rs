/// Tile kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

/// Step cost of an ordinary walkable tile for the hunter's pathfinding.
pub const FLOOR_COST: u32 = 1;
/// Step cost of a destructible block: passable for planning, but only
/// worth it when every wall-free detour is longer.
pub const DESTRUCTIBLE_COST: u32 = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Tile {
    Wall,         // 1
    Empty,        // 0
    StartMarker,  // 2: consumed at load, becomes Empty
    Goal,         // 3
    Coin,         // 4
    Destructible, // 5: must be fired upon before the player can pass
}

impl Tile {
    /// Decode a layout code (`1=Wall, 0=Empty, 2=Start, 3=Goal, 4=Coin, 5=Destructible`).
    pub fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Wall),
            2 => Some(Tile::StartMarker),
            3 => Some(Tile::Goal),
            4 => Some(Tile::Coin),
            5 => Some(Tile::Destructible),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Wall => 1,
            Tile::StartMarker => 2,
            Tile::Goal => 3,
            Tile::Coin => 4,
            Tile::Destructible => 5,
        }
    }

    /// Everything except a wall can be occupied.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall)
    }

    /// Can the hunter plan a route through this tile?
    /// Destructible blocks are costly, not blocking.
    pub fn is_passable_for_pathing(self) -> bool {
        self.path_cost().is_some()
    }

    /// Cost of stepping onto this tile. `None` = never expanded.
    pub fn path_cost(self) -> Option<u32> {
        match self {
            Tile::Wall => None,
            Tile::Destructible => Some(DESTRUCTIBLE_COST),
            _ => Some(FLOOR_COST),
        }
    }

    /// Blocks the player's movement (wall or unbroken obstacle).
    pub fn blocks_player(self) -> bool {
        matches!(self, Tile::Wall | Tile::Destructible)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 0..=5u8 {
            let tile = Tile::from_code(code).unwrap();
            assert_eq!(tile.code(), code);
        }
        assert_eq!(Tile::from_code(6), None);
    }

    #[test]
    fn only_walls_are_unwalkable() {
        assert!(!Tile::Wall.is_walkable());
        assert!(Tile::Destructible.is_walkable());
        assert!(Tile::Goal.is_walkable());
        assert!(Tile::Coin.is_walkable());
    }

    #[test]
    fn destructible_is_costly_not_blocking() {
        assert!(Tile::Destructible.is_passable_for_pathing());
        assert_eq!(Tile::Destructible.path_cost(), Some(100));
        assert_eq!(Tile::Coin.path_cost(), Some(1));
        assert_eq!(Tile::Wall.path_cost(), None);
    }
}
