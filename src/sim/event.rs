/// Events emitted by state-changing calls.
/// The presentation layer consumes these for the status line and overlays;
/// tests assert on them.

use crate::domain::entity::{Direction, Pos};
use crate::gesture::classifier::GestureLabel;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Restarted,
    GestureConfirmed(GestureLabel),
    Moved { to: Pos, facing: Direction },
    Blocked { reason: BlockReason },
    CoinCollected { at: Pos, score: u32 },
    ObstacleDestroyed { at: Pos, score: u32 },
    FiredAtNothing,
    EnemyMoved { from: Pos, to: Pos },
    PlayerHit { lives_left: u32 },
    Won { seconds: u64, score: u32, lives: u32 },
    Lost,
    TimerTick(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockReason {
    Border,
    Wall,
    Destructible,
}

impl BlockReason {
    pub fn status_text(self) -> &'static str {
        match self {
            BlockReason::Border => "Blocked by border",
            BlockReason::Wall => "Blocked by brick",
            BlockReason::Destructible => "Destructible in the way - FIRE to remove",
        }
    }
}
