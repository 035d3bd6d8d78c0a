//! Landmark snapshot → discrete gesture label. Pure, no history.
//!
//! A finger is "open" when its tip sits above its middle joint by more than
//! `open_margin` (normalized units). Rules, first match wins:
//!
//! | index | middle | ring | pinky | label |
//! |-------|--------|------|-------|-------|
//! | -     | -      | -    | -     | Left  |
//! | up    | up     | up   | up    | Fire  |
//! | up    | -      | -    | -     | Up    |
//! | -     | -      | -    | up    | Down  |
//! | up    | up     | -    | -     | Right |
//! | anything else                 || None  |

use crate::domain::entity::Direction;

use super::landmarks::{Finger, HandLandmarks};

pub const DEFAULT_OPEN_MARGIN: f32 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureLabel {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
    Fire,
}

impl GestureLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            GestureLabel::None => "NONE",
            GestureLabel::Up => "UP",
            GestureLabel::Down => "DOWN",
            GestureLabel::Left => "LEFT",
            GestureLabel::Right => "RIGHT",
            GestureLabel::Fire => "FIRE",
        }
    }

    /// Movement direction, `None` for Fire and None.
    pub fn direction(self) -> Option<Direction> {
        match self {
            GestureLabel::Up => Some(Direction::Up),
            GestureLabel::Down => Some(Direction::Down),
            GestureLabel::Left => Some(Direction::Left),
            GestureLabel::Right => Some(Direction::Right),
            GestureLabel::None | GestureLabel::Fire => None,
        }
    }
}

pub fn finger_open(hand: &HandLandmarks, finger: Finger, open_margin: f32) -> bool {
    let (tip, pip) = finger.tip_and_pip();
    hand.point(tip).y < hand.point(pip).y - open_margin
}

pub fn classify(hand: &HandLandmarks, open_margin: f32) -> GestureLabel {
    let [index, middle, ring, pinky] = Finger::ALL.map(|f| finger_open(hand, f, open_margin));

    match (index, middle, ring, pinky) {
        (false, false, false, false) => GestureLabel::Left,
        (true, true, true, true) => GestureLabel::Fire,
        (true, false, false, false) => GestureLabel::Up,
        (false, false, false, true) => GestureLabel::Down,
        (true, true, false, false) => GestureLabel::Right,
        _ => GestureLabel::None,
    }
}
