//! Hand input: detector frames → labels → confirmed actions.

pub mod classifier;
pub mod hold;
pub mod landmarks;
pub mod replay;

use landmarks::HandLandmarks;

/// One result from the external hand detector.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Hand(HandLandmarks),
    NoHand,
    /// The detector itself failed (no camera, unreadable recording).
    Unavailable(String),
}
