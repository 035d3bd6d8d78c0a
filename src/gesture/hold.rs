//! Hold-to-confirm: turns a per-frame label stream into confirmed actions.
//!
//! States: `Idle` (no hand) and `Holding(label, since)`.
//!   - no hand            → `Idle`, any hold in progress is dropped
//!   - label changed      → restart the hold at `now`, nothing fires
//!   - same label, held ≥ threshold → confirm once, re-arm at `now`
//!
//! Re-arming means a sustained gesture repeats every `threshold` without
//! having to release it. `GestureLabel::None` is tracked but never confirms.

use std::time::{Duration, Instant};

use tracing::debug;

use super::classifier::GestureLabel;

pub const DEFAULT_HOLD: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    Holding { label: GestureLabel, since: Instant },
}

#[derive(Debug, Clone)]
pub struct HoldTracker {
    state: HoldState,
    threshold: Duration,
}

impl HoldTracker {
    pub fn new(threshold: Duration) -> Self {
        HoldTracker { state: HoldState::Idle, threshold }
    }

    #[cfg(test)]
    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.state = HoldState::Idle;
    }

    /// Feed one classified frame (`None` = no hand in view).
    /// Returns the label when a hold completes.
    pub fn update(&mut self, label: Option<GestureLabel>, now: Instant) -> Option<GestureLabel> {
        let Some(label) = label else {
            self.state = HoldState::Idle;
            return None;
        };

        match self.state {
            HoldState::Holding { label: held, since } if held == label => {
                if label == GestureLabel::None {
                    return None;
                }
                if now.saturating_duration_since(since) >= self.threshold {
                    self.state = HoldState::Holding { label, since: now };
                    debug!(gesture = label.as_str(), "gesture confirmed");
                    return Some(label);
                }
                None
            }
            _ => {
                self.state = HoldState::Holding { label, since: now };
                None
            }
        }
    }

    /// How far the current hold is toward confirmation, `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        match self.state {
            HoldState::Holding { label, since } if label != GestureLabel::None => {
                if self.threshold.is_zero() {
                    return 1.0;
                }
                let held = now.saturating_duration_since(since).as_secs_f32();
                (held / self.threshold.as_secs_f32()).min(1.0)
            }
            _ => 0.0,
        }
    }
}

impl Default for HoldTracker {
    fn default() -> Self {
        HoldTracker::new(DEFAULT_HOLD)
    }
}
