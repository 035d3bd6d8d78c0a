//! Recorded detector output, played back against the wall clock.
//!
//! JSON lines, one detector frame each:
//! ```text
//! {"t_ms": 0,    "hand": [[0.50, 0.90], [0.38, 0.80], ... 21 points]}
//! {"t_ms": 33,   "hand": null}
//! ```
//! `t_ms` is the offset from the start of playback and must not decrease.
//! Blank lines and lines starting with `#` are skipped.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

use super::landmarks::{HandLandmarks, Point2};
use super::Detection;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("could not read replay file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Json { line: usize, source: serde_json::Error },
    #[error("line {line}: hand has {count} points, expected 21")]
    BadHand { line: usize, count: usize },
    #[error("line {line}: t_ms goes backwards")]
    OutOfOrder { line: usize },
}

#[derive(Deserialize)]
struct ReplayLine {
    t_ms: u64,
    hand: Option<Vec<Point2>>,
}

#[derive(Debug, Clone)]
pub struct ReplayFeed {
    frames: Vec<(Duration, Option<HandLandmarks>)>,
    next: usize,
    started: Option<Instant>,
}

impl ReplayFeed {
    pub fn open(path: &Path) -> Result<Self, ReplayError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        let mut frames: Vec<(Duration, Option<HandLandmarks>)> = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let rec: ReplayLine = serde_json::from_str(trimmed)
                .map_err(|source| ReplayError::Json { line, source })?;
            let at = Duration::from_millis(rec.t_ms);
            if frames.last().is_some_and(|(prev, _)| *prev > at) {
                return Err(ReplayError::OutOfOrder { line });
            }
            let hand = match rec.hand {
                Some(points) => Some(
                    HandLandmarks::from_slice(&points)
                        .ok_or(ReplayError::BadHand { line, count: points.len() })?,
                ),
                None => None,
            };
            frames.push((at, hand));
        }
        Ok(ReplayFeed { frames, next: 0, started: None })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.frames.len()
    }

    /// Newest frame that has come due since the last poll, if any.
    /// Frames skipped over in between are dropped, like a detector
    /// that only reports its latest result. Playback starts at the first poll.
    pub fn poll(&mut self, now: Instant) -> Option<Detection> {
        let started = *self.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started);

        let mut latest = None;
        while let Some((at, hand)) = self.frames.get(self.next) {
            if *at > elapsed {
                break;
            }
            latest = Some(match hand {
                Some(h) => Detection::Hand(h.clone()),
                None => Detection::NoHand,
            });
            self.next += 1;
        }
        latest
    }
}
