//! Hand landmark snapshots as delivered by an external hand-pose detector.
//!
//! One snapshot is 21 normalized `(x, y)` points in the standard hand-pose
//! order (wrist, then four joints per finger from thumb to pinky).
//! `y` grows downward, so a raised fingertip has a *smaller* `y`.

use serde::Deserialize;

/// Number of points in one snapshot.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices. Classification reads only tips and middle joints;
/// the rest name their slot in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Landmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl Landmark {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The four fingers used for classification (thumb ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// (tip, middle joint) pair compared to decide open/closed.
    pub fn tip_and_pip(self) -> (Landmark, Landmark) {
        match self {
            Finger::Index => (Landmark::IndexTip, Landmark::IndexPip),
            Finger::Middle => (Landmark::MiddleTip, Landmark::MiddlePip),
            Finger::Ring => (Landmark::RingTip, Landmark::RingPip),
            Finger::Pinky => (Landmark::PinkyTip, Landmark::PinkyPip),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl From<[f32; 2]> for Point2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Point2 { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Point2; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Point2; LANDMARK_COUNT]) -> Self {
        HandLandmarks { points }
    }

    /// `None` unless exactly 21 points are given.
    pub fn from_slice(points: &[Point2]) -> Option<Self> {
        let points: [Point2; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(HandLandmarks::new(points))
    }

    pub fn point(&self, lm: Landmark) -> Point2 {
        self.points[lm.index()]
    }

    #[allow(dead_code)]
    pub fn points(&self) -> &[Point2; LANDMARK_COUNT] {
        &self.points
    }

    /// Synthesize a plausible upright hand with the given fingers raised.
    /// Order: index, middle, ring, pinky.
    /// Used by the keyboard hand simulator.
    pub fn with_open_fingers(open: [bool; 4]) -> Self {
        let mut points = [Point2::default(); LANDMARK_COUNT];
        points[Landmark::Wrist.index()] = Point2 { x: 0.5, y: 0.9 };
        for (i, lm) in [Landmark::ThumbCmc, Landmark::ThumbMcp, Landmark::ThumbIp, Landmark::ThumbTip]
            .into_iter()
            .enumerate()
        {
            points[lm.index()] = Point2 { x: 0.38 - 0.04 * i as f32, y: 0.8 - 0.05 * i as f32 };
        }

        for (finger, raised) in Finger::ALL.into_iter().zip(open) {
            let base = finger as usize * 4 + Landmark::IndexMcp.index();
            let x = 0.42 + 0.06 * finger as usize as f32;
            // mcp, pip, dip, tip
            let ys = if raised {
                [0.6, 0.5, 0.42, 0.35]
            } else {
                [0.6, 0.52, 0.58, 0.62]
            };
            for (j, y) in ys.into_iter().enumerate() {
                points[base + j] = Point2 { x, y };
            }
        }
        HandLandmarks::new(points)
    }
}
