/// Input state tracker and keyboard hand simulator.
///
/// Tracks which keys are currently held down, enabling:
///   - a synthesized hand pose for as long as a gesture key is held
///   - edge-triggered commands (restart, start) that fire once per press
///
/// Key → pose (fingers index, middle, ring, pinky):
///   ↑ / W      index only      → UP
///   ↓ / S      pinky only      → DOWN
///   ← / A      fist            → LEFT
///   → / D      index + middle  → RIGHT
///   Space      open palm       → FIRE
///   nothing held               → no hand in view
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::gesture::landmarks::HandLandmarks;
use crate::gesture::Detection;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
/// Must outlast the terminal's autorepeat start delay.
const HOLD_TIMEOUT: Duration = Duration::from_millis(600);

const UP_KEYS: [KeyCode; 3] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN_KEYS: [KeyCode; 3] = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const FIRE_KEYS: [KeyCode; 1] = [KeyCode::Char(' ')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before feeding the game.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        let now = Instant::now();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply_key(key, now);
            }
        }

        self.expire(now);
    }

    fn apply_key(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // release unreliable without enhancement; timeout handles it
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.saturating_duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Hand simulator ──

    /// The detector frame the held keys stand for.
    /// With several gesture keys down, FIRE wins, then the arrows in
    /// up, down, left, right order.
    pub fn hand_detection(&self) -> Detection {
        self.hand_detection_at(Instant::now())
    }

    fn hand_detection_at(&self, now: Instant) -> Detection {
        let held = |codes: &[KeyCode]| codes.iter().any(|c| self.is_held_at(*c, now));
        let pose = if held(&FIRE_KEYS) {
            [true, true, true, true]
        } else if held(&UP_KEYS) {
            [true, false, false, false]
        } else if held(&DOWN_KEYS) {
            [false, false, false, true]
        } else if held(&LEFT_KEYS) {
            [false, false, false, false]
        } else if held(&RIGHT_KEYS) {
            [true, true, false, false]
        } else {
            return Detection::NoHand;
        };
        Detection::Hand(HandLandmarks::with_open_fingers(pose))
    }

    // ── Internal ──

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active.get(&code)
            .is_some_and(|t| now.saturating_duration_since(*t) < HOLD_TIMEOUT)
    }
}

impl Default for InputState {
    fn default() -> Self {
        InputState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::classifier::{classify, GestureLabel, DEFAULT_OPEN_MARGIN};
    use rstest::rstest;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn label_of(d: &Detection) -> Option<GestureLabel> {
        match d {
            Detection::Hand(h) => Some(classify(h, DEFAULT_OPEN_MARGIN)),
            _ => None,
        }
    }

    #[rstest]
    #[case(KeyCode::Up, GestureLabel::Up)]
    #[case(KeyCode::Char('s'), GestureLabel::Down)]
    #[case(KeyCode::Left, GestureLabel::Left)]
    #[case(KeyCode::Char('d'), GestureLabel::Right)]
    #[case(KeyCode::Char(' '), GestureLabel::Fire)]
    fn held_key_classifies_as_gesture(#[case] code: KeyCode, #[case] expected: GestureLabel) {
        let now = Instant::now();
        let mut input = InputState::new();
        input.apply_key(press(code), now);
        assert_eq!(label_of(&input.hand_detection_at(now)), Some(expected));
    }

    #[test]
    fn nothing_held_is_no_hand() {
        let input = InputState::new();
        assert_eq!(input.hand_detection_at(Instant::now()), Detection::NoHand);
    }

    #[test]
    fn key_expires_without_repeat() {
        let now = Instant::now();
        let mut input = InputState::new();
        input.apply_key(press(KeyCode::Up), now);
        let later = now + HOLD_TIMEOUT;
        input.expire(later);
        assert_eq!(input.hand_detection_at(later), Detection::NoHand);
    }

    #[test]
    fn release_honored_when_enhanced() {
        let now = Instant::now();
        let mut input = InputState::new();
        input.honor_release = true;
        input.apply_key(press(KeyCode::Up), now);
        let mut release = press(KeyCode::Up);
        release.kind = KeyEventKind::Release;
        input.apply_key(release, now);
        assert_eq!(input.hand_detection_at(now), Detection::NoHand);
    }

    #[test]
    fn repeat_is_not_a_fresh_press() {
        let now = Instant::now();
        let mut input = InputState::new();
        input.apply_key(press(KeyCode::Char('r')), now);
        assert!(input.was_pressed(KeyCode::Char('r')));
        input.fresh_presses.clear();
        input.apply_key(press(KeyCode::Char('r')), now + Duration::from_millis(30));
        assert!(!input.was_pressed(KeyCode::Char('r')));
    }

    #[test]
    fn fire_wins_over_arrows() {
        let now = Instant::now();
        let mut input = InputState::new();
        input.apply_key(press(KeyCode::Up), now);
        input.apply_key(press(KeyCode::Char(' ')), now);
        assert_eq!(label_of(&input.hand_detection_at(now)), Some(GestureLabel::Fire));
    }
}
