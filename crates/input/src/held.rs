//! Held-key tracking for terminals with or without key-release events
//!
//! The engine wants to know which actions are held on every tick. Terminals
//! that implement the keyboard enhancement protocol report releases; the rest
//! only send presses (and OS auto-repeat as more presses). For those a key
//! counts as released once no press or repeat has arrived for
//! [`KEY_RELEASE_TIMEOUT_MS`]. The timeout switches off as soon as one real
//! release is seen.
//!
//! One-shot actions (hard drop, hold, pause, restart) are tracked the same
//! way, so a key held down with OS repeats stays one press edge. A fresh press
//! is also latched for the next frame, which keeps a press and release landing
//! between two frames visible.

use blockfall_engine::{Action, InputFrame};
use crossterm::event::{KeyEvent, KeyEventKind};

use crate::map::map_key;

/// Idle time after which a key is treated as released
pub const KEY_RELEASE_TIMEOUT_MS: u64 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyState {
    /// Press order, for resolving opposite pairs
    pressed_seq: u64,
    last_seen_ms: u64,
}

/// Which actions are held right now
#[derive(Debug, Clone)]
pub struct HeldKeys {
    keys: [Option<KeyState>; Action::ALL.len()],
    pulses: InputFrame,
    seq: u64,
    release_timeout_ms: u64,
    reports_release: bool,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::with_timeout(KEY_RELEASE_TIMEOUT_MS)
    }

    pub fn with_timeout(release_timeout_ms: u64) -> Self {
        Self {
            keys: [None; Action::ALL.len()],
            pulses: InputFrame::IDLE,
            seq: 0,
            release_timeout_ms,
            reports_release: false,
        }
    }

    /// Whether the terminal has been seen reporting key releases
    pub fn reports_release(&self) -> bool {
        self.reports_release
    }

    /// Feed one key event; returns the action it maps to
    pub fn handle(&mut self, key: KeyEvent, now_ms: u64) -> Option<Action> {
        let action = map_key(key)?;
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.press(action, now_ms),
            KeyEventKind::Release => {
                self.reports_release = true;
                self.release(action);
            }
        }
        Some(action)
    }

    pub fn press(&mut self, action: Action, now_ms: u64) {
        let stale = self.is_expired(self.keys[action as usize], now_ms);
        let slot = &mut self.keys[action as usize];
        match slot {
            Some(state) if !stale => state.last_seen_ms = now_ms,
            _ => {
                self.seq += 1;
                *slot = Some(KeyState {
                    pressed_seq: self.seq,
                    last_seen_ms: now_ms,
                });
                self.pulses.set(action, true);
            }
        }
    }

    /// Without release events, a key goes quiet after the timeout
    fn is_expired(&self, state: Option<KeyState>, now_ms: u64) -> bool {
        match state {
            Some(state) if !self.reports_release => {
                now_ms.saturating_sub(state.last_seen_ms) > self.release_timeout_ms
            }
            _ => false,
        }
    }

    pub fn release(&mut self, action: Action) {
        self.keys[action as usize] = None;
    }

    /// Forget everything (focus loss, pause screens)
    pub fn clear(&mut self) {
        self.keys = [None; Action::ALL.len()];
        self.pulses = InputFrame::IDLE;
    }

    /// The held set for this tick; consumes latched presses
    pub fn frame(&mut self, now_ms: u64) -> InputFrame {
        for action in Action::ALL {
            if self.is_expired(self.keys[action as usize], now_ms) {
                self.keys[action as usize] = None;
            }
        }

        let mut frame = std::mem::replace(&mut self.pulses, InputFrame::IDLE);
        for action in Action::ALL {
            if self.keys[action as usize].is_some() {
                frame.set(action, true);
            }
        }

        self.resolve(&mut frame, Action::MoveLeft, Action::MoveRight);
        self.resolve(&mut frame, Action::RotateLeft, Action::RotateRight);
        frame
    }

    /// Keep only the most recently pressed of an opposite pair
    fn resolve(&self, frame: &mut InputFrame, a: Action, b: Action) {
        if let (Some(first), Some(second)) = (self.keys[a as usize], self.keys[b as usize]) {
            if first.pressed_seq > second.pressed_seq {
                frame.set(b, false);
            } else {
                frame.set(a, false);
            }
        }
    }
}

impl Default for HeldKeys {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_press_holds_until_timeout() {
        let mut keys = HeldKeys::new();
        keys.handle(key(KeyCode::Left, KeyEventKind::Press), 0);
        assert!(keys.frame(100).move_left);
        assert!(keys.frame(150).move_left);
        assert!(!keys.frame(151).move_left);
    }

    #[test]
    fn test_repeats_keep_key_held() {
        let mut keys = HeldKeys::new();
        keys.handle(key(KeyCode::Down, KeyEventKind::Press), 0);
        keys.handle(key(KeyCode::Down, KeyEventKind::Press), 140);
        keys.handle(key(KeyCode::Down, KeyEventKind::Repeat), 280);
        assert!(keys.frame(400).soft_drop);
    }

    #[test]
    fn test_release_event_disables_timeout() {
        let mut keys = HeldKeys::new();
        keys.handle(key(KeyCode::Char('x'), KeyEventKind::Press), 0);
        keys.handle(key(KeyCode::Char('x'), KeyEventKind::Release), 10);
        assert!(keys.reports_release());

        keys.handle(key(KeyCode::Right, KeyEventKind::Press), 20);
        assert!(keys.frame(5000).move_right);
        keys.handle(key(KeyCode::Right, KeyEventKind::Release), 5001);
        assert!(!keys.frame(5002).move_right);
    }

    #[test]
    fn test_one_shot_held_while_repeats_arrive() {
        let mut keys = HeldKeys::new();
        for now in (0..=300).step_by(32) {
            keys.handle(key(KeyCode::Char(' '), KeyEventKind::Press), now);
            assert!(keys.frame(now).hard_drop);
            assert!(keys.frame(now + 16).hard_drop);
        }
        assert!(!keys.frame(288 + 151).hard_drop);
    }

    #[test]
    fn test_press_and_release_between_frames_shows_once() {
        let mut keys = HeldKeys::new();
        keys.handle(key(KeyCode::Char('c'), KeyEventKind::Press), 0);
        keys.handle(key(KeyCode::Char('c'), KeyEventKind::Release), 5);
        assert!(keys.frame(16).hold);
        assert!(!keys.frame(32).hold);
    }

    #[test]
    fn test_press_after_timeout_starts_a_new_hold() {
        let mut keys = HeldKeys::new();
        keys.handle(key(KeyCode::Char('p'), KeyEventKind::Press), 0);
        assert!(keys.frame(0).pause);
        keys.handle(key(KeyCode::Char('p'), KeyEventKind::Press), 400);
        assert!(keys.frame(400).pause);
        assert!(keys.frame(416).pause);
    }

    #[test]
    fn test_latest_press_wins_opposite_pair() {
        let mut keys = HeldKeys::new();
        keys.handle(key(KeyCode::Left, KeyEventKind::Press), 0);
        keys.handle(key(KeyCode::Right, KeyEventKind::Press), 10);
        let frame = keys.frame(20);
        assert!(frame.move_right);
        assert!(!frame.move_left);

        keys.handle(key(KeyCode::Char('x'), KeyEventKind::Press), 30);
        keys.handle(key(KeyCode::Char('z'), KeyEventKind::Press), 40);
        let frame = keys.frame(50);
        assert!(frame.rotate_left);
        assert!(!frame.rotate_right);
    }
}
