//! Per-tick input snapshot and auto-repeat
//!
//! The host reports which actions are held right now. The game derives press
//! edges by comparing against the previous frame, so the host never has to
//! deliver discrete "pressed" events.

/// A player action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateLeft,
    RotateRight,
    SoftDrop,
    HardDrop,
    Hold,
    Pause,
    Restart,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::RotateLeft,
        Action::RotateRight,
        Action::SoftDrop,
        Action::HardDrop,
        Action::Hold,
        Action::Pause,
        Action::Restart,
    ];
}

/// Actions held during one tick.
///
/// Opposite pairs (left/right, rotate left/right) are expected to be resolved
/// by the input layer; if both arrive, both are applied in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputFrame {
    pub move_left: bool,
    pub move_right: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub soft_drop: bool,
    pub hard_drop: bool,
    pub hold: bool,
    pub pause: bool,
    pub restart: bool,
}

impl InputFrame {
    /// Nothing held
    pub const IDLE: InputFrame = InputFrame {
        move_left: false,
        move_right: false,
        rotate_left: false,
        rotate_right: false,
        soft_drop: false,
        hard_drop: false,
        hold: false,
        pause: false,
        restart: false,
    };

    /// A frame holding exactly one action
    pub fn only(action: Action) -> Self {
        let mut frame = Self::IDLE;
        frame.set(action, true);
        frame
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, action: Action) -> Self {
        self.set(action, true);
        self
    }

    pub fn set(&mut self, action: Action, held: bool) {
        *self.slot(action) = held;
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left,
            Action::MoveRight => self.move_right,
            Action::RotateLeft => self.rotate_left,
            Action::RotateRight => self.rotate_right,
            Action::SoftDrop => self.soft_drop,
            Action::HardDrop => self.hard_drop,
            Action::Hold => self.hold,
            Action::Pause => self.pause,
            Action::Restart => self.restart,
        }
    }

    /// Actions held now that were not held in `previous`
    pub fn pressed_since(&self, previous: &InputFrame) -> InputFrame {
        let mut pressed = Self::IDLE;
        for action in Action::ALL {
            pressed.set(action, self.is_held(action) && !previous.is_held(action));
        }
        pressed
    }

    fn slot(&mut self, action: Action) -> &mut bool {
        match action {
            Action::MoveLeft => &mut self.move_left,
            Action::MoveRight => &mut self.move_right,
            Action::RotateLeft => &mut self.rotate_left,
            Action::RotateRight => &mut self.rotate_right,
            Action::SoftDrop => &mut self.soft_drop,
            Action::HardDrop => &mut self.hard_drop,
            Action::Hold => &mut self.hold,
            Action::Pause => &mut self.pause,
            Action::Restart => &mut self.restart,
        }
    }
}

/// Delayed auto-repeat for one held action.
///
/// Fires on the press, again once `delay_ms` has passed, then every
/// `interval_ms` while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRepeat {
    delay_ms: u64,
    interval_ms: u64,
    held_since: Option<u64>,
    last_fire: u64,
}

impl AutoRepeat {
    pub fn new(delay_ms: u64, interval_ms: u64) -> Self {
        Self {
            delay_ms,
            interval_ms,
            held_since: None,
            last_fire: 0,
        }
    }

    /// Feed the held state for this tick; returns whether the action fires
    pub fn fire(&mut self, held: bool, now_ms: u64) -> bool {
        if !held {
            self.held_since = None;
            return false;
        }

        match self.held_since {
            None => {
                self.held_since = Some(now_ms);
                self.last_fire = now_ms;
                true
            }
            Some(since) => {
                let repeating = now_ms.saturating_sub(since) >= self.delay_ms;
                if repeating && now_ms.saturating_sub(self.last_fire) >= self.interval_ms {
                    self.last_fire = now_ms;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Move the time references forward (resume after pause)
    pub fn shift(&mut self, delta_ms: u64) {
        if let Some(since) = self.held_since.as_mut() {
            *since += delta_ms;
            self.last_fire += delta_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_since_reports_edges_only() {
        let previous = InputFrame::only(Action::MoveLeft);
        let current = InputFrame::only(Action::MoveLeft).with(Action::HardDrop);
        let pressed = current.pressed_since(&previous);
        assert!(pressed.hard_drop);
        assert!(!pressed.move_left);
        assert_eq!(InputFrame::IDLE.pressed_since(&current), InputFrame::IDLE);
    }

    #[test]
    fn test_auto_repeat_delay_then_interval() {
        let mut repeat = AutoRepeat::new(150, 50);
        assert!(repeat.fire(true, 1000));
        assert!(!repeat.fire(true, 1100));
        assert!(repeat.fire(true, 1150));
        assert!(!repeat.fire(true, 1190));
        assert!(repeat.fire(true, 1200));

        assert!(!repeat.fire(false, 1210));
        assert!(repeat.fire(true, 1220), "a new press fires at once");
    }

    #[test]
    fn test_auto_repeat_shift_preserves_phase() {
        let mut repeat = AutoRepeat::new(150, 50);
        assert!(repeat.fire(true, 0));
        repeat.shift(1000);
        assert!(!repeat.fire(true, 1100));
        assert!(repeat.fire(true, 1150));
    }
}
