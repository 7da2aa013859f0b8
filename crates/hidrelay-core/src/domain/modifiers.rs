//! Modifier state tracking.
//!
//! [`ModifierState`] holds the three logical modifier flags the wire protocol
//! can express.  Left and right variants of a modifier collapse onto the same
//! flag.  The tracker is fed every key event regardless of the current mode,
//! so when forwarding is switched on in the middle of a chord the flags are
//! already correct.

use crate::domain::event::KeyEdge;
use crate::keymap::KeyCode;

/// Logical modifier flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierState {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl ModifierState {
    /// Updates the flags from one key event.
    ///
    /// Down and Repeat set the matching flag, Up clears it.  Meta keys are
    /// modifiers but have no flag; non-modifier keys are ignored.
    pub fn update(&mut self, code: KeyCode, edge: KeyEdge) {
        let pressed = edge.is_pressed();
        match code {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.shift = pressed,
            KeyCode::ControlLeft | KeyCode::ControlRight => self.ctrl = pressed,
            KeyCode::AltLeft | KeyCode::AltRight => self.alt = pressed,
            _ => {}
        }
    }
}
