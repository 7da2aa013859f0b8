//! Mode-toggle key debouncing.
//!
//! # How the toggle works (for beginners)
//!
//! Holding a key down makes the OS emit a stream of auto-repeat events.  If
//! every press event flipped the mode, holding the toggle key for half a
//! second would flip it a dozen times.  The state machine below fires exactly
//! once per physical press-release cycle:
//!
//! ```text
//!   Idle ──Down──▶ Armed ──Up──▶ Idle   (fires on this Up)
//!                   │  ▲
//!                   └──┘ Down / Repeat absorbed
//! ```
//!
//! The toggle key's own events never reach the encoder, whether or not they
//! cause a transition.

use crate::domain::event::KeyEdge;
use crate::keymap::KeyCode;

/// Default toggle key: backtick / grave accent.
pub const DEFAULT_TOGGLE_KEY: KeyCode = KeyCode::Backquote;

/// Internal debounce state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Idle,
    Armed,
}

/// What the pipeline should do with the key event just observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Not the toggle key; continue processing normally.
    PassThrough,
    /// The toggle key, swallowed without a mode flip.
    Consumed,
    /// The toggle key was released after a press; flip the mode.
    Fired,
}

/// Idle/Armed debounce machine for one configured toggle key.
#[derive(Debug, Clone)]
pub struct ToggleStateMachine {
    toggle_key: KeyCode,
    state: ToggleState,
}

impl ToggleStateMachine {
    pub fn new(toggle_key: KeyCode) -> Self {
        Self { toggle_key, state: ToggleState::Idle }
    }

    pub fn toggle_key(&self) -> KeyCode {
        self.toggle_key
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Feeds one key event through the machine.
    pub fn observe(&mut self, code: KeyCode, edge: KeyEdge) -> ToggleOutcome {
        if code != self.toggle_key {
            return ToggleOutcome::PassThrough;
        }

        match (self.state, edge) {
            (ToggleState::Idle, KeyEdge::Down) => {
                self.state = ToggleState::Armed;
                ToggleOutcome::Consumed
            }
            (ToggleState::Armed, KeyEdge::Up) => {
                self.state = ToggleState::Idle;
                ToggleOutcome::Fired
            }
            // Repeats while held, or a stray Repeat/Up while idle (e.g. the
            // key was already down when capture started).
            _ => ToggleOutcome::Consumed,
        }
    }
}

impl Default for ToggleStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_TOGGLE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle() -> ToggleStateMachine {
        ToggleStateMachine::default()
    }

    #[test]
    fn test_press_release_fires_once() {
        // Arrange
        let mut sm = toggle();

        // Act
        let down = sm.observe(KeyCode::Backquote, KeyEdge::Down);
        let up = sm.observe(KeyCode::Backquote, KeyEdge::Up);

        // Assert
        assert_eq!(down, ToggleOutcome::Consumed);
        assert_eq!(up, ToggleOutcome::Fired);
        assert_eq!(sm.state(), ToggleState::Idle);
    }

    #[test]
    fn test_repeats_while_armed_are_absorbed() {
        let mut sm = toggle();
        sm.observe(KeyCode::Backquote, KeyEdge::Down);

        for _ in 0..50 {
            assert_eq!(sm.observe(KeyCode::Backquote, KeyEdge::Repeat), ToggleOutcome::Consumed);
            assert_eq!(sm.observe(KeyCode::Backquote, KeyEdge::Down), ToggleOutcome::Consumed);
        }

        assert_eq!(sm.state(), ToggleState::Armed);
        assert_eq!(sm.observe(KeyCode::Backquote, KeyEdge::Up), ToggleOutcome::Fired);
    }

    #[test]
    fn test_exactly_one_flip_per_cycle() {
        let mut sm = toggle();
        let mut fired = 0;
        let sequence = [
            KeyEdge::Down,
            KeyEdge::Repeat,
            KeyEdge::Down,
            KeyEdge::Up,
            KeyEdge::Down,
            KeyEdge::Up,
            KeyEdge::Down,
            KeyEdge::Repeat,
            KeyEdge::Repeat,
            KeyEdge::Up,
        ];

        for edge in sequence {
            if sm.observe(KeyCode::Backquote, edge) == ToggleOutcome::Fired {
                fired += 1;
            }
        }

        assert_eq!(fired, 3);
    }

    #[test]
    fn test_up_while_idle_is_consumed_without_firing() {
        let mut sm = toggle();
        assert_eq!(sm.observe(KeyCode::Backquote, KeyEdge::Up), ToggleOutcome::Consumed);
        assert_eq!(sm.observe(KeyCode::Backquote, KeyEdge::Repeat), ToggleOutcome::Consumed);
        assert_eq!(sm.state(), ToggleState::Idle);
    }

    #[test]
    fn test_other_keys_pass_through_and_do_not_disturb_state() {
        let mut sm = toggle();
        sm.observe(KeyCode::Backquote, KeyEdge::Down);

        assert_eq!(sm.observe(KeyCode::KeyA, KeyEdge::Down), ToggleOutcome::PassThrough);
        assert_eq!(sm.observe(KeyCode::KeyA, KeyEdge::Up), ToggleOutcome::PassThrough);
        assert_eq!(sm.state(), ToggleState::Armed);
    }

    #[test]
    fn test_custom_toggle_key() {
        let mut sm = ToggleStateMachine::new(KeyCode::F12);
        assert_eq!(sm.observe(KeyCode::Backquote, KeyEdge::Down), ToggleOutcome::PassThrough);
        sm.observe(KeyCode::F12, KeyEdge::Down);
        assert_eq!(sm.observe(KeyCode::F12, KeyEdge::Up), ToggleOutcome::Fired);
    }
}
