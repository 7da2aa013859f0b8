//! Canonical input event model.
//!
//! Every capture backend (evdev on Linux, low-level hooks on Windows, the
//! in-process mock) produces [`InputEvent`] values tagged with the
//! [`DeviceRole`] they came from.  Events live only as long as one trip
//! through the forwarding pipeline; nothing here is persisted.

use std::fmt;

use crate::keymap::KeyCode;

/// Which physical device an event was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    Keyboard,
    Mouse,
}

impl DeviceRole {
    /// Both roles, keyboard first.
    pub const ALL: [DeviceRole; 2] = [DeviceRole::Keyboard, DeviceRole::Mouse];
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRole::Keyboard => f.write_str("keyboard"),
            DeviceRole::Mouse => f.write_str("mouse"),
        }
    }
}

/// Key transition reported by the OS.
///
/// `Repeat` is the auto-repeat signal a held key produces; it is distinct
/// from `Down` so the toggle key can be debounced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEdge {
    Down,
    Repeat,
    Up,
}

impl KeyEdge {
    /// Maps the evdev `EV_KEY` value (0 = up, 1 = down, 2 = repeat).
    ///
    /// Returns `None` for any other value.
    pub fn from_evdev_value(value: i32) -> Option<KeyEdge> {
        match value {
            0 => Some(KeyEdge::Up),
            1 => Some(KeyEdge::Down),
            2 => Some(KeyEdge::Repeat),
            _ => None,
        }
    }

    /// `true` for `Down` and `Repeat`, i.e. the key is held after this event.
    pub fn is_pressed(self) -> bool {
        !matches!(self, KeyEdge::Up)
    }
}

/// Mouse buttons the capture layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Back thumb button (`BTN_SIDE` / `XBUTTON1`).
    Side,
    /// Forward thumb button (`BTN_EXTRA` / `XBUTTON2`).
    Extra,
}

/// Mouse buttons have no auto-repeat, so they only go down and up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEdge {
    Down,
    Up,
}

/// One normalized input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key { code: KeyCode, edge: KeyEdge },
    /// Relative pointer motion since the previous sample.
    MouseMove { dx: i32, dy: i32 },
    MouseButton { button: MouseButton, edge: ButtonEdge },
    /// Wheel movement in detents; positive is away from the user.
    MouseWheel { delta: i32 },
}

impl InputEvent {
    /// Shorthand for a key event.
    pub fn key(code: KeyCode, edge: KeyEdge) -> Self {
        InputEvent::Key { code, edge }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_edge_from_evdev_value() {
        assert_eq!(KeyEdge::from_evdev_value(0), Some(KeyEdge::Up));
        assert_eq!(KeyEdge::from_evdev_value(1), Some(KeyEdge::Down));
        assert_eq!(KeyEdge::from_evdev_value(2), Some(KeyEdge::Repeat));
        assert_eq!(KeyEdge::from_evdev_value(3), None);
        assert_eq!(KeyEdge::from_evdev_value(-1), None);
    }

    #[test]
    fn test_key_edge_is_pressed() {
        assert!(KeyEdge::Down.is_pressed());
        assert!(KeyEdge::Repeat.is_pressed());
        assert!(!KeyEdge::Up.is_pressed());
    }

    #[test]
    fn test_key_shorthand_builds_key_event() {
        let key = InputEvent::key(KeyCode::KeyA, KeyEdge::Down);
        assert_eq!(key, InputEvent::Key { code: KeyCode::KeyA, edge: KeyEdge::Down });
    }

    #[test]
    fn test_device_role_display() {
        assert_eq!(DeviceRole::Keyboard.to_string(), "keyboard");
        assert_eq!(DeviceRole::Mouse.to_string(), "mouse");
    }
}
