//! Canonical key codes used throughout HidRelay.
//!
//! Platform capture layers translate their raw codes (Linux evdev key codes,
//! Windows virtual-key codes) into a [`KeyCode`] at the capture boundary.
//! Everything downstream (modifier tracking, the toggle key, the wire
//! encoder) works only with this enum.
//!
//! # Why a closed enum?
//!
//! The wire protocol only understands a fixed set of keys.  Keeping the set
//! closed lets the encoder classify every variant in a single exhaustive
//! `match`, so a new key cannot be added without deciding how it is sent.
//! Raw codes that have no variant collapse into [`KeyCode::Unknown`].
//!
//! # Names
//!
//! Every key has two names, both accepted when parsing configuration:
//!
//! | Friendly name | evdev name      |
//! |---------------|-----------------|
//! | `KeyA`        | `KEY_A`         |
//! | `Backquote`   | `KEY_GRAVE`     |
//! | `ControlLeft` | `KEY_LEFTCTRL`  |

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A physical key known to HidRelay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    // Letters
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,

    // Digit row
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Punctuation
    Minus,
    Equal,
    BracketLeft,
    BracketRight,
    Semicolon,
    Quote,
    Backquote,
    Backslash,
    Comma,
    Period,
    Slash,

    // Control and editing keys
    Escape,
    Enter,
    Backspace,
    Tab,
    Space,
    CapsLock,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Navigation cluster
    Insert,
    Home,
    PageUp,
    Delete,
    End,
    PageDown,
    ArrowRight,
    ArrowLeft,
    ArrowDown,
    ArrowUp,

    // Modifiers
    ControlLeft,
    ControlRight,
    ShiftLeft,
    ShiftRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,

    // Known keys with no wire representation
    PrintScreen,
    ScrollLock,
    Pause,
    NumLock,
    ContextMenu,
    AudioMute,
    AudioVolumeDown,
    AudioVolumeUp,
    MediaPlayPause,
    MediaTrackNext,
    MediaTrackPrevious,

    /// Sentinel for any raw code without a variant.
    Unknown,
}

/// `(key, friendly name, evdev name)` for every variant except `Unknown`.
const KEY_NAMES: &[(KeyCode, &str, &str)] = {
    use KeyCode::*;
    &[
        (KeyA, "KeyA", "KEY_A"),
        (KeyB, "KeyB", "KEY_B"),
        (KeyC, "KeyC", "KEY_C"),
        (KeyD, "KeyD", "KEY_D"),
        (KeyE, "KeyE", "KEY_E"),
        (KeyF, "KeyF", "KEY_F"),
        (KeyG, "KeyG", "KEY_G"),
        (KeyH, "KeyH", "KEY_H"),
        (KeyI, "KeyI", "KEY_I"),
        (KeyJ, "KeyJ", "KEY_J"),
        (KeyK, "KeyK", "KEY_K"),
        (KeyL, "KeyL", "KEY_L"),
        (KeyM, "KeyM", "KEY_M"),
        (KeyN, "KeyN", "KEY_N"),
        (KeyO, "KeyO", "KEY_O"),
        (KeyP, "KeyP", "KEY_P"),
        (KeyQ, "KeyQ", "KEY_Q"),
        (KeyR, "KeyR", "KEY_R"),
        (KeyS, "KeyS", "KEY_S"),
        (KeyT, "KeyT", "KEY_T"),
        (KeyU, "KeyU", "KEY_U"),
        (KeyV, "KeyV", "KEY_V"),
        (KeyW, "KeyW", "KEY_W"),
        (KeyX, "KeyX", "KEY_X"),
        (KeyY, "KeyY", "KEY_Y"),
        (KeyZ, "KeyZ", "KEY_Z"),
        (Digit0, "Digit0", "KEY_0"),
        (Digit1, "Digit1", "KEY_1"),
        (Digit2, "Digit2", "KEY_2"),
        (Digit3, "Digit3", "KEY_3"),
        (Digit4, "Digit4", "KEY_4"),
        (Digit5, "Digit5", "KEY_5"),
        (Digit6, "Digit6", "KEY_6"),
        (Digit7, "Digit7", "KEY_7"),
        (Digit8, "Digit8", "KEY_8"),
        (Digit9, "Digit9", "KEY_9"),
        (Minus, "Minus", "KEY_MINUS"),
        (Equal, "Equal", "KEY_EQUAL"),
        (BracketLeft, "BracketLeft", "KEY_LEFTBRACE"),
        (BracketRight, "BracketRight", "KEY_RIGHTBRACE"),
        (Semicolon, "Semicolon", "KEY_SEMICOLON"),
        (Quote, "Quote", "KEY_APOSTROPHE"),
        (Backquote, "Backquote", "KEY_GRAVE"),
        (Backslash, "Backslash", "KEY_BACKSLASH"),
        (Comma, "Comma", "KEY_COMMA"),
        (Period, "Period", "KEY_DOT"),
        (Slash, "Slash", "KEY_SLASH"),
        (Escape, "Escape", "KEY_ESC"),
        (Enter, "Enter", "KEY_ENTER"),
        (Backspace, "Backspace", "KEY_BACKSPACE"),
        (Tab, "Tab", "KEY_TAB"),
        (Space, "Space", "KEY_SPACE"),
        (CapsLock, "CapsLock", "KEY_CAPSLOCK"),
        (F1, "F1", "KEY_F1"),
        (F2, "F2", "KEY_F2"),
        (F3, "F3", "KEY_F3"),
        (F4, "F4", "KEY_F4"),
        (F5, "F5", "KEY_F5"),
        (F6, "F6", "KEY_F6"),
        (F7, "F7", "KEY_F7"),
        (F8, "F8", "KEY_F8"),
        (F9, "F9", "KEY_F9"),
        (F10, "F10", "KEY_F10"),
        (F11, "F11", "KEY_F11"),
        (F12, "F12", "KEY_F12"),
        (Insert, "Insert", "KEY_INSERT"),
        (Home, "Home", "KEY_HOME"),
        (PageUp, "PageUp", "KEY_PAGEUP"),
        (Delete, "Delete", "KEY_DELETE"),
        (End, "End", "KEY_END"),
        (PageDown, "PageDown", "KEY_PAGEDOWN"),
        (ArrowRight, "ArrowRight", "KEY_RIGHT"),
        (ArrowLeft, "ArrowLeft", "KEY_LEFT"),
        (ArrowDown, "ArrowDown", "KEY_DOWN"),
        (ArrowUp, "ArrowUp", "KEY_UP"),
        (ControlLeft, "ControlLeft", "KEY_LEFTCTRL"),
        (ControlRight, "ControlRight", "KEY_RIGHTCTRL"),
        (ShiftLeft, "ShiftLeft", "KEY_LEFTSHIFT"),
        (ShiftRight, "ShiftRight", "KEY_RIGHTSHIFT"),
        (AltLeft, "AltLeft", "KEY_LEFTALT"),
        (AltRight, "AltRight", "KEY_RIGHTALT"),
        (MetaLeft, "MetaLeft", "KEY_LEFTMETA"),
        (MetaRight, "MetaRight", "KEY_RIGHTMETA"),
        (PrintScreen, "PrintScreen", "KEY_SYSRQ"),
        (ScrollLock, "ScrollLock", "KEY_SCROLLLOCK"),
        (Pause, "Pause", "KEY_PAUSE"),
        (NumLock, "NumLock", "KEY_NUMLOCK"),
        (ContextMenu, "ContextMenu", "KEY_COMPOSE"),
        (AudioMute, "AudioMute", "KEY_MUTE"),
        (AudioVolumeDown, "AudioVolumeDown", "KEY_VOLUMEDOWN"),
        (AudioVolumeUp, "AudioVolumeUp", "KEY_VOLUMEUP"),
        (MediaPlayPause, "MediaPlayPause", "KEY_PLAYPAUSE"),
        (MediaTrackNext, "MediaTrackNext", "KEY_NEXTSONG"),
        (MediaTrackPrevious, "MediaTrackPrevious", "KEY_PREVIOUSSONG"),
    ]
};

/// Error returned when a key name does not match any [`KeyCode`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown key name: {0:?}")]
pub struct UnknownKeyName(pub String);

impl KeyCode {
    /// Iterates over every named key (all variants except [`KeyCode::Unknown`]).
    pub fn all() -> impl Iterator<Item = KeyCode> {
        KEY_NAMES.iter().map(|(key, _, _)| *key)
    }

    /// The friendly name, e.g. `"Backquote"`.
    pub fn name(self) -> &'static str {
        KEY_NAMES
            .iter()
            .find(|(key, _, _)| *key == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("Unknown")
    }

    /// The Linux input-event-codes name, e.g. `"KEY_GRAVE"`.
    pub fn evdev_name(self) -> &'static str {
        KEY_NAMES
            .iter()
            .find(|(key, _, _)| *key == self)
            .map(|(_, _, evdev)| *evdev)
            .unwrap_or("KEY_UNKNOWN")
    }

    /// Looks a key up by either of its names, ignoring ASCII case.
    ///
    /// `Unknown` is never returned; unrecognised names yield `None`.
    pub fn from_name(name: &str) -> Option<KeyCode> {
        let name = name.trim();
        KEY_NAMES
            .iter()
            .find(|(_, friendly, evdev)| {
                friendly.eq_ignore_ascii_case(name) || evdev.eq_ignore_ascii_case(name)
            })
            .map(|(key, _, _)| *key)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.evdev_name())
    }
}

impl FromStr for KeyCode {
    type Err = UnknownKeyName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyCode::from_name(s).ok_or_else(|| UnknownKeyName(s.to_string()))
    }
}
