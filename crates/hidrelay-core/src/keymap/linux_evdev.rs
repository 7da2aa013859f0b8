//! Linux evdev key code to [`KeyCode`] translation table.
//!
//! Numeric values come from `linux/input-event-codes.h`.  The capture layer
//! reads raw `EV_KEY` codes from `/dev/input/event*` and passes them through
//! [`evdev_to_key`]; it never needs to know key names.
//!
//! Codes at or above [`BTN_MISC`] are buttons, not keys, and are handled by
//! the mouse decoder instead.

use super::keys::KeyCode;

/// First code of the button range (`BTN_MISC`).  Everything below is a key.
pub const BTN_MISC: u16 = 0x100;

/// Translates an evdev key code to a [`KeyCode`].
///
/// Returns [`KeyCode::Unknown`] for codes without a variant.
pub fn evdev_to_key(code: u16) -> KeyCode {
    use KeyCode::*;
    match code {
        1 => Escape,
        2 => Digit1,
        3 => Digit2,
        4 => Digit3,
        5 => Digit4,
        6 => Digit5,
        7 => Digit6,
        8 => Digit7,
        9 => Digit8,
        10 => Digit9,
        11 => Digit0,
        12 => Minus,
        13 => Equal,
        14 => Backspace,
        15 => Tab,
        16 => KeyQ,
        17 => KeyW,
        18 => KeyE,
        19 => KeyR,
        20 => KeyT,
        21 => KeyY,
        22 => KeyU,
        23 => KeyI,
        24 => KeyO,
        25 => KeyP,
        26 => BracketLeft,
        27 => BracketRight,
        28 => Enter,
        29 => ControlLeft,
        30 => KeyA,
        31 => KeyS,
        32 => KeyD,
        33 => KeyF,
        34 => KeyG,
        35 => KeyH,
        36 => KeyJ,
        37 => KeyK,
        38 => KeyL,
        39 => Semicolon,
        40 => Quote,
        41 => Backquote,
        42 => ShiftLeft,
        43 => Backslash,
        44 => KeyZ,
        45 => KeyX,
        46 => KeyC,
        47 => KeyV,
        48 => KeyB,
        49 => KeyN,
        50 => KeyM,
        51 => Comma,
        52 => Period,
        53 => Slash,
        54 => ShiftRight,
        56 => AltLeft,
        57 => Space,
        58 => CapsLock,
        59 => F1,
        60 => F2,
        61 => F3,
        62 => F4,
        63 => F5,
        64 => F6,
        65 => F7,
        66 => F8,
        67 => F9,
        68 => F10,
        69 => NumLock,
        70 => ScrollLock,
        87 => F11,
        88 => F12,
        97 => ControlRight,
        99 => PrintScreen, // KEY_SYSRQ
        100 => AltRight,
        102 => Home,
        103 => ArrowUp,
        104 => PageUp,
        105 => ArrowLeft,
        106 => ArrowRight,
        107 => End,
        108 => ArrowDown,
        109 => PageDown,
        110 => Insert,
        111 => Delete,
        113 => AudioMute,
        114 => AudioVolumeDown,
        115 => AudioVolumeUp,
        119 => Pause,
        125 => MetaLeft,
        126 => MetaRight,
        127 => ContextMenu, // KEY_COMPOSE
        163 => MediaTrackNext,
        164 => MediaPlayPause,
        165 => MediaTrackPrevious,
        _ => Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_codes_follow_qwerty_rows() {
        assert_eq!(evdev_to_key(16), KeyCode::KeyQ);
        assert_eq!(evdev_to_key(30), KeyCode::KeyA);
        assert_eq!(evdev_to_key(44), KeyCode::KeyZ);
    }

    #[test]
    fn test_digit_row_starts_at_one() {
        assert_eq!(evdev_to_key(2), KeyCode::Digit1);
        assert_eq!(evdev_to_key(10), KeyCode::Digit9);
        assert_eq!(evdev_to_key(11), KeyCode::Digit0);
    }

    #[test]
    fn test_grave_is_backquote() {
        assert_eq!(evdev_to_key(41), KeyCode::Backquote);
    }

    #[test]
    fn test_modifiers_map_to_sided_variants() {
        assert_eq!(evdev_to_key(29), KeyCode::ControlLeft);
        assert_eq!(evdev_to_key(97), KeyCode::ControlRight);
        assert_eq!(evdev_to_key(42), KeyCode::ShiftLeft);
        assert_eq!(evdev_to_key(54), KeyCode::ShiftRight);
        assert_eq!(evdev_to_key(56), KeyCode::AltLeft);
        assert_eq!(evdev_to_key(100), KeyCode::AltRight);
        assert_eq!(evdev_to_key(125), KeyCode::MetaLeft);
        assert_eq!(evdev_to_key(126), KeyCode::MetaRight);
    }

    #[test]
    fn test_unmapped_codes_are_unknown() {
        assert_eq!(evdev_to_key(0), KeyCode::Unknown);
        assert_eq!(evdev_to_key(55), KeyCode::Unknown); // KEY_KPASTERISK
        assert_eq!(evdev_to_key(240), KeyCode::Unknown); // KEY_UNKNOWN
    }

    #[test]
    fn test_every_named_key_has_an_evdev_code() {
        let reachable: std::collections::HashSet<KeyCode> = (0..BTN_MISC).map(evdev_to_key).collect();
        for key in KeyCode::all() {
            assert!(reachable.contains(&key), "{key:?} has no evdev code");
        }
    }
}
