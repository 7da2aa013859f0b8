//! Windows Virtual Key (VK) code to [`KeyCode`] translation table.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//!
//! `VK_TO_KEY_TABLE` is a compile-time array of 256 [`KeyCode`] values
//! indexed by VK code, so translation on the hook callback path is a single
//! array index.  VK codes with no variant store [`KeyCode::Unknown`].
//!
//! Low-level keyboard hooks report sided modifier codes (`VK_LSHIFT`,
//! `VK_RCONTROL`, ...).  The generic codes (`VK_SHIFT`, `VK_CONTROL`,
//! `VK_MENU`) are mapped to the left-hand variant for sources that only
//! report those.

use super::keys::KeyCode;

/// Translates a Windows Virtual Key code to a [`KeyCode`].
///
/// This function never panics; all u8 inputs are handled.
pub fn vk_to_key(vk: u8) -> KeyCode {
    VK_TO_KEY_TABLE[vk as usize]
}

/// Complete VK → KeyCode mapping table indexed by VK code (0x00–0xFF).
const VK_TO_KEY_TABLE: [KeyCode; 256] = {
    use KeyCode::*;
    let mut t = [Unknown; 256];

    // ── Alphabet keys (VK_A=0x41 … VK_Z=0x5A) ────────────────────────────────
    t[0x41] = KeyA;
    t[0x42] = KeyB;
    t[0x43] = KeyC;
    t[0x44] = KeyD;
    t[0x45] = KeyE;
    t[0x46] = KeyF;
    t[0x47] = KeyG;
    t[0x48] = KeyH;
    t[0x49] = KeyI;
    t[0x4A] = KeyJ;
    t[0x4B] = KeyK;
    t[0x4C] = KeyL;
    t[0x4D] = KeyM;
    t[0x4E] = KeyN;
    t[0x4F] = KeyO;
    t[0x50] = KeyP;
    t[0x51] = KeyQ;
    t[0x52] = KeyR;
    t[0x53] = KeyS;
    t[0x54] = KeyT;
    t[0x55] = KeyU;
    t[0x56] = KeyV;
    t[0x57] = KeyW;
    t[0x58] = KeyX;
    t[0x59] = KeyY;
    t[0x5A] = KeyZ;

    // ── Digit row (VK_0=0x30 … VK_9=0x39) ───────────────────────────────────
    t[0x30] = Digit0;
    t[0x31] = Digit1;
    t[0x32] = Digit2;
    t[0x33] = Digit3;
    t[0x34] = Digit4;
    t[0x35] = Digit5;
    t[0x36] = Digit6;
    t[0x37] = Digit7;
    t[0x38] = Digit8;
    t[0x39] = Digit9;

    // ── Control keys ─────────────────────────────────────────────────────────
    t[0x0D] = Enter;        // VK_RETURN
    t[0x1B] = Escape;       // VK_ESCAPE
    t[0x08] = Backspace;    // VK_BACK
    t[0x09] = Tab;          // VK_TAB
    t[0x20] = Space;        // VK_SPACE
    t[0x14] = CapsLock;     // VK_CAPITAL
    t[0x91] = ScrollLock;   // VK_SCROLL
    t[0x13] = Pause;        // VK_PAUSE
    t[0x90] = NumLock;      // VK_NUMLOCK
    t[0x2D] = Insert;       // VK_INSERT
    t[0x24] = Home;         // VK_HOME
    t[0x21] = PageUp;       // VK_PRIOR
    t[0x2E] = Delete;       // VK_DELETE
    t[0x23] = End;          // VK_END
    t[0x22] = PageDown;     // VK_NEXT
    t[0x2C] = PrintScreen;  // VK_SNAPSHOT
    t[0x5D] = ContextMenu;  // VK_APPS

    // ── Arrow keys ────────────────────────────────────────────────────────────
    t[0x25] = ArrowLeft;
    t[0x26] = ArrowUp;
    t[0x27] = ArrowRight;
    t[0x28] = ArrowDown;

    // ── Function keys (VK_F1=0x70 … VK_F12=0x7B) ─────────────────────────────
    t[0x70] = F1;
    t[0x71] = F2;
    t[0x72] = F3;
    t[0x73] = F4;
    t[0x74] = F5;
    t[0x75] = F6;
    t[0x76] = F7;
    t[0x77] = F8;
    t[0x78] = F9;
    t[0x79] = F10;
    t[0x7A] = F11;
    t[0x7B] = F12;

    // ── Punctuation / symbols ─────────────────────────────────────────────────
    t[0xBD] = Minus;        // VK_OEM_MINUS  (- _)
    t[0xBB] = Equal;        // VK_OEM_PLUS   (= +)
    t[0xDB] = BracketLeft;  // VK_OEM_4      ([ {)
    t[0xDD] = BracketRight; // VK_OEM_6      (] })
    t[0xDC] = Backslash;    // VK_OEM_5      (\ |)
    t[0xBA] = Semicolon;    // VK_OEM_1      (; :)
    t[0xDE] = Quote;        // VK_OEM_7      (' ")
    t[0xC0] = Backquote;    // VK_OEM_3      (` ~)
    t[0xBC] = Comma;        // VK_OEM_COMMA  (, <)
    t[0xBE] = Period;       // VK_OEM_PERIOD (. >)
    t[0xBF] = Slash;        // VK_OEM_2      (/ ?)

    // ── Modifier keys ─────────────────────────────────────────────────────────
    t[0x10] = ShiftLeft;    // VK_SHIFT
    t[0x11] = ControlLeft;  // VK_CONTROL
    t[0x12] = AltLeft;      // VK_MENU
    t[0xA0] = ShiftLeft;    // VK_LSHIFT
    t[0xA1] = ShiftRight;   // VK_RSHIFT
    t[0xA2] = ControlLeft;  // VK_LCONTROL
    t[0xA3] = ControlRight; // VK_RCONTROL
    t[0xA4] = AltLeft;      // VK_LMENU
    t[0xA5] = AltRight;     // VK_RMENU
    t[0x5B] = MetaLeft;     // VK_LWIN
    t[0x5C] = MetaRight;    // VK_RWIN

    // ── Media keys ────────────────────────────────────────────────────────────
    t[0xAD] = AudioMute;          // VK_VOLUME_MUTE
    t[0xAE] = AudioVolumeDown;    // VK_VOLUME_DOWN
    t[0xAF] = AudioVolumeUp;      // VK_VOLUME_UP
    t[0xB0] = MediaTrackNext;     // VK_MEDIA_NEXT_TRACK
    t[0xB1] = MediaTrackPrevious; // VK_MEDIA_PREV_TRACK
    t[0xB3] = MediaPlayPause;     // VK_MEDIA_PLAY_PAUSE

    t
};

#[cfg(test)]
mod tests {
    use super::*;
    use KeyCode::*;

    const STANDARD_MAPPINGS: &[(u8, KeyCode)] = &[
        (0x41, KeyA), (0x5A, KeyZ), (0x30, Digit0), (0x39, Digit9),
        (0x0D, Enter), (0x1B, Escape), (0x08, Backspace), (0x09, Tab), (0x20, Space),
        (0x70, F1), (0x7B, F12), (0x25, ArrowLeft), (0x28, ArrowDown),
        (0xC0, Backquote), (0xBF, Slash), (0xDE, Quote),
        (0xA0, ShiftLeft), (0xA1, ShiftRight), (0xA2, ControlLeft), (0xA3, ControlRight),
        (0xA4, AltLeft), (0xA5, AltRight), (0x5B, MetaLeft), (0x5C, MetaRight),
    ];

    #[test]
    fn test_standard_keys_map_to_expected_codes() {
        for &(vk, expected) in STANDARD_MAPPINGS {
            assert_eq!(vk_to_key(vk), expected, "VK 0x{vk:02X}");
        }
    }

    #[test]
    fn test_generic_modifiers_map_to_left_variant() {
        assert_eq!(vk_to_key(0x10), ShiftLeft);
        assert_eq!(vk_to_key(0x11), ControlLeft);
        assert_eq!(vk_to_key(0x12), AltLeft);
    }

    #[test]
    fn test_mouse_button_vks_are_unknown() {
        // VK_LBUTTON, VK_RBUTTON, VK_MBUTTON
        for vk in [0x01u8, 0x02, 0x04] {
            assert_eq!(vk_to_key(vk), Unknown);
        }
    }

    #[test]
    fn test_sided_modifier_codes_map_to_sided_variants() {
        assert_eq!(vk_to_key(0xA0), ShiftLeft);
        assert_eq!(vk_to_key(0xA1), ShiftRight);
        assert_eq!(vk_to_key(0xA2), ControlLeft);
        assert_eq!(vk_to_key(0xA3), ControlRight);
    }

    #[test]
    fn test_every_named_key_has_a_vk_code() {
        let reachable: std::collections::HashSet<KeyCode> = (0..=u8::MAX).map(vk_to_key).collect();
        for key in KeyCode::all() {
            assert!(reachable.contains(&key), "{key:?} should have a VK code");
        }
    }
}
