//! Text wire protocol understood by the HID endpoint.
//!
//! Wire format, one message per WebSocket text frame:
//! ```text
//! KEY:<mods><payload>   mods    = *( "CTRL+" | "SHIFT+" | "ALT+" ), always in that order
//!                       payload = "0x" 2HEXDIG | letter | digit | punctuation
//! CLICK:LEFT
//! CLICK:RIGHT
//! MOVE:<dx>:<dy>        signed decimal deltas
//! SCROLL:<delta>        signed decimal detents
//! ```
//!
//! [`encode`] is a pure function: the same event and modifier state always
//! yield the same message.  Events with no wire form yield `None`, which is
//! not an error.

use std::fmt;

use crate::domain::event::{ButtonEdge, InputEvent, KeyEdge, MouseButton};
use crate::domain::modifiers::ModifierState;
use crate::keymap::KeyCode;

const MOVE_PREFIX: &str = "MOVE:";

/// One encoded message, ready to be sent as a text frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WireMessage(String);

impl WireMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// `MOVE:<dx>:<dy>` for a non-zero delta.
    pub fn mouse_move(dx: i32, dy: i32) -> Option<WireMessage> {
        if dx == 0 && dy == 0 {
            return None;
        }
        Some(WireMessage(format!("{MOVE_PREFIX}{dx}:{dy}")))
    }

    /// Splits a combined `MOVE:dx:dy` into single-axis messages for receivers
    /// that only understand one axis per message.
    ///
    /// A zero axis is omitted.  Any other message is returned unchanged.
    pub fn split_axes(&self) -> Vec<WireMessage> {
        let Some((dx, dy)) = self.move_delta() else {
            return vec![self.clone()];
        };
        if dx == 0 || dy == 0 {
            return vec![self.clone()];
        }
        [WireMessage::mouse_move(dx, 0), WireMessage::mouse_move(0, dy)]
            .into_iter()
            .flatten()
            .collect()
    }

    fn move_delta(&self) -> Option<(i32, i32)> {
        let rest = self.0.strip_prefix(MOVE_PREFIX)?;
        let (dx, dy) = rest.split_once(':')?;
        Some((dx.parse().ok()?, dy.parse().ok()?))
    }
}

impl fmt::Display for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<WireMessage> for String {
    fn from(msg: WireMessage) -> Self {
        msg.0
    }
}

// ── Key classification ────────────────────────────────────────────────────────

/// How a key is represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Shift/Ctrl/Alt/Meta: only ever a prefix, never a payload.
    Modifier,
    /// Sent as `0xHH`.
    Named(u8),
    /// Sent as the literal character.
    Literal(char),
    /// Known key with no wire form.
    Unmapped,
}

/// Classifies every [`KeyCode`].
///
/// The match is exhaustive on purpose: a new variant does not compile until
/// its wire form is decided here.
pub fn classify(code: KeyCode) -> KeyClass {
    use KeyClass::*;
    use KeyCode::*;
    match code {
        ControlLeft | ControlRight | ShiftLeft | ShiftRight | AltLeft | AltRight | MetaLeft
        | MetaRight => Modifier,

        Escape => Named(0xB1),
        Enter => Named(0xB0),
        Backspace => Named(0xB2),
        Tab => Named(0xB3),
        Space => Named(0x20),
        CapsLock => Named(0xC1),
        F1 => Named(0xC2),
        F2 => Named(0xC3),
        F3 => Named(0xC4),
        F4 => Named(0xC5),
        F5 => Named(0xC6),
        F6 => Named(0xC7),
        F7 => Named(0xC8),
        F8 => Named(0xC9),
        F9 => Named(0xCA),
        F10 => Named(0xCB),
        F11 => Named(0xCC),
        F12 => Named(0xCD),
        Insert => Named(0xD1),
        Home => Named(0xD2),
        PageUp => Named(0xD3),
        Delete => Named(0xD4),
        End => Named(0xD5),
        PageDown => Named(0xD6),
        ArrowRight => Named(0xD7),
        ArrowLeft => Named(0xD8),
        ArrowDown => Named(0xD9),
        ArrowUp => Named(0xDA),

        KeyA => Literal('a'),
        KeyB => Literal('b'),
        KeyC => Literal('c'),
        KeyD => Literal('d'),
        KeyE => Literal('e'),
        KeyF => Literal('f'),
        KeyG => Literal('g'),
        KeyH => Literal('h'),
        KeyI => Literal('i'),
        KeyJ => Literal('j'),
        KeyK => Literal('k'),
        KeyL => Literal('l'),
        KeyM => Literal('m'),
        KeyN => Literal('n'),
        KeyO => Literal('o'),
        KeyP => Literal('p'),
        KeyQ => Literal('q'),
        KeyR => Literal('r'),
        KeyS => Literal('s'),
        KeyT => Literal('t'),
        KeyU => Literal('u'),
        KeyV => Literal('v'),
        KeyW => Literal('w'),
        KeyX => Literal('x'),
        KeyY => Literal('y'),
        KeyZ => Literal('z'),
        Digit0 => Literal('0'),
        Digit1 => Literal('1'),
        Digit2 => Literal('2'),
        Digit3 => Literal('3'),
        Digit4 => Literal('4'),
        Digit5 => Literal('5'),
        Digit6 => Literal('6'),
        Digit7 => Literal('7'),
        Digit8 => Literal('8'),
        Digit9 => Literal('9'),

        Minus => Literal('-'),
        Equal => Literal('='),
        BracketLeft => Literal('['),
        BracketRight => Literal(']'),
        Semicolon => Literal(';'),
        Quote => Literal('\''),
        Backquote => Literal('`'),
        Backslash => Literal('\\'),
        Comma => Literal(','),
        Period => Literal('.'),
        Slash => Literal('/'),

        PrintScreen | ScrollLock | Pause | NumLock | ContextMenu | AudioMute
        | AudioVolumeDown | AudioVolumeUp | MediaPlayPause | MediaTrackNext
        | MediaTrackPrevious | Unknown => Unmapped,
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes one event under the given modifier state.
///
/// Returns `None` for modifier keys, key releases, unmapped keys, button
/// releases, buttons other than left/right, zero movement and zero scroll.
pub fn encode(event: &InputEvent, mods: ModifierState) -> Option<WireMessage> {
    match *event {
        InputEvent::Key { code, edge } => encode_key(code, edge, mods),
        InputEvent::MouseButton { button, edge: ButtonEdge::Down } => match button {
            MouseButton::Left => Some(WireMessage("CLICK:LEFT".to_string())),
            MouseButton::Right => Some(WireMessage("CLICK:RIGHT".to_string())),
            MouseButton::Middle | MouseButton::Side | MouseButton::Extra => None,
        },
        InputEvent::MouseButton { edge: ButtonEdge::Up, .. } => None,
        InputEvent::MouseMove { dx, dy } => WireMessage::mouse_move(dx, dy),
        InputEvent::MouseWheel { delta: 0 } => None,
        InputEvent::MouseWheel { delta } => Some(WireMessage(format!("SCROLL:{delta}"))),
    }
}

fn encode_key(code: KeyCode, edge: KeyEdge, mods: ModifierState) -> Option<WireMessage> {
    if edge == KeyEdge::Up {
        return None;
    }

    let mut out = String::with_capacity(24);
    out.push_str("KEY:");
    if mods.ctrl {
        out.push_str("CTRL+");
    }
    if mods.shift {
        out.push_str("SHIFT+");
    }
    if mods.alt {
        out.push_str("ALT+");
    }

    match classify(code) {
        KeyClass::Named(hid) => out.push_str(&format!("0x{hid:02X}")),
        KeyClass::Literal(ch) => out.push(ch),
        KeyClass::Modifier | KeyClass::Unmapped => return None,
    }
    Some(WireMessage(out))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(code: KeyCode) -> InputEvent {
        InputEvent::key(code, KeyEdge::Down)
    }

    fn no_mods() -> ModifierState {
        ModifierState::default()
    }

    fn encoded(event: InputEvent, mods: ModifierState) -> Option<String> {
        encode(&event, mods).map(WireMessage::into_string)
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_letter_encodes_as_lowercase_literal() {
        assert_eq!(encoded(key_down(KeyCode::KeyA), no_mods()).as_deref(), Some("KEY:a"));
    }

    #[test]
    fn test_digit_encodes_as_literal() {
        assert_eq!(encoded(key_down(KeyCode::Digit7), no_mods()).as_deref(), Some("KEY:7"));
    }

    #[test]
    fn test_enter_and_escape_use_named_codes() {
        assert_eq!(encoded(key_down(KeyCode::Enter), no_mods()).as_deref(), Some("KEY:0xB0"));
        assert_eq!(encoded(key_down(KeyCode::Escape), no_mods()).as_deref(), Some("KEY:0xB1"));
    }

    #[test]
    fn test_named_table_codes() {
        let cases = [
            (KeyCode::Backspace, "KEY:0xB2"),
            (KeyCode::Tab, "KEY:0xB3"),
            (KeyCode::Space, "KEY:0x20"),
            (KeyCode::CapsLock, "KEY:0xC1"),
            (KeyCode::F1, "KEY:0xC2"),
            (KeyCode::F12, "KEY:0xCD"),
            (KeyCode::Insert, "KEY:0xD1"),
            (KeyCode::PageDown, "KEY:0xD6"),
            (KeyCode::ArrowRight, "KEY:0xD7"),
            (KeyCode::ArrowUp, "KEY:0xDA"),
        ];
        for (code, expected) in cases {
            assert_eq!(encoded(key_down(code), no_mods()).as_deref(), Some(expected), "{code:?}");
        }
    }

    #[test]
    fn test_punctuation_encodes_as_literal() {
        let cases = [
            (KeyCode::Minus, "KEY:-"),
            (KeyCode::Quote, "KEY:'"),
            (KeyCode::Backquote, "KEY:`"),
            (KeyCode::Backslash, "KEY:\\"),
            (KeyCode::Slash, "KEY:/"),
        ];
        for (code, expected) in cases {
            assert_eq!(encoded(key_down(code), no_mods()).as_deref(), Some(expected), "{code:?}");
        }
    }

    #[test]
    fn test_modifier_prefix_order_is_ctrl_shift_alt() {
        let all = ModifierState { shift: true, ctrl: true, alt: true };
        assert_eq!(
            encoded(key_down(KeyCode::KeyX), all).as_deref(),
            Some("KEY:CTRL+SHIFT+ALT+x")
        );

        let ctrl_alt = ModifierState { shift: false, ctrl: true, alt: true };
        assert_eq!(encoded(key_down(KeyCode::KeyA), ctrl_alt).as_deref(), Some("KEY:CTRL+ALT+a"));
    }

    #[test]
    fn test_prefix_applies_to_named_keys() {
        let shift = ModifierState { shift: true, ..Default::default() };
        assert_eq!(encoded(key_down(KeyCode::Tab), shift).as_deref(), Some("KEY:SHIFT+0xB3"));
    }

    #[test]
    fn test_repeat_is_encoded_and_up_is_not() {
        let repeat = InputEvent::key(KeyCode::KeyB, KeyEdge::Repeat);
        let up = InputEvent::key(KeyCode::KeyB, KeyEdge::Up);
        assert_eq!(encoded(repeat, no_mods()).as_deref(), Some("KEY:b"));
        assert_eq!(encoded(up, no_mods()), None);
    }

    #[test]
    fn test_modifier_keys_never_encode() {
        let ctrl = ModifierState { ctrl: true, ..Default::default() };
        for code in [KeyCode::ControlLeft, KeyCode::ShiftRight, KeyCode::AltLeft, KeyCode::MetaLeft] {
            assert_eq!(encoded(key_down(code), ctrl), None, "{code:?}");
        }
    }

    #[test]
    fn test_unmapped_keys_produce_nothing() {
        for code in [KeyCode::AudioVolumeUp, KeyCode::PrintScreen, KeyCode::Unknown] {
            assert_eq!(encoded(key_down(code), no_mods()), None, "{code:?}");
        }
    }

    #[test]
    fn test_every_key_is_classified_consistently_with_encoding() {
        for code in KeyCode::all() {
            let message = encoded(key_down(code), no_mods());
            match classify(code) {
                KeyClass::Named(_) | KeyClass::Literal(_) => assert!(message.is_some(), "{code:?}"),
                KeyClass::Modifier | KeyClass::Unmapped => assert!(message.is_none(), "{code:?}"),
            }
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let mods = ModifierState { shift: true, ..Default::default() };
        let event = key_down(KeyCode::KeyQ);
        assert_eq!(encode(&event, mods), encode(&event, mods));
    }

    // ── Mouse ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_left_and_right_click_down_only() {
        let down = |button| InputEvent::MouseButton { button, edge: ButtonEdge::Down };
        let up = |button| InputEvent::MouseButton { button, edge: ButtonEdge::Up };

        assert_eq!(encoded(down(MouseButton::Left), no_mods()).as_deref(), Some("CLICK:LEFT"));
        assert_eq!(encoded(down(MouseButton::Right), no_mods()).as_deref(), Some("CLICK:RIGHT"));
        assert_eq!(encoded(up(MouseButton::Left), no_mods()), None);
        assert_eq!(encoded(down(MouseButton::Middle), no_mods()), None);
        assert_eq!(encoded(down(MouseButton::Side), no_mods()), None);
    }

    #[test]
    fn test_movement_encodes_signed_deltas() {
        let event = InputEvent::MouseMove { dx: -3, dy: 12 };
        assert_eq!(encoded(event, no_mods()).as_deref(), Some("MOVE:-3:12"));
    }

    #[test]
    fn test_zero_movement_produces_nothing() {
        assert_eq!(encoded(InputEvent::MouseMove { dx: 0, dy: 0 }, no_mods()), None);
    }

    #[test]
    fn test_scroll_encodes_signed_delta() {
        assert_eq!(encoded(InputEvent::MouseWheel { delta: -1 }, no_mods()).as_deref(), Some("SCROLL:-1"));
        assert_eq!(encoded(InputEvent::MouseWheel { delta: 0 }, no_mods()), None);
    }

    // ── split_axes ────────────────────────────────────────────────────────────

    #[test]
    fn test_split_axes_separates_combined_move() {
        let msg = WireMessage::mouse_move(4, -2).expect("non-zero");
        let parts: Vec<String> = msg.split_axes().into_iter().map(String::from).collect();
        assert_eq!(parts, vec!["MOVE:4:0", "MOVE:0:-2"]);
    }

    #[test]
    fn test_split_axes_keeps_single_axis_move_intact() {
        let msg = WireMessage::mouse_move(0, 9).expect("non-zero");
        assert_eq!(msg.split_axes(), vec![msg.clone()]);
    }

    #[test]
    fn test_split_axes_leaves_other_messages_unchanged() {
        let msg = encode(&key_down(KeyCode::KeyA), no_mods()).expect("encodes");
        assert_eq!(msg.split_axes(), vec![msg.clone()]);
    }
}
