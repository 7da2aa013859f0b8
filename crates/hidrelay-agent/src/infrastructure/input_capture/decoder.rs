//! Normalizes raw evdev `(type, code, value)` triples into [`InputEvent`]s.
//!
//! The kernel reports one physical mouse motion as separate `REL_X` and
//! `REL_Y` events followed by a `SYN_REPORT`.  [`FrameDecoder`] sums the
//! relative axes within a frame and emits a single `MouseMove` when the frame
//! closes.  Everything else maps one-to-one.
//!
//! This module has no OS dependencies so it is compiled and tested on every
//! platform; only the Linux backend feeds it real data.

use hidrelay_core::keymap::linux_evdev::BTN_MISC;
use hidrelay_core::{ButtonEdge, DeviceRole, InputEvent, KeyEdge, KeyMapper, MouseButton};
use tracing::trace;

// linux/input-event-codes.h
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;

pub const SYN_REPORT: u16 = 0;
pub const SYN_DROPPED: u16 = 3;

pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_WHEEL: u16 = 0x08;

pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;
pub const BTN_MIDDLE: u16 = 0x112;
pub const BTN_SIDE: u16 = 0x113;
pub const BTN_EXTRA: u16 = 0x114;

/// Per-device decoding state.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    role: DeviceRole,
    dx: i32,
    dy: i32,
}

impl FrameDecoder {
    pub fn new(role: DeviceRole) -> Self {
        Self { role, dx: 0, dy: 0 }
    }

    pub fn role(&self) -> DeviceRole {
        self.role
    }

    /// Feeds one raw event, appending any completed events to `out`.
    pub fn push(&mut self, event_type: u16, code: u16, value: i32, out: &mut Vec<InputEvent>) {
        match (event_type, self.role) {
            (EV_KEY, DeviceRole::Keyboard) if code < BTN_MISC => {
                if let Some(edge) = KeyEdge::from_evdev_value(value) {
                    out.push(InputEvent::key(KeyMapper::evdev_to_key(code), edge));
                }
            }
            (EV_KEY, DeviceRole::Mouse) => {
                let button = match code {
                    BTN_LEFT => MouseButton::Left,
                    BTN_RIGHT => MouseButton::Right,
                    BTN_MIDDLE => MouseButton::Middle,
                    BTN_SIDE => MouseButton::Side,
                    BTN_EXTRA => MouseButton::Extra,
                    _ => return,
                };
                let edge = if value == 0 { ButtonEdge::Up } else { ButtonEdge::Down };
                out.push(InputEvent::MouseButton { button, edge });
            }
            (EV_REL, DeviceRole::Mouse) => match code {
                REL_X => self.dx = self.dx.saturating_add(value),
                REL_Y => self.dy = self.dy.saturating_add(value),
                REL_WHEEL => out.push(InputEvent::MouseWheel { delta: value }),
                _ => {}
            },
            (EV_SYN, _) => match code {
                SYN_REPORT => self.finish(out),
                SYN_DROPPED => {
                    trace!(role = %self.role, "kernel dropped events; discarding partial frame");
                    self.dx = 0;
                    self.dy = 0;
                }
                _ => {}
            },
            _ => {}
        }
    }

    /// Emits any accumulated motion.  Called on `SYN_REPORT` and at the end
    /// of each read batch.
    pub fn finish(&mut self, out: &mut Vec<InputEvent>) {
        if self.dx != 0 || self.dy != 0 {
            out.push(InputEvent::MouseMove { dx: self.dx, dy: self.dy });
            self.dx = 0;
            self.dy = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidrelay_core::KeyCode;

    fn decode(role: DeviceRole, raw: &[(u16, u16, i32)]) -> Vec<InputEvent> {
        let mut decoder = FrameDecoder::new(role);
        let mut out = Vec::new();
        for &(t, c, v) in raw {
            decoder.push(t, c, v, &mut out);
        }
        out
    }

    #[test]
    fn test_key_press_repeat_release() {
        // KEY_A = 30
        let events = decode(
            DeviceRole::Keyboard,
            &[(EV_KEY, 30, 1), (EV_SYN, SYN_REPORT, 0), (EV_KEY, 30, 2), (EV_KEY, 30, 0)],
        );

        assert_eq!(
            events,
            vec![
                InputEvent::key(KeyCode::KeyA, KeyEdge::Down),
                InputEvent::key(KeyCode::KeyA, KeyEdge::Repeat),
                InputEvent::key(KeyCode::KeyA, KeyEdge::Up),
            ]
        );
    }

    #[test]
    fn test_x_and_y_in_one_frame_become_one_move() {
        let events = decode(
            DeviceRole::Mouse,
            &[(EV_REL, REL_X, 3), (EV_REL, REL_Y, -2), (EV_SYN, SYN_REPORT, 0)],
        );
        assert_eq!(events, vec![InputEvent::MouseMove { dx: 3, dy: -2 }]);
    }

    #[test]
    fn test_single_axis_frame() {
        let events = decode(DeviceRole::Mouse, &[(EV_REL, REL_Y, 5), (EV_SYN, SYN_REPORT, 0)]);
        assert_eq!(events, vec![InputEvent::MouseMove { dx: 0, dy: 5 }]);
    }

    #[test]
    fn test_motion_without_report_is_held_until_finish() {
        let mut decoder = FrameDecoder::new(DeviceRole::Mouse);
        let mut out = Vec::new();

        decoder.push(EV_REL, REL_X, 1, &mut out);
        assert!(out.is_empty());

        decoder.finish(&mut out);
        assert_eq!(out, vec![InputEvent::MouseMove { dx: 1, dy: 0 }]);
    }

    #[test]
    fn test_syn_dropped_discards_partial_motion() {
        let events = decode(
            DeviceRole::Mouse,
            &[(EV_REL, REL_X, 9), (EV_SYN, SYN_DROPPED, 0), (EV_SYN, SYN_REPORT, 0)],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_mouse_buttons_and_wheel() {
        let events = decode(
            DeviceRole::Mouse,
            &[
                (EV_KEY, BTN_LEFT, 1),
                (EV_KEY, BTN_LEFT, 0),
                (EV_KEY, BTN_RIGHT, 1),
                (EV_KEY, BTN_SIDE, 1),
                (EV_REL, REL_WHEEL, -1),
            ],
        );

        assert_eq!(
            events,
            vec![
                InputEvent::MouseButton { button: MouseButton::Left, edge: ButtonEdge::Down },
                InputEvent::MouseButton { button: MouseButton::Left, edge: ButtonEdge::Up },
                InputEvent::MouseButton { button: MouseButton::Right, edge: ButtonEdge::Down },
                InputEvent::MouseButton { button: MouseButton::Side, edge: ButtonEdge::Down },
                InputEvent::MouseWheel { delta: -1 },
            ]
        );
    }

    #[test]
    fn test_events_outside_role_are_ignored() {
        // Relative motion on the keyboard node, a key code on the mouse node,
        // and a button code on the keyboard node.
        let kb = decode(DeviceRole::Keyboard, &[(EV_REL, REL_X, 4), (EV_KEY, BTN_LEFT, 1)]);
        let mouse = decode(DeviceRole::Mouse, &[(EV_KEY, 30, 1), (EV_KEY, 0x115, 1)]);

        assert!(kb.is_empty());
        assert!(mouse.is_empty());
    }
}
