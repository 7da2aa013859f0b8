//! # hidrelay-core
//!
//! Shared library for HidRelay containing the input event model, the
//! forwarding state machines, key code translation tables and the text wire
//! protocol.
//!
//! It has zero dependencies on OS APIs or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! HidRelay captures the local keyboard and mouse and relays them to a small
//! HID-emulation board (for example an ESP32 exposing a WebSocket), which
//! replays the input on another machine.  A toggle key switches between
//! **Local** mode, where input behaves normally, and **Forwarding** mode,
//! where input is grabbed away from the host and sent to the board.
//!
//! This crate (`hidrelay-core`) is the pure foundation.  It defines:
//!
//! - **`domain`** – The event model and the small state machines between
//!   capture and transport: modifier tracking, toggle debouncing, the mode
//!   flag, movement rate limiting and reconnect backoff.
//!
//! - **`keymap`** – Translation tables from platform key codes (Linux evdev,
//!   Windows VK) to the canonical [`KeyCode`].
//!
//! - **`protocol`** – How an event becomes a text message such as `KEY:a`,
//!   `MOVE:4:0` or `CLICK:LEFT`.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `hidrelay_core::InputEvent` instead of `hidrelay_core::domain::event::InputEvent`.
pub use domain::backoff::Backoff;
pub use domain::event::{ButtonEdge, DeviceRole, InputEvent, KeyEdge, MouseButton};
pub use domain::mode::{AtomicMode, Mode};
pub use domain::modifiers::ModifierState;
pub use domain::rate_limit::MoveRateLimiter;
pub use domain::toggle::{ToggleOutcome, ToggleState, ToggleStateMachine, DEFAULT_TOGGLE_KEY};
pub use keymap::{KeyCode, KeyMapper, UnknownKeyName};
pub use protocol::wire::{encode, WireMessage};
