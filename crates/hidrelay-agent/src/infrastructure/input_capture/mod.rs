//! Input capture infrastructure.
//!
//! Each backend reads the physical keyboard and mouse on a dedicated OS
//! thread and pushes normalized `(DeviceRole, InputEvent)` pairs onto a
//! bounded Tokio channel consumed by the forwarding loop.
//!
//! # Backends
//!
//! - **Linux (`linux`)**: opens the evdev devices under `/dev/input`, waits
//!   on both file descriptors with `poll(2)` and a bounded timeout, and
//!   grabs devices with `EVIOCGRAB`.
//! - **Windows (`windows`)**: installs `WH_KEYBOARD_LL` / `WH_MOUSE_LL`
//!   hooks on a message-loop thread.  "Grab" means the hook swallows the
//!   event after forwarding it.
//! - **Mock (`mock`)**: in-process source for tests.
//!
//! # Testability
//!
//! Device classification ([`resolve_roles`]) and evdev frame decoding
//! ([`decoder`]) are pure functions so they can be unit-tested on any
//! platform.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use hidrelay_core::{DeviceRole, InputEvent};
use tokio::sync::mpsc;

use crate::application::mode_control::DeviceGrab;

pub mod decoder;
pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

/// Capacity of the capture → processing channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// One captured event tagged with the device it came from.
pub type CapturedEvent = (DeviceRole, InputEvent);

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No device could be classified for the role at startup.
    #[error("no {0} device found")]
    DeviceNotFound(DeviceRole),
    #[error("failed to grab {role}: {reason}")]
    Grab { role: DeviceRole, reason: String },
    #[error("failed to release {role}: {reason}")]
    Ungrab { role: DeviceRole, reason: String },
    #[error("failed to start capture: {0}")]
    Start(String),
    #[error("capture has already been started")]
    AlreadyStarted,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting input event production.
///
/// Implementations also provide exclusive grab/release through
/// [`DeviceGrab`], which the mode controller drives.
pub trait InputSource: DeviceGrab {
    /// Starts the capture thread and returns the receiving end of the event
    /// channel.  The thread exits when `running` is cleared or [`stop`]
    /// is called.
    ///
    /// [`stop`]: InputSource::stop
    fn start(&self, running: Arc<AtomicBool>) -> Result<mpsc::Receiver<CapturedEvent>, CaptureError>;

    /// Stops the capture thread and releases OS resources.
    ///
    /// May block until the capture thread exits; from async code use
    /// [`stop_capture`].
    fn stop(&self);
}

/// Runs [`InputSource::stop`] on Tokio's blocking pool so the thread join
/// never stalls a runtime worker.
///
/// # Errors
///
/// Returns the join error if `stop` panicked.
pub async fn stop_capture(source: Arc<dyn InputSource>) -> Result<(), tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || source.stop()).await
}

// ── Device classification ─────────────────────────────────────────────────────

/// What the enumerator learned about one input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCandidate {
    pub path: String,
    pub name: String,
    /// Reports `KEY_A`, i.e. looks like a keyboard.
    pub has_alpha_keys: bool,
    /// Reports `BTN_LEFT`, i.e. looks like a pointer.
    pub has_primary_button: bool,
}

/// Indices into the candidate list chosen for each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRoles {
    pub keyboard: usize,
    pub mouse: usize,
}

/// Picks the keyboard and mouse from the enumerated devices.
///
/// The keyboard is the first candidate with alphabetic keys.  The mouse is
/// the first other candidate with a primary button whose name equals
/// `mouse_name` when one is configured.
///
/// # Errors
///
/// Returns [`CaptureError::DeviceNotFound`] for the first role that cannot
/// be resolved.
pub fn resolve_roles(
    candidates: &[DeviceCandidate],
    mouse_name: Option<&str>,
) -> Result<ResolvedRoles, CaptureError> {
    let keyboard = candidates
        .iter()
        .position(|c| c.has_alpha_keys)
        .ok_or(CaptureError::DeviceNotFound(DeviceRole::Keyboard))?;

    let mouse = candidates
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != keyboard && c.has_primary_button)
        .find(|(_, c)| mouse_name.map_or(true, |wanted| c.name == wanted))
        .map(|(i, _)| i)
        .ok_or(CaptureError::DeviceNotFound(DeviceRole::Mouse))?;

    Ok(ResolvedRoles { keyboard, mouse })
}
