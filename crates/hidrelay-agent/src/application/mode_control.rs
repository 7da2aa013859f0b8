//! ModeController: flips between Local and Forwarding and grabs or releases
//! the physical devices to match.
//!
//! Grab failures never stop a flip.  Each device is handled independently,
//! the error is logged once, and there is no retry: the next flip tries
//! again from scratch.

use std::sync::Arc;

use hidrelay_core::{DeviceRole, Mode};
use tracing::{info, warn};

use super::context::ForwardContext;
use crate::infrastructure::input_capture::CaptureError;

/// Exclusive OS-level acquisition of a capture device.
///
/// The Linux backend issues `EVIOCGRAB`; the Windows backend suppresses the
/// role's hook events; tests record calls.
pub trait DeviceGrab: Send + Sync {
    fn grab(&self, role: DeviceRole) -> Result<(), CaptureError>;
    fn ungrab(&self, role: DeviceRole) -> Result<(), CaptureError>;
}

pub struct ModeController {
    context: Arc<ForwardContext>,
    devices: Arc<dyn DeviceGrab>,
}

impl ModeController {
    pub fn new(context: Arc<ForwardContext>, devices: Arc<dyn DeviceGrab>) -> Self {
        Self { context, devices }
    }

    pub fn current_mode(&self) -> Mode {
        self.context.mode()
    }

    /// Handles a fired toggle: flips the mode, drops held-back motion, then
    /// grabs (entering Forwarding) or releases (leaving it) both devices.
    ///
    /// Returns the new mode.
    pub fn on_toggle_fired(&self) -> Mode {
        let mode = self.context.flip_mode();
        if let Err(e) = self.context.reset_motion() {
            warn!("could not reset pending motion: {e}");
        }

        match mode {
            Mode::Forwarding => info!("Forwarding ENABLED"),
            Mode::Local => info!("Forwarding DISABLED"),
        }
        self.apply(mode);
        mode
    }

    /// Releases both devices and returns to Local.  Used at shutdown so the
    /// host is never left with grabbed input.
    pub fn release_all(&self) {
        if self.context.mode() == Mode::Forwarding {
            self.context.set_mode(Mode::Local);
            self.apply(Mode::Local);
            info!("devices released");
        }
    }

    fn apply(&self, mode: Mode) {
        for role in DeviceRole::ALL {
            let result = match mode {
                Mode::Forwarding => self.devices.grab(role),
                Mode::Local => self.devices.ungrab(role),
            };
            if let Err(e) = result {
                warn!(%role, "{e}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
