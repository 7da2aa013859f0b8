//! Operating mode and its lock-free shared cell.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Whether captured input stays on this host or is relayed to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Input behaves normally on the host.  Devices are not grabbed.
    #[default]
    Local,
    /// Input is grabbed, suppressed locally and forwarded.
    Forwarding,
}

impl Mode {
    /// The other mode.
    pub fn flipped(self) -> Mode {
        match self {
            Mode::Local => Mode::Forwarding,
            Mode::Forwarding => Mode::Local,
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Mode::Local => 0,
            Mode::Forwarding => 1,
        }
    }

    fn from_u8(raw: u8) -> Mode {
        if raw == 1 {
            Mode::Forwarding
        } else {
            Mode::Local
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Local => f.write_str("local"),
            Mode::Forwarding => f.write_str("forwarding"),
        }
    }
}

/// A [`Mode`] that can be read from any thread without locking.
///
/// The mode controller is the only writer; the forwarding gate and the
/// capture backends read it.
#[derive(Debug, Default)]
pub struct AtomicMode(AtomicU8);

impl AtomicMode {
    pub fn new(mode: Mode) -> Self {
        Self(AtomicU8::new(mode.to_u8()))
    }

    pub fn load(&self) -> Mode {
        Mode::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, mode: Mode) {
        self.0.store(mode.to_u8(), Ordering::Release);
    }

    /// Atomically flips the mode and returns the new value.
    pub fn flip(&self) -> Mode {
        let previous = self.0.fetch_xor(1, Ordering::AcqRel);
        Mode::from_u8(previous).flipped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_starts_local() {
        assert_eq!(Mode::default(), Mode::Local);
        assert_eq!(AtomicMode::default().load(), Mode::Local);
    }

    #[test]
    fn test_flip_alternates_and_returns_new_mode() {
        let mode = AtomicMode::new(Mode::Local);

        assert_eq!(mode.flip(), Mode::Forwarding);
        assert_eq!(mode.load(), Mode::Forwarding);
        assert_eq!(mode.flip(), Mode::Local);
        assert_eq!(mode.load(), Mode::Local);
    }

    #[test]
    fn test_store_overrides_current_value() {
        let mode = AtomicMode::new(Mode::Forwarding);
        mode.store(Mode::Local);
        assert_eq!(mode.load(), Mode::Local);
    }
}
