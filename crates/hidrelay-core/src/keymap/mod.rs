//! Key code translation tables for cross-platform keyboard capture.
//!
//! The canonical representation is [`KeyCode`].  Platform-specific codes are
//! translated to it at the capture boundary and never travel further.

pub mod keys;
pub mod linux_evdev;
pub mod windows_vk;

pub use keys::{KeyCode, UnknownKeyName};

/// Unified key mapper over the platform capture tables.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a Linux evdev key code to a [`KeyCode`].
    ///
    /// Returns [`KeyCode::Unknown`] if no mapping exists for `code`.
    pub fn evdev_to_key(code: u16) -> KeyCode {
        linux_evdev::evdev_to_key(code)
    }

    /// Translates a Windows Virtual Key code to a [`KeyCode`].
    ///
    /// Returns [`KeyCode::Unknown`] if no mapping exists for `vk`.
    pub fn windows_vk_to_key(vk: u8) -> KeyCode {
        windows_vk::vk_to_key(vk)
    }
}
