//! Wire protocol spoken to the HID endpoint.

pub mod wire;

pub use wire::{classify, encode, KeyClass, WireMessage};
