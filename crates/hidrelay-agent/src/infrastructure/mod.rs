//! Infrastructure layer for the agent.
//!
//! Contains OS-facing adapters: input capture backends, the WebSocket
//! transport and configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `hidrelay_core`, but the domain types in `hidrelay_core` never depend on
//! it.

pub mod input_capture;
pub mod network;
pub mod storage;
