//! ForwardInputUseCase: turns captured events into wire messages.
//!
//! This use case is the heart of the agent.  Every captured event passes
//! through the same stages, in this order:
//!
//! ```text
//! key events:   modifier tracker (always) → toggle machine
//!                                              ├─ Fired    → mode flip, stop
//!                                              ├─ Consumed → stop
//!                                              └─ PassThrough ↓
//! all events:   gate (Forwarding && Connected) → rate limiter (moves only)
//!               → encoder → transmitter
//! ```
//!
//! # Architecture
//!
//! This use case depends only on the [`WireTransmitter`] trait, the
//! [`ModeController`] and the shared [`ForwardContext`].  The transport is
//! injected at construction time, making the use case fully unit-testable.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use hidrelay_core::{encode, DeviceRole, InputEvent, Mode, ToggleOutcome, WireMessage};
use thiserror::Error;
use tracing::{debug, warn};

use super::context::ForwardContext;
use super::mode_control::ModeController;
use crate::infrastructure::network::TransportError;

/// Error type for the forward-input use case.
///
/// Transport failures are not errors here: a failed send is logged and the
/// reconnect loop takes over.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("shared {0} state is poisoned")]
    StatePoisoned(&'static str),
}

/// Trait for delivering wire messages to the endpoint.
///
/// The infrastructure implementation is the WebSocket transport manager;
/// test implementations record calls.
#[async_trait]
pub trait WireTransmitter: Send + Sync {
    async fn send(&self, message: WireMessage) -> Result<(), TransportError>;

    /// `true` when the link is up and sends can be attempted.
    async fn is_connected(&self) -> bool;
}

/// The Forward Input use case.
pub struct ForwardInputUseCase {
    context: Arc<ForwardContext>,
    modes: Arc<ModeController>,
    transmitter: Arc<dyn WireTransmitter>,
}

impl ForwardInputUseCase {
    pub fn new(
        context: Arc<ForwardContext>,
        modes: Arc<ModeController>,
        transmitter: Arc<dyn WireTransmitter>,
    ) -> Self {
        Self { context, modes, transmitter }
    }

    /// Handles one captured event.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError`] when shared state is unusable.  The caller
    /// logs it and moves on to the next event.
    pub async fn handle_event(
        &self,
        role: DeviceRole,
        event: InputEvent,
        now: Instant,
    ) -> Result<(), ForwardError> {
        if let InputEvent::Key { code, edge } = event {
            debug!(%role, key = %code, ?edge, "key event");
            match self.context.observe_key(code, edge)? {
                ToggleOutcome::Fired => {
                    self.modes.on_toggle_fired();
                    return Ok(());
                }
                ToggleOutcome::Consumed => return Ok(()),
                ToggleOutcome::PassThrough => {}
            }
        }

        if !self.gate_open().await {
            self.context.reset_motion()?;
            return Ok(());
        }

        let event = match event {
            InputEvent::MouseMove { dx, dy } => match self.context.offer_move(dx, dy, now)? {
                Some((dx, dy)) => InputEvent::MouseMove { dx, dy },
                None => return Ok(()),
            },
            other => other,
        };

        let mods = self.context.modifiers()?;
        if let Some(message) = encode(&event, mods) {
            self.transmit(message).await;
        }
        Ok(())
    }

    /// Sends movement the rate limiter is still holding once its interval
    /// has passed.  Called by the processing loop when no event arrived.
    pub async fn on_idle(&self, now: Instant) -> Result<(), ForwardError> {
        if !self.gate_open().await {
            return Ok(());
        }
        if let Some((dx, dy)) = self.context.flush_move(now)? {
            if let Some(message) = WireMessage::mouse_move(dx, dy) {
                self.transmit(message).await;
            }
        }
        Ok(())
    }

    async fn gate_open(&self) -> bool {
        self.modes.current_mode() == Mode::Forwarding && self.transmitter.is_connected().await
    }

    async fn transmit(&self, message: WireMessage) {
        debug!(%message, "sending");
        if let Err(e) = self.transmitter.send(message).await {
            warn!("send failed: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
