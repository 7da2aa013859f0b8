//! TransportManager: owns the single connection to the HID endpoint.
//!
//! # State machine
//!
//! ```text
//!  Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!       ▲                          │                  │
//!       └────────── failure ───────┴── send/close ────┘
//! ```
//!
//! State and link share one `tokio::sync::Mutex`.  A send holds it for the
//! duration of the write only, and every write is cut off after the send
//! timeout: an endpoint that accepts the connection but stops reading would
//! otherwise park the writer, and everyone waiting on the lock, for good.
//! A timed-out write drops the link like any other send failure.
//! `connect()` releases the lock during the network handshake with the state
//! set to `Connecting`, so sends issued meanwhile fail fast instead of
//! queueing behind the handshake.
//!
//! # Reconnection
//!
//! [`TransportManager::run_reconnect_loop`] runs as its own task, apart from
//! the capture pipeline.  While disconnected it calls `connect()`, sleeping
//! for the next [`Backoff`] delay after each failure; after a success it just
//! re-checks every `check_interval`.  Sleeps are cut into short slices so a
//! shutdown is noticed promptly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hidrelay_core::{Backoff, WireMessage};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::websocket::{Connector, Link};
use super::TransportError;
use crate::application::forward_input::WireTransmitter;

/// Granularity of shutdown checks while the reconnect loop sleeps.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Upper bound on one frame write unless configured otherwise.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Timing for the background reconnect loop.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub backoff: Backoff,
    /// How often a healthy connection is re-checked.
    pub check_interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { backoff: Backoff::default(), check_interval: Duration::from_secs(1) }
    }
}

struct Inner {
    state: ConnectionState,
    link: Option<Box<dyn Link>>,
}

pub struct TransportManager {
    connector: Arc<dyn Connector>,
    inner: Mutex<Inner>,
    split_move_axes: bool,
    send_timeout: Duration,
}

impl TransportManager {
    /// Creates a disconnected manager.
    ///
    /// With `split_move_axes`, combined `MOVE:dx:dy` messages are sent as
    /// two single-axis messages.
    pub fn new(connector: Arc<dyn Connector>, split_move_axes: bool) -> Self {
        Self {
            connector,
            inner: Mutex::new(Inner { state: ConnectionState::Disconnected, link: None }),
            split_move_axes,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Replaces the per-frame write limit (default [`DEFAULT_SEND_TIMEOUT`]).
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub async fn status(&self) -> ConnectionState {
        self.inner.lock().await.state
    }

    /// Makes one connection attempt.
    ///
    /// Succeeds immediately when already connected.
    ///
    /// # Errors
    ///
    /// Returns the connector's error, or [`TransportError::ConnectInProgress`]
    /// if another attempt is already in flight.
    pub async fn connect(&self) -> Result<(), TransportError> {
        {
            let mut inner = self.inner.lock().await;
            match inner.state {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Connecting => return Err(TransportError::ConnectInProgress),
                ConnectionState::Disconnected => inner.state = ConnectionState::Connecting,
            }
        }

        debug!(endpoint = %self.connector.endpoint(), "connecting");
        let result = self.connector.connect().await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(link) => {
                inner.link = Some(link);
                inner.state = ConnectionState::Connected;
                info!(endpoint = %self.connector.endpoint(), "connected");
                Ok(())
            }
            Err(e) => {
                inner.link = None;
                inner.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    /// Sends one message.  Fails immediately when not connected; a write
    /// failure or a write still pending after the send timeout drops the link
    /// and returns to `Disconnected`.
    pub async fn send(&self, message: WireMessage) -> Result<(), TransportError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        if inner.state != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        let Some(link) = inner.link.as_mut() else {
            inner.state = ConnectionState::Disconnected;
            return Err(TransportError::NotConnected);
        };

        let frames = if self.split_move_axes { message.split_axes() } else { vec![message] };
        for frame in frames {
            let result = match tokio::time::timeout(self.send_timeout, link.send_text(frame.into_string())).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::SendTimeout(self.send_timeout)),
            };
            if let Err(e) = result {
                warn!("dropping connection: {e}");
                inner.link = None;
                inner.state = ConnectionState::Disconnected;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Closes the link, if any, and returns to `Disconnected`.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = ConnectionState::Disconnected;
        if let Some(mut link) = inner.link.take() {
            match link.close().await {
                Ok(()) => info!("connection closed"),
                Err(e) => debug!("close failed: {e}"),
            }
        }
    }

    /// Downgrades a connected-but-dead link to `Disconnected`.
    ///
    /// Returns the state after the check.
    pub async fn check_liveness(&self) -> ConnectionState {
        let mut inner = self.inner.lock().await;
        if inner.state == ConnectionState::Connected
            && !inner.link.as_ref().map_or(false, |link| link.is_open())
        {
            warn!("connection lost");
            inner.link = None;
            inner.state = ConnectionState::Disconnected;
        }
        inner.state
    }

    /// Keeps the connection up until `running` is cleared.
    pub async fn run_reconnect_loop(self: Arc<Self>, running: Arc<AtomicBool>, policy: ReconnectPolicy) {
        let ReconnectPolicy { mut backoff, check_interval } = policy;

        while running.load(Ordering::Relaxed) {
            let delay = match self.check_liveness().await {
                ConnectionState::Connected | ConnectionState::Connecting => check_interval,
                ConnectionState::Disconnected => match self.connect().await {
                    Ok(()) => {
                        backoff.reset();
                        check_interval
                    }
                    Err(e) => {
                        let delay = backoff.next_delay();
                        warn!("reconnect failed: {e}; retrying in {:.1}s", delay.as_secs_f64());
                        delay
                    }
                },
            };
            sleep_while_running(delay, &running).await;
        }
        debug!("reconnect loop stopped");
    }
}

#[async_trait]
impl WireTransmitter for TransportManager {
    async fn send(&self, message: WireMessage) -> Result<(), TransportError> {
        TransportManager::send(self, message).await
    }

    async fn is_connected(&self) -> bool {
        self.status().await == ConnectionState::Connected
    }
}

/// Sleeps for `total`, returning early once `running` is cleared.
async fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let mut remaining = total;
    while !remaining.is_zero() && running.load(Ordering::Relaxed) {
        let slice = remaining.min(SLEEP_SLICE);
        tokio::time::sleep(slice).await;
        remaining = remaining.saturating_sub(slice);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
