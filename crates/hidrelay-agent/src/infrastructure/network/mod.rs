//! Network infrastructure: the outbound link to the HID endpoint.
//!
//! # Sub-modules
//!
//! - **`websocket`** – The [`Connector`]/[`Link`] seams and their
//!   `tokio-tungstenite` implementation.  One link is one WebSocket
//!   connection; every wire message is one text frame.
//!
//! - **`transport`** – [`TransportManager`], which owns the current link,
//!   tracks the connection state and runs the reconnect loop with backoff.
//!   Every write is bounded by a send timeout, so an endpoint that stops
//!   reading costs at most one timeout before the link is dropped.

pub mod transport;
pub mod websocket;

use std::time::Duration;

use thiserror::Error;

pub use transport::{ConnectionState, ReconnectPolicy, TransportManager};
pub use websocket::{Connector, Link, WebSocketConnector};

/// Errors from the endpoint transport.
///
/// None of these are fatal to the agent; the reconnect loop recovers from
/// all of them.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("connecting to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("send failed: {0}")]
    Send(String),

    /// The endpoint stopped reading and the write never completed.
    #[error("send did not complete within {0:?}")]
    SendTimeout(Duration),

    #[error("close failed: {0}")]
    Close(String),

    #[error("not connected")]
    NotConnected,

    #[error("a connection attempt is already in progress")]
    ConnectInProgress,
}
