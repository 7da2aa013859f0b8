//! WebSocket link to the HID endpoint.
//!
//! [`Connector`] and [`Link`] are the seams the transport manager is written
//! against.  The production pair, [`WebSocketConnector`] and
//! [`WebSocketLink`], is built on `tokio-tungstenite`.
//!
//! # Liveness
//!
//! The endpoint never sends application data, but a dead peer is only
//! noticed when something is read.  After the handshake the stream is split:
//! the write half stays in the link, and a background task drains the read
//! half.  When the peer closes or the read fails, the task clears the link's
//! `open` flag, and the reconnect loop picks that up on its next check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use super::TransportError;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;

/// Opens new links to the endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Link>, TransportError>;

    /// Human-readable endpoint, for logs.
    fn endpoint(&self) -> String;
}

/// One established connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Link: Send + Sync {
    /// Sends one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;

    /// `false` once the peer has closed or the read side failed.
    fn is_open(&self) -> bool;
}

// ── Production connector ──────────────────────────────────────────────────────

pub struct WebSocketConnector {
    url: String,
    timeout: Duration,
}

impl WebSocketConnector {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self { url: url.into(), timeout }
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self) -> Result<Box<dyn Link>, TransportError> {
        let (stream, _response) = tokio::time::timeout(self.timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| TransportError::Timeout { url: self.url.clone(), timeout: self.timeout })?
            .map_err(|e| TransportError::Connect { url: self.url.clone(), reason: e.to_string() })?;

        let (sink, mut source) = stream.split();
        let open = Arc::new(AtomicBool::new(true));
        let open_flag = Arc::clone(&open);

        let drain = tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(WsMessage::Close(frame)) => {
                        debug!(?frame, "endpoint closed the connection");
                        break;
                    }
                    // Pings are answered by tungstenite itself.
                    Ok(_) => {}
                    Err(e) => {
                        warn!("websocket read failed: {e}");
                        break;
                    }
                }
            }
            open_flag.store(false, Ordering::SeqCst);
        });

        Ok(Box::new(WebSocketLink { sink, open, drain }))
    }

    fn endpoint(&self) -> String {
        self.url.clone()
    }
}

pub struct WebSocketLink {
    sink: WsSink,
    open: Arc<AtomicBool>,
    drain: JoinHandle<()>,
}

#[async_trait]
impl Link for WebSocketLink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sink.send(WsMessage::Text(text)).await.map_err(|e| {
            self.open.store(false, Ordering::SeqCst);
            TransportError::Send(e.to_string())
        })
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.open.store(false, Ordering::SeqCst);
        let result = self.sink.close().await.map_err(|e| TransportError::Close(e.to_string()));
        self.drain.abort();
        result
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Drop for WebSocketLink {
    fn drop(&mut self) {
        self.drain.abort();
    }
}
