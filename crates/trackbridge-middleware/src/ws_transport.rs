//! WebSocket transport.
//!
//! [`WebSocketTransport`] accepts one remote client at a time and exchanges
//! [`Message`] values with it as JSON text frames:
//!
//! * inbound frames are decoded and handed to
//!   [`ProtocolBridge::on_message_received`]; frames that do not decode are
//!   logged and skipped,
//! * every flush interval the outbound queue is flushed into the client's
//!   writer,
//! * a new client triggers [`ProtocolBridge::on_reconnected`], a lost client
//!   [`ProtocolBridge::on_disconnected`].
//!
//! The writer buffer between a flush and the socket is bounded.  A full
//! buffer makes the flush stop, and frames still buffered (or whose write
//! failed) when the client goes away are put back at the head of the outbound
//! queue.  While no client is attached nothing is flushed, so outbound
//! messages accumulate and are delivered to the next client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, Sender, error::TrySendError};
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};
use trackbridge_types::{BridgeError, Message};
use tracing::{debug, error, info, warn};

use crate::bridge::ProtocolBridge;
use crate::transport::Transport;

/// Default interval between outbound flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

/// Frames a client's writer may have buffered before `send_raw` reports the
/// link as busy.
const CLIENT_BUFFER: usize = 64;

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Serves a [`ProtocolBridge`] to WebSocket clients.
#[derive(Clone)]
pub struct WebSocketTransport {
    bridge: Arc<ProtocolBridge>,
    flush_interval: Duration,
}

/// A message waiting for the socket, kept alongside its encoding so it can be
/// requeued if the write never happens.
struct Frame {
    message: Message,
    json: String,
}

/// [`Transport`] feeding the writer half of one client connection.
///
/// Sending fails while the writer's buffer is full and once the writer has
/// gone away.
struct ClientSink {
    frames: Sender<Frame>,
}

impl Transport for ClientSink {
    fn send_raw(&self, message: &Message) -> Result<(), BridgeError> {
        let json =
            serde_json::to_string(message).map_err(|e| BridgeError::Serialization(e.to_string()))?;
        self.frames
            .try_send(Frame {
                message: message.clone(),
                json,
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => BridgeError::SendFailed("client writer busy".to_string()),
                TrySendError::Closed(_) => {
                    BridgeError::SendFailed("client writer closed".to_string())
                }
            })
    }
}

impl WebSocketTransport {
    /// Create a transport for `bridge` using [`DEFAULT_FLUSH_INTERVAL`].
    pub fn new(bridge: Arc<ProtocolBridge>) -> Self {
        Self {
            bridge,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    /// Override the flush interval.
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Bind `addr` and serve clients until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] if the listener cannot be bound.
    pub async fn run(self, addr: SocketAddr) -> Result<(), BridgeError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BridgeError::Transport(format!("ws bind error on {addr}: {e}")))?;
        self.serve(listener).await;
        Ok(())
    }

    /// Serve clients from an already bound listener, one at a time.
    pub async fn serve(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    if let Err(e) = self.handle_client(stream, peer).await {
                        error!(peer = %peer, error = %e, "ws client error");
                    }
                }
                Err(e) => {
                    error!(error = %e, "ws accept error");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    async fn handle_client(&self, stream: TcpStream, peer: SocketAddr) -> Result<(), BridgeError> {
        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| BridgeError::Transport(format!("ws handshake from {peer}: {e}")))?;
        info!(bridge = %self.bridge.name(), peer = %peer, "ws client connected");

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let (frames, mut pending) = mpsc::channel::<Frame>(CLIENT_BUFFER);
        let sink = ClientSink { frames };
        let mut flush = tokio::time::interval(self.flush_interval);
        let mut undelivered = Vec::new();

        self.bridge.on_reconnected();

        loop {
            tokio::select! {
                _ = flush.tick() => {
                    self.bridge.flush_outbound(&sink);
                }
                Some(frame) = pending.recv() => {
                    if ws_tx.send(WsMessage::Text(frame.json.into())).await.is_err() {
                        undelivered.push(frame.message);
                        break;
                    }
                }
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(WsMessage::Close(_))) | None => break,
                        Some(Err(e)) => {
                            warn!(peer = %peer, error = %e, "ws read error");
                            break;
                        }
                        Some(Ok(WsMessage::Text(text))) => {
                            self.handle_incoming_text(text.as_str());
                        }
                        _ => {}
                    }
                }
            }
        }

        pending.close();
        while let Ok(frame) = pending.try_recv() {
            undelivered.push(frame.message);
        }
        if !undelivered.is_empty() {
            debug!(bridge = %self.bridge.name(), count = undelivered.len(), "requeueing undelivered frames");
            self.bridge.queue().requeue_outbound(undelivered);
        }

        self.bridge.on_disconnected();
        info!(bridge = %self.bridge.name(), peer = %peer, "ws client disconnected");
        Ok(())
    }

    /// Decode one text frame and queue it on the bridge.
    fn handle_incoming_text(&self, text: &str) {
        match serde_json::from_str::<Message>(text) {
            Ok(message) => self.bridge.on_message_received(message),
            Err(e) => {
                debug!(bridge = %self.bridge.name(), error = %e, "undecodable frame skipped");
            }
        }
    }
}
