//! The transport seam.
//!
//! The bridge never touches a pipe, socket or shared-memory segment itself.
//! A concrete transport owns the I/O and talks to the
//! [`ProtocolBridge`][crate::bridge::ProtocolBridge] through four calls:
//!
//! * `on_message_received` for every decoded inbound [`Message`],
//! * `on_reconnected` / `on_disconnected` on connection changes,
//! * `flush_outbound` on its own schedule, passing itself as the
//!   [`Transport`] that writes each message.
//!
//! [`WebSocketTransport`][crate::ws_transport::WebSocketTransport] is the
//! bundled implementation.

use trackbridge_types::{BridgeError, Message};

/// Writes one message to the remote side.
///
/// # Contract
///
/// * Must not block for long; it is called in a loop by
///   [`ProtocolBridge::flush_outbound`][crate::bridge::ProtocolBridge::flush_outbound].
/// * An `Err` means "stop flushing for now".  The message stays queued and
///   is offered again on the next flush.  Retry cadence is up to the caller
///   of `flush_outbound`.
pub trait Transport {
    fn send_raw(&self, message: &Message) -> Result<(), BridgeError>;
}
