//! `trackbridge-middleware` – the bridging core.
//!
//! Connects a host's tracking pipeline to an external tracking source across
//! a protocol boundary.  A transport context performs the I/O and a tick
//! context owns the tracker objects; the two only meet at the queues and the
//! remote-tracker registry.
//!
//! # Modules
//!
//! - [`queue`] – [`DualQueue`]: inbound and outbound FIFO channels with
//!   non-blocking push and bulk drain.
//! - [`registry`] – [`RemoteTrackerRegistry`]: remote trackers keyed by
//!   protocol id and by serial.
//! - [`tracker`] – the [`Tracker`] capability surface, host collaborator
//!   traits and a ready-made [`BasicTracker`].
//! - [`reset`] – [`ResetDispatcher`]: maps user actions to host resets.
//! - [`transport`] – the [`Transport`] trait concrete transports implement.
//! - [`bridge`] – [`ProtocolBridge`]: tick processing, lifecycle, shared
//!   tracker export and HMD override.
//! - [`ws_transport`] – [`WebSocketTransport`]: JSON messages over a
//!   WebSocket connection.

pub mod bridge;
pub mod queue;
pub mod registry;
pub mod reset;
pub mod tracker;
pub mod transport;
pub mod ws_transport;

pub use bridge::ProtocolBridge;
pub use queue::DualQueue;
pub use registry::RemoteTrackerRegistry;
pub use reset::{ResetAction, ResetDispatcher};
pub use tracker::{BasicTracker, BasicTrackerFactory, HostServer, Tracker, TrackerFactory};
pub use transport::Transport;
pub use ws_transport::WebSocketTransport;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
