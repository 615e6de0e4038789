//! `trackbridge-types` – shared vocabulary of the tracking bridge.
//!
//! # Modules
//!
//! - [`math`] – [`Vec3`] and [`Quaternion`] as carried on the wire.
//! - [`message`] – the protocol [`Message`] union and its payloads.
//! - [`tracker`] – local status, role and body-placement enums together with
//!   their protocol id tables.

pub mod math;
pub mod message;
pub mod tracker;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use math::{Quaternion, Vec3};
pub use message::{Message, Position, StatusUpdate, TrackerAdded, UserAction};
pub use tracker::{TrackerPosition, TrackerRole, TrackerStatus};

/// Error type shared by the bridge core, its transports and the CLI.
///
/// Protocol-level anomalies (unknown tracker ids, duplicate announcements,
/// unrecognised user actions) are never errors; they are dropped and logged.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BridgeError {
    #[error("Transport Send Failed: {0}")]
    SendFailed(String),

    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Message Serialization Error: {0}")]
    Serialization(String),

    #[error("Unknown tracker position designation: {0}")]
    UnknownDesignation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_error_display() {
        let err = BridgeError::SendFailed("pipe closed".to_string());
        assert!(err.to_string().contains("Transport Send Failed"));
        assert!(err.to_string().contains("pipe closed"));

        let err2 = BridgeError::UnknownDesignation("body:tail".to_string());
        assert!(err2.to_string().contains("body:tail"));
    }

    #[test]
    fn bridge_error_is_serialisable() {
        let err = BridgeError::Transport("reset by peer".to_string());
        let json = serde_json::to_string(&err).unwrap();
        let back: BridgeError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
