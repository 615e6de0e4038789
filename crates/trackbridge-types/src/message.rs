//! Protocol messages exchanged between the bridge and the remote side.
//!
//! A [`Message`] carries exactly one payload kind.  The wire encoding is left
//! to the transport; the types derive `serde` so JSON transports can use them
//! directly.

use serde::{Deserialize, Serialize};

use crate::math::{Quaternion, Vec3};
use crate::tracker::TrackerStatus;

/// One protocol event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Message {
    /// Transform update for one tracker.
    Position(Position),
    /// Connection status change for one tracker.
    TrackerStatus(StatusUpdate),
    /// Announcement of a tracker the sender owns.
    TrackerAdded(TrackerAdded),
    /// A named user action (e.g. `"reset"`).
    UserAction(UserAction),
}

/// Transform update.
///
/// Absent fields were not set by the sender.  Receivers apply the rotation
/// even when it is absent, reading the wire default ([`Quaternion::zero`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub tracker_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quaternion>,
}

/// Tracker status change.  `status` is the protocol status code; see
/// [`TrackerStatus::from_protocol`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub tracker_id: i32,
    pub status: u32,
}

/// Tracker announcement.  `role` is a protocol role id; see
/// [`TrackerRole::from_id`][crate::tracker::TrackerRole::from_id].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerAdded {
    pub tracker_id: i32,
    pub name: String,
    pub serial: String,
    pub role: u32,
}

/// Named user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAction {
    pub name: String,
}

impl Message {
    /// Build a [`Message::Position`].
    pub fn position(
        tracker_id: i32,
        position: Option<Vec3>,
        rotation: Option<Quaternion>,
    ) -> Self {
        Self::Position(Position {
            tracker_id,
            position,
            rotation,
        })
    }

    /// Build a [`Message::TrackerStatus`] from a local status.
    pub fn status(tracker_id: i32, status: TrackerStatus) -> Self {
        Self::TrackerStatus(StatusUpdate {
            tracker_id,
            status: status.protocol_code(),
        })
    }

    /// Build a [`Message::TrackerAdded`].
    pub fn tracker_added(
        tracker_id: i32,
        name: impl Into<String>,
        serial: impl Into<String>,
        role: u32,
    ) -> Self {
        Self::TrackerAdded(TrackerAdded {
            tracker_id,
            name: name.into(),
            serial: serial.into(),
            role,
        })
    }

    /// Build a [`Message::UserAction`].
    pub fn user_action(name: impl Into<String>) -> Self {
        Self::UserAction(UserAction { name: name.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_without_fields_decodes_to_none() {
        let msg: Message =
            serde_json::from_str(r#"{"type":"Position","payload":{"tracker_id":5}}"#).unwrap();
        match msg {
            Message::Position(p) => {
                assert_eq!(p.tracker_id, 5);
                assert!(p.position.is_none());
                assert!(p.rotation.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn absent_fields_are_not_serialised() {
        let json = serde_json::to_string(&Message::position(1, None, None)).unwrap();
        assert!(!json.contains("position\":"));
        assert!(!json.contains("rotation"));
    }

    #[test]
    fn status_builder_uses_protocol_code() {
        let msg = Message::status(9, TrackerStatus::Disconnected);
        assert_eq!(
            msg,
            Message::TrackerStatus(StatusUpdate {
                tracker_id: 9,
                status: 0
            })
        );
    }

    #[test]
    fn tracker_added_json_shape() {
        let msg = Message::tracker_added(3, "left foot", "lf-01", 2);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"TrackerAdded\""));
        assert!(json.contains("\"serial\":\"lf-01\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
