//! Tracker status, role and body placement.
//!
//! Each enum carries the numeric id it has on the wire.  Ids are fixed by
//! the protocol and must never be renumbered.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// Local connection status of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackerStatus {
    Disconnected,
    #[default]
    Ok,
    Busy,
    Error,
    Occluded,
    /// Local only; never received from the remote side.
    TimedOut,
}

impl TrackerStatus {
    /// Translate a protocol status code into the local status.
    ///
    /// Returns `None` for codes the protocol does not define.
    pub fn from_protocol(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Disconnected),
            1 => Some(Self::Ok),
            2 => Some(Self::Busy),
            3 => Some(Self::Error),
            4 => Some(Self::Occluded),
            _ => None,
        }
    }

    /// Protocol code for this status.  [`TrackerStatus::TimedOut`] has no
    /// protocol counterpart and is reported as disconnected.
    pub fn protocol_code(self) -> u32 {
        match self {
            Self::Disconnected | Self::TimedOut => 0,
            Self::Ok => 1,
            Self::Busy => 2,
            Self::Error => 3,
            Self::Occluded => 4,
        }
    }
}

/// Protocol role of a tracker.  Id `0` means "no role assigned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerRole {
    Waist = 1,
    LeftFoot = 2,
    RightFoot = 3,
    Chest = 4,
    LeftKnee = 5,
    RightKnee = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftShoulder = 9,
    RightShoulder = 10,
    LeftHand = 11,
    RightHand = 12,
    LeftController = 13,
    RightController = 14,
    Head = 15,
    Neck = 16,
    Camera = 17,
    Keyboard = 18,
    Hmd = 19,
    Beacon = 20,
    GenericController = 21,
}

impl TrackerRole {
    const ALL: [Self; 21] = [
        Self::Waist,
        Self::LeftFoot,
        Self::RightFoot,
        Self::Chest,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHand,
        Self::RightHand,
        Self::LeftController,
        Self::RightController,
        Self::Head,
        Self::Neck,
        Self::Camera,
        Self::Keyboard,
        Self::Hmd,
        Self::Beacon,
        Self::GenericController,
    ];

    /// Protocol id of this role.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Resolve a protocol role id.  Returns `None` for `0` and unknown ids.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    /// Protocol id for an optional role, `0` when unassigned.
    pub fn id_or_unassigned(role: Option<Self>) -> u32 {
        role.map_or(0, Self::id)
    }
}

/// Where on the body a tracker is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerPosition {
    Head,
    Neck,
    Chest,
    Waist,
    Hip,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    LeftLowerArm,
    RightLowerArm,
    LeftUpperArm,
    RightUpperArm,
    LeftHand,
    RightHand,
    LeftShoulder,
    RightShoulder,
}

impl TrackerPosition {
    const ALL: [Self; 19] = [
        Self::Head,
        Self::Neck,
        Self::Chest,
        Self::Waist,
        Self::Hip,
        Self::LeftUpperLeg,
        Self::RightUpperLeg,
        Self::LeftLowerLeg,
        Self::RightLowerLeg,
        Self::LeftFoot,
        Self::RightFoot,
        Self::LeftLowerArm,
        Self::RightLowerArm,
        Self::LeftUpperArm,
        Self::RightUpperArm,
        Self::LeftHand,
        Self::RightHand,
        Self::LeftShoulder,
        Self::RightShoulder,
    ];

    /// String designation, e.g. `"body:left_foot"`.
    pub fn designation(self) -> &'static str {
        match self {
            Self::Head => "body:head",
            Self::Neck => "body:neck",
            Self::Chest => "body:chest",
            Self::Waist => "body:waist",
            Self::Hip => "body:hip",
            Self::LeftUpperLeg => "body:left_upper_leg",
            Self::RightUpperLeg => "body:right_upper_leg",
            Self::LeftLowerLeg => "body:left_lower_leg",
            Self::RightLowerLeg => "body:right_lower_leg",
            Self::LeftFoot => "body:left_foot",
            Self::RightFoot => "body:right_foot",
            Self::LeftLowerArm => "body:left_lower_arm",
            Self::RightLowerArm => "body:right_lower_arm",
            Self::LeftUpperArm => "body:left_upper_arm",
            Self::RightUpperArm => "body:right_upper_arm",
            Self::LeftHand => "body:left_hand",
            Self::RightHand => "body:right_hand",
            Self::LeftShoulder => "body:left_shoulder",
            Self::RightShoulder => "body:right_shoulder",
        }
    }

    /// The protocol role a tracker at this position is announced with.
    ///
    /// Some positions (waist, lower legs, lower arms) have no role.
    pub fn tracker_role(self) -> Option<TrackerRole> {
        match self {
            Self::Head => Some(TrackerRole::Hmd),
            Self::Neck => Some(TrackerRole::Neck),
            Self::Chest => Some(TrackerRole::Chest),
            Self::Hip => Some(TrackerRole::Waist),
            Self::LeftUpperLeg => Some(TrackerRole::LeftKnee),
            Self::RightUpperLeg => Some(TrackerRole::RightKnee),
            Self::LeftFoot => Some(TrackerRole::LeftFoot),
            Self::RightFoot => Some(TrackerRole::RightFoot),
            Self::LeftUpperArm => Some(TrackerRole::LeftElbow),
            Self::RightUpperArm => Some(TrackerRole::RightElbow),
            Self::LeftHand => Some(TrackerRole::LeftController),
            Self::RightHand => Some(TrackerRole::RightController),
            Self::LeftShoulder => Some(TrackerRole::LeftShoulder),
            Self::RightShoulder => Some(TrackerRole::RightShoulder),
            Self::Waist | Self::LeftLowerLeg | Self::RightLowerLeg => None,
            Self::LeftLowerArm | Self::RightLowerArm => None,
        }
    }

    /// Case-insensitive lookup by designation.
    pub fn from_designation(designation: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.designation().eq_ignore_ascii_case(designation))
    }

    /// The body position a role maps back to, if any.
    pub fn from_role(role: TrackerRole) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.tracker_role() == Some(role))
    }
}

impl FromStr for TrackerPosition {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_designation(s).ok_or_else(|| BridgeError::UnknownDesignation(s.to_string()))
    }
}
