//! Tracker capability surface and host collaborator traits.
//!
//! The bridge never owns the host's tracker objects.  It talks to them only
//! through [`Tracker`], asks a [`TrackerFactory`] to materialise remote
//! trackers, and reaches host-wide operations through [`HostServer`].  All
//! three are injected at construction; there is no global host accessor.
//!
//! Trackers are shared between the tick and transport contexts, so every
//! [`Tracker`] method takes `&self` and implementations use interior
//! mutability.

use std::sync::{Arc, Mutex};

use trackbridge_types::{
    Quaternion, TrackerAdded, TrackerPosition, TrackerRole, TrackerStatus, Vec3,
};

use crate::lock;

/// What the bridge needs from a tracker.
pub trait Tracker: Send + Sync {
    /// Protocol-visible numeric id.
    fn id(&self) -> i32;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Serial string; defaults to the name.
    fn serial(&self) -> &str {
        self.name()
    }

    /// Where on the body the tracker is assigned, if anywhere.
    fn body_position(&self) -> Option<TrackerPosition>;

    /// Protocol role, derived from the body position.
    fn role(&self) -> Option<TrackerRole> {
        self.body_position().and_then(TrackerPosition::tracker_role)
    }

    fn position(&self) -> Vec3;
    fn set_position(&self, position: Vec3);
    fn rotation(&self) -> Quaternion;
    fn set_rotation(&self, rotation: Quaternion);
    fn status(&self) -> TrackerStatus;
    fn set_status(&self, status: TrackerStatus);

    /// Whether [`Tracker::position`] holds real data.
    fn has_position(&self) -> bool;

    /// Whether [`Tracker::rotation`] holds real data.
    fn has_rotation(&self) -> bool;

    /// Signal that one new sample has been applied.
    fn data_tick(&self);
}

/// Materialises remote trackers from announcements.
pub trait TrackerFactory: Send + Sync {
    fn create_tracker(&self, announcement: &TrackerAdded) -> Arc<dyn Tracker>;
}

/// Host-wide operations the bridge may trigger.
pub trait HostServer: Send + Sync {
    /// Make a newly announced (non-HMD) remote tracker visible to the host
    /// pipeline.  Called exactly once per tracker.
    fn register_tracker(&self, tracker: Arc<dyn Tracker>);

    /// Full reset of every tracker.  `source` names who asked for it.
    fn reset_trackers_full(&self, source: &str);

    /// Yaw-only reset of every tracker.
    fn reset_trackers_yaw(&self, source: &str);

    /// Rebuild the skeleton model from the current tracker set.
    fn update_skeleton_model(&self);
}

// ─────────────────────────────────────────────────────────────────────────────
// BasicTracker
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct TrackerState {
    position: Vec3,
    rotation: Quaternion,
    status: TrackerStatus,
    ticks: u64,
}

/// A plain in-memory [`Tracker`].
///
/// Suitable both for trackers the host owns and for remote trackers created
/// by [`BasicTrackerFactory`].
#[derive(Debug)]
pub struct BasicTracker {
    id: i32,
    name: String,
    serial: String,
    body_position: Option<TrackerPosition>,
    has_position: bool,
    has_rotation: bool,
    state: Mutex<TrackerState>,
}

impl BasicTracker {
    /// A tracker with position and rotation, status OK, identity rotation.
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            serial: name.clone(),
            name,
            body_position: None,
            has_position: true,
            has_rotation: true,
            state: Mutex::new(TrackerState {
                position: Vec3::zero(),
                rotation: Quaternion::identity(),
                status: TrackerStatus::Ok,
                ticks: 0,
            }),
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = serial.into();
        self
    }

    pub fn with_body_position(mut self, position: Option<TrackerPosition>) -> Self {
        self.body_position = position;
        self
    }

    /// Mark the tracker as orientation-only (an IMU without positional data).
    pub fn rotation_only(mut self) -> Self {
        self.has_position = false;
        self
    }

    /// Number of [`Tracker::data_tick`] calls so far.
    pub fn tick_count(&self) -> u64 {
        lock(&self.state).ticks
    }
}

impl Tracker for BasicTracker {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn serial(&self) -> &str {
        &self.serial
    }

    fn body_position(&self) -> Option<TrackerPosition> {
        self.body_position
    }

    fn position(&self) -> Vec3 {
        lock(&self.state).position
    }

    fn set_position(&self, position: Vec3) {
        lock(&self.state).position = position;
    }

    fn rotation(&self) -> Quaternion {
        lock(&self.state).rotation
    }

    fn set_rotation(&self, rotation: Quaternion) {
        lock(&self.state).rotation = rotation;
    }

    fn status(&self) -> TrackerStatus {
        lock(&self.state).status
    }

    fn set_status(&self, status: TrackerStatus) {
        lock(&self.state).status = status;
    }

    fn has_position(&self) -> bool {
        self.has_position
    }

    fn has_rotation(&self) -> bool {
        self.has_rotation
    }

    fn data_tick(&self) {
        lock(&self.state).ticks += 1;
    }
}

/// [`TrackerFactory`] producing [`BasicTracker`]s.
///
/// The announced role is mapped back to a body position when one exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicTrackerFactory;

impl TrackerFactory for BasicTrackerFactory {
    fn create_tracker(&self, announcement: &TrackerAdded) -> Arc<dyn Tracker> {
        let body_position =
            TrackerRole::from_id(announcement.role).and_then(TrackerPosition::from_role);
        Arc::new(
            BasicTracker::new(announcement.tracker_id, announcement.name.clone())
                .with_serial(announcement.serial.clone())
                .with_body_position(body_position),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tracker_defaults() {
        let t = BasicTracker::new(3, "chest");
        assert_eq!(t.id(), 3);
        assert_eq!(t.name(), "chest");
        assert_eq!(t.serial(), "chest");
        assert_eq!(t.status(), TrackerStatus::Ok);
        assert_eq!(t.rotation(), Quaternion::identity());
        assert!(t.has_position());
        assert!(t.has_rotation());
        assert_eq!(t.role(), None);
    }

    #[test]
    fn role_follows_body_position() {
        let t = BasicTracker::new(1, "foot").with_body_position(Some(TrackerPosition::LeftFoot));
        assert_eq!(t.role(), Some(TrackerRole::LeftFoot));

        let waist = BasicTracker::new(2, "waist").with_body_position(Some(TrackerPosition::Waist));
        assert_eq!(waist.role(), None);
    }

    #[test]
    fn setters_and_ticks() {
        let t = BasicTracker::new(1, "t").rotation_only();
        assert!(!t.has_position());
        t.set_position(Vec3::new(1.0, 2.0, 3.0));
        t.set_status(TrackerStatus::Busy);
        t.data_tick();
        t.data_tick();
        assert_eq!(t.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.status(), TrackerStatus::Busy);
        assert_eq!(t.tick_count(), 2);
    }

    #[test]
    fn factory_maps_role_to_body_position() {
        let tracker = BasicTrackerFactory.create_tracker(&TrackerAdded {
            tracker_id: 7,
            name: "Right foot".to_string(),
            serial: "rf-07".to_string(),
            role: TrackerRole::RightFoot.id(),
        });
        assert_eq!(tracker.id(), 7);
        assert_eq!(tracker.name(), "Right foot");
        assert_eq!(tracker.serial(), "rf-07");
        assert_eq!(tracker.body_position(), Some(TrackerPosition::RightFoot));
    }

    #[test]
    fn factory_leaves_unknown_role_unassigned() {
        let tracker = BasicTrackerFactory.create_tracker(&TrackerAdded {
            tracker_id: 8,
            name: "kbd".to_string(),
            serial: "kbd".to_string(),
            role: TrackerRole::Keyboard.id(),
        });
        assert_eq!(tracker.body_position(), None);
    }
}
