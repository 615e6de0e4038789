//! [`RemoteTrackerRegistry`] – trackers announced by the remote side.
//!
//! Trackers are indexed twice: by protocol id and by serial.  Each index has
//! its own lock and every operation takes at most one lock at a time.  No
//! lock is held while a [`Tracker`] method runs.
//!
//! Entries are never removed.  A disconnect only changes tracker status so
//! the same objects are reused when the remote side comes back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use trackbridge_types::TrackerStatus;

use crate::lock;
use crate::tracker::Tracker;

/// Thread-safe id/serial index of remote trackers.
#[derive(Default)]
pub struct RemoteTrackerRegistry {
    by_id: Mutex<HashMap<i32, Arc<dyn Tracker>>>,
    by_serial: Mutex<HashMap<String, Arc<dyn Tracker>>>,
}

impl RemoteTrackerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a tracker by protocol id.  Callable from any context.
    pub fn lookup_by_id(&self, id: i32) -> Option<Arc<dyn Tracker>> {
        lock(&self.by_id).get(&id).cloned()
    }

    /// Look up a tracker by serial.
    pub fn lookup_by_serial(&self, serial: &str) -> Option<Arc<dyn Tracker>> {
        lock(&self.by_serial).get(serial).cloned()
    }

    /// Insert `tracker` into both indexes.
    ///
    /// Returns `false` and leaves the registry untouched when a tracker with
    /// the same id is already registered.
    pub fn register(&self, tracker: Arc<dyn Tracker>) -> bool {
        {
            let mut by_id = lock(&self.by_id);
            if by_id.contains_key(&tracker.id()) {
                return false;
            }
            by_id.insert(tracker.id(), Arc::clone(&tracker));
        }
        lock(&self.by_serial).insert(tracker.serial().to_string(), tracker);
        true
    }

    /// Set every registered tracker to [`TrackerStatus::Disconnected`].
    ///
    /// Returns the number of trackers touched.
    pub fn mark_all_disconnected(&self) -> usize {
        let trackers: Vec<Arc<dyn Tracker>> = lock(&self.by_id).values().cloned().collect();
        for tracker in &trackers {
            tracker.set_status(TrackerStatus::Disconnected);
        }
        trackers.len()
    }

    /// Number of registered trackers.
    pub fn len(&self) -> usize {
        lock(&self.by_id).len()
    }

    /// Whether no remote tracker has been announced yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
