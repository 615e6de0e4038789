//! [`LoggingHost`] – stand-alone host used by the binary.
//!
//! There is no skeleton solver behind the binary, so host operations are
//! recorded and logged.

use std::sync::{Arc, Mutex, PoisonError};

use trackbridge_middleware::{HostServer, Tracker};
use tracing::info;

#[derive(Default)]
pub struct LoggingHost {
    trackers: Mutex<Vec<Arc<dyn Tracker>>>,
}

impl LoggingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trackers registered so far, in registration order.
    pub fn trackers(&self) -> Vec<Arc<dyn Tracker>> {
        self.trackers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HostServer for LoggingHost {
    fn register_tracker(&self, tracker: Arc<dyn Tracker>) {
        info!(tracker_id = tracker.id(), name = tracker.name(), serial = tracker.serial(), "host: tracker registered");
        self.trackers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tracker);
    }

    fn reset_trackers_full(&self, source: &str) {
        info!(source = %source, "host: full reset");
    }

    fn reset_trackers_yaw(&self, source: &str) {
        info!(source = %source, "host: yaw reset");
    }

    fn update_skeleton_model(&self) {
        info!("host: skeleton rebuild");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackbridge_middleware::BasicTracker;

    #[test]
    fn registered_trackers_are_kept_in_order() {
        let host = LoggingHost::new();
        host.register_tracker(Arc::new(BasicTracker::new(2, "b")));
        host.register_tracker(Arc::new(BasicTracker::new(1, "a")));
        host.reset_trackers_full("ProtocolBridge: test");

        let ids: Vec<i32> = host.trackers().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
