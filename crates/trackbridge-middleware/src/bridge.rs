//! [`ProtocolBridge`] – tick-synchronised bridge between a transport and the
//! host's tracking pipeline.
//!
//! # Threading
//!
//! The transport context calls [`ProtocolBridge::on_message_received`] and
//! [`ProtocolBridge::flush_outbound`] at any time.  The tick context calls
//! [`ProtocolBridge::read`] then [`ProtocolBridge::write`] once per frame.
//! Nothing here blocks: queues are non-blocking, registry locks are short and
//! never held across a tracker or transport call.
//!
//! # Tick
//!
//! `read` drains the inbound queue and applies each message:
//!
//! | Message | Effect |
//! |---|---|
//! | `Position` | update the remote tracker's transform; unknown ids are dropped |
//! | `TrackerStatus` | set the remote tracker's status; unknown ids are dropped |
//! | `TrackerAdded` | create and register the tracker once; repeats are ignored |
//! | `UserAction` | forwarded to the [`ResetDispatcher`] |
//!
//! If anything arrived and a remote HMD has been announced, the local HMD is
//! overwritten from it.  `write` only publishes shared trackers on ticks where
//! `read` saw data, so the bridge runs at the pace of the remote side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use trackbridge_types::{
    Message, Position, StatusUpdate, TrackerAdded, TrackerRole, TrackerStatus,
};
use tracing::{debug, info};

use crate::lock;
use crate::queue::DualQueue;
use crate::registry::RemoteTrackerRegistry;
use crate::reset::ResetDispatcher;
use crate::tracker::{HostServer, Tracker, TrackerFactory};
use crate::transport::Transport;

/// One bridge session between the host and a remote tracking source.
pub struct ProtocolBridge {
    name: String,
    queue: DualQueue,
    registry: RemoteTrackerRegistry,
    shared_trackers: Mutex<Vec<Arc<dyn Tracker>>>,
    /// The host's own HMD, overwritten from `hmd_tracker`.
    hmd: Arc<dyn Tracker>,
    /// Remote tracker announced with the HMD role.
    hmd_tracker: Mutex<Option<Arc<dyn Tracker>>>,
    had_new_data: AtomicBool,
    resets: ResetDispatcher,
    host: Arc<dyn HostServer>,
    factory: Arc<dyn TrackerFactory>,
}

impl ProtocolBridge {
    /// Create a bridge named `name` that overrides the local `hmd`.
    pub fn new(
        name: impl Into<String>,
        hmd: Arc<dyn Tracker>,
        host: Arc<dyn HostServer>,
        factory: Arc<dyn TrackerFactory>,
    ) -> Self {
        let name = name.into();
        Self {
            resets: ResetDispatcher::new(name.clone()),
            name,
            queue: DualQueue::new(),
            registry: RemoteTrackerRegistry::new(),
            shared_trackers: Mutex::new(Vec::new()),
            hmd,
            hmd_tracker: Mutex::new(None),
            had_new_data: AtomicBool::new(false),
            host,
            factory,
        }
    }

    /// Bridge name, used in logs and reset provenance tags.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remote trackers announced so far.
    pub fn registry(&self) -> &RemoteTrackerRegistry {
        &self.registry
    }

    /// The inbound/outbound queues.
    pub fn queue(&self) -> &DualQueue {
        &self.queue
    }

    /// The remote tracker announced with the HMD role, if any.
    pub fn hmd_tracker(&self) -> Option<Arc<dyn Tracker>> {
        lock(&self.hmd_tracker).clone()
    }

    /// Snapshot of the shared tracker set, in export order.
    pub fn shared_trackers(&self) -> Vec<Arc<dyn Tracker>> {
        lock(&self.shared_trackers).clone()
    }

    /// Whether the last [`ProtocolBridge::read`] applied any message.
    pub fn had_new_data(&self) -> bool {
        self.had_new_data.load(Ordering::Acquire)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transport side
    // ─────────────────────────────────────────────────────────────────────────

    /// Queue a decoded inbound message.  Thread-safe, never blocks.
    pub fn on_message_received(&self, message: Message) {
        self.queue.enqueue_inbound(message);
    }

    /// Queue a message for the remote side.
    pub fn send_message(&self, message: Message) {
        self.queue.enqueue_outbound(message);
    }

    /// Write queued outbound messages through `transport` until it fails.
    ///
    /// Returns the number of messages written.
    pub fn flush_outbound(&self, transport: &dyn Transport) -> usize {
        self.queue.flush_outbound(|message| {
            transport.send_raw(message).inspect_err(|e| {
                debug!(bridge = %self.name, error = %e, "send failed, flush deferred");
            })
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tick side
    // ─────────────────────────────────────────────────────────────────────────

    /// Drain and apply every inbound message, then run the HMD override.
    pub fn read(&self) {
        let messages = self.queue.drain_inbound();
        let had_new_data = !messages.is_empty();
        for message in messages {
            self.process_message(message);
        }
        self.had_new_data.store(had_new_data, Ordering::Release);

        if !had_new_data {
            return;
        }
        if let Some(source) = self.hmd_tracker() {
            // The skeleton ignores a disconnected HMD; rebuild it before the
            // override brings the HMD back.
            if self.hmd.status() == TrackerStatus::Disconnected {
                self.host.update_skeleton_model();
            }
            Self::apply_override(source.as_ref(), self.hmd.as_ref());
        }
    }

    /// Publish the transform of every shared tracker.
    ///
    /// Does nothing unless the preceding [`ProtocolBridge::read`] saw data.
    pub fn write(&self) {
        if !self.had_new_data() {
            return;
        }
        for tracker in self.shared_trackers() {
            self.send_message(Self::position_update(tracker.as_ref()));
        }
    }

    /// Copy transform and status from `source` onto `target` and tick it.
    pub fn apply_override(source: &dyn Tracker, target: &dyn Tracker) {
        target.set_position(source.position());
        target.set_rotation(source.rotation());
        target.set_status(source.status());
        target.data_tick();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Shared trackers
    // ─────────────────────────────────────────────────────────────────────────

    /// Announce a local tracker to the remote side.  Exporting a tracker that
    /// is already shared does nothing.
    pub fn export_tracker(&self, tracker: Arc<dyn Tracker>) {
        {
            let mut shared = lock(&self.shared_trackers);
            if shared.iter().any(|t| t.id() == tracker.id()) {
                return;
            }
            shared.push(Arc::clone(&tracker));
        }
        info!(bridge = %self.name, tracker_id = tracker.id(), name = tracker.name(), "exporting tracker");
        self.send_message(Self::announcement(tracker.as_ref()));
    }

    /// Stop sharing a tracker.
    ///
    /// The protocol has no removal message; the remote side is told the
    /// tracker is disconnected.
    pub fn retract_tracker(&self, tracker: &dyn Tracker) {
        lock(&self.shared_trackers).retain(|t| t.id() != tracker.id());
        info!(bridge = %self.name, tracker_id = tracker.id(), "retracting tracker");
        self.send_message(Message::status(tracker.id(), TrackerStatus::Disconnected));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-announce every shared tracker.  Call on every (re)connection; the
    /// protocol keeps no session state.
    pub fn on_reconnected(&self) {
        let shared = self.shared_trackers();
        info!(bridge = %self.name, shared = shared.len(), "connected, replaying shared trackers");
        for tracker in shared {
            self.send_message(Self::announcement(tracker.as_ref()));
        }
    }

    /// Mark every remote tracker, and the local HMD if it is being
    /// overridden, as disconnected.  Nothing is unregistered.
    pub fn on_disconnected(&self) {
        let count = self.registry.mark_all_disconnected();
        if self.hmd_tracker().is_some() {
            self.hmd.set_status(TrackerStatus::Disconnected);
        }
        info!(bridge = %self.name, remote_trackers = count, "disconnected");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Message handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn process_message(&self, message: Message) {
        match message {
            Message::Position(update) => self.position_received(update),
            Message::TrackerStatus(update) => self.status_received(update),
            Message::TrackerAdded(announcement) => self.tracker_added_received(announcement),
            Message::UserAction(action) => {
                self.resets.dispatch(&action.name, self.host.as_ref());
            }
        }
    }

    fn position_received(&self, update: Position) {
        let Some(tracker) = self.registry.lookup_by_id(update.tracker_id) else {
            debug!(bridge = %self.name, tracker_id = update.tracker_id, "position for unknown tracker dropped");
            return;
        };
        if let Some(position) = update.position {
            tracker.set_position(position);
        }
        // Rotation is applied even when absent, as the wire default.
        tracker.set_rotation(update.rotation.unwrap_or_default());
        tracker.data_tick();
    }

    fn status_received(&self, update: StatusUpdate) {
        let Some(tracker) = self.registry.lookup_by_id(update.tracker_id) else {
            debug!(bridge = %self.name, tracker_id = update.tracker_id, "status for unknown tracker dropped");
            return;
        };
        match TrackerStatus::from_protocol(update.status) {
            Some(status) => tracker.set_status(status),
            None => {
                debug!(bridge = %self.name, tracker_id = update.tracker_id, code = update.status, "unknown status code ignored");
            }
        }
    }

    fn tracker_added_received(&self, announcement: TrackerAdded) {
        if self.registry.lookup_by_id(announcement.tracker_id).is_some() {
            // TODO: decide whether a repeated announcement should refresh
            // name/serial/role; for now the first one wins.
            return;
        }
        let tracker = self.factory.create_tracker(&announcement);
        if !self.registry.register(Arc::clone(&tracker)) {
            return;
        }
        info!(
            bridge = %self.name,
            tracker_id = announcement.tracker_id,
            serial = %announcement.serial,
            role = announcement.role,
            "remote tracker added"
        );
        if announcement.role == TrackerRole::Hmd.id() {
            *lock(&self.hmd_tracker) = Some(tracker);
        } else {
            self.host.register_tracker(tracker);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Message builders
    // ─────────────────────────────────────────────────────────────────────────

    fn announcement(tracker: &dyn Tracker) -> Message {
        Message::tracker_added(
            tracker.id(),
            tracker.name(),
            tracker.name(),
            TrackerRole::id_or_unassigned(tracker.role()),
        )
    }

    fn position_update(tracker: &dyn Tracker) -> Message {
        Message::position(
            tracker.id(),
            tracker.has_position().then(|| tracker.position()),
            tracker.has_rotation().then(|| tracker.rotation()),
        )
    }
}
