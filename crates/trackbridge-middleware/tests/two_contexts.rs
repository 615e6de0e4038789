//! Drives a bridge from a transport thread and a tick thread at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use trackbridge_middleware::{
    BasicTracker, BasicTrackerFactory, HostServer, ProtocolBridge, Tracker, Transport,
};
use trackbridge_types::{
    BridgeError, Message, Quaternion, TrackerPosition, TrackerRole, TrackerStatus, Vec3,
};

#[derive(Default)]
struct CountingHost {
    registered: Mutex<Vec<i32>>,
}

impl HostServer for CountingHost {
    fn register_tracker(&self, tracker: Arc<dyn Tracker>) {
        self.registered.lock().unwrap().push(tracker.id());
    }
    fn reset_trackers_full(&self, _source: &str) {}
    fn reset_trackers_yaw(&self, _source: &str) {}
    fn update_skeleton_model(&self) {}
}

#[derive(Default)]
struct CollectingTransport {
    sent: Mutex<Vec<Message>>,
    down: AtomicBool,
}

impl Transport for CollectingTransport {
    fn send_raw(&self, message: &Message) -> Result<(), BridgeError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(BridgeError::SendFailed("link down".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn make_bridge(host: Arc<CountingHost>) -> Arc<ProtocolBridge> {
    Arc::new(ProtocolBridge::new(
        "integration",
        Arc::new(BasicTracker::new(0, "HMD").with_body_position(Some(TrackerPosition::Head))),
        host,
        Arc::new(BasicTrackerFactory),
    ))
}

#[test]
fn transport_thread_and_tick_thread_cooperate() {
    let host = Arc::new(CountingHost::default());
    let bridge = make_bridge(Arc::clone(&host));

    let transport = {
        let bridge = Arc::clone(&bridge);
        thread::spawn(move || {
            for id in 0..20 {
                bridge.on_message_received(Message::tracker_added(
                    id,
                    format!("t{id}"),
                    format!("serial-{id}"),
                    TrackerRole::Waist.id(),
                ));
                bridge.on_message_received(Message::position(
                    id,
                    Some(Vec3::new(id as f32, 0.0, 0.0)),
                    Some(Quaternion::identity()),
                ));
            }
        })
    };

    let mut ticks = 0;
    while bridge.registry().len() < 20 && ticks < 1000 {
        bridge.read();
        bridge.write();
        ticks += 1;
        thread::sleep(Duration::from_millis(1));
    }
    transport.join().unwrap();
    bridge.read();

    assert_eq!(bridge.registry().len(), 20);
    assert_eq!(host.registered.lock().unwrap().len(), 20);
    for id in 0..20 {
        let tracker = bridge.registry().lookup_by_id(id).unwrap();
        assert_eq!(tracker.position(), Vec3::new(id as f32, 0.0, 0.0));
        assert_eq!(tracker.serial(), format!("serial-{id}"));
    }
}

#[test]
fn outbound_survives_a_down_link() {
    let host = Arc::new(CountingHost::default());
    let bridge = make_bridge(host);
    let link = CollectingTransport::default();

    let foot: Arc<dyn Tracker> =
        Arc::new(BasicTracker::new(9, "left foot").with_body_position(Some(TrackerPosition::LeftFoot)));
    bridge.export_tracker(Arc::clone(&foot));

    link.down.store(true, Ordering::SeqCst);
    assert_eq!(bridge.flush_outbound(&link), 0);

    bridge.on_message_received(Message::user_action("noop"));
    bridge.read();
    bridge.write();
    bridge.retract_tracker(foot.as_ref());

    link.down.store(false, Ordering::SeqCst);
    assert_eq!(bridge.flush_outbound(&link), 3);
    let sent = link.sent.lock().unwrap();
    assert!(matches!(&sent[0], Message::TrackerAdded(a) if a.tracker_id == 9));
    assert!(matches!(&sent[1], Message::Position(p) if p.tracker_id == 9));
    assert_eq!(sent[2], Message::status(9, TrackerStatus::Disconnected));
}
