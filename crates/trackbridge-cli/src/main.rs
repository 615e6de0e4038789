//! `trackbridge` – stand-alone tracking bridge.
//!
//! 1. Loads `~/.trackbridge/config.toml` (written with defaults on first run).
//! 2. Creates a [`ProtocolBridge`] with a local HMD and exports the configured
//!    shared trackers.
//! 3. Serves the bridge over WebSocket and drives `read`/`write` at the
//!    configured tick rate until Ctrl-C.

mod config;
mod host;
mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use trackbridge_middleware::{
    BasicTracker, BasicTrackerFactory, ProtocolBridge, Tracker, WebSocketTransport,
};
use trackbridge_types::TrackerPosition;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::host::LoggingHost;

#[tokio::main]
async fn main() {
    let _guard = telemetry::init_tracing("trackbridge");

    match config::write_default_if_missing() {
        Ok(true) => info!(path = %config::config_path().display(), "wrote default config"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "could not write default config"),
    }
    let cfg = match config::load_or_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    info!(?cfg, "configuration loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_flag.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let host = Arc::new(LoggingHost::new());
    let bridge = match build_bridge(&cfg, Arc::clone(&host)) {
        Ok(bridge) => bridge,
        Err(e) => {
            error!(error = %e, "invalid shared tracker configuration");
            std::process::exit(1);
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.listen_port));
    let transport = WebSocketTransport::new(Arc::clone(&bridge))
        .with_flush_interval(Duration::from_millis(cfg.flush_interval_ms.max(1)));
    tokio::spawn(async move {
        if let Err(e) = transport.run(addr).await {
            error!(error = %e, "transport stopped");
        }
    });
    info!(bridge = %cfg.bridge_name, %addr, tick_rate_hz = cfg.tick_rate_hz, "bridge running");

    let mut ticker = tokio::time::interval(Duration::from_secs(1) / cfg.tick_rate_hz.max(1));
    while !shutdown.load(Ordering::SeqCst) {
        ticker.tick().await;
        bridge.read();
        bridge.write();
    }

    info!(
        remote_trackers = bridge.registry().len(),
        registered = host.trackers().len(),
        "shutting down"
    );
}

/// Build the bridge and export the configured shared trackers.
fn build_bridge(cfg: &Config, host: Arc<LoggingHost>) -> Result<Arc<ProtocolBridge>, String> {
    let hmd: Arc<dyn Tracker> =
        Arc::new(BasicTracker::new(0, cfg.hmd_name.clone()).with_body_position(Some(TrackerPosition::Head)));
    let bridge = Arc::new(ProtocolBridge::new(
        cfg.bridge_name.clone(),
        hmd,
        host,
        Arc::new(BasicTrackerFactory),
    ));

    for shared in &cfg.shared_trackers {
        let tracker = BasicTracker::new(shared.id, shared.name.clone())
            .with_body_position(shared.body_position()?);
        bridge.export_tracker(Arc::new(tracker));
    }
    Ok(bridge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SharedTrackerConfig;
    use trackbridge_types::{Message, TrackerRole};

    #[test]
    fn build_bridge_exports_configured_trackers() {
        let cfg = Config {
            shared_trackers: vec![
                SharedTrackerConfig {
                    id: 1,
                    name: "left foot".to_string(),
                    position: Some("body:left_foot".to_string()),
                },
                SharedTrackerConfig {
                    id: 2,
                    name: "waist".to_string(),
                    position: None,
                },
            ],
            ..Config::default()
        };

        let bridge = build_bridge(&cfg, Arc::new(LoggingHost::new())).expect("valid config");
        assert_eq!(bridge.name(), "websocket");
        assert_eq!(
            bridge.queue().drain_outbound(),
            vec![
                Message::tracker_added(1, "left foot", "left foot", TrackerRole::LeftFoot.id()),
                Message::tracker_added(2, "waist", "waist", 0),
            ]
        );
    }

    #[test]
    fn build_bridge_rejects_unknown_designation() {
        let cfg = Config {
            shared_trackers: vec![SharedTrackerConfig {
                id: 1,
                name: "tail".to_string(),
                position: Some("body:tail".to_string()),
            }],
            ..Config::default()
        };
        assert!(build_bridge(&cfg, Arc::new(LoggingHost::new())).is_err());
    }
}
