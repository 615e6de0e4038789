//! [`ResetDispatcher`] – user actions to host-wide resets.
//!
//! | Action name | Effect |
//! |---|---|
//! | `"reset"` | [`HostServer::reset_trackers_full`] |
//! | `"fast_reset"` | [`HostServer::reset_trackers_yaw`] |
//! | `"calibrate"` | deprecated; warns, then behaves like `"reset"` |
//! | anything else | ignored |
//!
//! Every reset is tagged with `"ProtocolBridge: <bridge name>"` so the host
//! can report which bridge asked for it.

use tracing::warn;

use crate::tracker::HostServer;

/// Prefix of the provenance tag attached to every reset.
pub const RESET_SOURCE_PREFIX: &str = "ProtocolBridge";

/// Kind of reset a user action resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetAction {
    Full,
    Yaw,
}

impl ResetAction {
    /// Resolve a user action name.  `"calibrate"` resolves to
    /// [`ResetAction::Full`].
    pub fn from_action_name(name: &str) -> Option<Self> {
        match name {
            "reset" | "calibrate" => Some(Self::Full),
            "fast_reset" => Some(Self::Yaw),
            _ => None,
        }
    }
}

/// Maps user action names onto host resets for one bridge.
#[derive(Debug, Clone)]
pub struct ResetDispatcher {
    bridge_name: String,
    source: String,
}

impl ResetDispatcher {
    /// Dispatcher tagging resets with `"ProtocolBridge: <bridge_name>"`.
    pub fn new(bridge_name: impl Into<String>) -> Self {
        let bridge_name = bridge_name.into();
        let source = format!("{RESET_SOURCE_PREFIX}: {bridge_name}");
        Self {
            bridge_name,
            source,
        }
    }

    /// The provenance tag passed to the host.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Apply the user action `name` to `host`.
    ///
    /// Returns the reset that was triggered, or `None` if the action was not
    /// recognised.
    pub fn dispatch(&self, name: &str, host: &dyn HostServer) -> Option<ResetAction> {
        if name == "calibrate" {
            warn!(bridge = %self.bridge_name, "received deprecated user action 'calibrate'");
        }
        let action = ResetAction::from_action_name(name)?;
        match action {
            ResetAction::Full => host.reset_trackers_full(&self.source),
            ResetAction::Yaw => host.reset_trackers_yaw(&self.source),
        }
        Some(action)
    }
}
