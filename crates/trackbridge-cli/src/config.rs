//! Bridge configuration – reads/writes `~/.trackbridge/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trackbridge_types::TrackerPosition;

/// A local tracker published to the remote side at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedTrackerConfig {
    pub id: i32,
    pub name: String,
    /// Body designation, e.g. `"body:left_foot"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl SharedTrackerConfig {
    /// Resolve the body designation.
    pub fn body_position(&self) -> Result<Option<TrackerPosition>, String> {
        self.position
            .as_deref()
            .map(|designation| designation.parse::<TrackerPosition>())
            .transpose()
            .map_err(|e| format!("tracker '{}': {e}", self.name))
    }
}

/// Persisted configuration stored in `~/.trackbridge/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Bridge name, used in logs and reset provenance tags.
    #[serde(default = "default_bridge_name")]
    pub bridge_name: String,

    /// WebSocket listen port.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Read/write cycles per second.
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    /// Milliseconds between outbound flushes.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Name of the local HMD tracker the bridge may override.
    #[serde(default = "default_hmd_name")]
    pub hmd_name: String,

    #[serde(default)]
    pub shared_trackers: Vec<SharedTrackerConfig>,
}

fn default_bridge_name() -> String {
    "websocket".to_string()
}
fn default_listen_port() -> u16 {
    21110
}
fn default_tick_rate_hz() -> u32 {
    100
}
fn default_flush_interval_ms() -> u64 {
    10
}
fn default_hmd_name() -> String {
    "HMD".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_name: default_bridge_name(),
            listen_port: default_listen_port(),
            tick_rate_hz: default_tick_rate_hz(),
            flush_interval_ms: default_flush_interval_ms(),
            hmd_name: default_hmd_name(),
            shared_trackers: Vec::new(),
        }
    }
}

/// Return the path to `~/.trackbridge/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".trackbridge").join("config.toml")
}

/// Load the config, falling back to defaults when the file is absent.
/// Environment overrides apply in both cases.
pub fn load_or_default() -> Result<Config, String> {
    load_or_default_from(&config_path())
}

pub(crate) fn load_or_default_from(path: &Path) -> Result<Config, String> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does not
/// exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `TRACKBRIDGE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `TRACKBRIDGE_BRIDGE_NAME` | `bridge_name` |
/// | `TRACKBRIDGE_PORT` | `listen_port` |
/// | `TRACKBRIDGE_TICK_HZ` | `tick_rate_hz` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TRACKBRIDGE_BRIDGE_NAME") {
        cfg.bridge_name = v;
    }
    if let Ok(v) = std::env::var("TRACKBRIDGE_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.listen_port = port;
    }
    if let Ok(v) = std::env::var("TRACKBRIDGE_TICK_HZ")
        && let Ok(hz) = v.parse::<u32>()
        && hz > 0
    {
        cfg.tick_rate_hz = hz;
    }
}

/// Write a default config file when none exists yet.
///
/// Returns `true` if a file was created.
pub fn write_default_if_missing() -> Result<bool, String> {
    let path = config_path();
    if path.exists() {
        return Ok(false);
    }
    save_to(&Config::default(), &path)?;
    Ok(true)
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
