//! Configuration Vault – reads/writes `~/.padbot/config.toml`.

use padbot_driver::DriverConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted mapper configuration stored in `~/.padbot/config.toml`.
///
/// ```toml
/// base_url = "http://192.168.1.20:5000"
///
/// [driver]
/// poll_interval_ms = 1000
/// request_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the robot's HTTP gateway. Empty means "not configured";
    /// the mapper then idles without touching the network.
    #[serde(default)]
    pub base_url: String,

    /// Poller and dispatcher tunables.
    #[serde(default)]
    pub driver: DriverConfig,
}

/// Return the path to `~/.padbot/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".padbot").join("config.toml")
}

/// Load the config from disk and apply `PADBOT_*` overrides.  Returns `None`
/// if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Load the config from a specific path.
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

/// Apply `PADBOT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PADBOT_BASE_URL` | `base_url` |
/// | `PADBOT_POLL_INTERVAL_MS` | `driver.poll_interval_ms` |
/// | `PADBOT_REQUEST_TIMEOUT_MS` | `driver.request_timeout_ms` |
///
/// Unparsable numbers are ignored. The driver raises a poll period below
/// its minimum to that minimum.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PADBOT_BASE_URL") {
        cfg.base_url = v;
    }
    if let Ok(v) = std::env::var("PADBOT_POLL_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.driver.poll_interval_ms = ms;
    }
    if let Ok(v) = std::env::var("PADBOT_REQUEST_TIMEOUT_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.driver.request_timeout_ms = ms;
    }
}

/// Save the config to disk, creating `~/.padbot/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
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
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
