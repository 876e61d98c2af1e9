// Runtime configuration (daemon and CLI)

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::battery_telemetry_impl::BatteryNodePaths;

const SYSTEM_CONFIG_PATH: &str = "/etc/chargekeeper/config.toml";

/// Daemon/CLI configuration: defaults → config file → `CHARGEKEEPER_*`
/// environment variables. User preferences live in a separate CLI-editable
/// file under `state_dir` (see `preferences_path`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Where preferences, flags and the pidfile live
    pub state_dir: PathBuf,
    /// Battery virtual-file nodes
    pub battery: BatteryNodePaths,
    /// Charger plug-state poll interval (seconds)
    pub plug_poll_secs: u64,
    /// Optional command to run after a fully-limited charge session
    pub stats_reset_command: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            battery: BatteryNodePaths::default(),
            plug_poll_secs: 2,
            stats_reset_command: Vec::new(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    match ProjectDirs::from("", "", "chargekeeper") {
        Some(dirs) => dirs.data_local_dir().to_path_buf(),
        // No HOME (system service): fall back to the system location
        None => PathBuf::from("/var/lib/chargekeeper"),
    }
}

impl RuntimeConfig {
    /// Load from `$CHARGEKEEPER_CONFIG`, else the system config path, with
    /// environment overrides on top. A missing file just means defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("CHARGEKEEPER_CONFIG")
            .unwrap_or_else(|_| SYSTEM_CONFIG_PATH.to_string());

        Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix("CHARGEKEEPER").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.state_dir.join("preferences.toml")
    }

    pub fn flags_path(&self) -> PathBuf {
        self.state_dir.join("flags.properties")
    }

    pub fn pidfile_path(&self) -> PathBuf {
        self.state_dir.join("chargekeeperd.pid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();

        assert_eq!(config.plug_poll_secs, 2);
        assert!(config.stats_reset_command.is_empty());
        assert_eq!(
            config.battery.capacity,
            PathBuf::from("/sys/class/power_supply/battery/capacity")
        );
        assert_eq!(
            config.preferences_path(),
            config.state_dir.join("preferences.toml")
        );
    }

    #[test]
    fn test_config_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
plug_poll_secs = 7

[battery]
capacity = "/tmp/fake/capacity"
"#,
        )
        .unwrap();

        let config: RuntimeConfig = Config::builder()
            .add_source(File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.plug_poll_secs, 7);
        assert_eq!(config.battery.capacity, PathBuf::from("/tmp/fake/capacity"));
        // Unspecified nodes keep their defaults
        assert_eq!(
            config.battery.temperature,
            PathBuf::from("/sys/class/power_supply/battery/temp")
        );
    }
}
