// Battery telemetry adapter over power_supply virtual files

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, warn};

use chargekeeper_core::domain::{BatterySample, Reading};
use chargekeeper_core::port::BatteryTelemetry;

/// Virtual-file nodes the telemetry reader and actuators operate on.
/// Defaults match the common qcom power_supply layout; device overrides
/// come from the daemon config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatteryNodePaths {
    pub capacity: PathBuf,
    /// Reported in tenths of a degree Celsius
    pub temperature: PathBuf,
    pub charger_present: PathBuf,
    pub charging_enabled: PathBuf,
    pub max_current: PathBuf,
}

impl Default for BatteryNodePaths {
    fn default() -> Self {
        Self {
            capacity: PathBuf::from("/sys/class/power_supply/battery/capacity"),
            temperature: PathBuf::from("/sys/class/power_supply/battery/temp"),
            charger_present: PathBuf::from("/sys/class/power_supply/usb/present"),
            charging_enabled: PathBuf::from(
                "/sys/class/power_supply/battery/battery_charging_enabled",
            ),
            max_current: PathBuf::from(
                "/sys/class/power_supply/battery/constant_charge_current_max",
            ),
        }
    }
}

/// Reads battery counters from sysfs-style nodes (one value per line).
///
/// Every node is re-read on each `sample()` call; a missing or garbled node
/// degrades to a `Reading::Defaulted` field with a WARN, never an error.
pub struct SysfsBatteryTelemetry {
    paths: BatteryNodePaths,
}

impl SysfsBatteryTelemetry {
    pub fn new(paths: BatteryNodePaths) -> Self {
        Self { paths }
    }
}

/// First line of the node, trimmed; None when unreadable
async fn read_trimmed(path: &Path) -> Option<String> {
    match fs::read_to_string(path).await {
        Ok(raw) => raw.lines().next().map(|line| line.trim().to_string()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Battery node unreadable");
            None
        }
    }
}

async fn read_int(path: &Path) -> Reading<i32> {
    match read_trimmed(path).await.and_then(|s| s.parse().ok()) {
        Some(value) => Reading::Parsed(value),
        None => {
            warn!(path = %path.display(), "Defaulting unreadable battery node to 0");
            Reading::Defaulted(0)
        }
    }
}

/// Flag nodes report "1"/"0"; anything readable that isn't "1" is false
async fn read_flag(path: &Path) -> Reading<bool> {
    match read_trimmed(path).await {
        Some(raw) => Reading::Parsed(raw == "1"),
        None => {
            warn!(path = %path.display(), "Defaulting unreadable battery node to false");
            Reading::Defaulted(false)
        }
    }
}

#[async_trait]
impl BatteryTelemetry for SysfsBatteryTelemetry {
    async fn sample(&self) -> BatterySample {
        let capacity_percent = read_int(&self.paths.capacity).await;

        // Kernel reports tenths of a degree
        let temperature_celsius = match read_int(&self.paths.temperature).await {
            Reading::Parsed(tenths) => Reading::Parsed(tenths as f32 / 10.0),
            Reading::Defaulted(_) => Reading::Defaulted(0.0),
        };

        let is_plugged = read_flag(&self.paths.charger_present).await;
        let is_charging_enabled = read_flag(&self.paths.charging_enabled).await;

        BatterySample {
            capacity_percent,
            temperature_celsius,
            is_plugged,
            is_charging_enabled,
        }
    }
}
