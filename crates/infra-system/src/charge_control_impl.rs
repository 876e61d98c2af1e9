// Charging actuation adapter over power_supply virtual files

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use chargekeeper_core::error::{AppError, Result};
use chargekeeper_core::port::ChargeControl;

use crate::battery_telemetry_impl::BatteryNodePaths;

/// Writes the charging switch and max-current nodes.
pub struct SysfsChargeControl {
    paths: BatteryNodePaths,
}

impl SysfsChargeControl {
    pub fn new(paths: BatteryNodePaths) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl ChargeControl for SysfsChargeControl {
    async fn set_charging_enabled(&self, enabled: bool) -> Result<()> {
        let value = if enabled { "1" } else { "0" };
        debug!(path = %self.paths.charging_enabled.display(), value, "Writing charging switch");

        fs::write(&self.paths.charging_enabled, value)
            .await
            .map_err(|e| {
                AppError::Actuation(format!(
                    "write {}: {e}",
                    self.paths.charging_enabled.display()
                ))
            })
    }

    async fn set_max_current(&self, max_current_ua: &str) -> Result<()> {
        debug!(
            path = %self.paths.max_current.display(),
            value = max_current_ua,
            "Writing max charging current"
        );

        fs::write(&self.paths.max_current, max_current_ua)
            .await
            .map_err(|e| {
                AppError::Actuation(format!("write {}: {e}", self.paths.max_current.display()))
            })
    }
}
