// Charge Threshold Snapshot

use serde::{Deserialize, Serialize};

use crate::application::constants::{
    DEFAULT_CHARGE_LIMIT_PERCENT, DEFAULT_CHARGE_RESUME_PERCENT, DEFAULT_MAX_CURRENT_UA,
    DEFAULT_TEMP_LIMIT_CELSIUS,
};

/// User-configured charging thresholds, snapshotted once per reevaluation.
///
/// `resume_percent < limit_percent` is expected but not enforced here:
/// `limit_percent == resume_percent` is the documented "manual-only resume"
/// escape hatch, and an inverted pair is surfaced to the user as a warning
/// at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeThresholds {
    /// Charging stops at/above this battery percentage
    pub limit_percent: i32,
    /// Charging resumes at/below this battery percentage
    pub resume_percent: i32,
    /// Charging stops at/above this temperature (°C)
    pub temp_limit_celsius: i32,
    /// Opaque passthrough written to the max-current hardware node
    pub max_current_ua: String,
}

impl Default for ChargeThresholds {
    fn default() -> Self {
        Self {
            limit_percent: DEFAULT_CHARGE_LIMIT_PERCENT,
            resume_percent: DEFAULT_CHARGE_RESUME_PERCENT,
            temp_limit_celsius: DEFAULT_TEMP_LIMIT_CELSIUS,
            max_current_ua: DEFAULT_MAX_CURRENT_UA.to_string(),
        }
    }
}

impl ChargeThresholds {
    /// True when auto-resume can never trigger (limit == resume)
    pub fn is_manual_resume_only(&self) -> bool {
        self.limit_percent == self.resume_percent
    }
}
