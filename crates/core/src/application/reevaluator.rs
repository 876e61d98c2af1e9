//! Reevaluator - the hysteresis decision at the heart of the control loop
//!
//! Pure function: thresholds + fresh telemetry + last stop reason in,
//! target charging state + new stop reason out. The caller owns all side
//! effects (hardware writes, flag persistence), which keeps every branch
//! directly testable.

use std::time::Duration;

use crate::application::constants::{
    COOL_DOWN_BAND_CELSIUS, DEFAULT_POLL_INTERVAL, OVERCHARGED_POLL_INTERVAL,
    OVERHEATED_POLL_INTERVAL,
};
use crate::domain::{BatterySample, ChargeThresholds, StopReason};

/// Outcome of one reevaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeDecision {
    /// Target hardware charging state
    pub charging_enabled: bool,
    /// Stop reason after this decision (unchanged when nothing happened)
    pub reason: StopReason,
}

/// Decide whether charging should be enabled and why.
///
/// Hysteresis: after an overheat stop the effective temperature limit is
/// lowered by [`COOL_DOWN_BAND_CELSIUS`] so charging does not flap around
/// the threshold. `limit == resume` disables auto-resume entirely
/// (manual resume only).
pub fn reevaluate(
    thresholds: &ChargeThresholds,
    sample: &BatterySample,
    last_reason: StopReason,
) -> ChargeDecision {
    let was_overheated = last_reason == StopReason::Overheated;

    // Cool down by at least the band before the limit applies again
    let mut temp_limit = thresholds.temp_limit_celsius;
    if was_overheated {
        temp_limit -= COOL_DOWN_BAND_CELSIUS;
    }

    let capacity = sample.capacity_percent.get();
    let temperature = sample.temperature_celsius.get();
    let charging_enabled = sample.is_charging_enabled.get();

    let is_overcharged = capacity >= thresholds.limit_percent;
    let is_overheated = temperature >= temp_limit as f32;
    let is_resumable = capacity <= thresholds.resume_percent;

    if charging_enabled {
        if is_overcharged {
            ChargeDecision {
                charging_enabled: false,
                reason: StopReason::Overcharged,
            }
        } else if is_overheated {
            ChargeDecision {
                charging_enabled: false,
                reason: StopReason::Overheated,
            }
        } else {
            // Charging continues
            ChargeDecision {
                charging_enabled: true,
                reason: last_reason,
            }
        }
    } else if (is_resumable || was_overheated)
        && !thresholds.is_manual_resume_only()
        && !is_overheated
    {
        ChargeDecision {
            charging_enabled: true,
            reason: StopReason::Unknown,
        }
    } else {
        // Stays disabled
        ChargeDecision {
            charging_enabled: false,
            reason: last_reason,
        }
    }
}

/// Poll interval until the next reevaluation, keyed on the last stop
/// reason: back off when no state change is expected soon, poll tightly
/// during normal charge-up.
pub fn poll_interval(last_reason: StopReason) -> Duration {
    match last_reason {
        StopReason::Overcharged => OVERCHARGED_POLL_INTERVAL,
        StopReason::Overheated => OVERHEATED_POLL_INTERVAL,
        _ => DEFAULT_POLL_INTERVAL,
    }
}
