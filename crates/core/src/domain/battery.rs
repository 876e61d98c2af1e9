// Battery Domain Model

use serde::{Deserialize, Serialize};

/// Why charging was last stopped.
///
/// Selects the next poll interval and the temperature hysteresis band.
/// Persisted in the flag store as a stable integer code (0..3) so it
/// survives daemon restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    Unknown,
    Overheated,
    Overcharged,
    /// User pressed "not now" on the notification; the current plugged
    /// session stays suspended until the next unplug/replug.
    UserSuspended,
}

impl StopReason {
    /// Integer code used by the durable flag store
    pub fn as_code(self) -> i32 {
        match self {
            StopReason::Unknown => 0,
            StopReason::Overheated => 1,
            StopReason::Overcharged => 2,
            StopReason::UserSuspended => 3,
        }
    }

    /// Decode a flag-store code; unknown codes fall back to `Unknown`
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => StopReason::Overheated,
            2 => StopReason::Overcharged,
            3 => StopReason::UserSuspended,
            _ => StopReason::Unknown,
        }
    }
}

impl Default for StopReason {
    fn default() -> Self {
        StopReason::Unknown
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Unknown => write!(f, "UNKNOWN"),
            StopReason::Overheated => write!(f, "OVERHEATED"),
            StopReason::Overcharged => write!(f, "OVERCHARGED"),
            StopReason::UserSuspended => write!(f, "USER_SUSPENDED"),
        }
    }
}

/// A telemetry value that is either parsed from the source node or
/// substituted with a default because the node was missing/garbled.
///
/// Malformed telemetry never raises; it degrades to the default value.
/// Keeping the provenance lets callers log and tests assert on degraded
/// readings instead of silently matching them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<T> {
    Parsed(T),
    Defaulted(T),
}

impl<T: Copy> Reading<T> {
    /// The carried value, regardless of provenance
    pub fn get(&self) -> T {
        match self {
            Reading::Parsed(v) | Reading::Defaulted(v) => *v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Reading::Defaulted(_))
    }
}

/// One battery telemetry snapshot, read fresh before every decision.
///
/// `is_charging_enabled` is the hardware ground truth; the controller never
/// shadows it with its own last write.
#[derive(Debug, Clone, PartialEq)]
pub struct BatterySample {
    pub capacity_percent: Reading<i32>,
    pub temperature_celsius: Reading<f32>,
    pub is_plugged: Reading<bool>,
    pub is_charging_enabled: Reading<bool>,
}

impl BatterySample {
    /// Fully-parsed sample (test and mock convenience)
    pub fn parsed(
        capacity_percent: i32,
        temperature_celsius: f32,
        is_plugged: bool,
        is_charging_enabled: bool,
    ) -> Self {
        Self {
            capacity_percent: Reading::Parsed(capacity_percent),
            temperature_celsius: Reading::Parsed(temperature_celsius),
            is_plugged: Reading::Parsed(is_plugged),
            is_charging_enabled: Reading::Parsed(is_charging_enabled),
        }
    }

    /// True if any field was substituted with its default
    pub fn is_degraded(&self) -> bool {
        self.capacity_percent.is_defaulted()
            || self.temperature_celsius.is_defaulted()
            || self.is_plugged.is_defaulted()
            || self.is_charging_enabled.is_defaulted()
    }
}
