// Charging control constants (no magic values)
use std::time::Duration;

/// Cool-down band after an overheat stop: the battery must drop this many
/// °C below the configured limit before charging may resume
pub const COOL_DOWN_BAND_CELSIUS: i32 = 3;

/// Poll interval while stopped at the charge limit (no state change soon)
pub const OVERCHARGED_POLL_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Poll interval while cooling down after an overheat stop
pub const OVERHEATED_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Poll interval during normal charge-up
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Default charge-stop threshold (battery %)
pub const DEFAULT_CHARGE_LIMIT_PERCENT: i32 = 80;

/// Default charge-resume threshold (battery %)
pub const DEFAULT_CHARGE_RESUME_PERCENT: i32 = 60;

/// Default temperature limit (°C)
pub const DEFAULT_TEMP_LIMIT_CELSIUS: i32 = 35;

/// Hardware default for the max-current node, restored when monitoring stops
pub const DEFAULT_MAX_CURRENT_UA: &str = "3000000";
