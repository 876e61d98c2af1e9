// Chargekeeper Infrastructure - System Adapters
// Implements: BatteryTelemetry, ChargeControl, FlagStore, PreferenceStore,
// Notifier, StatsResetter

pub mod battery_telemetry_impl;
pub mod charge_control_impl;
pub mod config;
pub mod flag_store_impl;
pub mod notifier_impl;
pub mod preference_store_impl;
pub mod stats_resetter_impl;

pub use battery_telemetry_impl::{BatteryNodePaths, SysfsBatteryTelemetry};
pub use charge_control_impl::SysfsChargeControl;
pub use config::RuntimeConfig;
pub use flag_store_impl::FileFlagStore;
pub use notifier_impl::{DbusNotifier, NoopNotifier};
pub use preference_store_impl::{FilePreferenceStore, Preferences};
pub use stats_resetter_impl::SubprocessStatsResetter;
