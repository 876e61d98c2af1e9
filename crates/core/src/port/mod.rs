// Port Layer - Interfaces for external dependencies

pub mod battery_telemetry;
pub mod charge_control;
pub mod flag_store;
pub mod notifier;
pub mod preference_store;
pub mod stats_resetter;
pub mod time_provider;

// Re-exports
pub use battery_telemetry::BatteryTelemetry;
pub use charge_control::ChargeControl;
pub use flag_store::FlagStore;
pub use notifier::{NotificationContent, Notifier};
pub use preference_store::PreferenceStore;
pub use stats_resetter::StatsResetter;
pub use time_provider::TimeProvider;
