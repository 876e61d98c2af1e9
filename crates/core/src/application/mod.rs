// Application Layer - Charging control use-cases

pub mod constants;
pub mod monitor;
pub mod reevaluator;
pub mod shutdown;

// Re-exports
pub use monitor::{BatteryMonitor, MonitorEvent};
pub use reevaluator::{poll_interval, reevaluate, ChargeDecision};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
