// Domain Layer - Pure charging-control entities

pub mod battery;
pub mod error;
pub mod thresholds;

// Re-exports
pub use battery::{BatterySample, Reading, StopReason};
pub use error::DomainError;
pub use thresholds::ChargeThresholds;
