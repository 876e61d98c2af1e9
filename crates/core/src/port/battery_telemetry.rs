// Battery telemetry port

use async_trait::async_trait;

use crate::domain::BatterySample;

/// Read-side of the device: battery counters exposed as virtual files.
///
/// Reading never fails: missing or unparseable nodes degrade to
/// `Reading::Defaulted` fields in the sample, so the control loop always
/// has something to decide on.
#[async_trait]
pub trait BatteryTelemetry: Send + Sync {
    /// Take a fresh snapshot of capacity, temperature, charger presence and
    /// the current hardware charging-enabled state.
    async fn sample(&self) -> BatterySample;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::Reading;
    use std::sync::{Arc, Mutex};

    /// Mock BatteryTelemetry for testing
    pub struct MockBatteryTelemetry {
        sample: Arc<Mutex<BatterySample>>,
    }

    impl MockBatteryTelemetry {
        pub fn new(sample: BatterySample) -> Self {
            Self {
                sample: Arc::new(Mutex::new(sample)),
            }
        }

        pub fn set_sample(&self, sample: BatterySample) {
            *self.sample.lock().unwrap() = sample;
        }

        pub fn set_capacity(&self, percent: i32) {
            self.sample.lock().unwrap().capacity_percent = Reading::Parsed(percent);
        }

        pub fn set_temperature(&self, celsius: f32) {
            self.sample.lock().unwrap().temperature_celsius = Reading::Parsed(celsius);
        }

        pub fn set_plugged(&self, plugged: bool) {
            self.sample.lock().unwrap().is_plugged = Reading::Parsed(plugged);
        }

        pub fn set_charging_enabled(&self, enabled: bool) {
            self.sample.lock().unwrap().is_charging_enabled = Reading::Parsed(enabled);
        }
    }

    #[async_trait]
    impl BatteryTelemetry for MockBatteryTelemetry {
        async fn sample(&self) -> BatterySample {
            self.sample.lock().unwrap().clone()
        }
    }
}
