// Charging actuation port

use async_trait::async_trait;

use crate::error::Result;

/// Write-side of the device: charging switch and max-current node.
///
/// The monitor treats write failures as non-fatal (logged and ignored); the
/// hardware state is re-read on the next reevaluation anyway.
#[async_trait]
pub trait ChargeControl: Send + Sync {
    /// Write the charging switch ("1"/"0" on the virtual file)
    async fn set_charging_enabled(&self, enabled: bool) -> Result<()>;

    /// Write the opaque max-current passthrough value
    async fn set_max_current(&self, max_current_ua: &str) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock ChargeControl that records every write
    pub struct MockChargeControl {
        charging_writes: Arc<Mutex<Vec<bool>>>,
        max_current_writes: Arc<Mutex<Vec<String>>>,
    }

    impl MockChargeControl {
        pub fn new() -> Self {
            Self {
                charging_writes: Arc::new(Mutex::new(Vec::new())),
                max_current_writes: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Most recent charging-enabled write, if any
        pub fn last_charging_enabled(&self) -> Option<bool> {
            self.charging_writes.lock().unwrap().last().copied()
        }

        pub fn charging_writes(&self) -> Vec<bool> {
            self.charging_writes.lock().unwrap().clone()
        }

        pub fn max_current_writes(&self) -> Vec<String> {
            self.max_current_writes.lock().unwrap().clone()
        }
    }

    impl Default for MockChargeControl {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ChargeControl for MockChargeControl {
        async fn set_charging_enabled(&self, enabled: bool) -> Result<()> {
            self.charging_writes.lock().unwrap().push(enabled);
            Ok(())
        }

        async fn set_max_current(&self, max_current_ua: &str) -> Result<()> {
            self.max_current_writes
                .lock()
                .unwrap()
                .push(max_current_ua.to_string());
            Ok(())
        }
    }
}
