// Preference store port

use async_trait::async_trait;

use crate::domain::ChargeThresholds;
use crate::error::Result;

/// User-configured preferences, externally durable.
///
/// Snapshots are re-read on every use so an out-of-band edit (CLI + reload
/// signal) is picked up without daemon restart.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Current threshold snapshot
    async fn thresholds(&self) -> Result<ChargeThresholds>;

    /// Feature main switch
    async fn is_enabled(&self) -> Result<bool>;

    /// Whether to reset battery stats after a fully-limited charge session
    async fn reset_stats_on_charged(&self) -> Result<bool>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock PreferenceStore for testing
    pub struct MockPreferenceStore {
        thresholds: Arc<Mutex<ChargeThresholds>>,
        enabled: Arc<Mutex<bool>>,
        reset_stats: Arc<Mutex<bool>>,
    }

    impl MockPreferenceStore {
        pub fn new(thresholds: ChargeThresholds) -> Self {
            Self {
                thresholds: Arc::new(Mutex::new(thresholds)),
                enabled: Arc::new(Mutex::new(true)),
                reset_stats: Arc::new(Mutex::new(false)),
            }
        }

        pub fn set_thresholds(&self, thresholds: ChargeThresholds) {
            *self.thresholds.lock().unwrap() = thresholds;
        }

        pub fn set_enabled(&self, enabled: bool) {
            *self.enabled.lock().unwrap() = enabled;
        }

        pub fn set_reset_stats(&self, reset: bool) {
            *self.reset_stats.lock().unwrap() = reset;
        }
    }

    #[async_trait]
    impl PreferenceStore for MockPreferenceStore {
        async fn thresholds(&self) -> Result<ChargeThresholds> {
            Ok(self.thresholds.lock().unwrap().clone())
        }

        async fn is_enabled(&self) -> Result<bool> {
            Ok(*self.enabled.lock().unwrap())
        }

        async fn reset_stats_on_charged(&self) -> Result<bool> {
            Ok(*self.reset_stats.lock().unwrap())
        }
    }
}
