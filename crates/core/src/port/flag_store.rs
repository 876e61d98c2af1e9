// Durable flag store port

use async_trait::async_trait;

use crate::domain::StopReason;
use crate::error::Result;

/// Small durable flags surviving daemon restarts: last stop reason,
/// notification-dismissed marker and the next scheduled check time.
///
/// Reads degrade to the documented defaults on a missing/garbled store;
/// only writes can fail.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Last reason charging was stopped (default `Unknown`)
    async fn last_stop_reason(&self) -> StopReason;

    async fn set_last_stop_reason(&self, reason: StopReason) -> Result<()>;

    /// Whether the user dismissed the monitoring notification
    async fn is_notification_dismissed(&self) -> bool;

    async fn set_notification_dismissed(&self, dismissed: bool) -> Result<()>;

    /// Next scheduled reevaluation, epoch ms (`None` if never scheduled)
    async fn next_check_at(&self) -> Option<i64>;

    async fn set_next_check_at(&self, at_ms: i64) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory MockFlagStore for testing
    pub struct MockFlagStore {
        reason: Arc<Mutex<StopReason>>,
        dismissed: Arc<Mutex<bool>>,
        next_check_at: Arc<Mutex<Option<i64>>>,
    }

    impl MockFlagStore {
        pub fn new() -> Self {
            Self {
                reason: Arc::new(Mutex::new(StopReason::Unknown)),
                dismissed: Arc::new(Mutex::new(false)),
                next_check_at: Arc::new(Mutex::new(None)),
            }
        }

        pub fn with_reason(reason: StopReason) -> Self {
            let store = Self::new();
            *store.reason.lock().unwrap() = reason;
            store
        }
    }

    impl Default for MockFlagStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl FlagStore for MockFlagStore {
        async fn last_stop_reason(&self) -> StopReason {
            *self.reason.lock().unwrap()
        }

        async fn set_last_stop_reason(&self, reason: StopReason) -> Result<()> {
            *self.reason.lock().unwrap() = reason;
            Ok(())
        }

        async fn is_notification_dismissed(&self) -> bool {
            *self.dismissed.lock().unwrap()
        }

        async fn set_notification_dismissed(&self, dismissed: bool) -> Result<()> {
            *self.dismissed.lock().unwrap() = dismissed;
            Ok(())
        }

        async fn next_check_at(&self) -> Option<i64> {
            *self.next_check_at.lock().unwrap()
        }

        async fn set_next_check_at(&self, at_ms: i64) -> Result<()> {
            *self.next_check_at.lock().unwrap() = Some(at_ms);
            Ok(())
        }
    }
}
