// Battery stats reset port

use async_trait::async_trait;

use crate::error::Result;

/// Fire-and-forget external stats-reset command, invoked after a charge
/// session that hit the configured limit. Failures are logged and ignored;
/// there is no retry.
#[async_trait]
pub trait StatsResetter: Send + Sync {
    async fn reset(&self) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock StatsResetter counting invocations
    pub struct MockStatsResetter {
        count: Arc<Mutex<u32>>,
    }

    impl MockStatsResetter {
        pub fn new() -> Self {
            Self {
                count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn reset_count(&self) -> u32 {
            *self.count.lock().unwrap()
        }
    }

    impl Default for MockStatsResetter {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl StatsResetter for MockStatsResetter {
        async fn reset(&self) -> Result<()> {
            *self.count.lock().unwrap() += 1;
            Ok(())
        }
    }
}
