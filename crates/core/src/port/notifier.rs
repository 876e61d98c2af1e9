// Notification sink port

use async_trait::async_trait;

use crate::error::Result;

/// What the monitoring notification displays.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationContent {
    pub limit_percent: i32,
    pub resume_percent: i32,
    pub temp_limit_celsius: i32,
    /// Current battery temperature at the time of posting
    pub battery_temp_celsius: f32,
    /// Next scheduled check, epoch ms (omitted from display when None)
    pub next_check_at: Option<i64>,
}

/// Notification sink with two user actions ("not now" and dismiss).
///
/// `show` is idempotent: re-posting replaces the previous notification.
/// The user actions come back to the monitor as events through whatever
/// channel the adapter is wired to; this port only covers posting.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, content: &NotificationContent) -> Result<()>;

    /// Clear the notification (the caller resets the dismissed flag)
    async fn remove(&self) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock Notifier that records show/remove calls
    pub struct MockNotifier {
        shown: Arc<Mutex<Vec<NotificationContent>>>,
        removes: Arc<Mutex<u32>>,
    }

    impl MockNotifier {
        pub fn new() -> Self {
            Self {
                shown: Arc::new(Mutex::new(Vec::new())),
                removes: Arc::new(Mutex::new(0)),
            }
        }

        pub fn show_count(&self) -> usize {
            self.shown.lock().unwrap().len()
        }

        pub fn last_content(&self) -> Option<NotificationContent> {
            self.shown.lock().unwrap().last().cloned()
        }

        pub fn remove_count(&self) -> u32 {
            *self.removes.lock().unwrap()
        }
    }

    impl Default for MockNotifier {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn show(&self, content: &NotificationContent) -> Result<()> {
            self.shown.lock().unwrap().push(content.clone());
            Ok(())
        }

        async fn remove(&self) -> Result<()> {
            *self.removes.lock().unwrap() += 1;
            Ok(())
        }
    }
}
