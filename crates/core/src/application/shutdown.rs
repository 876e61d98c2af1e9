//! Cooperative shutdown signal shared by the daemon's background tasks
//! (monitor actor, plug watcher, notification listener).

use tokio::sync::watch;

/// Receiving half, one per background task.
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check without waiting
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is requested. A dropped sender counts as a
    /// shutdown request, so tasks never hang on a dead channel.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Sending half, held by the daemon's signal loop.
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Request shutdown of every subscribed task
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }

    /// Subscribe another task
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }
}

pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_after_shutdown() {
        let (tx, mut token) = shutdown_channel();
        assert!(!token.is_shutdown());

        tx.shutdown();
        tokio::time::timeout(Duration::from_secs(1), token.wait())
            .await
            .unwrap();
        assert!(token.is_shutdown());
    }

    #[tokio::test]
    async fn test_dropped_sender_releases_waiters() {
        let (tx, _) = shutdown_channel();
        let mut token = tx.token();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), token.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_shutdown() {
        let (tx, _) = shutdown_channel();
        tx.shutdown();

        let token = tx.token();
        assert!(token.is_shutdown());
    }
}
