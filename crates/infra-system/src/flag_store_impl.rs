// Durable flag store adapter (key=value file, atomically rewritten)

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use chargekeeper_core::domain::StopReason;
use chargekeeper_core::error::{AppError, Result};
use chargekeeper_core::port::FlagStore;

const KEY_LAST_STOP_REASON: &str = "last_stop_reason";
const KEY_NOTIFICATION_DISMISSED: &str = "notification_dismissed";
const KEY_NEXT_CHECK_AT: &str = "next_check_at";

/// A handful of durable scalars in one small key=value file.
/// Writes go through a temp file + rename so a crash never
/// leaves a half-written store; reads of a missing/garbled store degrade to
/// the documented defaults.
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Flag store not readable");
                return map;
            }
        };

        for line in raw.lines() {
            if let Some((key, value)) = line.split_once('=') {
                map.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        map
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut map = self.load().await;
        map.insert(key.to_string(), value);

        let mut contents = String::new();
        for (k, v) in &map {
            contents.push_str(k);
            contents.push('=');
            contents.push_str(v);
            contents.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Store(format!("create {}: {e}", parent.display())))?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents)
            .await
            .map_err(|e| AppError::Store(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::Store(format!("rename {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl FlagStore for FileFlagStore {
    async fn last_stop_reason(&self) -> StopReason {
        self.load()
            .await
            .get(KEY_LAST_STOP_REASON)
            .and_then(|v| v.parse().ok())
            .map(StopReason::from_code)
            .unwrap_or(StopReason::Unknown)
    }

    async fn set_last_stop_reason(&self, reason: StopReason) -> Result<()> {
        self.set(KEY_LAST_STOP_REASON, reason.as_code().to_string())
            .await
    }

    async fn is_notification_dismissed(&self) -> bool {
        self.load()
            .await
            .get(KEY_NOTIFICATION_DISMISSED)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    async fn set_notification_dismissed(&self, dismissed: bool) -> Result<()> {
        self.set(KEY_NOTIFICATION_DISMISSED, dismissed.to_string())
            .await
    }

    async fn next_check_at(&self) -> Option<i64> {
        self.load()
            .await
            .get(KEY_NEXT_CHECK_AT)
            .and_then(|v| v.parse().ok())
            .filter(|at| *at > 0)
    }

    async fn set_next_check_at(&self, at_ms: i64) -> Result<()> {
        self.set(KEY_NEXT_CHECK_AT, at_ms.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_on_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFlagStore::new(dir.path().join("flags.properties"));

        assert_eq!(store.last_stop_reason().await, StopReason::Unknown);
        assert!(!store.is_notification_dismissed().await);
        assert_eq!(store.next_check_at().await, None);
    }

    #[tokio::test]
    async fn test_flags_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.properties");

        let store = FileFlagStore::new(&path);
        store
            .set_last_stop_reason(StopReason::Overheated)
            .await
            .unwrap();
        store.set_notification_dismissed(true).await.unwrap();
        store.set_next_check_at(123_456).await.unwrap();

        // A fresh instance (daemon restart) sees the same flags
        let reopened = FileFlagStore::new(&path);
        assert_eq!(reopened.last_stop_reason().await, StopReason::Overheated);
        assert!(reopened.is_notification_dismissed().await);
        assert_eq!(reopened.next_check_at().await, Some(123_456));
    }

    #[tokio::test]
    async fn test_garbled_values_degrade_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.properties");
        std::fs::write(
            &path,
            "last_stop_reason=banana\nnext_check_at=-5\nnot a pair\n",
        )
        .unwrap();

        let store = FileFlagStore::new(&path);
        assert_eq!(store.last_stop_reason().await, StopReason::Unknown);
        assert_eq!(store.next_check_at().await, None);
    }

    #[tokio::test]
    async fn test_updates_preserve_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFlagStore::new(dir.path().join("flags.properties"));

        store
            .set_last_stop_reason(StopReason::Overcharged)
            .await
            .unwrap();
        store.set_next_check_at(42).await.unwrap();

        assert_eq!(store.last_stop_reason().await, StopReason::Overcharged);
        assert_eq!(store.next_check_at().await, Some(42));
    }
}
