// Preference store adapter (TOML file, CLI-editable)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use chargekeeper_core::application::constants::{
    DEFAULT_CHARGE_LIMIT_PERCENT, DEFAULT_CHARGE_RESUME_PERCENT, DEFAULT_MAX_CURRENT_UA,
    DEFAULT_TEMP_LIMIT_CELSIUS,
};
use chargekeeper_core::domain::ChargeThresholds;
use chargekeeper_core::error::{AppError, Result};
use chargekeeper_core::port::PreferenceStore;

/// On-disk user preferences.
/// The CLI rewrites this file; the daemon re-reads it on every use and is
/// nudged by SIGHUP when something changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub enabled: bool,
    pub limit_percent: i32,
    pub resume_percent: i32,
    pub temp_limit_celsius: i32,
    pub max_current_ua: String,
    pub reset_stats_on_charged: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            enabled: false,
            limit_percent: DEFAULT_CHARGE_LIMIT_PERCENT,
            resume_percent: DEFAULT_CHARGE_RESUME_PERCENT,
            temp_limit_celsius: DEFAULT_TEMP_LIMIT_CELSIUS,
            max_current_ua: DEFAULT_MAX_CURRENT_UA.to_string(),
            reset_stats_on_charged: false,
        }
    }
}

impl Preferences {
    pub fn thresholds(&self) -> ChargeThresholds {
        ChargeThresholds {
            limit_percent: self.limit_percent,
            resume_percent: self.resume_percent,
            temp_limit_celsius: self.temp_limit_celsius,
            max_current_ua: self.max_current_ua.clone(),
        }
    }
}

/// Read preferences; a missing file yields defaults, a malformed one errors
pub fn load_preferences(path: &Path) -> Result<Preferences> {
    if !path.exists() {
        debug!(path = %path.display(), "No preference file, using defaults");
        return Ok(Preferences::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("read {}: {e}", path.display())))?;
    toml::from_str(&raw).map_err(|e| AppError::Config(format!("parse {}: {e}", path.display())))
}

/// Atomically rewrite the preference file
pub fn save_preferences(path: &Path, preferences: &Preferences) -> Result<()> {
    let raw = toml::to_string_pretty(preferences)
        .map_err(|e| AppError::Config(format!("serialize preferences: {e}")))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("create {}: {e}", parent.display())))?;
    }

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, raw)
        .map_err(|e| AppError::Config(format!("write {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| AppError::Config(format!("rename {}: {e}", path.display())))?;
    Ok(())
}

/// File-backed PreferenceStore
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Preferences> {
        load_preferences(&self.path)
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn thresholds(&self) -> Result<ChargeThresholds> {
        Ok(self.load()?.thresholds())
    }

    async fn is_enabled(&self) -> Result<bool> {
        Ok(self.load()?.enabled)
    }

    async fn reset_stats_on_charged(&self) -> Result<bool> {
        Ok(self.load()?.reset_stats_on_charged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("preferences.toml"));

        assert!(!store.is_enabled().await.unwrap());
        let thresholds = store.thresholds().await.unwrap();
        assert_eq!(thresholds.limit_percent, DEFAULT_CHARGE_LIMIT_PERCENT);
        assert_eq!(thresholds.resume_percent, DEFAULT_CHARGE_RESUME_PERCENT);
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let mut preferences = Preferences::default();
        preferences.enabled = true;
        preferences.limit_percent = 85;
        preferences.max_current_ua = "1500000".to_string();
        save_preferences(&path, &preferences).unwrap();

        let store = FilePreferenceStore::new(&path);
        assert!(store.is_enabled().await.unwrap());
        let thresholds = store.thresholds().await.unwrap();
        assert_eq!(thresholds.limit_percent, 85);
        assert_eq!(thresholds.max_current_ua, "1500000");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "enabled = true\nlimit_percent = 90\n").unwrap();

        let preferences = load_preferences(&path).unwrap();
        assert!(preferences.enabled);
        assert_eq!(preferences.limit_percent, 90);
        assert_eq!(preferences.resume_percent, DEFAULT_CHARGE_RESUME_PERCENT);
    }

    #[test]
    fn test_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "enabled = {{{{").unwrap();

        assert!(load_preferences(&path).is_err());
    }
}
