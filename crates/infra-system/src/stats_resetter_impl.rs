// Stats reset adapter (configurable external command)

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use chargekeeper_core::error::{AppError, Result};
use chargekeeper_core::port::StatsResetter;

/// Runs a configured command once per invocation, e.g. a vendor tool that
/// clears battery wear counters. No command configured means no-op; a
/// non-zero exit is logged and swallowed, matching the no-retry policy.
pub struct SubprocessStatsResetter {
    command: Vec<String>,
}

impl SubprocessStatsResetter {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl StatsResetter for SubprocessStatsResetter {
    async fn reset(&self) -> Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            debug!("No stats-reset command configured");
            return Ok(());
        };

        info!(command = ?self.command, "Running stats-reset command");

        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| AppError::Internal(format!("spawn {program}: {e}")))?;

        if !output.status.success() {
            warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "Stats-reset command failed"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_command_is_noop() {
        let resetter = SubprocessStatsResetter::new(Vec::new());
        assert!(resetter.reset().await.is_ok());
    }

    #[tokio::test]
    async fn test_command_runs() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("reset-ran");

        let resetter = SubprocessStatsResetter::new(vec![
            "touch".to_string(),
            marker.to_string_lossy().into_owned(),
        ]);
        resetter.reset().await.unwrap();

        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_failing_command_is_swallowed() {
        let resetter = SubprocessStatsResetter::new(vec!["false".to_string()]);
        assert!(resetter.reset().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_program_errors() {
        let resetter =
            SubprocessStatsResetter::new(vec!["definitely-not-a-real-program".to_string()]);
        assert!(resetter.reset().await.is_err());
    }
}
