//! Chargekeeper CLI - configure and inspect the charging daemon
//!
//! Edits the preference file the daemon reads and nudges the daemon with
//! SIGHUP; `status` reads the flag store and battery nodes directly.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{Table, Tabled};

use chargekeeper_core::domain::Reading;
use chargekeeper_core::port::{BatteryTelemetry, FlagStore};
use chargekeeper_infra_system::preference_store_impl::{load_preferences, save_preferences};
use chargekeeper_infra_system::{FileFlagStore, RuntimeConfig, SysfsBatteryTelemetry};

#[derive(Parser)]
#[command(name = "chargekeeper")]
#[command(about = "Smart charging control", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn smart charging on
    Enable,

    /// Turn smart charging off
    Disable,

    /// Update charging preferences
    Set {
        /// Charge-stop threshold (battery %)
        #[arg(long)]
        limit: Option<i32>,

        /// Charge-resume threshold (battery %)
        #[arg(long)]
        resume: Option<i32>,

        /// Temperature limit (°C)
        #[arg(long)]
        temp_limit: Option<i32>,

        /// Max charging current (opaque hardware value, e.g. µA)
        #[arg(long)]
        max_current: Option<String>,

        /// Reset battery stats after a fully-limited charge session
        #[arg(long)]
        reset_stats: Option<bool>,
    },

    /// Show charging status and configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config =
        RuntimeConfig::load().map_err(|e| anyhow::anyhow!("Config load failed: {e}"))?;

    match cli.command {
        Commands::Enable => set_enabled(&config, true),
        Commands::Disable => set_enabled(&config, false),
        Commands::Set {
            limit,
            resume,
            temp_limit,
            max_current,
            reset_stats,
        } => set_preferences(&config, limit, resume, temp_limit, max_current, reset_stats),
        Commands::Status => status(&config).await,
    }
}

fn set_enabled(config: &RuntimeConfig, enabled: bool) -> Result<()> {
    let path = config.preferences_path();
    let mut preferences = load_preferences(&path).context("Loading preferences")?;
    preferences.enabled = enabled;
    save_preferences(&path, &preferences).context("Saving preferences")?;

    if enabled {
        println!("Smart charging {}", "enabled".green());
    } else {
        println!("Smart charging {}", "disabled".red());
    }
    nudge_daemon(config);
    Ok(())
}

fn set_preferences(
    config: &RuntimeConfig,
    limit: Option<i32>,
    resume: Option<i32>,
    temp_limit: Option<i32>,
    max_current: Option<String>,
    reset_stats: Option<bool>,
) -> Result<()> {
    let path = config.preferences_path();
    let mut preferences = load_preferences(&path).context("Loading preferences")?;

    if let Some(limit) = limit {
        if !(1..=100).contains(&limit) {
            bail!("--limit must be within 1..=100");
        }
        preferences.limit_percent = limit;
    }
    if let Some(resume) = resume {
        if !(0..=100).contains(&resume) {
            bail!("--resume must be within 0..=100");
        }
        preferences.resume_percent = resume;
    }
    if let Some(temp_limit) = temp_limit {
        preferences.temp_limit_celsius = temp_limit;
    }
    if let Some(max_current) = max_current {
        preferences.max_current_ua = max_current;
    }
    if let Some(reset_stats) = reset_stats {
        preferences.reset_stats_on_charged = reset_stats;
    }

    // Inconsistent thresholds are a warning, not an error: the write
    // still proceeds (equal values mean manual-only resume)
    if preferences.resume_percent > preferences.limit_percent {
        println!(
            "{}",
            "Warning: resume level above charge limit; charging will stop and resume at odd points"
                .yellow()
        );
    } else if preferences.resume_percent == preferences.limit_percent {
        println!(
            "{}",
            "Note: equal limit and resume levels disable automatic resume".yellow()
        );
    }

    save_preferences(&path, &preferences).context("Saving preferences")?;
    println!("Preferences updated");
    nudge_daemon(config);
    Ok(())
}

async fn status(config: &RuntimeConfig) -> Result<()> {
    let preferences =
        load_preferences(&config.preferences_path()).context("Loading preferences")?;
    let flags = FileFlagStore::new(config.flags_path());
    let telemetry = SysfsBatteryTelemetry::new(config.battery.clone());
    let sample = telemetry.sample().await;

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Setting")]
        name: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let enabled = if preferences.enabled {
        "on".green().to_string()
    } else {
        "off".red().to_string()
    };

    let reason = flags.last_stop_reason().await;
    let next_check = match flags.next_check_at().await {
        Some(at_ms) => format_local_time(at_ms),
        None => "-".to_string(),
    };

    let rows = vec![
        Row {
            name: "Smart charging",
            value: enabled,
        },
        Row {
            name: "Charge limit",
            value: format!("{}%", preferences.limit_percent),
        },
        Row {
            name: "Resume level",
            value: format!("{}%", preferences.resume_percent),
        },
        Row {
            name: "Temperature limit",
            value: format!("{}°C", preferences.temp_limit_celsius),
        },
        Row {
            name: "Max current",
            value: preferences.max_current_ua.clone(),
        },
        Row {
            name: "Reset stats when charged",
            value: preferences.reset_stats_on_charged.to_string(),
        },
        Row {
            name: "Last stop reason",
            value: reason.to_string(),
        },
        Row {
            name: "Next check",
            value: next_check,
        },
        Row {
            name: "Battery capacity",
            value: format_reading(sample.capacity_percent, |v| format!("{v}%")),
        },
        Row {
            name: "Battery temperature",
            value: format_reading(sample.temperature_celsius, |v| format!("{v:.1}°C")),
        },
        Row {
            name: "Charger plugged",
            value: format_reading(sample.is_plugged, |v| v.to_string()),
        },
        Row {
            name: "Charging enabled (hw)",
            value: format_reading(sample.is_charging_enabled, |v| v.to_string()),
        },
    ];

    println!("{}", Table::new(rows));
    Ok(())
}

fn format_reading<T: Copy>(reading: Reading<T>, render: impl Fn(T) -> String) -> String {
    match reading {
        Reading::Parsed(v) => render(v),
        Reading::Defaulted(v) => format!("{} {}", render(v), "(unreadable)".dimmed()),
    }
}

fn format_local_time(at_ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(at_ms) {
        Some(at) => at
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

/// Tell a running daemon to re-read the preference file. Best effort:
/// without a daemon the preference change still lands on disk.
fn nudge_daemon(config: &RuntimeConfig) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pidfile = config.pidfile_path();
    let pid = std::fs::read_to_string(&pidfile)
        .ok()
        .and_then(|raw| raw.trim().parse::<i32>().ok());

    match pid {
        Some(pid) if kill(Pid::from_raw(pid), Signal::SIGHUP).is_ok() => {}
        _ => println!(
            "{}",
            "Daemon not reachable; changes apply when it starts".dimmed()
        ),
    }
}
