//! Chargekeeper Daemon - Main Entry Point
//!
//! Composition root: wires the sysfs adapters, the D-Bus notifier and the
//! battery monitor actor together, watches the charger plug state, and
//! reloads preferences on SIGHUP.

mod plug_watcher;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chargekeeper_core::application::{shutdown_channel, BatteryMonitor, MonitorEvent};
use chargekeeper_core::port::time_provider::SystemTimeProvider;
use chargekeeper_core::port::Notifier;
use chargekeeper_infra_system::preference_store_impl::load_preferences;
use chargekeeper_infra_system::{
    DbusNotifier, FileFlagStore, FilePreferenceStore, NoopNotifier, Preferences, RuntimeConfig,
    SubprocessStatsResetter, SysfsBatteryTelemetry, SysfsChargeControl,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const EVENT_QUEUE_DEPTH: usize = 16;
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format =
        std::env::var("CHARGEKEEPER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("chargekeeper=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Chargekeeper daemon v{} starting...", VERSION);

    // 2. Load configuration
    let config =
        RuntimeConfig::load().map_err(|e| anyhow::anyhow!("Config load failed: {e}"))?;
    info!(state_dir = %config.state_dir.display(), "Configuration loaded");

    tokio::fs::create_dir_all(&config.state_dir).await?;
    let pidfile = config.pidfile_path();
    tokio::fs::write(&pidfile, std::process::id().to_string()).await?;

    // 3. Setup dependencies (DI wiring)
    let telemetry = Arc::new(SysfsBatteryTelemetry::new(config.battery.clone()));
    let charge_control = Arc::new(SysfsChargeControl::new(config.battery.clone()));
    let preferences_path = config.preferences_path();
    let preferences = Arc::new(FilePreferenceStore::new(&preferences_path));
    let flags = Arc::new(FileFlagStore::new(config.flags_path()));
    let stats_resetter = Arc::new(SubprocessStatsResetter::new(
        config.stats_reset_command.clone(),
    ));
    let time_provider = Arc::new(SystemTimeProvider);

    // Notification surface is best-effort: headless hosts run without it
    let dbus_notifier = match DbusNotifier::connect().await {
        Ok(notifier) => Some(Arc::new(notifier)),
        Err(e) => {
            warn!(error = %e, "No notification service, continuing without notifications");
            None
        }
    };
    let notifier: Arc<dyn Notifier> = match &dbus_notifier {
        Some(n) => n.clone(),
        None => Arc::new(NoopNotifier),
    };

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let (event_tx, event_rx) = mpsc::channel::<MonitorEvent>(EVENT_QUEUE_DEPTH);

    // 4. Start the monitor actor
    let monitor = BatteryMonitor::new(
        telemetry.clone(),
        charge_control,
        preferences.clone(),
        flags,
        notifier,
        stats_resetter,
        time_provider,
    );
    let monitor_handle = tokio::spawn(async move {
        if let Err(e) = monitor.run(event_rx, shutdown_rx).await {
            error!(error = ?e, "Battery monitor failed");
        }
    });

    // 5. Apply the persisted main switch
    let mut last_preferences = load_preferences(&preferences_path).unwrap_or_else(|e| {
        warn!(error = %e, "Preference file unreadable, using defaults");
        Preferences::default()
    });
    if last_preferences.enabled {
        info!("Smart charging enabled at startup");
        let _ = event_tx.send(MonitorEvent::Enable).await;
    }

    // 6. Watch the charger plug state
    tokio::spawn(plug_watcher::run(
        telemetry,
        event_tx.clone(),
        Duration::from_secs(config.plug_poll_secs),
        shutdown_tx.token(),
    ));

    // 7. Forward notification actions ("not now", dismiss)
    if let Some(dbus) = dbus_notifier {
        let tx = event_tx.clone();
        let shutdown = shutdown_tx.token();
        tokio::spawn(async move {
            if let Err(e) = dbus.run_action_listener(tx, shutdown).await {
                warn!(error = %e, "Notification action listener failed");
            }
        });
    }

    info!("Chargekeeper ready");

    // 8. Signal loop: SIGHUP reloads preferences, SIGINT/SIGTERM shut down
    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    loop {
        tokio::select! {
            _ = sighup.recv() => {
                match load_preferences(&preferences_path) {
                    Ok(new_preferences) => {
                        handle_preference_reload(&event_tx, &last_preferences, &new_preferences)
                            .await;
                        last_preferences = new_preferences;
                    }
                    Err(e) => warn!(error = %e, "Preference reload failed"),
                }
            }
            _ = sigint.recv() => break,
            _ = sigterm.recv() => break,
        }
    }

    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown
    shutdown_tx.shutdown();
    let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, monitor_handle).await;
    let _ = tokio::fs::remove_file(&pidfile).await;

    info!("Shutdown complete.");

    Ok(())
}

/// Translate a preference-file change into monitor events: main-switch
/// flips beat everything else; otherwise flag whether the temperature
/// limit moved so a stale overheat reason can be cleared.
async fn handle_preference_reload(
    events: &mpsc::Sender<MonitorEvent>,
    old: &Preferences,
    new: &Preferences,
) {
    info!("Reloading preferences");

    if new.enabled != old.enabled {
        let event = if new.enabled {
            MonitorEvent::Enable
        } else {
            MonitorEvent::Disable
        };
        let _ = events.send(event).await;
        return;
    }

    if new.enabled && new != old {
        let _ = events
            .send(MonitorEvent::PreferencesChanged {
                temp_limit_changed: new.temp_limit_celsius != old.temp_limit_celsius,
            })
            .await;
    }
}
