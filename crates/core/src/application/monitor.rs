//! Battery Monitor - the monitoring session actor
//!
//! Owns the `{Stopped, Monitoring}` session state and serializes every
//! reevaluation: plug events, preference reloads, notification actions and
//! periodic ticks all arrive on one mpsc queue and are handled one at a
//! time, so no locking is needed around the stop reason or hardware writes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::application::constants::DEFAULT_MAX_CURRENT_UA;
use crate::application::reevaluator::{poll_interval, reevaluate};
use crate::application::shutdown::ShutdownToken;
use crate::domain::StopReason;
use crate::error::Result;
use crate::port::{
    BatteryTelemetry, ChargeControl, FlagStore, NotificationContent, Notifier, PreferenceStore,
    StatsResetter, TimeProvider,
};

/// Everything that can drive the monitor. Producers: the plug watcher,
/// the preference reload path, the notification action listener, and the
/// monitor's own periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Charger/USB plugged in
    PowerConnected,
    /// Charger/USB unplugged
    PowerDisconnected,
    /// Periodic reevaluation trigger
    Tick,
    /// Preferences were reloaded; flag set when the temperature limit moved
    PreferencesChanged { temp_limit_changed: bool },
    /// User swiped the notification away (visual only)
    NotificationDismissed,
    /// User pressed "not now": suspend monitoring for this plugged session
    NotNow,
    /// Feature main switch turned on
    Enable,
    /// Feature main switch turned off
    Disable,
}

/// Fallback select arm sleep when no tick is scheduled
const NO_TICK_SLEEP: Duration = Duration::from_secs(3600);

pub struct BatteryMonitor {
    telemetry: Arc<dyn BatteryTelemetry>,
    charge_control: Arc<dyn ChargeControl>,
    preferences: Arc<dyn PreferenceStore>,
    flags: Arc<dyn FlagStore>,
    notifier: Arc<dyn Notifier>,
    stats_resetter: Arc<dyn StatsResetter>,
    time_provider: Arc<dyn TimeProvider>,
    /// Next scheduled reevaluation (epoch ms); None means Stopped
    next_tick_at: Option<i64>,
}

impl BatteryMonitor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        telemetry: Arc<dyn BatteryTelemetry>,
        charge_control: Arc<dyn ChargeControl>,
        preferences: Arc<dyn PreferenceStore>,
        flags: Arc<dyn FlagStore>,
        notifier: Arc<dyn Notifier>,
        stats_resetter: Arc<dyn StatsResetter>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            telemetry,
            charge_control,
            preferences,
            flags,
            notifier,
            stats_resetter,
            time_provider,
            next_tick_at: None,
        }
    }

    /// True while a monitoring session is active (a tick is scheduled)
    pub fn is_monitoring(&self) -> bool {
        self.next_tick_at.is_some()
    }

    /// Run the monitor loop until the event channel closes or shutdown
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<MonitorEvent>,
        mut shutdown: ShutdownToken,
    ) -> Result<()> {
        info!("Battery monitor started");

        loop {
            if shutdown.is_shutdown() {
                break;
            }

            let tick_delay = self.next_tick_at.map(|at| {
                let remaining = at - self.time_provider.now_millis();
                Duration::from_millis(remaining.max(0) as u64)
            });

            tokio::select! {
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(event) => {
                            if let Err(e) = self.handle_event(event).await {
                                error!(error = ?e, ?event, "Monitor event failed");
                            }
                        }
                        None => {
                            info!("Monitor event channel closed");
                            break;
                        }
                    }
                }
                _ = sleep(tick_delay.unwrap_or(NO_TICK_SLEEP)), if tick_delay.is_some() => {
                    if let Err(e) = self.handle_event(MonitorEvent::Tick).await {
                        error!(error = ?e, "Monitor tick failed");
                    }
                }
                _ = shutdown.wait() => {
                    info!("Monitor interrupted by shutdown");
                    break;
                }
            }
        }

        info!("Battery monitor stopped");
        Ok(())
    }

    /// Handle one event. Public so scenario tests can drive the monitor
    /// without the timer loop.
    pub async fn handle_event(&mut self, event: MonitorEvent) -> Result<()> {
        debug!(?event, "Handling monitor event");

        // The main switch gates everything except the switch itself. The
        // plug watcher keeps running while the feature is off, so its
        // events must be ignored here.
        match event {
            MonitorEvent::Enable => return self.on_enable().await,
            MonitorEvent::Disable => return self.on_disable().await,
            _ => {
                if !self.preferences.is_enabled().await? {
                    debug!(?event, "Feature disabled, ignoring event");
                    return Ok(());
                }
            }
        }

        match event {
            MonitorEvent::PowerConnected => self.on_power_connected().await,
            MonitorEvent::PowerDisconnected => self.on_power_disconnected().await,
            MonitorEvent::Tick => self.on_tick().await,
            MonitorEvent::PreferencesChanged { temp_limit_changed } => {
                self.on_preferences_changed(temp_limit_changed).await
            }
            MonitorEvent::NotificationDismissed => {
                self.flags.set_notification_dismissed(true).await
            }
            MonitorEvent::NotNow => self.stop_monitoring(StopReason::UserSuspended).await,
            MonitorEvent::Enable | MonitorEvent::Disable => unreachable!("handled above"),
        }
    }

    async fn on_enable(&mut self) -> Result<()> {
        info!("Smart charging enabled");

        let sample = self.telemetry.sample().await;
        if sample.is_plugged.get() {
            self.start_monitoring().await?;
        }
        Ok(())
    }

    async fn on_disable(&mut self) -> Result<()> {
        info!("Smart charging disabled");

        self.stop_monitoring(StopReason::Unknown).await
    }

    async fn on_power_connected(&mut self) -> Result<()> {
        debug!("Charger/USB connected");

        if self.flags.last_stop_reason().await == StopReason::UserSuspended {
            // User suspended monitoring for a past session and charging
            // resumed; reset the reason so the NEXT replug starts
            // monitoring as expected
            self.flags.set_last_stop_reason(StopReason::Unknown).await
        } else {
            self.start_monitoring().await
        }
    }

    async fn on_power_disconnected(&mut self) -> Result<()> {
        debug!("Charger/USB disconnected");

        let last_reason = self.flags.last_stop_reason().await;
        let was_overheated = last_reason == StopReason::Overheated;
        let was_overcharged = last_reason == StopReason::Overcharged;

        // Stop now if there's no reason to keep watching the battery
        if !was_overheated && !was_overcharged {
            return self.stop_monitoring(StopReason::Unknown).await;
        }

        // Charging is still force-disabled; re-show a dismissed
        // notification so the user isn't surprised that replugging
        // doesn't charge
        if self.flags.is_notification_dismissed().await {
            self.flags.set_notification_dismissed(false).await?;
            self.show_notification().await;
        }

        let thresholds = self.preferences.thresholds().await?;
        let sample = self.telemetry.sample().await;
        let is_charged = sample.capacity_percent.get() >= thresholds.limit_percent;

        if is_charged && was_overcharged && self.preferences.reset_stats_on_charged().await? {
            info!("Resetting battery stats after limited charge session");
            if let Err(e) = self.stats_resetter.reset().await {
                error!(error = ?e, "Battery stats reset failed");
            }
        }

        Ok(())
    }

    async fn on_tick(&mut self) -> Result<()> {
        let sample = self.telemetry.sample().await;
        if !sample.is_plugged.get() {
            debug!("Charger/USB unplugged at tick");
            self.stop_monitoring(StopReason::Unknown).await
        } else {
            self.start_monitoring().await
        }
    }

    async fn on_preferences_changed(&mut self, temp_limit_changed: bool) -> Result<()> {
        // A new temperature limit must not stay masked by the cool-down
        // band of a previous overheat stop
        if temp_limit_changed
            && self.flags.last_stop_reason().await == StopReason::Overheated
        {
            self.flags.set_last_stop_reason(StopReason::Unknown).await?;
        }

        let sample = self.telemetry.sample().await;
        if sample.is_plugged.get() {
            self.start_monitoring().await?;
        }
        Ok(())
    }

    /// Enter (or refresh) the monitoring session: schedule the next tick
    /// from the pre-reevaluation stop reason, reevaluate immediately, and
    /// show the notification unless dismissed.
    async fn start_monitoring(&mut self) -> Result<()> {
        let last_reason = self.flags.last_stop_reason().await;
        let interval = poll_interval(last_reason);
        let next_at = self.time_provider.now_millis() + interval.as_millis() as i64;

        debug!(
            interval_secs = interval.as_secs(),
            last_reason = %last_reason,
            "Scheduling next battery check"
        );
        self.next_tick_at = Some(next_at);
        self.flags.set_next_check_at(next_at).await?;

        self.reevaluate().await?;

        if !self.flags.is_notification_dismissed().await {
            self.show_notification().await;
        }
        Ok(())
    }

    /// Leave the monitoring session: cancel the tick, clear the
    /// notification, record why, and hand the hardware back (charging on,
    /// default current).
    async fn stop_monitoring(&mut self, reason: StopReason) -> Result<()> {
        debug!(reason = %reason, "Stopping battery monitoring");

        self.next_tick_at = None;

        if let Err(e) = self.notifier.remove().await {
            warn!(error = ?e, "Failed to remove notification");
        }
        self.flags.set_notification_dismissed(false).await?;
        self.flags.set_last_stop_reason(reason).await?;

        if let Err(e) = self.charge_control.set_charging_enabled(true).await {
            warn!(error = ?e, "Failed to re-enable charging");
        }
        if let Err(e) = self
            .charge_control
            .set_max_current(DEFAULT_MAX_CURRENT_UA)
            .await
        {
            warn!(error = ?e, "Failed to restore default max current");
        }
        Ok(())
    }

    /// One read-decide-write pass
    async fn reevaluate(&mut self) -> Result<()> {
        let thresholds = self.preferences.thresholds().await?;
        let sample = self.telemetry.sample().await;
        let last_reason = self.flags.last_stop_reason().await;

        if sample.is_degraded() {
            warn!(?sample, "Degraded telemetry: defaulted readings in use");
        }

        debug!(
            charging_enabled = sample.is_charging_enabled.get(),
            capacity = sample.capacity_percent.get(),
            limit = thresholds.limit_percent,
            resume = thresholds.resume_percent,
            temperature = sample.temperature_celsius.get(),
            temp_limit = thresholds.temp_limit_celsius,
            max_current_ua = %thresholds.max_current_ua,
            last_reason = %last_reason,
            "Reevaluating charge state"
        );

        // Idempotent passthrough, independent of the enable/disable decision
        if let Err(e) = self
            .charge_control
            .set_max_current(&thresholds.max_current_ua)
            .await
        {
            warn!(error = ?e, "Failed to write max charging current");
        }

        let decision = reevaluate(&thresholds, &sample, last_reason);

        if decision.reason != last_reason {
            self.flags.set_last_stop_reason(decision.reason).await?;
        }

        // Hardware state is ground truth: only write on an actual change
        if decision.charging_enabled != sample.is_charging_enabled.get() {
            info!(
                charging_enabled = decision.charging_enabled,
                reason = %decision.reason,
                "Switching charging state"
            );
            if let Err(e) = self
                .charge_control
                .set_charging_enabled(decision.charging_enabled)
                .await
            {
                warn!(error = ?e, "Failed to switch charging state");
            }
        }
        Ok(())
    }

    async fn show_notification(&self) {
        let thresholds = match self.preferences.thresholds().await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = ?e, "Skipping notification: preferences unavailable");
                return;
            }
        };
        let sample = self.telemetry.sample().await;

        let content = NotificationContent {
            limit_percent: thresholds.limit_percent,
            resume_percent: thresholds.resume_percent,
            temp_limit_celsius: thresholds.temp_limit_celsius,
            battery_temp_celsius: sample.temperature_celsius.get(),
            next_check_at: self.flags.next_check_at().await,
        };

        if let Err(e) = self.notifier.show(&content).await {
            warn!(error = ?e, "Failed to post notification");
        }
    }
}
