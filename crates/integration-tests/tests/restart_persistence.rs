//! Daemon restarts must not lose session state: the stop reason and the
//! dismissed flag live in the durable flag store, and a fresh monitor
//! picks them up.

use std::path::Path;
use std::sync::Arc;

use chargekeeper_core::application::{BatteryMonitor, MonitorEvent};
use chargekeeper_core::domain::{BatterySample, ChargeThresholds, StopReason};
use chargekeeper_core::port::battery_telemetry::mocks::MockBatteryTelemetry;
use chargekeeper_core::port::charge_control::mocks::MockChargeControl;
use chargekeeper_core::port::notifier::mocks::MockNotifier;
use chargekeeper_core::port::preference_store::mocks::MockPreferenceStore;
use chargekeeper_core::port::stats_resetter::mocks::MockStatsResetter;
use chargekeeper_core::port::time_provider::mocks::MockTimeProvider;
use chargekeeper_core::port::FlagStore;
use chargekeeper_infra_system::FileFlagStore;

fn monitor_with_flags(
    flags_path: &Path,
    telemetry: Arc<MockBatteryTelemetry>,
    charge_control: Arc<MockChargeControl>,
) -> BatteryMonitor {
    BatteryMonitor::new(
        telemetry,
        charge_control,
        Arc::new(MockPreferenceStore::new(ChargeThresholds::default())),
        Arc::new(FileFlagStore::new(flags_path)),
        Arc::new(MockNotifier::new()),
        Arc::new(MockStatsResetter::new()),
        Arc::new(MockTimeProvider::new(1_000_000)),
    )
}

/// An overheat stop recorded before a restart keeps the cool-down band in
/// effect afterwards: the new process must not resume charging at a
/// temperature just under the limit.
#[tokio::test]
async fn test_overheat_hysteresis_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let flags_path = dir.path().join("flags.properties");

    let telemetry = Arc::new(MockBatteryTelemetry::new(BatterySample::parsed(
        50, 36.0, true, true,
    )));

    // First process: overheat stop
    {
        let charge_control = Arc::new(MockChargeControl::new());
        let mut monitor =
            monitor_with_flags(&flags_path, telemetry.clone(), charge_control.clone());
        monitor
            .handle_event(MonitorEvent::PowerConnected)
            .await
            .unwrap();
        assert_eq!(charge_control.last_charging_enabled(), Some(false));
    }

    let flags = FileFlagStore::new(&flags_path);
    assert_eq!(flags.last_stop_reason().await, StopReason::Overheated);

    // Second process: battery cooled to 33, inside the 3-degree band
    telemetry.set_temperature(33.0);
    telemetry.set_charging_enabled(false);
    let charge_control = Arc::new(MockChargeControl::new());
    let mut monitor = monitor_with_flags(&flags_path, telemetry.clone(), charge_control.clone());
    monitor.handle_event(MonitorEvent::Tick).await.unwrap();
    assert!(charge_control.charging_writes().is_empty());

    // Out of the band: charging resumes
    telemetry.set_temperature(31.0);
    monitor.handle_event(MonitorEvent::Tick).await.unwrap();
    assert_eq!(charge_control.last_charging_enabled(), Some(true));
    assert_eq!(flags.last_stop_reason().await, StopReason::Unknown);
}

/// A dismissed notification stays dismissed across a restart, so the new
/// process does not re-post it while the session continues.
#[tokio::test]
async fn test_dismissed_flag_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let flags_path = dir.path().join("flags.properties");

    let telemetry = Arc::new(MockBatteryTelemetry::new(BatterySample::parsed(
        50, 25.0, true, true,
    )));

    {
        let mut monitor = monitor_with_flags(
            &flags_path,
            telemetry.clone(),
            Arc::new(MockChargeControl::new()),
        );
        monitor
            .handle_event(MonitorEvent::PowerConnected)
            .await
            .unwrap();
        monitor
            .handle_event(MonitorEvent::NotificationDismissed)
            .await
            .unwrap();
    }

    let notifier = Arc::new(MockNotifier::new());
    let mut monitor = BatteryMonitor::new(
        telemetry,
        Arc::new(MockChargeControl::new()),
        Arc::new(MockPreferenceStore::new(ChargeThresholds::default())),
        Arc::new(FileFlagStore::new(&flags_path)),
        notifier.clone(),
        Arc::new(MockStatsResetter::new()),
        Arc::new(MockTimeProvider::new(2_000_000)),
    );
    monitor.handle_event(MonitorEvent::Tick).await.unwrap();

    assert!(monitor.is_monitoring());
    assert_eq!(notifier.show_count(), 0);
}
