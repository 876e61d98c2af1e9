//! The whole pipeline over real file adapters: battery nodes in a
//! tempdir, a TOML preference file and the durable flag store, with only
//! the notification and stats surfaces mocked.

use std::path::Path;
use std::sync::Arc;

use chargekeeper_core::application::{BatteryMonitor, MonitorEvent};
use chargekeeper_core::port::notifier::mocks::MockNotifier;
use chargekeeper_core::port::stats_resetter::mocks::MockStatsResetter;
use chargekeeper_core::port::time_provider::SystemTimeProvider;
use chargekeeper_infra_system::preference_store_impl::save_preferences;
use chargekeeper_infra_system::{
    BatteryNodePaths, FileFlagStore, FilePreferenceStore, Preferences, SysfsBatteryTelemetry,
    SysfsChargeControl,
};

struct Rig {
    dir: tempfile::TempDir,
    notifier: Arc<MockNotifier>,
    monitor: BatteryMonitor,
}

fn node_paths(dir: &Path) -> BatteryNodePaths {
    BatteryNodePaths {
        capacity: dir.join("capacity"),
        temperature: dir.join("temp"),
        charger_present: dir.join("present"),
        charging_enabled: dir.join("charging_enabled"),
        max_current: dir.join("constant_charge_current_max"),
    }
}

fn write_node(dir: &Path, name: &str, value: &str) {
    std::fs::write(dir.join(name), value).unwrap();
}

fn read_node(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

/// Battery at 50%/25.0C, plugged, charging on, feature enabled
fn rig() -> Rig {
    let dir = tempfile::tempdir().unwrap();
    write_node(dir.path(), "capacity", "50\n");
    write_node(dir.path(), "temp", "250\n");
    write_node(dir.path(), "present", "1\n");
    write_node(dir.path(), "charging_enabled", "1\n");
    write_node(dir.path(), "constant_charge_current_max", "3000000\n");

    let preferences_path = dir.path().join("preferences.toml");
    let mut preferences = Preferences::default();
    preferences.enabled = true;
    preferences.max_current_ua = "1500000".to_string();
    save_preferences(&preferences_path, &preferences).unwrap();

    let paths = node_paths(dir.path());
    let notifier = Arc::new(MockNotifier::new());
    let monitor = BatteryMonitor::new(
        Arc::new(SysfsBatteryTelemetry::new(paths.clone())),
        Arc::new(SysfsChargeControl::new(paths)),
        Arc::new(FilePreferenceStore::new(&preferences_path)),
        Arc::new(FileFlagStore::new(dir.path().join("flags.properties"))),
        notifier.clone(),
        Arc::new(MockStatsResetter::new()),
        Arc::new(SystemTimeProvider),
    );

    Rig {
        dir,
        notifier,
        monitor,
    }
}

#[tokio::test]
async fn test_tick_at_limit_writes_charging_switch_node() {
    let mut r = rig();
    write_node(r.dir.path(), "capacity", "80\n");

    r.monitor.handle_event(MonitorEvent::Tick).await.unwrap();

    assert_eq!(read_node(r.dir.path(), "charging_enabled"), "0");
    // Configured max current reached the hardware node
    assert_eq!(read_node(r.dir.path(), "constant_charge_current_max"), "1500000");
    assert_eq!(r.notifier.show_count(), 1);
}

#[tokio::test]
async fn test_below_limit_leaves_charging_switch_alone() {
    let mut r = rig();

    r.monitor.handle_event(MonitorEvent::Tick).await.unwrap();

    // Untouched: the node still carries the seeded value with its newline
    assert_eq!(read_node(r.dir.path(), "charging_enabled"), "1\n");
}

#[tokio::test]
async fn test_disable_restores_hardware_nodes() {
    let mut r = rig();
    write_node(r.dir.path(), "capacity", "80\n");

    r.monitor.handle_event(MonitorEvent::Tick).await.unwrap();
    assert_eq!(read_node(r.dir.path(), "charging_enabled"), "0");

    r.monitor.handle_event(MonitorEvent::Disable).await.unwrap();

    assert_eq!(read_node(r.dir.path(), "charging_enabled"), "1");
    assert_eq!(read_node(r.dir.path(), "constant_charge_current_max"), "3000000");
    assert_eq!(r.notifier.remove_count(), 1);
}

#[tokio::test]
async fn test_unplug_at_tick_persists_reason_in_flag_store() {
    let mut r = rig();

    r.monitor.handle_event(MonitorEvent::Tick).await.unwrap();
    write_node(r.dir.path(), "present", "0\n");
    r.monitor.handle_event(MonitorEvent::Tick).await.unwrap();

    assert!(!r.monitor.is_monitoring());
    let raw = read_node(r.dir.path(), "flags.properties");
    assert!(raw.contains("last_stop_reason=0"));
}
