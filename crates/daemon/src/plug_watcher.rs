//! Plug-state watcher
//!
//! Polls the charger-presence node and forwards plug/unplug edges to the
//! monitor queue. Runs for the whole daemon lifetime; the monitor decides
//! whether the feature is active.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, warn};

use chargekeeper_core::application::{MonitorEvent, ShutdownToken};
use chargekeeper_core::port::BatteryTelemetry;

pub async fn run(
    telemetry: Arc<dyn BatteryTelemetry>,
    events: mpsc::Sender<MonitorEvent>,
    poll_interval: Duration,
    mut shutdown: ShutdownToken,
) {
    info!(poll_secs = poll_interval.as_secs(), "Plug watcher started");

    let mut last_plugged: Option<bool> = None;

    loop {
        tokio::select! {
            _ = sleep(poll_interval) => {
                let sample = telemetry.sample().await;

                // A dead presence node must not synthesize unplug edges
                if sample.is_plugged.is_defaulted() {
                    warn!("Charger presence unreadable, skipping plug check");
                    continue;
                }

                let plugged = sample.is_plugged.get();
                match last_plugged {
                    None => {
                        // Startup baseline; the enable path covers an
                        // already-plugged charger
                        last_plugged = Some(plugged);
                    }
                    Some(previous) if previous != plugged => {
                        info!(plugged, "Charger plug state changed");
                        let event = if plugged {
                            MonitorEvent::PowerConnected
                        } else {
                            MonitorEvent::PowerDisconnected
                        };
                        if events.send(event).await.is_err() {
                            break;
                        }
                        last_plugged = Some(plugged);
                    }
                    Some(_) => {}
                }
            }
            _ = shutdown.wait() => break,
        }
    }

    info!("Plug watcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chargekeeper_core::application::shutdown_channel;
    use chargekeeper_core::domain::BatterySample;
    use chargekeeper_core::port::battery_telemetry::mocks::MockBatteryTelemetry;

    #[tokio::test]
    async fn test_edges_become_events() {
        let telemetry = Arc::new(MockBatteryTelemetry::new(BatterySample::parsed(
            50, 25.0, false, true,
        )));
        let (tx, mut rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let watcher = tokio::spawn(run(
            telemetry.clone() as Arc<dyn BatteryTelemetry>,
            tx,
            Duration::from_millis(10),
            shutdown_rx,
        ));

        // Baseline poll happens first; then flip to plugged
        tokio::time::sleep(Duration::from_millis(30)).await;
        telemetry.set_plugged(true);
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(event, Some(MonitorEvent::PowerConnected));

        telemetry.set_plugged(false);
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(event, Some(MonitorEvent::PowerDisconnected));

        shutdown_tx.shutdown();
        watcher.await.unwrap();
    }

    #[tokio::test]
    async fn test_steady_state_emits_nothing() {
        let telemetry = Arc::new(MockBatteryTelemetry::new(BatterySample::parsed(
            50, 25.0, true, true,
        )));
        let (tx, mut rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = shutdown_channel();

        let watcher = tokio::spawn(run(
            telemetry as Arc<dyn BatteryTelemetry>,
            tx,
            Duration::from_millis(10),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.shutdown();
        watcher.await.unwrap();

        assert!(rx.try_recv().is_err());
    }
}
