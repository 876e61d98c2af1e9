// Freedesktop notification adapter (org.freedesktop.Notifications)

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use zbus::zvariant::Value;
use zbus::{proxy, Connection};

use chargekeeper_core::application::{MonitorEvent, ShutdownToken};
use chargekeeper_core::error::{AppError, Result};
use chargekeeper_core::port::{NotificationContent, Notifier};

/// Action key offered on the notification
const ACTION_NOT_NOW: &str = "not-now";

/// CloseNotification reason code for "dismissed by the user"
const CLOSE_REASON_DISMISSED: u32 = 2;

/// Low urgency per the freedesktop spec
const URGENCY_LOW: u8 = 0;

#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    fn close_notification(&self, id: u32) -> zbus::Result<()>;

    #[zbus(signal)]
    fn action_invoked(&self, id: u32, action_key: String) -> zbus::Result<()>;

    #[zbus(signal)]
    fn notification_closed(&self, id: u32, reason: u32) -> zbus::Result<()>;
}

/// Desktop notification sink. `show` replaces the previous notification
/// (idempotent re-post); user actions come back as D-Bus signals and are
/// forwarded to the monitor queue by [`DbusNotifier::run_action_listener`].
pub struct DbusNotifier {
    proxy: NotificationsProxy<'static>,
    current_id: Arc<Mutex<u32>>,
}

impl DbusNotifier {
    pub async fn connect() -> Result<Self> {
        let connection = Connection::session()
            .await
            .map_err(|e| AppError::Notification(format!("session bus: {e}")))?;
        let proxy = NotificationsProxy::new(&connection)
            .await
            .map_err(|e| AppError::Notification(format!("notifications proxy: {e}")))?;

        Ok(Self {
            proxy,
            current_id: Arc::new(Mutex::new(0)),
        })
    }

    /// Forward "not now" presses and user dismissals of OUR notification to
    /// the monitor until shutdown. Spawned by the daemon.
    pub async fn run_action_listener(
        &self,
        events: mpsc::Sender<MonitorEvent>,
        mut shutdown: ShutdownToken,
    ) -> Result<()> {
        let mut actions = self
            .proxy
            .receive_action_invoked()
            .await
            .map_err(|e| AppError::Notification(format!("subscribe ActionInvoked: {e}")))?;
        let mut closes = self
            .proxy
            .receive_notification_closed()
            .await
            .map_err(|e| AppError::Notification(format!("subscribe NotificationClosed: {e}")))?;

        loop {
            tokio::select! {
                Some(signal) = actions.next() => {
                    let Ok(args) = signal.args() else { continue };
                    if *args.id() != *self.current_id.lock().unwrap() {
                        continue;
                    }
                    if args.action_key() == ACTION_NOT_NOW {
                        debug!("Notification action: not now");
                        let _ = events.send(MonitorEvent::NotNow).await;
                    }
                }
                Some(signal) = closes.next() => {
                    let Ok(args) = signal.args() else { continue };
                    if *args.id() != *self.current_id.lock().unwrap() {
                        continue;
                    }
                    if *args.reason() == CLOSE_REASON_DISMISSED {
                        debug!("Notification dismissed by user");
                        let _ = events.send(MonitorEvent::NotificationDismissed).await;
                    }
                }
                _ = shutdown.wait() => break,
            }
        }
        Ok(())
    }

    fn body(content: &NotificationContent) -> String {
        let mut body = format!(
            "Charge limit: {}%\nResume level: {}%\nBattery temperature: {:.1}°C (max. {}°C)",
            content.limit_percent,
            content.resume_percent,
            content.battery_temp_celsius,
            content.temp_limit_celsius,
        );

        if let Some(at_ms) = content.next_check_at {
            if let Some(at) = chrono::DateTime::from_timestamp_millis(at_ms) {
                let local = at.with_timezone(&chrono::Local);
                body.push_str(&format!("\nNext check at {}", local.format("%H:%M")));
            }
        }
        body
    }
}

#[async_trait]
impl Notifier for DbusNotifier {
    async fn show(&self, content: &NotificationContent) -> Result<()> {
        let replaces_id = *self.current_id.lock().unwrap();

        let mut hints: HashMap<&str, Value<'_>> = HashMap::new();
        hints.insert("urgency", Value::U8(URGENCY_LOW));

        let id = self
            .proxy
            .notify(
                "Smart charging",
                replaces_id,
                "battery-good-charging",
                "Smart charging",
                &Self::body(content),
                &[ACTION_NOT_NOW, "Not now"],
                hints,
                0, // persistent
            )
            .await
            .map_err(|e| AppError::Notification(format!("notify: {e}")))?;

        *self.current_id.lock().unwrap() = id;
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        let id = std::mem::replace(&mut *self.current_id.lock().unwrap(), 0);
        if id == 0 {
            return Ok(());
        }

        if let Err(e) = self.proxy.close_notification(id).await {
            // Already closed or server gone: nothing to surface
            warn!(error = %e, "CloseNotification failed");
        }
        Ok(())
    }
}

/// Fallback when no session bus is available (headless systems): the
/// control loop runs, the notification surface is simply absent.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn show(&self, content: &NotificationContent) -> Result<()> {
        debug!(?content, "Notification suppressed (no session bus)");
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        Ok(())
    }
}
