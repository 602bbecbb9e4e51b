//! LogAlarm - reports notifications via tracing

use tracing::info;

use super::Notification;

/// Alarm that logs one structured line per notification
#[derive(Debug, Default)]
pub struct LogAlarm;

impl LogAlarm {
    pub fn new() -> Self {
        Self
    }

    pub fn notify(&self, notification: &Notification) {
        info!(
            manager = %notification.manager,
            kind = %notification.kind,
            id = %notification.id,
            time_left = ?notification.time_left,
            expires_at = ?notification.expires_at,
            "Notification"
        );
    }
}
