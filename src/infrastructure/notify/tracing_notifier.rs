use crate::application::ports::{Notification, NotificationLevel, Notifier};

/// Routes user notifications into the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let message = notification.message;
        match notification.level {
            NotificationLevel::Info | NotificationLevel::Success => {
                tracing::info!(target: "noctrix::notify", "{}", message)
            }
            NotificationLevel::Warning => tracing::warn!(target: "noctrix::notify", "{}", message),
            NotificationLevel::Error => tracing::error!(target: "noctrix::notify", "{}", message),
        }
    }
}
