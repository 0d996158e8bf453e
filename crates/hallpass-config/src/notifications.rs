use std::time::Duration;

use crate::env_or;

/// Notification dispatcher and reminder scheduling.
#[derive(Clone, Debug)]
pub struct NotificationConfig {
    /// Bounded channel capacity between request handlers and the worker.
    pub queue_capacity: usize,
    /// How often the "leave starts tomorrow" sweep runs.
    pub reminder_interval: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            reminder_interval: Duration::from_secs(86400),
        }
    }
}

impl NotificationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let queue_capacity = env_or("NOTIFICATION_QUEUE_CAPACITY", defaults.queue_capacity).max(1);
        let interval_secs = env_or(
            "LEAVE_REMINDER_INTERVAL_SECS",
            defaults.reminder_interval.as_secs(),
        )
        .max(1);

        Self {
            queue_capacity,
            reminder_interval: Duration::from_secs(interval_secs),
        }
    }
}
