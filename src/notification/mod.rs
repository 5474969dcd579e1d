//! Break notification dispatch.
//!
//! The scheduler tells the user a break is due via a local notification
//! scheduled to fire when the work interval ends. Scheduling is
//! fire-and-forget: permission problems degrade to log lines and never
//! surface as errors inside the scheduler.
//!
//! On macOS the [`UserNotificationCenter`] posts real notifications through
//! `UNUserNotificationCenter`; elsewhere (and whenever authorization is
//! denied) the [`LogNotifier`] stands in.

pub mod error;

#[cfg(target_os = "macos")]
mod macos;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub use error::NotificationError;

#[cfg(target_os = "macos")]
pub use macos::UserNotificationCenter;

/// Trait for break notification dispatchers.
pub trait BreakNotifier: Send + Sync {
    /// Schedules a notification to be delivered after `fire_in`.
    ///
    /// Implementations must not block and must swallow delivery failures.
    fn schedule_break(&self, fire_in: Duration, title: &str, body: &str);

    /// Cancels every pending notification.
    fn cancel_pending(&self);
}

/// Notifier that only writes log lines.
///
/// Used on platforms without a notification center and as the fallback when
/// notification permission is denied.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BreakNotifier for LogNotifier {
    fn schedule_break(&self, fire_in: Duration, title: &str, _body: &str) {
        tracing::info!("通知の予定: {}秒後に「{}」", fire_in.as_secs(), title);
    }

    fn cancel_pending(&self) {
        tracing::debug!("Pending notifications cancelled");
    }
}

/// A notification recorded by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    /// Delay until delivery
    pub fire_in: Duration,
    /// Notification title
    pub title: String,
    /// Notification body
    pub body: String,
}

/// Mock notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    scheduled: Mutex<Vec<ScheduledNotification>>,
    cancel_calls: AtomicUsize,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification scheduled so far.
    #[must_use]
    pub fn scheduled(&self) -> Vec<ScheduledNotification> {
        self.scheduled.lock().unwrap().clone()
    }

    /// Returns the most recently scheduled notification, if any.
    #[must_use]
    pub fn last_scheduled(&self) -> Option<ScheduledNotification> {
        self.scheduled.lock().unwrap().last().cloned()
    }

    /// Returns how many times `cancel_pending` was called.
    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.scheduled.lock().unwrap().clear();
        self.cancel_calls.store(0, Ordering::SeqCst);
    }
}

impl BreakNotifier for MockNotifier {
    fn schedule_break(&self, fire_in: Duration, title: &str, body: &str) {
        self.scheduled.lock().unwrap().push(ScheduledNotification {
            fire_in,
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    fn cancel_pending(&self) {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_schedules() {
        let notifier = MockNotifier::new();
        notifier.schedule_break(Duration::from_secs(60), "title", "body");

        let scheduled = notifier.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].fire_in, Duration::from_secs(60));
        assert_eq!(scheduled[0].title, "title");
        assert_eq!(scheduled[0].body, "body");
    }

    #[test]
    fn test_mock_counts_cancels() {
        let notifier = MockNotifier::new();
        notifier.cancel_pending();
        notifier.cancel_pending();
        assert_eq!(notifier.cancel_count(), 2);
    }

    #[test]
    fn test_mock_last_scheduled() {
        let notifier = MockNotifier::new();
        assert!(notifier.last_scheduled().is_none());

        notifier.schedule_break(Duration::from_secs(1), "a", "a");
        notifier.schedule_break(Duration::from_secs(2), "b", "b");
        assert_eq!(
            notifier.last_scheduled().unwrap().fire_in,
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_log_notifier_is_a_no_op() {
        let notifier = LogNotifier::new();
        notifier.schedule_break(Duration::from_secs(5), "title", "body");
        notifier.cancel_pending();
    }
}
