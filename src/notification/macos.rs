//! UNUserNotificationCenter-backed notifier.
//!
//! Schedules break notifications through the native notification center.
//! The binary must be code-signed for notifications to work; for
//! development use ad-hoc signing:
//!
//! ```bash
//! codesign --force --deep --sign - target/release/restmode
//! ```

use std::cell::RefCell;
use std::time::Duration;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::Bool;
use objc2_foundation::{NSError, NSString};
use objc2_user_notifications::{
    UNAuthorizationOptions, UNMutableNotificationContent, UNNotificationRequest,
    UNNotificationSound, UNTimeIntervalNotificationTrigger, UNUserNotificationCenter,
};
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::NotificationError;
use super::BreakNotifier;

/// Notifier backed by the macOS notification center.
///
/// Construct with [`UserNotificationCenter::authorize`] before the daemon
/// starts scheduling; a denied authorization should fall back to
/// [`super::LogNotifier`].
pub struct UserNotificationCenter;

impl UserNotificationCenter {
    fn current() -> Retained<UNUserNotificationCenter> {
        UNUserNotificationCenter::currentNotificationCenter()
    }

    /// Requests notification authorization and returns the notifier.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::PermissionDenied` if the user declined,
    /// or `AuthorizationFailed` if the request itself failed.
    pub async fn authorize() -> Result<Self, NotificationError> {
        let (tx, rx) = oneshot::channel::<Result<bool, NotificationError>>();

        let options = UNAuthorizationOptions::Alert | UNAuthorizationOptions::Sound;

        let cb = RefCell::new(Some(tx));
        let block = RcBlock::new(move |granted: Bool, error: *mut NSError| {
            if let Some(sender) = cb.borrow_mut().take() {
                let result = if !error.is_null() {
                    let err_ref = unsafe { error.as_ref() }.unwrap();
                    let description = err_ref.localizedDescription();
                    Err(NotificationError::AuthorizationFailed(
                        description.to_string(),
                    ))
                } else {
                    Ok(granted.as_bool())
                };
                let _ = sender.send(result);
            }
        });

        Self::current().requestAuthorizationWithOptions_completionHandler(options, &block);

        let granted = rx
            .await
            .map_err(|_| NotificationError::InitializationFailed("Channel closed".to_string()))??;

        if granted {
            debug!("Notification authorization granted");
            Ok(Self)
        } else {
            Err(NotificationError::PermissionDenied)
        }
    }
}

impl BreakNotifier for UserNotificationCenter {
    fn schedule_break(&self, fire_in: Duration, title: &str, body: &str) {
        let content = unsafe { UNMutableNotificationContent::new() };
        unsafe {
            content.setTitle(&NSString::from_str(title));
            content.setBody(&NSString::from_str(body));
            content.setSound(Some(&UNNotificationSound::defaultSound()));
        }

        let trigger = unsafe {
            UNTimeIntervalNotificationTrigger::triggerWithTimeInterval_repeats(
                fire_in.as_secs_f64(),
                false,
            )
        };

        let identifier = NSString::from_str(&Uuid::new_v4().to_string());
        let request = UNNotificationRequest::requestWithIdentifier_content_trigger(
            &identifier,
            &content,
            Some(&trigger),
        );

        // Fire-and-forget: delivery failures only get a log line.
        let block = RcBlock::new(move |error: *mut NSError| {
            if !error.is_null() {
                let err_ref = unsafe { error.as_ref() }.unwrap();
                warn!(
                    "通知をスケジュールできませんでした: {}",
                    err_ref.localizedDescription()
                );
            }
        });
        Self::current().addNotificationRequest_withCompletionHandler(&request, Some(&block));
    }

    fn cancel_pending(&self) {
        Self::current().removeAllPendingNotificationRequests();
    }
}
