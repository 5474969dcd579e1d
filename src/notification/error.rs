//! Notification system error types.

use thiserror::Error;

/// Errors that can occur while setting up the notification system.
///
/// Delivery itself never errors: once set up, scheduling is fire-and-forget.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to request notification authorization from the system.
    #[error("通知許可の取得に失敗しました: {0}")]
    AuthorizationFailed(String),

    /// Notification permission was denied by the user.
    #[error("通知許可が拒否されています")]
    PermissionDenied,

    /// Failed to initialize the notification system.
    #[error("通知システムの初期化に失敗しました: {0}")]
    InitializationFailed(String),
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied | Self::AuthorizationFailed(_)
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AuthorizationFailed(_) | Self::PermissionDenied => {
                "システム環境設定 > 通知 でアプリの通知を許可してください"
            }
            Self::InitializationFailed(_) => "アプリケーションを再起動してください",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotificationError::AuthorizationFailed("denied".to_string());
        assert!(err.to_string().contains("denied"));
        assert!(err.to_string().contains("通知許可の取得に失敗しました"));
    }

    #[test]
    fn test_is_permission_error() {
        assert!(NotificationError::PermissionDenied.is_permission_error());
        assert!(NotificationError::AuthorizationFailed("x".into()).is_permission_error());
        assert!(!NotificationError::InitializationFailed("x".into()).is_permission_error());
    }

    #[test]
    fn test_suggestions_not_empty() {
        assert!(!NotificationError::PermissionDenied.suggestion().is_empty());
        assert!(!NotificationError::InitializationFailed("x".into())
            .suggestion()
            .is_empty());
    }
}
