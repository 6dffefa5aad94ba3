//! Notification side channel and view refresh.

use serde::{Deserialize, Serialize};

use crate::outcome::FailureReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A user-facing message emitted once per profile edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// Set on errors; the message text alone comes from config and may repeat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            reason: None,
        }
    }

    pub fn failure(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            reason: Some(reason),
        }
    }
}

/// Receives user-facing notifications (toasts, status lines, ...).
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Requests a coarse refresh of the current view.
///
/// Fire-and-forget: the in-place cache patch does not cover every view, so a
/// refresh is requested as a backstop and its completion is not awaited.
pub trait ViewRefresher: Send + Sync {
    fn request_refresh(&self);
}
