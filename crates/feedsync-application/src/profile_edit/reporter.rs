//! Surfaces the outcome of a profile edit to the user.

use feedsync_core::config::NotificationMessages;
use feedsync_core::notification::{Notification, Notifier, ViewRefresher};
use feedsync_core::outcome::{FailureReason, ProfileEditOutcome};
use std::sync::Arc;

/// Emits exactly one notification per outcome and requests a coarse refresh
/// whenever the cache was patched or should have been.
pub struct OutcomeReporter {
    notifier: Arc<dyn Notifier>,
    refresher: Arc<dyn ViewRefresher>,
    messages: NotificationMessages,
    refresh_after_partial_failure: bool,
}

impl OutcomeReporter {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        refresher: Arc<dyn ViewRefresher>,
        messages: NotificationMessages,
        refresh_after_partial_failure: bool,
    ) -> Self {
        Self {
            notifier,
            refresher,
            messages,
            refresh_after_partial_failure,
        }
    }

    /// Reports `outcome`. `cache_reconciled` is false when the cache patch
    /// was attempted and failed, in which case a refresh is always requested.
    pub fn report(&self, outcome: &ProfileEditOutcome, cache_reconciled: bool) {
        let notification = match outcome.failure_reason() {
            None => Notification::success(&self.messages.success),
            Some(reason) => Notification::failure(reason, self.failure_message(reason)),
        };
        let refresh = match outcome {
            ProfileEditOutcome::Success { .. } => true,
            ProfileEditOutcome::PartialFailure { .. } => {
                self.refresh_after_partial_failure || !cache_reconciled
            }
            ProfileEditOutcome::Failure { .. } => false,
        };

        if refresh {
            tracing::debug!("[OutcomeReporter] Requesting view refresh");
            self.refresher.request_refresh();
        }
        self.notifier.notify(notification);
    }

    fn failure_message(&self, reason: FailureReason) -> &str {
        match reason {
            FailureReason::ProfilePersistence => &self.messages.failure,
            FailureReason::AvatarUpload => &self.messages.avatar_failure,
        }
    }
}
