//! Channel-backed notification and refresh adapters.
//!
//! Notifications are forwarded over an unbounded tokio channel so a UI (or
//! the CLI) can drain them at its own pace. Refresh requests bump a counter
//! on a watch channel; observers only care that a refresh is pending.

use feedsync_core::notification::{Notification, Notifier, ViewRefresher};
use tokio::sync::{mpsc, watch};

/// A notifier that sends notifications to a channel.
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver that drains it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Non-blocking send - if the receiver is dropped, we just skip
        if self.sender.send(notification).is_err() {
            tracing::debug!("[ChannelNotifier] Receiver dropped, notification discarded");
        }
    }
}

/// Counts refresh requests and lets observers wait for the next one.
pub struct RefreshSignal {
    sender: watch::Sender<u64>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sender.subscribe()
    }

    /// Total refresh requests so far.
    pub fn request_count(&self) -> u64 {
        *self.sender.borrow()
    }
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRefresher for RefreshSignal {
    fn request_refresh(&self) {
        self.sender.send_modify(|count| *count += 1);
        tracing::debug!("[RefreshSignal] Refresh requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedsync_core::notification::NotificationKind;
    use feedsync_core::outcome::FailureReason;

    #[tokio::test]
    async fn test_channel_notifier_forwards() {
        let (notifier, mut receiver) = ChannelNotifier::new();

        notifier.notify(Notification::success("done"));

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.kind, NotificationKind::Success);
        assert_eq!(received.message, "done");
        assert_eq!(received.reason, None);
    }

    #[test]
    fn test_channel_notifier_survives_dropped_receiver() {
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);

        notifier.notify(Notification::failure(
            FailureReason::AvatarUpload,
            "nobody listening",
        ));
    }

    #[tokio::test]
    async fn test_refresh_signal_wakes_subscribers() {
        let signal = RefreshSignal::new();
        let mut observer = signal.subscribe();

        signal.request_refresh();

        observer.changed().await.unwrap();
        assert_eq!(*observer.borrow(), 1);
        assert_eq!(signal.request_count(), 1);
    }
}
