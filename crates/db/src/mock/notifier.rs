use async_trait::async_trait;
use carebook_core::{models::notification::Notification, store::Notifier};
use eyre::{Result, eyre};
use tokio::sync::mpsc;

/// Forwards every notification into a channel so tests can await delivery.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl RecordingNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.sender
            .send(notification)
            .map_err(|_| eyre!("notification receiver dropped"))
    }
}

/// A notifier whose delivery always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: Notification) -> Result<()> {
        Err(eyre!("notification service unavailable"))
    }
}
