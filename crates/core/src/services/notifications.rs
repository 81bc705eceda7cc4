use std::sync::Arc;

use tracing::{debug, warn};

use crate::{models::notification::Notification, store::Notifier};

/// Sends `notification` on a background task.
///
/// The caller never waits for delivery and a failed delivery is only logged.
/// Must be called from within a tokio runtime.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        let user_id = notification.user_id;
        match notifier.notify(notification).await {
            Ok(()) => debug!("Notification delivered to user {}", user_id),
            Err(e) => warn!("Failed to create notification for user {}: {:#}", user_id, e),
        }
    });
}
