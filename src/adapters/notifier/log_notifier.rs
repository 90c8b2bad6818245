//! Notifier that only writes to the log.

use async_trait::async_trait;

use crate::ports::{Notification, NotificationError, Notifier};

/// Used when no delivery endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        tracing::info!(
            recipient = %notification.recipient,
            kind = ?notification.kind,
            amount = %notification.amount,
            reference = %notification.reference,
            "Notification emitted"
        );
        Ok(())
    }
}
