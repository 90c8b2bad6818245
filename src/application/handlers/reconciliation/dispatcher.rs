//! Side-effect dispatcher.
//!
//! Notifications run on their own tasks after the financial outcome is
//! committed. Their failures are logged here and go no further.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::ports::{Notification, Notifier};

#[derive(Clone)]
pub struct SideEffectDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl SideEffectDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Hands `notification` to a background task and returns immediately.
    pub fn dispatch(&self, notification: Notification) -> JoinHandle<()> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let recipient = notification.recipient.clone();
            let kind = notification.kind;
            let reference = notification.reference.clone();
            if let Err(e) = notifier.notify(notification).await {
                tracing::warn!(
                    recipient = %recipient,
                    kind = ?kind,
                    reference = %reference,
                    error = %e,
                    "Notification failed; reconciliation unaffected"
                );
            }
        })
    }
}
