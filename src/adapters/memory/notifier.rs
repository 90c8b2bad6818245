//! Recording notifier for tests and local runs.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::ports::{Notification, NotificationError, Notifier};

/// Stores every notification it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .map_err(|_| NotificationError::Delivery("recorder poisoned".into()))?
            .push(notification);
        Ok(())
    }
}
