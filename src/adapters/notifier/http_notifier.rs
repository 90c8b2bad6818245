//! Notifier that posts JSON to a delivery service.

use async_trait::async_trait;
use std::time::Duration;

use crate::ports::{Notification, NotificationError, Notifier};

pub struct HttpNotifier {
    endpoint_url: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new(endpoint_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            timeout,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .post(&self.endpoint_url)
            .timeout(self.timeout)
            .json(&notification)
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Rejected(response.status().as_u16()));
        }

        tracing::debug!(
            recipient = %notification.recipient,
            reference = %notification.reference,
            "Notification delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Amount, UserId};
    use crate::ports::NotificationKind;

    #[test]
    fn notification_serializes_for_delivery() {
        let notification = Notification::new(
            UserId::new("seller-1").unwrap(),
            NotificationKind::WithdrawalFailed,
            Amount::from_minor_units(30_000).unwrap(),
            "wd_1",
        );
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["kind"], "withdrawal_failed");
        assert_eq!(json["recipient"], "seller-1");
        assert_eq!(json["reference"], "wd_1");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_delivery_error() {
        let notifier = HttpNotifier::new("http://127.0.0.1:1/notify", Duration::from_millis(500));
        let result = notifier
            .notify(Notification::new(
                UserId::new("u1").unwrap(),
                NotificationKind::DepositReceived,
                Amount::from_minor_units(100).unwrap(),
                "dep_1",
            ))
            .await;
        assert!(matches!(result, Err(NotificationError::Delivery(_))));
    }
}
