//! Notifier port - Best-effort user notifications.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::foundation::{Amount, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DepositReceived,
    WithdrawalCompleted,
    WithdrawalFailed,
    PurchaseConfirmed,
    SaleEscrowed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub amount: Amount,
    pub reference: String,
}

impl Notification {
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        amount: Amount,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            kind,
            amount,
            reference: reference.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),

    #[error("notification endpoint rejected request with HTTP {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError>;
}
