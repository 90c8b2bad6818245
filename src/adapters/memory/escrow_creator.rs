//! In-memory escrow creator.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::foundation::{EscrowId, HandoverId, Timestamp, TransactionId};
use crate::ports::{EscrowCreator, EscrowError, EscrowReceipt, EscrowRequest};

/// An escrow with its handover workflow, as recorded in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowRecord {
    pub receipt: EscrowReceipt,
    pub request: EscrowRequest,
    pub created_at: Timestamp,
}

/// Keeps one escrow per transaction.
#[derive(Debug, Default)]
pub struct InMemoryEscrowCreator {
    escrows: Mutex<HashMap<TransactionId, EscrowRecord>>,
}

impl InMemoryEscrowCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn escrow_for(&self, transaction_id: &TransactionId) -> Option<EscrowRecord> {
        self.escrows.lock().await.get(transaction_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.escrows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.escrows.lock().await.is_empty()
    }
}

#[async_trait]
impl EscrowCreator for InMemoryEscrowCreator {
    async fn create_escrow(&self, request: EscrowRequest) -> Result<EscrowReceipt, EscrowError> {
        let mut escrows = self.escrows.lock().await;
        if escrows.contains_key(&request.transaction_id) {
            return Err(EscrowError::AlreadyExists(request.transaction_id));
        }

        let receipt = EscrowReceipt {
            escrow_id: EscrowId::new(),
            handover_id: HandoverId::new(),
        };
        escrows.insert(
            request.transaction_id,
            EscrowRecord {
                receipt,
                request,
                created_at: Timestamp::now(),
            },
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Amount, PropertyId, UserId};
    use rust_decimal::Decimal;

    fn request(transaction_id: TransactionId) -> EscrowRequest {
        EscrowRequest {
            transaction_id,
            amount: Amount::new(Decimal::new(2_000_000, 0)).unwrap(),
            buyer_id: UserId::new("buyer-1").unwrap(),
            developer_id: UserId::new("dev-1").unwrap(),
            property_id: PropertyId::new("prop-1").unwrap(),
        }
    }

    #[tokio::test]
    async fn creates_one_escrow_per_transaction() {
        let creator = InMemoryEscrowCreator::new();
        let txn = TransactionId::new();

        let receipt = creator.create_escrow(request(txn)).await.unwrap();
        let stored = creator.escrow_for(&txn).await.unwrap();
        assert_eq!(stored.receipt, receipt);
        assert_eq!(stored.request.property_id.as_str(), "prop-1");

        let err = creator.create_escrow(request(txn)).await.unwrap_err();
        assert_eq!(err, EscrowError::AlreadyExists(txn));
        assert_eq!(creator.len().await, 1);
    }
}
