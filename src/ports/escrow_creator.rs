//! EscrowCreator port - Opens the escrow and handover for a purchase.
//!
//! Called after the purchase transaction is committed as successful. Its
//! internals (inspection scheduling, handover workflow) live elsewhere.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{Amount, EscrowId, HandoverId, PropertyId, TransactionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowRequest {
    pub transaction_id: TransactionId,
    pub amount: Amount,
    pub buyer_id: UserId,
    pub developer_id: UserId,
    pub property_id: PropertyId,
}

/// Identifiers of the created escrow and its handover workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowReceipt {
    pub escrow_id: EscrowId,
    pub handover_id: HandoverId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// An escrow already exists for this transaction.
    #[error("escrow already exists for transaction {0}")]
    AlreadyExists(TransactionId),

    #[error("escrow store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EscrowCreator: Send + Sync {
    async fn create_escrow(&self, request: EscrowRequest) -> Result<EscrowReceipt, EscrowError>;
}
