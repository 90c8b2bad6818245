//! TransactionStore port - Durable money movements and their settlement.
//!
//! Settlement is the only write this crate performs on a transaction. It
//! is a single conditional transition ("set status WHERE status is still
//! open") committed together with the ledger mutation it unlocks and that
//! mutation's audit record. Duplicate and concurrent deliveries for the
//! same reference therefore see `AlreadyTerminal` and never touch a wallet.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, TransactionId};
use crate::domain::ledger::{LedgerEntry, WalletActivityRecord};
use crate::domain::transaction::{ReferenceField, Transaction, TransactionStatus};

/// A request to move a transaction to a terminal status.
#[derive(Debug, Clone)]
pub struct SettleRequest {
    pub transaction_id: TransactionId,
    /// `Successful` or `Failed`.
    pub target: TransactionStatus,
    pub received_at: Timestamp,
    /// Ledger mutation committed atomically with the transition, if any.
    pub ledger_entry: Option<LedgerEntry>,
}

impl SettleRequest {
    pub fn new(transaction_id: TransactionId, target: TransactionStatus) -> Self {
        Self {
            transaction_id,
            target,
            received_at: Timestamp::now(),
            ledger_entry: None,
        }
    }

    pub fn with_ledger_entry(mut self, entry: LedgerEntry) -> Self {
        self.ledger_entry = Some(entry);
        self
    }

    pub fn received_at(mut self, at: Timestamp) -> Self {
        self.received_at = at;
        self
    }
}

/// Result of a settlement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SettleOutcome {
    /// This call performed the transition.
    Applied {
        transaction: Transaction,
        activity: Option<WalletActivityRecord>,
    },
    /// Another delivery got there first; nothing was changed.
    AlreadyTerminal,
}

impl SettleOutcome {
    pub fn was_applied(&self) -> bool {
        matches!(self, SettleOutcome::Applied { .. })
    }
}

/// Port for transaction persistence.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Finds a transaction whose `field` reference equals `value`.
    async fn find_by_reference(
        &self,
        field: ReferenceField,
        value: &str,
    ) -> Result<Option<Transaction>, DomainError>;

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError>;

    /// Records a newly initiated transaction.
    ///
    /// Initiation itself lives outside this service; this exists for
    /// seeding and for collaborators sharing the same store.
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Conditionally transitions the transaction and applies its ledger
    /// entry in one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns an error (and changes nothing) when the transaction does not
    /// exist, the ledger entry cannot be applied, or persistence fails.
    async fn settle(&self, request: SettleRequest) -> Result<SettleOutcome, DomainError>;
}
