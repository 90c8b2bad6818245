//! WalletLedger port - Standalone wallet mutations and balance reads.
//!
//! Webhook settlement goes through `TransactionStore::settle`, which applies
//! its entry inside the transition. This port serves flows that mutate a
//! wallet on their own, such as the lock taken at withdrawal initiation.

use async_trait::async_trait;

use crate::domain::foundation::{Amount, DomainError, TransactionId, UserId};
use crate::domain::ledger::{
    Actor, LedgerEntry, LedgerOperation, WalletActivityRecord, WalletBalances,
};

#[async_trait]
pub trait WalletLedger: Send + Sync {
    /// Applies one operation atomically to one wallet row and appends its
    /// audit record. Wallets are opened empty on first mutation.
    async fn apply(&self, entry: LedgerEntry) -> Result<WalletActivityRecord, DomainError>;

    /// Current balances, `None` if the wallet was never opened.
    async fn balances(&self, wallet_id: &UserId) -> Result<Option<WalletBalances>, DomainError>;

    /// Audit trail for a wallet, oldest first.
    async fn activity(&self, wallet_id: &UserId)
        -> Result<Vec<WalletActivityRecord>, DomainError>;

    async fn credit(
        &self,
        wallet_id: &UserId,
        amount: Amount,
        transaction_id: Option<TransactionId>,
        actor: Actor,
        description: &str,
    ) -> Result<WalletActivityRecord, DomainError> {
        self.apply(entry(
            wallet_id,
            LedgerOperation::Credit,
            amount,
            transaction_id,
            actor,
            description,
        ))
        .await
    }

    async fn debit(
        &self,
        wallet_id: &UserId,
        amount: Amount,
        transaction_id: Option<TransactionId>,
        actor: Actor,
        description: &str,
    ) -> Result<WalletActivityRecord, DomainError> {
        self.apply(entry(
            wallet_id,
            LedgerOperation::Debit,
            amount,
            transaction_id,
            actor,
            description,
        ))
        .await
    }

    async fn lock(
        &self,
        wallet_id: &UserId,
        amount: Amount,
        transaction_id: Option<TransactionId>,
        actor: Actor,
        description: &str,
    ) -> Result<WalletActivityRecord, DomainError> {
        self.apply(entry(
            wallet_id,
            LedgerOperation::Lock,
            amount,
            transaction_id,
            actor,
            description,
        ))
        .await
    }

    async fn release_lock(
        &self,
        wallet_id: &UserId,
        amount: Amount,
        transaction_id: Option<TransactionId>,
        actor: Actor,
        description: &str,
    ) -> Result<WalletActivityRecord, DomainError> {
        self.apply(entry(
            wallet_id,
            LedgerOperation::ReleaseLock,
            amount,
            transaction_id,
            actor,
            description,
        ))
        .await
    }

    async fn refund(
        &self,
        wallet_id: &UserId,
        amount: Amount,
        transaction_id: Option<TransactionId>,
        actor: Actor,
        description: &str,
    ) -> Result<WalletActivityRecord, DomainError> {
        self.apply(entry(
            wallet_id,
            LedgerOperation::Refund,
            amount,
            transaction_id,
            actor,
            description,
        ))
        .await
    }
}

fn entry(
    wallet_id: &UserId,
    operation: LedgerOperation,
    amount: Amount,
    transaction_id: Option<TransactionId>,
    actor: Actor,
    description: &str,
) -> LedgerEntry {
    let entry = LedgerEntry::new(wallet_id.clone(), operation, amount, actor, description);
    match transaction_id {
        Some(id) => entry.for_transaction(id),
        None => entry,
    }
}
