//! In-memory transaction store and wallet ledger.
//!
//! One async mutex guards transactions, wallets and the audit log
//! together, so a settlement (transition + wallet mutation + audit record)
//! is observed by other tasks either fully or not at all. Used by tests and
//! by the binary when no database is configured.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, TransactionId, UserId};
use crate::domain::ledger::{
    LedgerEntry, LedgerError, Wallet, WalletActivityRecord, WalletBalances,
};
use crate::domain::transaction::{ReferenceField, Transaction};
use crate::ports::{
    HealthProbe, SettleOutcome, SettleRequest, TransactionStore, WalletLedger,
};

#[derive(Debug, Default)]
struct LedgerState {
    transactions: HashMap<TransactionId, Transaction>,
    wallets: HashMap<UserId, Wallet>,
    activity: Vec<WalletActivityRecord>,
}

impl LedgerState {
    /// Applies `entry` to its wallet, opening it if needed.
    ///
    /// Nothing is written when the operation is refused.
    fn apply_entry(&mut self, entry: &LedgerEntry) -> Result<WalletActivityRecord, DomainError> {
        let previous = match self.wallets.get(&entry.wallet_id) {
            Some(wallet) => wallet.balances,
            None if entry.operation.opens_wallet() => WalletBalances::default(),
            None => return Err(LedgerError::WalletNotFound(entry.wallet_id.clone()).into()),
        };

        let current = entry
            .operation
            .apply(&entry.wallet_id, previous, entry.amount)?;

        let wallet = self
            .wallets
            .entry(entry.wallet_id.clone())
            .or_insert_with(|| Wallet::open(entry.wallet_id.clone()));
        *wallet = Wallet::with_balances(entry.wallet_id.clone(), current);

        let record = WalletActivityRecord::from_entry(entry, previous, current);
        self.activity.push(record.clone());
        Ok(record)
    }
}

/// In-memory implementation of `TransactionStore` and `WalletLedger`.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a wallet's balances directly, bypassing the audit log.
    ///
    /// For seeding fixtures only.
    pub async fn seed_wallet(&self, owner_id: UserId, balances: WalletBalances) {
        let mut state = self.state.lock().await;
        state
            .wallets
            .insert(owner_id.clone(), Wallet::with_balances(owner_id, balances));
    }

    /// Balances of a wallet, zero if it was never opened.
    pub async fn balances_of(&self, owner_id: &UserId) -> WalletBalances {
        let state = self.state.lock().await;
        state
            .wallets
            .get(owner_id)
            .map(|w| w.balances)
            .unwrap_or_default()
    }

    /// All audit records for `transaction_id`.
    pub async fn activity_for(&self, transaction_id: &TransactionId) -> Vec<WalletActivityRecord> {
        let state = self.state.lock().await;
        state
            .activity
            .iter()
            .filter(|r| r.transaction_id.as_ref() == Some(transaction_id))
            .cloned()
            .collect()
    }

    pub async fn activity_count(&self) -> usize {
        self.state.lock().await.activity.len()
    }
}

#[async_trait]
impl TransactionStore for InMemoryLedgerStore {
    async fn find_by_reference(
        &self,
        field: ReferenceField,
        value: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .values()
            .find(|t| t.references.matches(field, value))
            .cloned())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.transactions.get(id).cloned())
    }

    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.transactions.contains_key(&transaction.id) {
            return Err(DomainError::database(format!(
                "transaction {} already exists",
                transaction.id
            )));
        }
        state
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn settle(&self, request: SettleRequest) -> Result<SettleOutcome, DomainError> {
        let mut state = self.state.lock().await;

        let current = state
            .transactions
            .get(&request.transaction_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::TransactionNotFound,
                    format!("transaction {} not found", request.transaction_id),
                )
            })?;

        if !current.status.is_open() {
            return Ok(SettleOutcome::AlreadyTerminal);
        }

        let mut settled = current;
        settled.finalize(request.target, request.received_at)?;

        let activity = match &request.ledger_entry {
            Some(entry) => Some(state.apply_entry(entry)?),
            None => None,
        };

        state
            .transactions
            .insert(settled.id, settled.clone());

        Ok(SettleOutcome::Applied {
            transaction: settled,
            activity,
        })
    }
}

#[async_trait]
impl WalletLedger for InMemoryLedgerStore {
    async fn apply(&self, entry: LedgerEntry) -> Result<WalletActivityRecord, DomainError> {
        let mut state = self.state.lock().await;
        state.apply_entry(&entry)
    }

    async fn balances(&self, wallet_id: &UserId) -> Result<Option<WalletBalances>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.wallets.get(wallet_id).map(|w| w.balances))
    }

    async fn activity(
        &self,
        wallet_id: &UserId,
    ) -> Result<Vec<WalletActivityRecord>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .activity
            .iter()
            .filter(|r| &r.wallet_id == wallet_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HealthProbe for InMemoryLedgerStore {
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
