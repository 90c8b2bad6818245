//! Fixtures shared by the reconciliation handler tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::memory::{InMemoryEscrowCreator, InMemoryLedgerStore, RecordingNotifier};
use crate::domain::foundation::{Amount, DomainError, ErrorCode, TransactionId, UserId};
use crate::domain::ledger::WalletBalances;
use crate::domain::transaction::{
    ReferenceField, Transaction, TransactionKind, TransactionReferences,
};
use crate::ports::{
    EscrowCreator, EscrowError, EscrowReceipt, EscrowRequest, Notification, NotificationError,
    Notifier, PaymentVerifier, SettleOutcome, SettleRequest, TransactionStore, VerificationError,
    VerificationStatus,
};

use super::{PaymentVerification, SideEffectDispatcher};

// ════════════════════════════════════════════════════════════════════════════
// Builders
// ════════════════════════════════════════════════════════════════════════════

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn naira(v: i64) -> Amount {
    Amount::new(Decimal::new(v, 0)).unwrap()
}

pub fn balances(available: i64, locked: i64) -> WalletBalances {
    WalletBalances::new(Decimal::new(available, 0), Decimal::new(locked, 0)).unwrap()
}

pub fn deposit(reference: &str, owner: &str, amount: i64) -> Transaction {
    Transaction::initiate(
        TransactionKind::Deposit,
        user(owner),
        naira(amount),
        TransactionReferences::new(reference).unwrap(),
    )
}

pub fn withdrawal(reference: &str, owner: &str, amount: i64) -> Transaction {
    Transaction::initiate(
        TransactionKind::Withdrawal,
        user(owner),
        naira(amount),
        TransactionReferences::new(reference).unwrap(),
    )
    .with_counterpart("bank-acct-1")
}

pub fn purchase(reference: &str, buyer: &str, developer: &str, amount: i64) -> Transaction {
    Transaction::initiate(
        TransactionKind::PropertyPurchase,
        user(buyer),
        naira(amount),
        TransactionReferences::new(reference).unwrap(),
    )
    .with_counterpart(developer)
    .with_metadata(json!({ "property_id": "prop-77", "payment_type": "property_purchase" }))
}

/// Lets spawned notification tasks run.
pub async fn drain_background_tasks() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
}

// ════════════════════════════════════════════════════════════════════════════
// Mock Implementations
// ════════════════════════════════════════════════════════════════════════════

pub struct MockVerifier {
    response: Result<VerificationStatus, VerificationError>,
    calls: std::sync::Mutex<Vec<String>>,
}

impl MockVerifier {
    pub fn answering(response: Result<VerificationStatus, VerificationError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentVerifier for MockVerifier {
    async fn verify(&self, reference: &str) -> Result<VerificationStatus, VerificationError> {
        self.calls.lock().unwrap().push(reference.to_string());
        self.response.clone()
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Rejected(503))
    }
}

pub struct FailingEscrowCreator;

#[async_trait]
impl EscrowCreator for FailingEscrowCreator {
    async fn create_escrow(&self, _request: EscrowRequest) -> Result<EscrowReceipt, EscrowError> {
        Err(EscrowError::Unavailable("escrow service down".into()))
    }
}

/// Resolves like the wrapped store but fails every settlement.
pub struct FailingSettleStore {
    inner: Arc<InMemoryLedgerStore>,
}

impl FailingSettleStore {
    pub fn wrapping(inner: Arc<InMemoryLedgerStore>) -> Arc<Self> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl TransactionStore for FailingSettleStore {
    async fn find_by_reference(
        &self,
        field: ReferenceField,
        value: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        self.inner.find_by_reference(field, value).await
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        self.inner.insert(transaction).await
    }

    async fn settle(&self, _request: SettleRequest) -> Result<SettleOutcome, DomainError> {
        Err(DomainError::new(ErrorCode::DatabaseError, "connection reset"))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Fixture
// ════════════════════════════════════════════════════════════════════════════

pub struct Fixture {
    pub store: Arc<InMemoryLedgerStore>,
    pub escrows: Arc<InMemoryEscrowCreator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryLedgerStore::new()),
            escrows: Arc::new(InMemoryEscrowCreator::new()),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    pub async fn with_transaction(self, transaction: &Transaction) -> Self {
        self.store.insert(transaction).await.unwrap();
        self
    }

    pub async fn with_wallet(self, owner: &str, available: i64, locked: i64) -> Self {
        self.store
            .seed_wallet(user(owner), balances(available, locked))
            .await;
        self
    }

    pub fn dispatcher(&self) -> SideEffectDispatcher {
        SideEffectDispatcher::new(self.notifier.clone())
    }

    pub fn no_verification(&self) -> PaymentVerification {
        PaymentVerification::disabled()
    }

    pub async fn wallet(&self, owner: &str) -> WalletBalances {
        self.store.balances_of(&user(owner)).await
    }
}
