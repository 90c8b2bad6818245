//! Integration tests for the webhook HTTP surface.
//!
//! Drives the full router over the in-memory adapters:
//! 1. Authentication happens before any lookup
//! 2. Duplicate and concurrent deliveries settle once
//! 3. Wallet effects match each event family
//! 4. Every authenticated delivery is acknowledged with its outcome

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use wallet_ledger::adapters::http::{app_router, HealthAppState, WebhookAppState};
use wallet_ledger::adapters::{InMemoryEscrowCreator, InMemoryLedgerStore, RecordingNotifier};
use wallet_ledger::application::{
    PaymentVerification, ReconcileWebhookHandler, ReconciliationServices,
};
use wallet_ledger::domain::foundation::{Amount, DomainError, TransactionId, UserId};
use wallet_ledger::domain::ledger::{Actor, WalletBalances};
use wallet_ledger::domain::transaction::{
    ReferenceField, Transaction, TransactionKind, TransactionReferences, TransactionStatus,
};
use wallet_ledger::domain::webhook::{sign_payload, SIGNATURE_HEADER};
use wallet_ledger::ports::{
    PaymentVerifier, SettleOutcome, SettleRequest, TransactionStore, VerificationError,
    VerificationStatus, WalletLedger,
};

const SECRET: &str = "sk_test_integration";
const WEBHOOK_PATH: &str = "/api/webhooks/paystack";

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Counts lookups so tests can prove rejected requests never reach the store.
struct CountingStore {
    inner: Arc<InMemoryLedgerStore>,
    lookups: AtomicUsize,
}

#[async_trait]
impl TransactionStore for CountingStore {
    async fn find_by_reference(
        &self,
        field: ReferenceField,
        value: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_reference(field, value).await
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        self.inner.insert(transaction).await
    }

    async fn settle(&self, request: SettleRequest) -> Result<SettleOutcome, DomainError> {
        self.inner.settle(request).await
    }
}

struct TestApp {
    router: Router,
    ledger: Arc<InMemoryLedgerStore>,
    store: Arc<CountingStore>,
    escrows: Arc<InMemoryEscrowCreator>,
    notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_secret(Some(SECRET))
    }

    fn with_secret(secret: Option<&str>) -> Self {
        Self::build(secret, PaymentVerification::disabled(), Duration::from_secs(10))
    }

    fn with_verification(verification: PaymentVerification, request_timeout: Duration) -> Self {
        Self::build(Some(SECRET), verification, request_timeout)
    }

    fn build(
        secret: Option<&str>,
        verification: PaymentVerification,
        request_timeout: Duration,
    ) -> Self {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let store = Arc::new(CountingStore {
            inner: Arc::clone(&ledger),
            lookups: AtomicUsize::new(0),
        });
        let escrows = Arc::new(InMemoryEscrowCreator::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let services = ReconciliationServices {
            store: store.clone(),
            verification,
            escrow_creator: escrows.clone(),
            notifier: notifier.clone(),
        };
        let handler = ReconcileWebhookHandler::new(
            wallet_ledger::domain::webhook::WebhookSignatureVerifier::from_optional(
                secret.map(str::to_owned),
            ),
            services,
        );

        let router = app_router(
            WebhookAppState::new(Arc::new(handler)),
            HealthAppState {
                probe: ledger.clone(),
            },
            request_timeout,
        );

        Self {
            router,
            ledger,
            store,
            escrows,
            notifier,
        }
    }

    async fn seed(&self, transaction: &Transaction) {
        self.ledger.insert(transaction).await.unwrap();
    }

    async fn post_signed(&self, payload: &Value) -> (StatusCode, Value) {
        let body = serde_json::to_vec(payload).unwrap();
        let signature = sign_payload(SECRET, &body);
        self.post(body, Some(signature)).await
    }

    async fn post(&self, body: Vec<u8>, signature: Option<String>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(WEBHOOK_PATH)
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn lookups(&self) -> usize {
        self.store.lookups.load(Ordering::SeqCst)
    }
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn naira(v: i64) -> Amount {
    Amount::new(Decimal::new(v, 0)).unwrap()
}

fn balances(available: i64, locked: i64) -> WalletBalances {
    WalletBalances::new(Decimal::new(available, 0), Decimal::new(locked, 0)).unwrap()
}

fn transaction(kind: TransactionKind, reference: &str, owner: &str, amount: i64) -> Transaction {
    Transaction::initiate(
        kind,
        user(owner),
        naira(amount),
        TransactionReferences::new(reference).unwrap(),
    )
}

fn charge_success(reference: &str, amount_kobo: i64) -> Value {
    json!({
        "event": "charge.success",
        "data": {
            "id": 302961,
            "reference": reference,
            "amount": amount_kobo,
            "currency": "NGN",
            "status": "success",
            "metadata": {}
        }
    })
}

/// Gateway that never answers within any sane bound.
struct StalledVerifier;

#[async_trait]
impl PaymentVerifier for StalledVerifier {
    async fn verify(&self, _reference: &str) -> Result<VerificationStatus, VerificationError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(VerificationStatus::Confirmed)
    }
}

/// Lets spawned notification tasks run.
async fn settle_background() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn invalid_signature_is_rejected_before_any_lookup() {
    let app = TestApp::new();
    app.seed(&transaction(TransactionKind::Deposit, "dep_1", "buyer-1", 500))
        .await;

    let body = serde_json::to_vec(&charge_success("dep_1", 50_000)).unwrap();
    let (status, json) = app.post(body, Some("deadbeef".repeat(16))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error_code"], "INVALID_SIGNATURE");
    assert_eq!(app.lookups(), 0);
    assert_eq!(app.ledger.activity_count().await, 0);
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let app = TestApp::new();
    let body = serde_json::to_vec(&charge_success("dep_1", 50_000)).unwrap();

    let (status, json) = app.post(body, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error_code"], "MISSING_SIGNATURE");
    assert_eq!(app.lookups(), 0);
}

#[tokio::test]
async fn signature_over_different_body_is_rejected() {
    let app = TestApp::new();
    let signed = serde_json::to_vec(&charge_success("dep_1", 50_000)).unwrap();
    let tampered = serde_json::to_vec(&charge_success("dep_1", 5_000_000)).unwrap();

    let (status, _) = app.post(tampered, Some(sign_payload(SECRET, &signed))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.lookups(), 0);
}

#[tokio::test]
async fn missing_secret_refuses_with_server_error() {
    let app = TestApp::with_secret(None);
    let body = serde_json::to_vec(&charge_success("dep_1", 50_000)).unwrap();

    let (status, json) = app.post(body.clone(), Some(sign_payload(SECRET, &body))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error_code"], "WEBHOOK_NOT_CONFIGURED");
    assert_eq!(app.lookups(), 0);
}

#[tokio::test]
async fn uppercase_hex_signature_is_accepted() {
    let app = TestApp::new();
    let body = serde_json::to_vec(&json!({"event": "customer.created", "data": {}})).unwrap();

    let signature = sign_payload(SECRET, &body).to_uppercase();
    let (status, json) = app.post(body, Some(signature)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "ignored");
}

// =============================================================================
// Deposits
// =============================================================================

#[tokio::test]
async fn duplicate_deposit_credits_once() {
    let app = TestApp::new();
    app.ledger
        .seed_wallet(user("buyer-1"), balances(1000, 0))
        .await;
    let deposit = transaction(TransactionKind::Deposit, "dep_1", "buyer-1", 500);
    app.seed(&deposit).await;

    let (first_status, first) = app.post_signed(&charge_success("dep_1", 50_000)).await;
    let (second_status, second) = app.post_signed(&charge_success("dep_1", 50_000)).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(first, json!({"received": true, "outcome": "deposit_credited"}));
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second["outcome"], "already_processed");

    assert_eq!(app.ledger.balances_of(&user("buyer-1")).await, balances(1500, 0));
    assert_eq!(app.ledger.activity_for(&deposit.id).await.len(), 1);

    let stored = app.ledger.find_by_id(&deposit.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Successful);
    assert!(stored.completed_at.is_some());
}

#[tokio::test]
async fn concurrent_duplicate_deposits_credit_once() {
    let app = Arc::new(TestApp::new());
    app.ledger
        .seed_wallet(user("buyer-1"), balances(1000, 0))
        .await;
    let deposit = transaction(TransactionKind::Deposit, "dep_race", "buyer-1", 500);
    app.seed(&deposit).await;

    let deliveries = (0..16).map(|_| {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.post_signed(&charge_success("dep_race", 50_000)).await })
    });
    let results = futures::future::join_all(deliveries).await;

    let mut credited = 0;
    for result in results {
        let (status, json) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
        if json["outcome"] == "deposit_credited" {
            credited += 1;
        } else {
            assert_eq!(json["outcome"], "already_processed");
        }
    }

    assert_eq!(credited, 1);
    assert_eq!(app.ledger.balances_of(&user("buyer-1")).await, balances(1500, 0));
    assert_eq!(app.ledger.activity_for(&deposit.id).await.len(), 1);
}

#[tokio::test]
async fn deposit_resolved_by_gateway_id() {
    let app = TestApp::new();
    let deposit = transaction(TransactionKind::Deposit, "dep_local", "buyer-1", 200)
        .with_gateway_reference("302961");
    app.seed(&deposit).await;

    let (status, json) = app.post_signed(&charge_success("unknown_ref", 20_000)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "deposit_credited");
    assert_eq!(app.ledger.balances_of(&user("buyer-1")).await, balances(200, 0));
}

#[tokio::test]
async fn deposit_notification_is_dispatched() {
    let app = TestApp::new();
    app.seed(&transaction(TransactionKind::Deposit, "dep_n", "buyer-9", 75))
        .await;

    app.post_signed(&charge_success("dep_n", 7_500)).await;
    settle_background().await;

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, user("buyer-9"));
    assert_eq!(sent[0].reference, "dep_n");
}

#[tokio::test]
async fn unknown_reference_is_acknowledged_without_mutation() {
    let app = TestApp::new();

    let (status, json) = app.post_signed(&charge_success("nobody", 10_000)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "transaction_not_found");
    assert_eq!(app.ledger.activity_count().await, 0);
}

#[tokio::test]
async fn stalled_verification_outlasting_request_timeout_still_credits() {
    let app = TestApp::with_verification(
        PaymentVerification::new(Arc::new(StalledVerifier), Duration::from_millis(1_500)),
        Duration::from_secs(1),
    );
    let buyer = user("buyer-slow");
    app.seed(&transaction(TransactionKind::Deposit, "dep_slow", "buyer-slow", 500))
        .await;

    let (status, json) = app.post_signed(&charge_success("dep_slow", 50_000)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "deposit_credited");
    assert_eq!(app.ledger.balances_of(&buyer).await, balances(500, 0));
}

// =============================================================================
// Withdrawals
// =============================================================================

#[tokio::test]
async fn failed_withdrawal_restores_initiation_hold() {
    let app = TestApp::new();
    let seller = user("seller-1");
    app.ledger.seed_wallet(seller.clone(), balances(1000, 0)).await;

    let withdrawal = transaction(TransactionKind::Withdrawal, "wd_1", "seller-1", 300)
        .with_counterpart("bank-acct-1")
        .with_provider_reference("TRF_1");
    app.seed(&withdrawal).await;
    app.ledger
        .lock(
            &seller,
            naira(300),
            Some(withdrawal.id),
            Actor::User(seller.clone()),
            "Withdrawal requested",
        )
        .await
        .unwrap();
    assert_eq!(app.ledger.balances_of(&seller).await, balances(700, 300));

    let (status, json) = app
        .post_signed(&json!({
            "event": "transfer.failed",
            "data": {
                "reference": "wd_1",
                "transfer_code": "TRF_1",
                "amount": 30_000,
                "status": "failed",
                "reason": "Could not resolve account"
            }
        }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "withdrawal_refunded");
    assert_eq!(app.ledger.balances_of(&seller).await, balances(1000, 0));

    let stored = app.ledger.find_by_id(&withdrawal.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Failed);
    assert!(stored.failed_at.is_some());
}

#[tokio::test]
async fn reversal_resolved_by_transfer_code() {
    let app = TestApp::new();
    let seller = user("seller-2");
    app.ledger.seed_wallet(seller.clone(), balances(0, 300)).await;
    let withdrawal = transaction(TransactionKind::Withdrawal, "wd_2", "seller-2", 300)
        .with_provider_reference("TRF_2");
    app.seed(&withdrawal).await;

    let (_, json) = app
        .post_signed(&json!({
            "event": "transfer.reversed",
            "data": {"reference": "", "transfer_code": "TRF_2", "amount": 30_000}
        }))
        .await;

    assert_eq!(json["outcome"], "withdrawal_refunded");
    assert_eq!(app.ledger.balances_of(&seller).await, balances(300, 0));
}

#[tokio::test]
async fn successful_withdrawal_releases_lock_once() {
    let app = TestApp::new();
    let seller = user("seller-3");
    app.ledger.seed_wallet(seller.clone(), balances(700, 300)).await;
    app.seed(&transaction(TransactionKind::Withdrawal, "wd_3", "seller-3", 300))
        .await;
    let event = json!({
        "event": "transfer.success",
        "data": {"reference": "wd_3", "transfer_code": "TRF_3", "amount": 30_000}
    });

    let (_, first) = app.post_signed(&event).await;
    let (_, second) = app.post_signed(&event).await;

    assert_eq!(first["outcome"], "withdrawal_settled");
    assert_eq!(second["outcome"], "already_processed");
    assert_eq!(app.ledger.balances_of(&seller).await, balances(700, 0));
}

#[tokio::test]
async fn failure_after_success_is_a_no_op() {
    let app = TestApp::new();
    let seller = user("seller-4");
    app.ledger.seed_wallet(seller.clone(), balances(700, 300)).await;
    app.seed(&transaction(TransactionKind::Withdrawal, "wd_4", "seller-4", 300))
        .await;

    app.post_signed(&json!({"event": "transfer.success", "data": {"reference": "wd_4"}}))
        .await;
    let (_, late) = app
        .post_signed(&json!({"event": "transfer.failed", "data": {"reference": "wd_4"}}))
        .await;

    assert_eq!(late["outcome"], "already_processed");
    assert_eq!(app.ledger.balances_of(&seller).await, balances(700, 0));
}

// =============================================================================
// Escrowed purchases
// =============================================================================

#[tokio::test]
async fn escrow_purchase_leaves_buyer_wallet_untouched() {
    let app = TestApp::new();
    let buyer = user("buyer-5");
    let developer = user("dev-5");
    app.ledger.seed_wallet(buyer.clone(), balances(1000, 0)).await;

    let purchase = transaction(TransactionKind::PropertyPurchase, "pp_1", "buyer-5", 2_000_000)
        .with_counterpart("dev-5")
        .with_metadata(json!({"property_id": "prop-12"}));
    app.seed(&purchase).await;

    let (status, json) = app
        .post_signed(&json!({
            "event": "charge.success",
            "data": {
                "reference": "pp_1",
                "amount": 200_000_000,
                "status": "success",
                "metadata": {"payment_type": "property_purchase", "property_id": "prop-12"}
            }
        }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "escrow_created");
    assert_eq!(app.ledger.balances_of(&buyer).await, balances(1000, 0));
    assert_eq!(
        app.ledger.balances_of(&developer).await,
        balances(0, 2_000_000)
    );

    let escrow = app.escrows.escrow_for(&purchase.id).await.unwrap();
    assert_eq!(escrow.request.buyer_id, buyer);
    assert_eq!(escrow.request.developer_id, developer);
    assert_eq!(escrow.request.property_id.as_str(), "prop-12");
}

#[tokio::test]
async fn purchase_delivered_twice_opens_one_escrow() {
    let app = TestApp::new();
    let purchase = transaction(TransactionKind::PropertyPurchase, "pp_2", "buyer-6", 50_000)
        .with_counterpart("dev-6")
        .with_metadata(json!({"property_id": "prop-3"}));
    app.seed(&purchase).await;
    let event = json!({
        "event": "charge.success",
        "data": {"reference": "pp_2", "metadata": "{\"payment_type\":\"property_purchase\"}"}
    });

    let (_, first) = app.post_signed(&event).await;
    let (_, second) = app.post_signed(&event).await;

    assert_eq!(first["outcome"], "escrow_created");
    assert_eq!(second["outcome"], "already_processed");
    assert_eq!(app.escrows.len().await, 1);
    assert_eq!(app.ledger.balances_of(&user("dev-6")).await, balances(0, 50_000));
}

// =============================================================================
// Acknowledged no-ops
// =============================================================================

#[tokio::test]
async fn malformed_body_is_acknowledged() {
    let app = TestApp::new();
    let body = b"{not json".to_vec();

    let (status, json) = app.post(body.clone(), Some(sign_payload(SECRET, &body))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "malformed");
    assert_eq!(app.lookups(), 0);
}

#[tokio::test]
async fn unrecognized_event_is_ignored() {
    let app = TestApp::new();

    let (status, json) = app
        .post_signed(&json!({"event": "subscription.create", "data": {"reference": "x"}}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outcome"], "ignored");
    assert_eq!(app.lookups(), 0);
}

#[tokio::test]
async fn charge_for_withdrawal_is_kind_mismatch() {
    let app = TestApp::new();
    let withdrawal = transaction(TransactionKind::Withdrawal, "wd_9", "seller-9", 100);
    app.seed(&withdrawal).await;

    let (_, json) = app.post_signed(&charge_success("wd_9", 10_000)).await;

    assert_eq!(json["outcome"], "kind_mismatch");
    let stored = app.ledger.find_by_id(&withdrawal.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Pending);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_reachable_store() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["database"], "reachable");
}
