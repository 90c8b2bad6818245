//! PostgreSQL implementation of TransactionStore and WalletLedger.
//!
//! Settlement runs in one database transaction:
//!
//! 1. `UPDATE transactions ... WHERE id = $1 AND status IN ('pending','processing')`
//!    - zero rows means another delivery already settled it
//! 2. one `UPDATE wallets` whose WHERE clause refuses a negative available
//!    balance and whose SET clamps locked at zero
//! 3. `INSERT INTO wallet_activity`
//!
//! No step reads a value and writes it back from application code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::foundation::{
    ActivityId, Amount, DomainError, ErrorCode, Timestamp, TransactionId, UserId,
};
use crate::domain::ledger::{
    Actor, LedgerEntry, LedgerError, LedgerOperation, WalletActivityRecord, WalletBalances,
};
use crate::domain::transaction::{
    ReferenceField, Transaction, TransactionKind, TransactionReferences, TransactionStatus,
};
use crate::ports::{
    HealthProbe, SettleOutcome, SettleRequest, TransactionStore, WalletLedger,
};

const TRANSACTION_COLUMNS: &str = r#"
    id, kind, amount, status, owner_id, counterpart,
    reference, gateway_reference, provider_reference, metadata,
    created_at, completed_at, failed_at, webhook_received_at
"#;

/// PostgreSQL-backed transaction store and wallet ledger.
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a transaction.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    kind: String,
    amount: Decimal,
    status: String,
    owner_id: String,
    counterpart: Option<String>,
    reference: String,
    gateway_reference: Option<String>,
    provider_reference: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    failed_at: Option<DateTime<Utc>>,
    webhook_received_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::domain::foundation::ValidationError| {
            DomainError::database(format!("Invalid transaction row {}: {}", row.id, e))
        };

        let mut references = TransactionReferences::new(row.reference.clone()).map_err(corrupt)?;
        references.gateway = row.gateway_reference.clone();
        references.provider = row.provider_reference.clone();

        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            kind: row.kind.parse::<TransactionKind>().map_err(corrupt)?,
            amount: Amount::new(row.amount).map_err(corrupt)?,
            status: row.status.parse::<TransactionStatus>().map_err(corrupt)?,
            owner_id: UserId::new(row.owner_id.clone()).map_err(corrupt)?,
            counterpart: row.counterpart.clone(),
            references,
            metadata: row.metadata.clone(),
            created_at: Timestamp::from_datetime(row.created_at),
            completed_at: row.completed_at.map(Timestamp::from_datetime),
            failed_at: row.failed_at.map(Timestamp::from_datetime),
            webhook_received_at: row.webhook_received_at.map(Timestamp::from_datetime),
        })
    }
}

/// Database row representation of an audit record.
#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    wallet_id: String,
    actor: String,
    action: String,
    previous_available: Decimal,
    previous_locked: Decimal,
    new_available: Decimal,
    new_locked: Decimal,
    transaction_id: Option<Uuid>,
    description: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for WalletActivityRecord {
    type Error = DomainError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::domain::foundation::ValidationError| {
            DomainError::database(format!("Invalid wallet_activity row {}: {}", row.id, e))
        };
        let balances = |available, locked| {
            WalletBalances::new(available, locked).ok_or_else(|| {
                DomainError::database(format!("Negative balance in wallet_activity row {}", row.id))
            })
        };

        Ok(WalletActivityRecord {
            id: ActivityId::from_uuid(row.id),
            wallet_id: UserId::new(row.wallet_id.clone()).map_err(corrupt)?,
            actor: row.actor.parse::<Actor>().map_err(corrupt)?,
            action: row.action.parse::<LedgerOperation>().map_err(corrupt)?,
            previous: balances(row.previous_available, row.previous_locked)?,
            current: balances(row.new_available, row.new_locked)?,
            transaction_id: row.transaction_id.map(TransactionId::from_uuid),
            description: row.description.clone(),
            recorded_at: Timestamp::from_datetime(row.recorded_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BalanceChangeRow {
    previous_available: Decimal,
    previous_locked: Decimal,
    new_available: Decimal,
    new_locked: Decimal,
}

fn reference_column(field: ReferenceField) -> &'static str {
    match field {
        ReferenceField::Primary => "reference",
        ReferenceField::Gateway => "gateway_reference",
        ReferenceField::Provider => "provider_reference",
    }
}

fn db_error(context: &str) -> impl Fn(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

/// Applies one ledger entry on `conn` and records its audit row.
///
/// Must run inside a database transaction so the wallet change and its
/// audit record commit together.
async fn apply_entry(
    conn: &mut PgConnection,
    entry: &LedgerEntry,
) -> Result<WalletActivityRecord, DomainError> {
    let (available_delta, locked_delta) = entry.operation.deltas(entry.amount);

    if entry.operation.opens_wallet() {
        sqlx::query("INSERT INTO wallets (owner_id) VALUES ($1) ON CONFLICT (owner_id) DO NOTHING")
            .bind(entry.wallet_id.as_str())
            .execute(&mut *conn)
            .await
            .map_err(db_error("Failed to open wallet"))?;
    }

    let change: Option<BalanceChangeRow> = sqlx::query_as(
        r#"
        UPDATE wallets AS w SET
            available_balance = w.available_balance + $2,
            locked_balance = GREATEST(w.locked_balance + $3, 0),
            updated_at = now()
        FROM (
            SELECT owner_id, available_balance, locked_balance
            FROM wallets
            WHERE owner_id = $1
            FOR UPDATE
        ) AS prev
        WHERE w.owner_id = prev.owner_id
          AND prev.available_balance + $2 >= 0
        RETURNING
            prev.available_balance AS previous_available,
            prev.locked_balance AS previous_locked,
            w.available_balance AS new_available,
            w.locked_balance AS new_locked
        "#,
    )
    .bind(entry.wallet_id.as_str())
    .bind(available_delta)
    .bind(locked_delta)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error("Failed to update wallet"))?;

    let Some(change) = change else {
        let available: Option<Decimal> =
            sqlx::query_scalar("SELECT available_balance FROM wallets WHERE owner_id = $1")
                .bind(entry.wallet_id.as_str())
                .fetch_optional(&mut *conn)
                .await
                .map_err(db_error("Failed to read wallet"))?;
        let Some(available) = available else {
            return Err(LedgerError::WalletNotFound(entry.wallet_id.clone()).into());
        };
        return Err(LedgerError::InsufficientFunds {
            wallet: entry.wallet_id.clone(),
            available,
            required: -available_delta,
        }
        .into());
    };

    let previous = WalletBalances {
        available: change.previous_available,
        locked: change.previous_locked,
    };
    let current = WalletBalances {
        available: change.new_available,
        locked: change.new_locked,
    };
    let record = WalletActivityRecord::from_entry(entry, previous, current);

    sqlx::query(
        r#"
        INSERT INTO wallet_activity (
            id, wallet_id, actor, action,
            previous_available, previous_locked, new_available, new_locked,
            transaction_id, description, recorded_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(record.id.as_uuid())
    .bind(record.wallet_id.as_str())
    .bind(record.actor.to_string())
    .bind(record.action.as_str())
    .bind(record.previous.available)
    .bind(record.previous.locked)
    .bind(record.current.available)
    .bind(record.current.locked)
    .bind(record.transaction_id.map(|id| *id.as_uuid()))
    .bind(&record.description)
    .bind(record.recorded_at.as_datetime())
    .execute(&mut *conn)
    .await
    .map_err(db_error("Failed to append wallet activity"))?;

    Ok(record)
}

#[async_trait]
impl TransactionStore for PostgresLedgerStore {
    async fn find_by_reference(
        &self,
        field: ReferenceField,
        value: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE {} = $1 LIMIT 1",
            TRANSACTION_COLUMNS,
            reference_column(field)
        );
        let row: Option<TransactionRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find transaction"))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        let sql = format!("SELECT {} FROM transactions WHERE id = $1", TRANSACTION_COLUMNS);
        let row: Option<TransactionRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find transaction"))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, kind, amount, status, owner_id, counterpart,
                reference, gateway_reference, provider_reference, metadata,
                created_at, completed_at, failed_at, webhook_received_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.kind.as_str())
        .bind(transaction.amount.value())
        .bind(transaction.status.as_str())
        .bind(transaction.owner_id.as_str())
        .bind(&transaction.counterpart)
        .bind(&transaction.references.primary)
        .bind(&transaction.references.gateway)
        .bind(&transaction.references.provider)
        .bind(&transaction.metadata)
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.completed_at.map(|t| *t.as_datetime()))
        .bind(transaction.failed_at.map(|t| *t.as_datetime()))
        .bind(transaction.webhook_received_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("transactions_reference_key") {
                    return DomainError::new(
                        ErrorCode::ValidationFailed,
                        "Transaction reference already exists",
                    )
                    .with_detail("reference", transaction.references.primary.clone());
                }
            }
            DomainError::database(format!("Failed to insert transaction: {}", e))
        })?;

        Ok(())
    }

    async fn settle(&self, request: SettleRequest) -> Result<SettleOutcome, DomainError> {
        if request.target.is_open() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("{} is not a terminal status", request.target),
            ));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let sql = format!(
            r#"
            UPDATE transactions SET
                status = $2,
                completed_at = CASE WHEN $2 = 'successful' THEN $3 ELSE completed_at END,
                failed_at = CASE WHEN $2 = 'failed' THEN $3 ELSE failed_at END,
                webhook_received_at = $3
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        );
        let row: Option<TransactionRow> = sqlx::query_as(&sql)
            .bind(request.transaction_id.as_uuid())
            .bind(request.target.as_str())
            .bind(request.received_at.as_datetime())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to settle transaction"))?;

        let Some(row) = row else {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM transactions WHERE id = $1)")
                    .bind(request.transaction_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_error("Failed to check transaction"))?;
            if !exists {
                return Err(DomainError::new(
                    ErrorCode::TransactionNotFound,
                    format!("transaction {} not found", request.transaction_id),
                ));
            }
            return Ok(SettleOutcome::AlreadyTerminal);
        };

        let transaction = Transaction::try_from(row)?;

        let activity = match &request.ledger_entry {
            Some(entry) => Some(apply_entry(&mut *tx, entry).await?),
            None => None,
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit settlement"))?;

        Ok(SettleOutcome::Applied {
            transaction,
            activity,
        })
    }
}

#[async_trait]
impl WalletLedger for PostgresLedgerStore {
    async fn apply(&self, entry: LedgerEntry) -> Result<WalletActivityRecord, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let record = apply_entry(&mut *tx, &entry).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit ledger entry"))?;
        Ok(record)
    }

    async fn balances(&self, wallet_id: &UserId) -> Result<Option<WalletBalances>, DomainError> {
        let row: Option<(Decimal, Decimal)> = sqlx::query_as(
            "SELECT available_balance, locked_balance FROM wallets WHERE owner_id = $1",
        )
        .bind(wallet_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to read wallet"))?;

        Ok(row.map(|(available, locked)| WalletBalances { available, locked }))
    }

    async fn activity(
        &self,
        wallet_id: &UserId,
    ) -> Result<Vec<WalletActivityRecord>, DomainError> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT id, wallet_id, actor, action,
                   previous_available, previous_locked, new_available, new_locked,
                   transaction_id, description, recorded_at
            FROM wallet_activity
            WHERE wallet_id = $1
            ORDER BY recorded_at, id
            "#,
        )
        .bind(wallet_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to read wallet activity"))?;

        rows.into_iter().map(WalletActivityRecord::try_from).collect()
    }
}

#[async_trait]
impl HealthProbe for PostgresLedgerStore {
    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("Database unreachable"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_fields_map_to_columns() {
        assert_eq!(reference_column(ReferenceField::Primary), "reference");
        assert_eq!(reference_column(ReferenceField::Gateway), "gateway_reference");
        assert_eq!(reference_column(ReferenceField::Provider), "provider_reference");
    }

    fn row(status: &str) -> TransactionRow {
        TransactionRow {
            id: Uuid::new_v4(),
            kind: "withdrawal".into(),
            amount: Decimal::new(30_000, 2),
            status: status.into(),
            owner_id: "seller-1".into(),
            counterpart: Some("bank-1".into()),
            reference: "wd_1".into(),
            gateway_reference: None,
            provider_reference: Some("TRF_1".into()),
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
            completed_at: None,
            failed_at: None,
            webhook_received_at: None,
        }
    }

    #[test]
    fn row_converts_to_transaction() {
        let txn = Transaction::try_from(row("processing")).unwrap();
        assert_eq!(txn.kind, TransactionKind::Withdrawal);
        assert_eq!(txn.status, TransactionStatus::Processing);
        assert_eq!(txn.amount.value(), Decimal::new(300, 0));
        assert!(txn.references.matches(ReferenceField::Provider, "TRF_1"));
    }

    #[test]
    fn corrupt_row_is_database_error() {
        let err = Transaction::try_from(row("settled")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        let mut zero = row("pending");
        zero.amount = Decimal::ZERO;
        assert!(Transaction::try_from(zero).is_err());
    }

    #[test]
    fn activity_row_converts() {
        let record = WalletActivityRecord::try_from(ActivityRow {
            id: Uuid::new_v4(),
            wallet_id: "seller-1".into(),
            actor: "payment_webhook".into(),
            action: "refund".into(),
            previous_available: Decimal::new(700, 0),
            previous_locked: Decimal::new(300, 0),
            new_available: Decimal::new(1000, 0),
            new_locked: Decimal::ZERO,
            transaction_id: None,
            description: "Withdrawal refunded".into(),
            recorded_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(record.action, LedgerOperation::Refund);
        assert_eq!(record.available_delta(), Decimal::new(300, 0));
    }
}
