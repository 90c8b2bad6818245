//! PostgreSQL escrow creator.
//!
//! Inserts the escrow and its handover workflow in one transaction. The
//! unique constraint on `escrows.transaction_id` keeps a purchase from
//! ever getting two escrows.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{EscrowId, HandoverId};
use crate::ports::{EscrowCreator, EscrowError, EscrowReceipt, EscrowRequest};

pub struct PostgresEscrowCreator {
    pool: PgPool,
}

impl PostgresEscrowCreator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(context: &'static str) -> impl Fn(sqlx::Error) -> EscrowError {
    move |e| EscrowError::Unavailable(format!("{}: {}", context, e))
}

#[async_trait]
impl EscrowCreator for PostgresEscrowCreator {
    async fn create_escrow(&self, request: EscrowRequest) -> Result<EscrowReceipt, EscrowError> {
        let receipt = EscrowReceipt {
            escrow_id: EscrowId::new(),
            handover_id: HandoverId::new(),
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(unavailable("Failed to start transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO escrows (id, transaction_id, buyer_id, developer_id, property_id, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(receipt.escrow_id.as_uuid())
        .bind(request.transaction_id.as_uuid())
        .bind(request.buyer_id.as_str())
        .bind(request.developer_id.as_str())
        .bind(request.property_id.as_str())
        .bind(request.amount.value())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("escrows_transaction_id_key") {
                    return EscrowError::AlreadyExists(request.transaction_id);
                }
            }
            EscrowError::Unavailable(format!("Failed to insert escrow: {}", e))
        })?;

        sqlx::query("INSERT INTO handovers (id, escrow_id) VALUES ($1, $2)")
            .bind(receipt.handover_id.as_uuid())
            .bind(receipt.escrow_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(unavailable("Failed to insert handover"))?;

        tx.commit()
            .await
            .map_err(unavailable("Failed to commit escrow"))?;

        Ok(receipt)
    }
}
