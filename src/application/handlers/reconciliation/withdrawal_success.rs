//! WithdrawalSuccessHandler - Releases the hold of a paid-out withdrawal.
//!
//! Available balance was already reduced when the withdrawal was
//! initiated; only the lock is released here.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::ledger::{Actor, LedgerEntry, LedgerOperation};
use crate::domain::transaction::{TransactionKind, TransactionStatus};
use crate::domain::webhook::{
    PayloadReferences, ReconciliationOutcome, TransferData, TRANSFER_SUCCESS,
};
use crate::ports::{Notification, NotificationKind, SettleOutcome, SettleRequest, TransactionStore};

use super::resolver::ReferenceResolver;
use super::support::{already_processed, locate, Located};
use super::SideEffectDispatcher;

#[derive(Debug, Clone)]
pub struct WithdrawalSuccessCommand {
    pub references: PayloadReferences,
    pub reported_amount: Option<i64>,
    pub received_at: Timestamp,
}

impl From<&TransferData> for WithdrawalSuccessCommand {
    fn from(data: &TransferData) -> Self {
        Self {
            references: data.references(),
            reported_amount: data.amount,
            received_at: Timestamp::now(),
        }
    }
}

pub struct WithdrawalSuccessHandler {
    store: Arc<dyn TransactionStore>,
    resolver: ReferenceResolver,
    dispatcher: SideEffectDispatcher,
}

impl WithdrawalSuccessHandler {
    pub fn new(store: Arc<dyn TransactionStore>, dispatcher: SideEffectDispatcher) -> Self {
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&store)),
            store,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: WithdrawalSuccessCommand,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let transaction = match locate(
            &self.resolver,
            &cmd.references,
            TransactionKind::Withdrawal,
            TRANSFER_SUCCESS,
            cmd.reported_amount,
        )
        .await?
        {
            Located::Ready(resolved) => resolved.transaction,
            Located::Done(outcome) => return Ok(outcome),
        };

        let entry = LedgerEntry::new(
            transaction.owner_id.clone(),
            LedgerOperation::ReleaseLock,
            transaction.amount,
            Actor::PaymentWebhook,
            format!("Withdrawal paid out {}", transaction.references.primary),
        )
        .for_transaction(transaction.id);

        let request = SettleRequest::new(transaction.id, TransactionStatus::Successful)
            .received_at(cmd.received_at)
            .with_ledger_entry(entry);

        match self.store.settle(request).await? {
            SettleOutcome::AlreadyTerminal => {
                Ok(already_processed(&transaction, TRANSFER_SUCCESS))
            }
            SettleOutcome::Applied { activity, .. } => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    reference = %transaction.references.primary,
                    wallet_id = %transaction.owner_id,
                    amount = %transaction.amount,
                    locked_after = ?activity.map(|a| a.current.locked),
                    "Withdrawal settled; hold released"
                );
                self.dispatcher.dispatch(Notification::new(
                    transaction.owner_id.clone(),
                    NotificationKind::WithdrawalCompleted,
                    transaction.amount,
                    transaction.references.primary.clone(),
                ));
                Ok(ReconciliationOutcome::WithdrawalSettled)
            }
        }
    }
}
