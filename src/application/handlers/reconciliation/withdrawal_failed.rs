//! WithdrawalFailedHandler - Refunds a withdrawal the gateway could not pay.
//!
//! The refund returns the amount to available and releases the hold in the
//! same operation, exactly cancelling the lock taken at initiation.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::ledger::{Actor, LedgerEntry, LedgerOperation};
use crate::domain::transaction::{TransactionKind, TransactionStatus};
use crate::domain::webhook::{PayloadReferences, ReconciliationOutcome, TransferData};
use crate::ports::{Notification, NotificationKind, SettleOutcome, SettleRequest, TransactionStore};

use super::resolver::ReferenceResolver;
use super::support::{already_processed, locate, Located};
use super::SideEffectDispatcher;

#[derive(Debug, Clone)]
pub struct WithdrawalFailedCommand {
    pub references: PayloadReferences,
    pub reported_amount: Option<i64>,
    /// Gateway's stated reason, if any.
    pub reason: Option<String>,
    /// `transfer.failed` or `transfer.reversed`.
    pub event_type: &'static str,
    pub received_at: Timestamp,
}

impl WithdrawalFailedCommand {
    pub fn from_transfer(data: &TransferData, event_type: &'static str) -> Self {
        Self {
            references: data.references(),
            reported_amount: data.amount,
            reason: data.reason.clone(),
            event_type,
            received_at: Timestamp::now(),
        }
    }
}

pub struct WithdrawalFailedHandler {
    store: Arc<dyn TransactionStore>,
    resolver: ReferenceResolver,
    dispatcher: SideEffectDispatcher,
}

impl WithdrawalFailedHandler {
    pub fn new(store: Arc<dyn TransactionStore>, dispatcher: SideEffectDispatcher) -> Self {
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&store)),
            store,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: WithdrawalFailedCommand,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let transaction = match locate(
            &self.resolver,
            &cmd.references,
            TransactionKind::Withdrawal,
            cmd.event_type,
            cmd.reported_amount,
        )
        .await?
        {
            Located::Ready(resolved) => resolved.transaction,
            Located::Done(outcome) => return Ok(outcome),
        };

        let entry = LedgerEntry::new(
            transaction.owner_id.clone(),
            LedgerOperation::Refund,
            transaction.amount,
            Actor::PaymentWebhook,
            format!(
                "Withdrawal {} refunded: {}",
                transaction.references.primary,
                cmd.reason.as_deref().unwrap_or(cmd.event_type)
            ),
        )
        .for_transaction(transaction.id);

        let request = SettleRequest::new(transaction.id, TransactionStatus::Failed)
            .received_at(cmd.received_at)
            .with_ledger_entry(entry);

        match self.store.settle(request).await? {
            SettleOutcome::AlreadyTerminal => Ok(already_processed(&transaction, cmd.event_type)),
            SettleOutcome::Applied { activity, .. } => {
                tracing::info!(
                    event_type = cmd.event_type,
                    transaction_id = %transaction.id,
                    reference = %transaction.references.primary,
                    wallet_id = %transaction.owner_id,
                    amount = %transaction.amount,
                    reason = cmd.reason.as_deref().unwrap_or(""),
                    balances_after = ?activity.map(|a| a.current),
                    "Withdrawal failed; funds returned to available"
                );
                self.dispatcher.dispatch(Notification::new(
                    transaction.owner_id.clone(),
                    NotificationKind::WithdrawalFailed,
                    transaction.amount,
                    transaction.references.primary.clone(),
                ));
                Ok(ReconciliationOutcome::WithdrawalRefunded)
            }
        }
    }
}
