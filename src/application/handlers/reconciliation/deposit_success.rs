//! DepositSuccessHandler - Credits a buyer's wallet for a settled charge.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::ledger::{Actor, LedgerEntry, LedgerOperation};
use crate::domain::transaction::{TransactionKind, TransactionStatus};
use crate::domain::webhook::{ChargeData, PayloadReferences, ReconciliationOutcome, CHARGE_SUCCESS};
use crate::ports::{Notification, NotificationKind, SettleOutcome, SettleRequest, TransactionStore};

use super::resolver::ReferenceResolver;
use super::support::{already_processed, locate, non_blank, Located};
use super::{PaymentVerification, SideEffectDispatcher, VerificationVerdict};

/// Command to reconcile a successful deposit charge.
#[derive(Debug, Clone)]
pub struct DepositSuccessCommand {
    pub references: PayloadReferences,
    /// Gateway-reported amount in minor units. Logged only.
    pub reported_amount: Option<i64>,
    pub received_at: Timestamp,
}

impl From<&ChargeData> for DepositSuccessCommand {
    fn from(data: &ChargeData) -> Self {
        Self {
            references: data.references(),
            reported_amount: data.amount,
            received_at: Timestamp::now(),
        }
    }
}

pub struct DepositSuccessHandler {
    store: Arc<dyn TransactionStore>,
    resolver: ReferenceResolver,
    verification: PaymentVerification,
    dispatcher: SideEffectDispatcher,
}

impl DepositSuccessHandler {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        verification: PaymentVerification,
        dispatcher: SideEffectDispatcher,
    ) -> Self {
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&store)),
            store,
            verification,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: DepositSuccessCommand,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let resolved = match locate(
            &self.resolver,
            &cmd.references,
            TransactionKind::Deposit,
            CHARGE_SUCCESS,
            cmd.reported_amount,
        )
        .await?
        {
            Located::Ready(resolved) => resolved,
            Located::Done(outcome) => return Ok(outcome),
        };
        let transaction = resolved.transaction;

        // 1. Optional re-confirmation with the gateway
        let verify_reference = non_blank(cmd.references.reference.as_deref())
            .unwrap_or(&transaction.references.primary);
        let verdict = self.verification.check(verify_reference).await;
        match &verdict {
            VerificationVerdict::Rejected { status } => tracing::warn!(
                transaction_id = %transaction.id,
                reference = %verify_reference,
                gateway_status = %status,
                "Gateway verification reports non-success; deposit left pending"
            ),
            VerificationVerdict::Inconclusive { reason } => tracing::warn!(
                transaction_id = %transaction.id,
                reference = %verify_reference,
                reason = %reason,
                "Gateway verification inconclusive; proceeding on signature trust"
            ),
            VerificationVerdict::Confirmed | VerificationVerdict::Skipped => {}
        }
        if !verdict.permits_settlement() {
            return Ok(ReconciliationOutcome::VerificationRejected);
        }

        // 2. Conditional transition + credit + audit, atomically
        let entry = LedgerEntry::new(
            transaction.owner_id.clone(),
            LedgerOperation::Credit,
            transaction.amount,
            Actor::PaymentWebhook,
            format!("Wallet deposit {}", transaction.references.primary),
        )
        .for_transaction(transaction.id);

        let request = SettleRequest::new(transaction.id, TransactionStatus::Successful)
            .received_at(cmd.received_at)
            .with_ledger_entry(entry);

        match self.store.settle(request).await? {
            SettleOutcome::AlreadyTerminal => Ok(already_processed(&transaction, CHARGE_SUCCESS)),
            SettleOutcome::Applied { activity, .. } => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    reference = %transaction.references.primary,
                    wallet_id = %transaction.owner_id,
                    amount = %transaction.amount,
                    available_after = ?activity.map(|a| a.current.available),
                    "Deposit credited"
                );

                // 3. Fire-and-forget notification
                self.dispatcher.dispatch(Notification::new(
                    transaction.owner_id.clone(),
                    NotificationKind::DepositReceived,
                    transaction.amount,
                    transaction.references.primary.clone(),
                ));

                Ok(ReconciliationOutcome::DepositCredited)
            }
        }
    }
}
