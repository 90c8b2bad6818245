//! EscrowPurchaseHandler - Settles a property purchase into escrow.
//!
//! The buyer's wallet is never touched. The payment is committed as
//! successful together with a hold on the developer's locked balance, then
//! the escrow and handover records are opened. If that last step fails
//! the payment stays settled and the gap is logged for manual remediation.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::ledger::{Actor, LedgerEntry, LedgerOperation};
use crate::domain::transaction::{TransactionKind, TransactionStatus};
use crate::domain::webhook::{ChargeData, PayloadReferences, ReconciliationOutcome, CHARGE_SUCCESS};
use crate::ports::{
    EscrowCreator, EscrowRequest, Notification, NotificationKind, SettleRequest,
    TransactionStore,
};

use super::resolver::ReferenceResolver;
use super::support::{already_processed, locate, Located};
use super::SideEffectDispatcher;

#[derive(Debug, Clone)]
pub struct EscrowPurchaseCommand {
    pub references: PayloadReferences,
    pub reported_amount: Option<i64>,
    pub received_at: Timestamp,
}

impl From<&ChargeData> for EscrowPurchaseCommand {
    fn from(data: &ChargeData) -> Self {
        Self {
            references: data.references(),
            reported_amount: data.amount,
            received_at: Timestamp::now(),
        }
    }
}

pub struct EscrowPurchaseHandler {
    store: Arc<dyn TransactionStore>,
    resolver: ReferenceResolver,
    escrow_creator: Arc<dyn EscrowCreator>,
    dispatcher: SideEffectDispatcher,
}

impl EscrowPurchaseHandler {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        escrow_creator: Arc<dyn EscrowCreator>,
        dispatcher: SideEffectDispatcher,
    ) -> Self {
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&store)),
            store,
            escrow_creator,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: EscrowPurchaseCommand,
    ) -> Result<ReconciliationOutcome, DomainError> {
        let transaction = match locate(
            &self.resolver,
            &cmd.references,
            TransactionKind::PropertyPurchase,
            CHARGE_SUCCESS,
            cmd.reported_amount,
        )
        .await?
        {
            Located::Ready(resolved) => resolved.transaction,
            Located::Done(outcome) => return Ok(outcome),
        };

        let context = match transaction.purchase_context() {
            Ok(context) => context,
            Err(e) => {
                tracing::error!(
                    reconciliation_gap = true,
                    transaction_id = %transaction.id,
                    reference = %transaction.references.primary,
                    error = %e,
                    "Purchase transaction lacks escrow context; left unsettled"
                );
                return Ok(ReconciliationOutcome::EscrowGap);
            }
        };

        // 1. Conditional transition + developer hold + audit, atomically
        let entry = LedgerEntry::new(
            context.developer_id.clone(),
            LedgerOperation::EscrowHold,
            transaction.amount,
            Actor::PaymentWebhook,
            format!(
                "Escrow hold for property {} ({})",
                context.property_id, transaction.references.primary
            ),
        )
        .for_transaction(transaction.id);

        let request = SettleRequest::new(transaction.id, TransactionStatus::Successful)
            .received_at(cmd.received_at)
            .with_ledger_entry(entry);

        if !self.store.settle(request).await?.was_applied() {
            return Ok(already_processed(&transaction, CHARGE_SUCCESS));
        }

        // 2. Escrow + handover, after commit
        let escrow_request = EscrowRequest {
            transaction_id: transaction.id,
            amount: transaction.amount,
            buyer_id: context.buyer_id.clone(),
            developer_id: context.developer_id.clone(),
            property_id: context.property_id.clone(),
        };

        match self.escrow_creator.create_escrow(escrow_request).await {
            Ok(receipt) => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    reference = %transaction.references.primary,
                    escrow_id = %receipt.escrow_id,
                    handover_id = %receipt.handover_id,
                    buyer_id = %context.buyer_id,
                    developer_id = %context.developer_id,
                    property_id = %context.property_id,
                    "Property purchase settled into escrow"
                );
                self.dispatcher.dispatch(Notification::new(
                    context.buyer_id.clone(),
                    NotificationKind::PurchaseConfirmed,
                    transaction.amount,
                    transaction.references.primary.clone(),
                ));
                self.dispatcher.dispatch(Notification::new(
                    context.developer_id.clone(),
                    NotificationKind::SaleEscrowed,
                    transaction.amount,
                    transaction.references.primary.clone(),
                ));
                Ok(ReconciliationOutcome::EscrowCreated)
            }
            Err(e) => {
                tracing::error!(
                    reconciliation_gap = true,
                    transaction_id = %transaction.id,
                    reference = %transaction.references.primary,
                    property_id = %context.property_id,
                    error = %e,
                    "Payment settled but escrow creation failed; manual remediation required"
                );
                Ok(ReconciliationOutcome::EscrowGap)
            }
        }
    }
}
