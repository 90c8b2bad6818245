//! ReconcileWebhookHandler - Entry point for one gateway delivery.
//!
//! Authenticates the raw body, decodes it, routes it to its family
//! handler and absorbs every post-authentication failure into an outcome.
//! Only an authentication failure is returned as an error.

use std::sync::Arc;

use crate::domain::webhook::{
    GatewayEvent, ReconciliationOutcome, WebhookError, WebhookSignatureVerifier,
};
use crate::ports::{EscrowCreator, Notifier, TransactionStore};

use super::{
    DepositSuccessCommand, DepositSuccessHandler, EscrowPurchaseCommand, EscrowPurchaseHandler,
    EventRoute, PaymentVerification, SideEffectDispatcher, WithdrawalFailedCommand,
    WithdrawalFailedHandler, WithdrawalSuccessCommand, WithdrawalSuccessHandler,
};

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct ReconcileWebhookCommand {
    /// Exact request body bytes.
    pub payload: Vec<u8>,
    /// Signature header value, if present.
    pub signature: Option<String>,
}

/// Collaborators shared by the family handlers.
#[derive(Clone)]
pub struct ReconciliationServices {
    pub store: Arc<dyn TransactionStore>,
    pub verification: PaymentVerification,
    pub escrow_creator: Arc<dyn EscrowCreator>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct ReconcileWebhookHandler {
    signature_verifier: WebhookSignatureVerifier,
    deposit: DepositSuccessHandler,
    withdrawal_success: WithdrawalSuccessHandler,
    withdrawal_failed: WithdrawalFailedHandler,
    escrow_purchase: EscrowPurchaseHandler,
}

impl ReconcileWebhookHandler {
    pub fn new(
        signature_verifier: WebhookSignatureVerifier,
        services: ReconciliationServices,
    ) -> Self {
        let dispatcher = SideEffectDispatcher::new(services.notifier);
        Self {
            signature_verifier,
            deposit: DepositSuccessHandler::new(
                Arc::clone(&services.store),
                services.verification,
                dispatcher.clone(),
            ),
            withdrawal_success: WithdrawalSuccessHandler::new(
                Arc::clone(&services.store),
                dispatcher.clone(),
            ),
            withdrawal_failed: WithdrawalFailedHandler::new(
                Arc::clone(&services.store),
                dispatcher.clone(),
            ),
            escrow_purchase: EscrowPurchaseHandler::new(
                services.store,
                services.escrow_creator,
                dispatcher,
            ),
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileWebhookCommand,
    ) -> Result<ReconciliationOutcome, WebhookError> {
        // 1. Authenticate before anything else is looked at
        if let Err(e) = self
            .signature_verifier
            .verify(&cmd.payload, cmd.signature.as_deref())
        {
            match &e {
                WebhookError::SecretNotConfigured => {
                    tracing::error!("Webhook received but no gateway secret is configured")
                }
                _ => tracing::warn!(error = %e, "Rejected unauthenticated webhook"),
            }
            return Err(e);
        }

        // 2. Decode
        let event = match GatewayEvent::parse(&cmd.payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    outcome = %ReconciliationOutcome::Malformed,
                    "Authenticated webhook could not be decoded; acknowledging"
                );
                return Ok(ReconciliationOutcome::Malformed);
            }
        };

        let event_type = event.event_type().to_owned();
        let reference = event
            .references()
            .primary_hint()
            .unwrap_or("<none>")
            .to_owned();

        // 3. Route and reconcile
        let route = EventRoute::from(event);
        let result = match &route {
            EventRoute::DepositSuccess(data) => {
                self.deposit.handle(DepositSuccessCommand::from(data)).await
            }
            EventRoute::EscrowPurchaseSuccess(data) => {
                self.escrow_purchase
                    .handle(EscrowPurchaseCommand::from(data))
                    .await
            }
            EventRoute::WithdrawalSuccess(data) => {
                self.withdrawal_success
                    .handle(WithdrawalSuccessCommand::from(data))
                    .await
            }
            EventRoute::WithdrawalFailed { data, event_type } => {
                self.withdrawal_failed
                    .handle(WithdrawalFailedCommand::from_transfer(data, *event_type))
                    .await
            }
            EventRoute::Unrecognized { .. } => Ok(ReconciliationOutcome::Ignored),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    event_type = %event_type,
                    reference = %reference,
                    route = route.name(),
                    error_code = %e.code,
                    error = %e,
                    "Reconciliation failed to persist; manual reconciliation required"
                );
                ReconciliationOutcome::PersistenceFailed
            }
        };

        if outcome.needs_attention() {
            tracing::warn!(
                event_type = %event_type,
                reference = %reference,
                route = route.name(),
                outcome = %outcome,
                "Webhook acknowledged; needs manual follow-up"
            );
        } else {
            tracing::info!(
                event_type = %event_type,
                reference = %reference,
                route = route.name(),
                outcome = %outcome,
                "Webhook reconciled"
            );
        }
        Ok(outcome)
    }
}
