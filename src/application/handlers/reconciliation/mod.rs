//! Reconciliation handlers.
//!
//! Turn authenticated gateway webhooks into exactly-once settlements of
//! stored transactions and their wallet effects.
//!
//! ## Flow
//! - `ReconcileWebhookHandler` authenticates, decodes and routes a delivery
//! - `EventRoute` picks the handler family for the event
//! - one handler per family settles the transaction atomically with its
//!   ledger operation, then hands notifications to the dispatcher

mod deposit_success;
mod dispatcher;
mod escrow_purchase;
mod reconcile_webhook;
mod resolver;
mod router;
mod support;
mod verification;
mod withdrawal_failed;
mod withdrawal_success;

#[cfg(test)]
mod test_support;

pub use deposit_success::{DepositSuccessCommand, DepositSuccessHandler};
pub use dispatcher::SideEffectDispatcher;
pub use escrow_purchase::{EscrowPurchaseCommand, EscrowPurchaseHandler};
pub use reconcile_webhook::{
    ReconcileWebhookCommand, ReconcileWebhookHandler, ReconciliationServices,
};
pub use resolver::{ReferenceResolver, ResolvedTransaction};
pub use router::EventRoute;
pub use verification::{PaymentVerification, VerificationVerdict};
pub use withdrawal_failed::{WithdrawalFailedCommand, WithdrawalFailedHandler};
pub use withdrawal_success::{WithdrawalSuccessCommand, WithdrawalSuccessHandler};
