//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod reconciliation;

pub use reconciliation::{
    // Entry point
    ReconcileWebhookCommand, ReconcileWebhookHandler, ReconciliationServices,
    // Family handlers
    DepositSuccessCommand, DepositSuccessHandler,
    EscrowPurchaseCommand, EscrowPurchaseHandler,
    WithdrawalFailedCommand, WithdrawalFailedHandler,
    WithdrawalSuccessCommand, WithdrawalSuccessHandler,
    // Supporting services
    EventRoute, PaymentVerification, ReferenceResolver, SideEffectDispatcher,
    VerificationVerdict,
};
