//! Paystack gateway adapter.
//!
//! Provides the secondary verification client. Webhook signatures are
//! checked in the domain (`WebhookSignatureVerifier`) since they need no I/O.

mod types;
mod verifier;

pub use types::{ErrorResponse, VerifiedCharge, VerifyResponse};
pub use verifier::{PaystackConfig, PaystackVerifier};
