//! Gateway webhook domain module.
//!
//! - `signature` - HMAC-SHA512 authentication of raw bodies
//! - `event` - tagged union of the gateway events we reconcile
//! - `references` - ordered reference candidates for transaction lookup
//! - `outcome` - per-delivery reconciliation result

mod errors;
mod event;
mod outcome;
mod references;
mod signature;

pub use errors::WebhookError;
pub use event::{
    ChargeData, GatewayEvent, TransferData, CHARGE_SUCCESS, PROPERTY_PURCHASE_PAYMENT_TYPE,
    TRANSFER_FAILED, TRANSFER_REVERSED, TRANSFER_SUCCESS,
};
pub use outcome::ReconciliationOutcome;
pub use references::{PayloadReferences, ReferenceCandidate};
pub use signature::{sign_payload, WebhookSignatureVerifier, SIGNATURE_HEADER};
