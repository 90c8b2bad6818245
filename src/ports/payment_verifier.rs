//! PaymentVerifier port - Secondary confirmation with the gateway.
//!
//! Advisory only. An explicit non-success answer stops a deposit; any
//! failure to get an answer does not.

use async_trait::async_trait;
use thiserror::Error;

/// The gateway's answer about a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Gateway reports the charge succeeded.
    Confirmed,
    /// Gateway reports any other status for the charge.
    Rejected { status: String },
}

/// Failure to obtain an answer. Always treated as inconclusive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("verification timed out after {0} ms")]
    Timeout(u64),

    #[error("provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("invalid verify URL: {0}")]
    InvalidUrl(String),
}

#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, reference: &str) -> Result<VerificationStatus, VerificationError>;
}
