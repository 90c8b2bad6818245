//! Secondary payment verification policy.
//!
//! The signature is the trust anchor. Asking the gateway again is an extra
//! check with an asymmetric result: an explicit non-success answer blocks
//! settlement, while an error or timeout lets it proceed.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{PaymentVerifier, VerificationStatus};

/// What the verification step concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationVerdict {
    Confirmed,
    Rejected { status: String },
    Inconclusive { reason: String },
    /// Verification is disabled.
    Skipped,
}

impl VerificationVerdict {
    pub fn permits_settlement(&self) -> bool {
        !matches!(self, VerificationVerdict::Rejected { .. })
    }
}

#[derive(Clone)]
pub struct PaymentVerification {
    verifier: Option<Arc<dyn PaymentVerifier>>,
    timeout: Duration,
}

impl PaymentVerification {
    pub fn new(verifier: Arc<dyn PaymentVerifier>, timeout: Duration) -> Self {
        Self {
            verifier: Some(verifier),
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            verifier: None,
            timeout: Duration::ZERO,
        }
    }

    /// Asks the gateway about `reference`, bounded by the configured timeout.
    pub async fn check(&self, reference: &str) -> VerificationVerdict {
        let Some(verifier) = &self.verifier else {
            return VerificationVerdict::Skipped;
        };

        match tokio::time::timeout(self.timeout, verifier.verify(reference)).await {
            Ok(Ok(VerificationStatus::Confirmed)) => VerificationVerdict::Confirmed,
            Ok(Ok(VerificationStatus::Rejected { status })) => {
                VerificationVerdict::Rejected { status }
            }
            Ok(Err(e)) => VerificationVerdict::Inconclusive {
                reason: e.to_string(),
            },
            Err(_) => VerificationVerdict::Inconclusive {
                reason: format!("timed out after {} ms", self.timeout.as_millis()),
            },
        }
    }
}
