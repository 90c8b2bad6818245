//! HTTP DTOs for the gateway webhook endpoint.

use serde::Serialize;

use crate::domain::webhook::ReconciliationOutcome;

/// Acknowledgement returned for every authenticated delivery.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub outcome: ReconciliationOutcome,
}

impl WebhookAck {
    pub fn new(outcome: ReconciliationOutcome) -> Self {
        Self {
            received: true,
            outcome,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
