//! Webhook error types.
//!
//! Only the authentication-stage errors ever reach the gateway as a
//! non-200 response; everything after authentication is acknowledged.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// No signing secret configured; nothing can be authenticated.
    #[error("Webhook secret is not configured")]
    SecretNotConfigured,

    /// Signature header absent from the request.
    #[error("Missing signature header")]
    MissingSignature,

    /// Signature did not match the body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Authenticated body could not be decoded into an event.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl WebhookError {
    /// HTTP status returned to the gateway.
    ///
    /// A parse error is still acknowledged: the delivery was authentic and
    /// retrying it will not make it decodable.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::SecretNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::ParseError(_) => StatusCode::OK,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            WebhookError::SecretNotConfigured => "WEBHOOK_NOT_CONFIGURED",
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::ParseError(_) => "MALFORMED_PAYLOAD",
        }
    }
}
