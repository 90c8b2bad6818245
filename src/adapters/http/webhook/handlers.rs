//! HTTP handler for gateway webhook deliveries.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::{ReconcileWebhookCommand, ReconcileWebhookHandler};
use crate::domain::webhook::{ReconciliationOutcome, WebhookError, SIGNATURE_HEADER};

use super::dto::{ErrorResponse, WebhookAck};

/// State for the webhook routes.
#[derive(Clone)]
pub struct WebhookAppState {
    pub reconcile_handler: Arc<ReconcileWebhookHandler>,
}

impl WebhookAppState {
    pub fn new(reconcile_handler: Arc<ReconcileWebhookHandler>) -> Self {
        Self { reconcile_handler }
    }
}

/// POST /api/webhooks/paystack - Reconcile one gateway delivery
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn handle_paystack_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let cmd = ReconcileWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let outcome = state.reconcile_handler.handle(cmd).await?;

    Ok((StatusCode::OK, Json(WebhookAck::new(outcome))))
}

/// API error that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        if status == StatusCode::OK {
            return (
                status,
                Json(WebhookAck::new(ReconciliationOutcome::Malformed)),
            )
                .into_response();
        }

        let message = match &self.0 {
            WebhookError::SecretNotConfigured => "Webhook processing is not configured".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse::new(self.0.error_code(), message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_keep_their_status() {
        let response = WebhookApiError::from(WebhookError::InvalidSignature).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = WebhookApiError::from(WebhookError::SecretNotConfigured).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn parse_error_is_still_acknowledged() {
        let response =
            WebhookApiError::from(WebhookError::ParseError("eof".into())).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
