//! Axum router for gateway webhooks.

use axum::{routing::post, Router};

use super::handlers::{handle_paystack_webhook, WebhookAppState};

/// Webhook routes, mounted under `/api/webhooks`.
///
/// No user authentication; deliveries are verified by signature.
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/paystack", post(handle_paystack_webhook))
}
