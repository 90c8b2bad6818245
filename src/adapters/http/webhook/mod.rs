//! HTTP adapter for gateway webhooks.
//!
//! - `POST /api/webhooks/paystack` - Reconcile a Paystack delivery

pub mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, WebhookAck};
pub use handlers::{handle_paystack_webhook, WebhookApiError, WebhookAppState};
pub use routes::webhook_routes;
