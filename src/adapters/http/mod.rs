//! HTTP adapters - REST endpoints.
//!
//! - `webhook` - Gateway webhook deliveries
//! - `health` - Liveness and database reachability

pub mod health;
pub mod webhook;

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use health::{health_routes, HealthAppState};
pub use webhook::{webhook_routes, WebhookAppState};

/// Builds the complete application router.
///
/// `request_timeout` bounds the health route only. A webhook delivery is
/// never cut short from outside: dropping it mid-settlement would answer
/// the gateway with a non-200 and lose the credit. Its slow steps carry
/// their own bounds (verification timeout, pool acquire timeout).
///
/// ```ignore
/// let app = app_router(webhook_state, health_state, Duration::from_secs(30));
/// axum::serve(listener, app).await?;
/// ```
pub fn app_router(
    webhook_state: WebhookAppState,
    health_state: HealthAppState,
    request_timeout: Duration,
) -> Router {
    Router::new()
        .nest("/api/webhooks", webhook_routes().with_state(webhook_state))
        .merge(
            health_routes()
                .with_state(health_state)
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
