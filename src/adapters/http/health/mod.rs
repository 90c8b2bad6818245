//! Liveness endpoint.
//!
//! - `GET /health` - Reports whether the backing store answers

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use serde::Serialize;

use crate::ports::HealthProbe;

#[derive(Clone)]
pub struct HealthAppState {
    pub probe: Arc<dyn HealthProbe>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /health
pub async fn health_check(State(state): State<HealthAppState>) -> impl IntoResponse {
    match state.probe.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "reachable",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: "unreachable",
                }),
            )
        }
    }
}

pub fn health_routes() -> Router<HealthAppState> {
    Router::new().route("/health", get(health_check))
}
