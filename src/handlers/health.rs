//! Health endpoint.
//!
//! `GET /health` is served without authentication. It always returns 200;
//! the body reports `"degraded"` when any service is not ready.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::instrument;

use crate::models::{HealthResponse, HealthStatus};
use crate::state::AppState;

/// Health check endpoint.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "healthy",
///   "services": { "translation": "ready", "price_discovery": "ready", ... },
///   "version": "0.1.0",
///   "timestamp": "2024-01-15T10:30:00Z"
/// }
/// ```
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let services = state.services_health();

    Json(HealthResponse {
        status: if services.all_ready() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        services,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
