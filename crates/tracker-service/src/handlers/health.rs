//! Health check handler.
//!
//! Provides the health endpoint used by load balancers and probes.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Health check handler.
///
/// Probes the backend table and reports the result. Always returns 200 so
/// the caller can read the body even when the backend is down.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "region": "us-east-1",
///   "table": "tv-show-tracker"
/// }
/// ```
#[instrument(skip_all, name = "tracker.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = match state.store.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(target: "tracker.api", error = %e, "Health probe failed");
            "unhealthy"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        region: state.config.region.clone(),
        table: state.config.table_name.clone(),
    })
}
