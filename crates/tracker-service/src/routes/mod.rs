//! HTTP routes for the episode tracker.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, json_error_body};
use crate::observability::TelemetrySink;
use crate::services::EpisodeStore;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Episode table access.
    pub store: EpisodeStore,

    /// Destination for per-call API telemetry.
    pub telemetry: Arc<dyn TelemetrySink>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/api/show_episode` - One user's progress on one show
/// - `/api/show_user` - Every show tracked by one user
/// - `/api/update_episode` - Create or overwrite progress
/// - `/api/show_all` - Every record in the table
/// - `/health` - Backend probe, always 200
/// - `/metrics` - Prometheus metrics endpoint
/// - JSON 404 for any other path
/// - JSON error bodies for 405 and 408
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/show_episode", get(handlers::show_episode))
        .route("/show_user", get(handlers::show_user))
        .route("/update_episode", post(handlers::update_episode))
        .route("/show_all", get(handlers::show_all));

    let app_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TraceLayer - Log request details (innermost)
    // 2. TimeoutLayer - Timeout the request
    // 3. json_error_body - JSON body for empty 405/408
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    app_routes
        .merge(metrics_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::map_response(json_error_body))
        .layer(middleware::from_fn(http_metrics_middleware))
}
