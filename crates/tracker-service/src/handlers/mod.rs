//! HTTP request handlers for the episode tracker.

pub mod episodes;
pub mod health;
pub mod metrics;

pub use episodes::{show_all, show_episode, show_user, update_episode};
pub use health::health_check;
pub use metrics::metrics_handler;

use crate::errors::TrackerError;

/// Fallback for any path without a route.
pub async fn not_found() -> TrackerError {
    TrackerError::NotFound("Endpoint not found".to_string())
}
