//! Middleware for the episode tracker.
//!
//! # Components
//!
//! - `http_metrics` - Records request count and latency for every response
//! - `error_body` - JSON bodies for framework 405 and 408 responses

pub mod error_body;
pub mod http_metrics;

pub use error_body::json_error_body;
pub use http_metrics::http_metrics_middleware;
