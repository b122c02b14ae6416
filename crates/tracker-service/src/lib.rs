//! Episode Tracker Service Library
//!
//! HTTP API that records, per user and per TV show, the season and episode
//! the user last watched. Records live in a DynamoDB table keyed by
//! (`username`, `tv_show`).
//!
//! # Architecture
//!
//! The service follows the Handler -> Service -> Repository pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! Each API handler runs inside `observability::instrument`, which logs the
//! call and emits request/latency/outcome metrics through a `TelemetrySink`.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Stored record plus request/response bodies
//! - `observability` - Metrics recorder, telemetry sink and instrumentation
//! - `repositories` - DynamoDB and in-memory backends
//! - `routes` - Axum router setup
//! - `services` - Episode store
//! - `setup` - Table provisioning and sample data
//! - `simulator` - Synthetic traffic generator

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod setup;
pub mod simulator;
