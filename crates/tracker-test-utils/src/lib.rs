//! # Tracker Test Utilities
//!
//! Shared test utilities for the episode tracker service.
//!
//! This crate provides:
//! - Server test harness (`TestTrackerServer` for E2E tests over an
//!   in-memory backend)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tracker_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestTrackerServer::spawn().await?;
//!
//!     let response = reqwest::get(format!("{}/health", server.url())).await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

// Re-export commonly used items
pub use server_harness::*;
