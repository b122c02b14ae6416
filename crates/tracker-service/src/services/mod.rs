//! Service layer for the episode tracker.
//!
//! # Components
//!
//! - `episode_store` - Validated CRUD over the episode backend

pub mod episode_store;

pub use episode_store::EpisodeStore;
