//! Storage backends for episode records.
//!
//! The table is keyed by `username` (partition) and `tv_show` (sort). Each
//! method is exactly one backend round trip with no retries; the episode
//! store above adds validation, timestamps and logging.

pub mod dynamodb;
pub mod in_memory;

pub use dynamodb::DynamoDbEpisodeBackend;
pub use in_memory::InMemoryEpisodeBackend;

use crate::errors::TrackerError;
use crate::models::EpisodeRecord;
use async_trait::async_trait;

/// Partition key attribute.
pub const USERNAME_ATTRIBUTE: &str = "username";

/// Sort key attribute.
pub const TV_SHOW_ATTRIBUTE: &str = "tv_show";

/// Key-value backend holding episode records.
///
/// A missing item is `Ok(None)`, never an error. Connectivity, throttling and
/// malformed items are `TrackerError::Backend`.
#[async_trait]
pub trait EpisodeBackend: Send + Sync {
    /// Point lookup by composite key.
    async fn get_item(
        &self,
        username: &str,
        show_title: &str,
    ) -> Result<Option<EpisodeRecord>, TrackerError>;

    /// All items sharing a partition key, in backend order.
    async fn query_partition(&self, username: &str) -> Result<Vec<EpisodeRecord>, TrackerError>;

    /// Write the full item, replacing any existing one with the same key.
    async fn put_item(&self, record: &EpisodeRecord) -> Result<(), TrackerError>;

    /// One unfiltered scan request. Large tables may come back truncated.
    async fn scan(&self) -> Result<Vec<EpisodeRecord>, TrackerError>;

    /// Cheap reachability probe used by the health endpoint.
    async fn ping(&self) -> Result<(), TrackerError>;
}
