//! Episode store.
//!
//! Validates arguments, stamps writes with the server clock and maps backend
//! results onto `TrackerError`. Every operation is exactly one backend round
//! trip, logged as a database operation and recorded in the
//! `tracker_db_*` metrics.

use crate::errors::TrackerError;
use crate::models::{non_blank, EpisodeRecord};
use crate::observability::metrics::record_db_query;
use crate::repositories::EpisodeBackend;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Message returned when a (username, show) pair has no record.
pub const NOT_FOUND_MESSAGE: &str = "No data found for this user and TV show";

/// Handle to the episode table. Cheap to clone.
#[derive(Clone)]
pub struct EpisodeStore {
    backend: Arc<dyn EpisodeBackend>,
}

impl EpisodeStore {
    pub fn new(backend: Arc<dyn EpisodeBackend>) -> Self {
        Self { backend }
    }

    /// Fetch the record for one user and show.
    ///
    /// # Errors
    ///
    /// - `TrackerError::Validation` - blank username or show title
    /// - `TrackerError::NotFound` - no record for the pair
    /// - `TrackerError::Backend` - backend unreachable or item malformed
    #[instrument(skip_all, name = "tracker.store.get_episode")]
    pub async fn get_episode(
        &self,
        username: &str,
        show_title: &str,
    ) -> Result<EpisodeRecord, TrackerError> {
        let (username, show_title) = require_keys(username, show_title)?;

        db_operation("get", self.backend.get_item(username, show_title))
            .await?
            .ok_or_else(|| TrackerError::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }

    /// All records for one user. Empty when the user has none.
    #[instrument(skip_all, name = "tracker.store.list_shows_for_user")]
    pub async fn list_shows_for_user(
        &self,
        username: &str,
    ) -> Result<Vec<EpisodeRecord>, TrackerError> {
        let username = non_blank(Some(username))
            .ok_or_else(|| TrackerError::Validation("Username is required".to_string()))?;

        db_operation("query", self.backend.query_partition(username)).await
    }

    /// Create or overwrite the record for one user and show.
    ///
    /// The record is written whole with a fresh `last_updated`; there is no
    /// read before the write, so concurrent writers race last-writer-wins.
    /// Invalid input is rejected before anything is written.
    #[instrument(skip_all, name = "tracker.store.upsert_episode")]
    pub async fn upsert_episode(
        &self,
        username: &str,
        show_title: &str,
        season: u32,
        episode: u32,
    ) -> Result<EpisodeRecord, TrackerError> {
        let (username, show_title) = require_keys(username, show_title)?;
        if season < 1 || episode < 1 {
            return Err(TrackerError::Validation(
                "Season and episode must be positive integers".to_string(),
            ));
        }

        let record = EpisodeRecord {
            username: username.to_string(),
            show_title: show_title.to_string(),
            season,
            episode,
            last_updated: Some(Utc::now()),
        };

        db_operation("put", self.backend.put_item(&record)).await?;
        Ok(record)
    }

    /// Every record in the table, from a single scan request.
    #[instrument(skip_all, name = "tracker.store.list_all")]
    pub async fn list_all(&self) -> Result<Vec<EpisodeRecord>, TrackerError> {
        db_operation("scan", self.backend.scan()).await
    }

    /// Backend reachability, for the health endpoint.
    pub async fn ping(&self) -> Result<(), TrackerError> {
        self.backend.ping().await
    }
}

fn require_keys<'a>(
    username: &'a str,
    show_title: &'a str,
) -> Result<(&'a str, &'a str), TrackerError> {
    match (non_blank(Some(username)), non_blank(Some(show_title))) {
        (Some(username), Some(show_title)) => Ok((username, show_title)),
        _ => Err(TrackerError::Validation(
            "Username and tv_show are required".to_string(),
        )),
    }
}

/// Run one backend call with start/finish events and DB metrics.
async fn db_operation<T, F>(operation_type: &'static str, call: F) -> Result<T, TrackerError>
where
    F: Future<Output = Result<T, TrackerError>>,
{
    tracing::debug!(
        target: "tracker.store",
        operation_type,
        "DB_OPERATION_START"
    );
    let start = Instant::now();

    let result = call.await;
    let elapsed = start.elapsed();
    let duration_ms = (elapsed.as_secs_f64() * 100_000.0).round() / 100.0;

    match &result {
        Ok(_) => {
            tracing::debug!(
                target: "tracker.store",
                operation_type,
                duration_ms,
                "DB_OPERATION_SUCCESS"
            );
            record_db_query(operation_type, "success", elapsed);
        }
        Err(e) => {
            tracing::error!(
                target: "tracker.store",
                operation_type,
                duration_ms,
                error = %e,
                "DB_OPERATION_ERROR"
            );
            record_db_query(operation_type, "error", elapsed);
        }
    }

    result
}
