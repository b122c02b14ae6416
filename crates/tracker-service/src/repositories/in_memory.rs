//! In-process episode backend.
//!
//! Used by tests and the test server harness. Items live in a `BTreeMap`
//! keyed by (username, show title), so partition queries come back sorted
//! by show title the same way a DynamoDB sort key would.

use super::EpisodeBackend;
use crate::errors::TrackerError;
use crate::models::EpisodeRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Key = (String, String);

/// In-memory implementation of `EpisodeBackend`.
///
/// Can be flipped into an unavailable state to exercise backend failures.
#[derive(Debug, Default)]
pub struct InMemoryEpisodeBackend {
    items: Mutex<BTreeMap<Key, EpisodeRecord>>,
    unavailable: AtomicBool,
    call_count: AtomicUsize,
}

impl InMemoryEpisodeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that fails every call with `TrackerError::Backend`.
    pub fn failing() -> Self {
        let backend = Self::default();
        backend.set_unavailable(true);
        backend
    }

    /// A backend pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = EpisodeRecord>) -> Self {
        let backend = Self::default();
        {
            let mut items = backend.lock();
            for record in records {
                items.insert(
                    (record.username.clone(), record.show_title.clone()),
                    record,
                );
            }
        }
        backend
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of backend calls made, failed ones included.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of stored items. Not counted as a backend call.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Key, EpisodeRecord>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, operation: &str) -> Result<(), TrackerError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TrackerError::Backend(format!(
                "In-memory backend unavailable during {}",
                operation
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EpisodeBackend for InMemoryEpisodeBackend {
    async fn get_item(
        &self,
        username: &str,
        show_title: &str,
    ) -> Result<Option<EpisodeRecord>, TrackerError> {
        self.begin("get_item")?;
        Ok(self
            .lock()
            .get(&(username.to_string(), show_title.to_string()))
            .cloned())
    }

    async fn query_partition(&self, username: &str) -> Result<Vec<EpisodeRecord>, TrackerError> {
        self.begin("query")?;
        Ok(self
            .lock()
            .iter()
            .filter(|((user, _), _)| user == username)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn put_item(&self, record: &EpisodeRecord) -> Result<(), TrackerError> {
        self.begin("put_item")?;
        self.lock().insert(
            (record.username.clone(), record.show_title.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<EpisodeRecord>, TrackerError> {
        self.begin("scan")?;
        Ok(self.lock().values().cloned().collect())
    }

    async fn ping(&self) -> Result<(), TrackerError> {
        self.begin("ping")
    }
}
