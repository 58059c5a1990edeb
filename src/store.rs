//! Persistence contract the engine relies on, plus an in-memory store.
//!
//! The only write a store has to offer is a compare-and-swap keyed on
//! `(record id, expected status, expected version)`: two requests that
//! validated against the same snapshot cannot both land, even when the
//! record left that status and came back in between.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, WorkflowError};
use crate::workflow::{Role, VideoRecord, VideoStatus, visible_statuses};

pub trait VideoStore {
    fn fetch(&self, id: Uuid) -> Result<VideoRecord>;

    /// Stores a new record. Fails if the id is already taken.
    fn insert(&self, record: VideoRecord) -> Result<()>;

    /// Replaces the stored record only if its status still equals `expected`
    /// and its version still equals `expected_version`.
    fn compare_and_swap(
        &self,
        expected: VideoStatus,
        expected_version: u64,
        record: &VideoRecord,
    ) -> Result<()>;

    /// Records whose status is one of `statuses`.
    fn list_by_status(&self, statuses: &[VideoStatus]) -> Result<Vec<VideoRecord>>;

    /// Records the role may list, as a status filter pushed down to the store.
    fn list_visible(&self, role: Role) -> Result<Vec<VideoRecord>> {
        self.list_by_status(visible_statuses(role))
    }
}

/// Mutex-guarded map; the CAS check and the write happen under one lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<Uuid, VideoRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, VideoRecord>> {
        // A panic mid-write cannot leave a half-written record: every write
        // is a single map insert.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl VideoStore for InMemoryStore {
    fn fetch(&self, id: Uuid) -> Result<VideoRecord> {
        self.lock()
            .get(&id)
            .cloned()
            .ok_or(WorkflowError::NotFound(id))
    }

    fn insert(&self, record: VideoRecord) -> Result<()> {
        let mut records = self.lock();
        if records.contains_key(&record.id) {
            return Err(WorkflowError::AlreadyExists(record.id));
        }
        debug!(video_id = %record.id, status = %record.status(), "record inserted");
        records.insert(record.id, record);
        Ok(())
    }

    fn compare_and_swap(
        &self,
        expected: VideoStatus,
        expected_version: u64,
        record: &VideoRecord,
    ) -> Result<()> {
        let mut records = self.lock();
        let stored = records
            .get_mut(&record.id)
            .ok_or(WorkflowError::NotFound(record.id))?;

        if stored.status() != expected || stored.version() != expected_version {
            warn!(
                video_id = %record.id,
                %expected,
                expected_version,
                actual = %stored.status(),
                actual_version = stored.version(),
                "compare-and-swap conflict"
            );
            return Err(WorkflowError::StaleState {
                id: record.id,
                expected,
                actual: stored.status(),
                expected_version,
                actual_version: stored.version(),
            });
        }

        *stored = record.clone();
        Ok(())
    }

    fn list_by_status(&self, statuses: &[VideoStatus]) -> Result<Vec<VideoRecord>> {
        let mut found: Vec<VideoRecord> = self
            .lock()
            .values()
            .filter(|record| statuses.contains(&record.status()))
            .cloned()
            .collect();
        found.sort_by_key(|record| record.created_at);
        Ok(found)
    }
}
