//! Record store backends.
//!
//! The search core only needs one operation from persistence: fetch every
//! record. Substring filtering happens in the executor, so a backend stays a
//! thin adapter. [`sqlite`] reads the on-disk album database; [`MemoryStore`]
//! serves fixtures.

pub mod sqlite;

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Record;

/// Error from a record fetch.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to open record store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("record fetch failed: {0}")]
    Fetch(#[from] rusqlite::Error),
}

/// A persisted record collection supporting a full-scan fetch.
///
/// Implementations must tolerate concurrent fetches from overlapping search
/// generations: a superseded scan may still be running when the next one
/// starts. Backends that are not internally concurrency-safe must acquire
/// their own handle per invocation rather than sharing one.
pub trait RecordStore: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<Record>, StoreError>;
}

/// In-memory store, mainly for tests and small fixed datasets.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<Record>,
}

impl MemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordStore for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.records.clone())
    }
}
