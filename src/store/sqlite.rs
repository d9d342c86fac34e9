//! `SQLite` backend over the album schema.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::model::Record;
use crate::store::{RecordStore, StoreError};

/// Read-only SQLite-backed [`RecordStore`].
///
/// Holding a `SqliteStore` is cheap: no connection is kept open. Each
/// `fetch_all` opens its own read-only connection, so scans from overlapping
/// search generations never contend on a shared handle.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Point at a database file. Fails fast if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Err(StoreError::NotFound(path));
        }
        Ok(Self { path })
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::Open {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl RecordStore for SqliteStore {
    fn fetch_all(&self) -> Result<Vec<Record>, StoreError> {
        let start = Instant::now();
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT AlbumId, Title, ArtistId FROM Album ORDER BY AlbumId")?;
        let rows = stmt.query_map([], |row| {
            Ok(Record {
                id: row.get(0)?,
                title: row.get(1)?,
                artist_id: row.get(2)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        debug!(
            path = %self.path.display(),
            rows = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched record store"
        );
        Ok(records)
    }
}
