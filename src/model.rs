//! Normalized entity structs.

use serde::{Deserialize, Serialize};

/// One row of the record store: an album with a store-assigned primary key.
///
/// Immutable once fetched; identity is `id`. Only `title` participates in
/// substring matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
}

impl Record {
    pub fn new(id: i64, title: impl Into<String>, artist_id: i64) -> Self {
        Self {
            id,
            title: title.into(),
            artist_id,
        }
    }
}
