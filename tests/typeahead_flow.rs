//! End-to-end flow: a keystroke sequence against a real SQLite album store.
//!
//! Covers the full path — SqliteStore scan, executor matching, coordinator
//! generation filtering, sink delivery — with a temp database fixture.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::Lazy;
use tempfile::TempDir;

use typeahead_search::store::sqlite::SqliteStore;
use typeahead_search::{DeliveryMode, Record, ResultSink, SearchCoordinator, StoreError};

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
});

#[derive(Default)]
struct DisplaySink {
    rows: Vec<String>,
    last_count: Option<usize>,
    errors: Vec<String>,
    clears: usize,
}

impl ResultSink for DisplaySink {
    fn clear(&mut self) {
        self.clears += 1;
        self.rows.clear();
        self.last_count = None;
    }
    fn append(&mut self, record: Record) {
        self.rows.push(record.title);
    }
    fn report_count(&mut self, count: usize) {
        self.last_count = Some(count);
    }
    fn report_error(&mut self, error: StoreError) {
        self.errors.push(error.to_string());
    }
}

fn seed_albums(path: &Path) -> Result<()> {
    let conn = rusqlite::Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE Album (
            AlbumId INTEGER PRIMARY KEY AUTOINCREMENT,
            Title NVARCHAR(160) NOT NULL,
            ArtistId INTEGER NOT NULL
        );",
    )?;
    let titles = [
        "Dark Side of the Moon",
        "The Wall",
        "Kind of Blue",
        "In the Dark",
        "Moondance",
        "Blue Train",
    ];
    for (i, title) in titles.iter().enumerate() {
        conn.execute(
            "INSERT INTO Album (Title, ArtistId) VALUES (?1, ?2)",
            rusqlite::params![title, (i as i64) + 1],
        )?;
    }
    Ok(())
}

fn fixture() -> Result<(TempDir, SqliteStore)> {
    Lazy::force(&TRACING);
    let dir = TempDir::new()?;
    let db = dir.path().join("albums.sqlite");
    seed_albums(&db)?;
    let store = SqliteStore::open(&db)?;
    Ok((dir, store))
}

#[test]
fn typing_refines_results_keystroke_by_keystroke() -> Result<()> {
    let (_dir, store) = fixture()?;
    let mut coord = SearchCoordinator::new(Arc::new(store), DeliveryMode::Streaming);
    let mut sink = DisplaySink::default();

    for keystrokes in ["d", "da", "dar", "dark"] {
        coord.submit(keystrokes);
        coord.pump_until_settled(&mut sink);
    }

    assert_eq!(sink.rows, vec!["Dark Side of the Moon", "In the Dark"]);
    assert_eq!(sink.last_count, Some(2));
    assert_eq!(sink.clears, 4);
    assert!(sink.errors.is_empty());
    coord.join_workers();
    Ok(())
}

#[test]
fn deleting_the_query_restores_the_full_listing() -> Result<()> {
    let (_dir, store) = fixture()?;
    let mut coord = SearchCoordinator::new(Arc::new(store), DeliveryMode::Streaming);
    let mut sink = DisplaySink::default();

    coord.submit("blue");
    coord.pump_until_settled(&mut sink);
    assert_eq!(sink.rows, vec!["Kind of Blue", "Blue Train"]);

    coord.submit("");
    coord.pump_until_settled(&mut sink);
    assert_eq!(sink.rows.len(), 6);
    assert_eq!(sink.last_count, Some(6));
    coord.join_workers();
    Ok(())
}

#[test]
fn batch_mode_one_shot_search_over_sqlite() -> Result<()> {
    let (_dir, store) = fixture()?;
    let mut coord = SearchCoordinator::new(Arc::new(store), DeliveryMode::Batch);
    let mut sink = DisplaySink::default();

    coord.submit("moon");
    coord.pump_until_settled(&mut sink);

    assert_eq!(sink.rows, vec!["Dark Side of the Moon", "Moondance"]);
    assert_eq!(sink.last_count, Some(2));
    coord.join_workers();
    Ok(())
}

#[test]
fn burst_of_keystrokes_only_renders_the_newest() -> Result<()> {
    let (_dir, store) = fixture()?;
    let mut coord = SearchCoordinator::new(Arc::new(store), DeliveryMode::Streaming);
    let mut sink = DisplaySink::default();

    // No pump between submits: overlapping generations, only the last counts.
    for keystrokes in ["b", "bl", "blu", "blue", "blue t"] {
        coord.submit(keystrokes);
    }
    coord.join_workers();
    coord.pump(&mut sink);

    assert_eq!(sink.rows, vec!["Blue Train"]);
    assert_eq!(sink.last_count, Some(1));
    Ok(())
}

#[test]
fn vanished_database_reports_a_store_error() -> Result<()> {
    let (dir, store) = fixture()?;
    std::fs::remove_file(store.path())?;
    let mut coord = SearchCoordinator::new(Arc::new(store), DeliveryMode::Streaming);
    let mut sink = DisplaySink::default();

    coord.submit("dark");
    coord.pump_until_settled(&mut sink);

    assert!(sink.rows.is_empty());
    assert_eq!(sink.errors.len(), 1);
    assert_eq!(sink.last_count, None);

    // The coordinator stays usable; the next submit is the retry path.
    drop(dir);
    coord.submit("x");
    assert_eq!(coord.current_generation(), 2);
    coord.join_workers();
    Ok(())
}
