//! One-shot execution of a single search request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::search::coordinator::{DeliveryMode, SearchEvent};
use crate::store::RecordStore;

/// One submitted keystroke: query text tagged with the generation that
/// produced it. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub generation: u64,
    pub query: String,
}

/// Handle to a spawned [`QueryExecutor`] worker.
///
/// Cancellation is advisory: the worker checks the flag between records and
/// stops emitting as soon as it notices, but a scan blocked inside the store
/// simply runs to completion and has its output discarded by the
/// coordinator's generation check.
pub struct ExecutorHandle {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ExecutorHandle {
    /// Generation this worker is scanning for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask the worker to stop emitting. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take()
            && handle.join().is_err()
        {
            warn!(generation = self.generation, "query executor panicked");
        }
    }
}

/// Scans the full record set once for a single request and streams matches
/// to the coordinator's channel. Owns no state across invocations.
///
/// The scan is a deliberate full pass per keystroke — the dataset is assumed
/// small enough that no index is warranted; the behavioral contract is
/// substring match over every record, in store-iteration order.
pub struct QueryExecutor;

impl QueryExecutor {
    /// Spawn a worker for `request`. Exactly one terminal event
    /// ([`SearchEvent::Complete`] or [`SearchEvent::Failed`]) is emitted
    /// unless the worker is cancelled first, in which case it may emit
    /// nothing further at all.
    pub fn spawn(
        store: Arc<dyn RecordStore>,
        request: SearchRequest,
        mode: DeliveryMode,
        tx: Sender<SearchEvent>,
    ) -> ExecutorHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let generation = request.generation;

        let thread = thread::spawn(move || run_scan(&*store, &request, mode, &tx, &flag));

        ExecutorHandle {
            generation,
            cancelled,
            thread: Some(thread),
        }
    }
}

fn run_scan(
    store: &dyn RecordStore,
    request: &SearchRequest,
    mode: DeliveryMode,
    tx: &Sender<SearchEvent>,
    cancelled: &AtomicBool,
) {
    let generation = request.generation;
    debug!(generation, query = %request.query, "scan started");

    let records = match store.fetch_all() {
        Ok(records) => records,
        Err(error) => {
            if cancelled.load(Ordering::Relaxed) {
                debug!(generation, "scan failed after cancellation; dropping error");
                return;
            }
            warn!(generation, %error, "record fetch failed");
            let _ = tx.send(SearchEvent::Failed { generation, error });
            return;
        }
    };

    let needle = request.query.to_lowercase();
    let mut matched = 0usize;
    let mut batch = Vec::new();
    for record in records {
        if cancelled.load(Ordering::Relaxed) {
            debug!(generation, matched, "scan cancelled mid-stream");
            return;
        }
        if !title_matches(&record.title, &needle) {
            continue;
        }
        matched += 1;
        match mode {
            DeliveryMode::Streaming => {
                if tx.send(SearchEvent::Match { generation, record }).is_err() {
                    return;
                }
            }
            DeliveryMode::Batch => batch.push(record),
        }
    }

    if cancelled.load(Ordering::Relaxed) {
        debug!(generation, matched, "scan cancelled before completion");
        return;
    }
    if mode == DeliveryMode::Batch
        && tx
            .send(SearchEvent::Batch {
                generation,
                records: batch,
            })
            .is_err()
    {
        return;
    }
    let _ = tx.send(SearchEvent::Complete { generation, matched });
    debug!(generation, matched, "scan complete");
}

/// Case-insensitive substring predicate. `needle` must already be
/// lowercased; an empty needle matches every title.
pub(crate) fn title_matches(title: &str, needle: &str) -> bool {
    title.to_lowercase().contains(needle)
}
