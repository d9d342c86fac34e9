//! Generation-tagged coordination of overlapping searches.
//!
//! The coordinator is the single authority on which in-flight search may
//! reach the consumer. Each submit bumps a monotonic generation counter and
//! tags the spawned worker with it; every event is re-checked against the
//! current generation at delivery time and silently dropped when stale. A
//! slow scan for an old keystroke can therefore finish whenever it likes —
//! its output never reaches the sink once a newer keystroke exists.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, info, trace, warn};

use crate::model::Record;
use crate::search::executor::{ExecutorHandle, QueryExecutor, SearchRequest};
use crate::store::{RecordStore, StoreError};

/// How a worker hands its matches back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// One event per match, forwarded as the scan produces them.
    Streaming,
    /// Collect the whole result set, deliver it in a single event. The sink
    /// sees the same signal sequence either way.
    Batch,
}

/// Consumer of search results. Lives on the owning thread; the coordinator
/// only ever invokes it from inside [`SearchCoordinator::pump`] and
/// [`SearchCoordinator::pump_until_settled`], which the owning thread calls.
pub trait ResultSink {
    /// Drop all displayed results. Sent once per submit, before any append
    /// for that generation.
    fn clear(&mut self);
    /// One match, in store-iteration order.
    fn append(&mut self, record: Record);
    /// Final number of matches for the finished search.
    fn report_count(&mut self, count: usize);
    /// The search failed; equivalent to zero results. The next submit is the
    /// retry path.
    fn report_error(&mut self, error: StoreError);
}

/// Wire protocol between workers and the owning thread. Every event carries
/// the generation of the request that produced it.
#[derive(Debug)]
pub enum SearchEvent {
    Cleared { generation: u64 },
    Match { generation: u64, record: Record },
    Batch { generation: u64, records: Vec<Record> },
    Complete { generation: u64, matched: usize },
    Failed { generation: u64, error: StoreError },
}

impl SearchEvent {
    fn generation(&self) -> u64 {
        match self {
            Self::Cleared { generation }
            | Self::Match { generation, .. }
            | Self::Batch { generation, .. }
            | Self::Complete { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

/// Owns the generation counter and the worker pool for live search.
///
/// `submit` and the pump methods must be called from the owning thread (the
/// one that owns the [`ResultSink`]); workers run on their own threads and
/// communicate back over an unbounded channel, so a superseded worker can
/// never wedge on a send nobody will drain.
pub struct SearchCoordinator {
    store: Arc<dyn RecordStore>,
    mode: DeliveryMode,
    generation: Arc<AtomicU64>,
    tx: Sender<SearchEvent>,
    rx: Receiver<SearchEvent>,
    workers: Vec<ExecutorHandle>,
}

impl SearchCoordinator {
    pub fn new(store: Arc<dyn RecordStore>, mode: DeliveryMode) -> Self {
        let (tx, rx) = unbounded();
        Self {
            store,
            mode,
            generation: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
            workers: Vec::new(),
        }
    }

    /// Highest generation issued so far; the only one eligible to deliver.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new search for `query`, superseding any in-flight one.
    ///
    /// Never blocks for the scan itself. Bumps the generation, cancels prior
    /// workers (advisory), enqueues the clear signal for the new generation,
    /// and spawns its worker. Returns the new generation. An empty query is
    /// legal and matches every record.
    pub fn submit(&mut self, query: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        for worker in &self.workers {
            worker.cancel();
        }
        self.workers.retain(|w| !w.is_finished());

        debug!(generation, query, "search submitted");
        let _ = self.tx.send(SearchEvent::Cleared { generation });

        let request = SearchRequest {
            generation,
            query: query.to_string(),
        };
        let handle = QueryExecutor::spawn(
            Arc::clone(&self.store),
            request,
            self.mode,
            self.tx.clone(),
        );
        self.workers.push(handle);
        generation
    }

    /// Drain every queued event without blocking, applying current-generation
    /// ones to `sink` and dropping the rest. Returns the number of signals
    /// applied. Call from the owning thread, e.g. once per UI tick.
    pub fn pump(&mut self, sink: &mut dyn ResultSink) -> usize {
        let current = self.generation.load(Ordering::SeqCst);
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            if self.apply(event, current, sink) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocking pump: drain until the current generation's terminal event
    /// (completion or failure) has been applied. This is the one-shot
    /// fetch-and-display path; combined with [`DeliveryMode::Batch`] it
    /// behaves like a synchronous search while reusing the same protocol.
    pub fn pump_until_settled(&mut self, sink: &mut dyn ResultSink) {
        let current = self.generation.load(Ordering::SeqCst);
        loop {
            // recv cannot disconnect: the coordinator holds a sender.
            let Ok(event) = self.rx.recv() else { return };
            let settled = matches!(
                &event,
                SearchEvent::Complete { generation, .. } | SearchEvent::Failed { generation, .. }
                    if *generation == current
            );
            self.apply(event, current, sink);
            if settled {
                return;
            }
        }
    }

    /// Wait for every spawned worker to exit. Shutdown/test helper; a live
    /// coordinator never needs it, since stale workers are simply discarded.
    pub fn join_workers(&mut self) {
        for worker in &mut self.workers {
            worker.join();
        }
        self.workers.clear();
    }

    fn apply(&self, event: SearchEvent, current: u64, sink: &mut dyn ResultSink) -> bool {
        let generation = event.generation();
        if generation != current {
            trace!(generation, current, "dropping stale event");
            return false;
        }
        match event {
            SearchEvent::Cleared { .. } => sink.clear(),
            SearchEvent::Match { record, .. } => sink.append(record),
            SearchEvent::Batch { records, .. } => {
                for record in records {
                    sink.append(record);
                }
            }
            SearchEvent::Complete { matched, .. } => {
                info!(generation, matched, "search complete");
                sink.report_count(matched);
            }
            SearchEvent::Failed { error, .. } => {
                warn!(generation, %error, "search failed");
                sink.report_error(error);
            }
        }
        true
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        // Advisory only; runaway scans are discarded, not killed.
        for worker in &self.workers {
            worker.cancel();
        }
    }
}
