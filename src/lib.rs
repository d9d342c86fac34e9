//! Live search-as-you-type coordination over a local record store.
//!
//! Every keystroke submits a fresh query and results stream back
//! incrementally; results from a query that has since been superseded are
//! never shown. The correctness mechanism is a monotonic generation tag
//! compared at delivery time — cancelling an in-flight scan is purely a
//! performance optimization layered on top.
//!
//! - **[`model`]**: the `Record` row fetched from the store.
//! - **[`store`]**: the `RecordStore` trait plus SQLite and in-memory backends.
//! - **[`search`]**: the `SearchCoordinator` / `QueryExecutor` core.

pub mod model;
pub mod search;
pub mod store;

pub use model::Record;
pub use search::coordinator::{DeliveryMode, ResultSink, SearchCoordinator};
pub use search::executor::SearchRequest;
pub use store::{RecordStore, StoreError};
