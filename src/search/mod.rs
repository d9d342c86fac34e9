//! Search core.
//!
//! - **[`coordinator`]**: owns the generation counter, decides which
//!   in-flight search's results may reach the consumer.
//! - **[`executor`]**: one-shot worker scanning the store for a single
//!   request.

pub mod coordinator;
pub mod executor;
