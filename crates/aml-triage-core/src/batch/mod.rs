//! Batch outcome classification.

pub mod aggregator;

pub use aggregator::{aggregate, BatchResult, ItemFailure, ItemOutcome};
