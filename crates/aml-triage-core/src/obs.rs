//! Structured observability hooks for batch lifecycle events.
//!
//! This module provides:
//! - Batch-scoped tracing spans via [`batch_span`]
//! - Emission functions for key lifecycle events: start, item failure,
//!   aggregation, analysis completion, undecodable replies
//!
//! Events are emitted at `info!` level, failures at `warn!`. Verbosity is
//! controlled through `AML_TRIAGE_LOG` (see [`crate::telemetry`]).

use tracing::{info, warn};

/// Span tagging every event of one batch with its id.
///
/// The span is meant to be attached with [`tracing::Instrument`] so it stays
/// current across the awaits of a batch.
pub fn batch_span(batch_id: &str, operation: &str) -> tracing::Span {
    tracing::info_span!("aml_triage.batch", batch_id = %batch_id, operation = %operation)
}

/// Emit event: batch submitted.
///
/// # Example
///
/// ```ignore
/// emit_batch_started("b-123", "predict", 3);
/// // logs: event=batch.started batch_id=b-123 operation=predict items=3
/// ```
pub fn emit_batch_started(batch_id: &str, operation: &str, items: usize) {
    info!(event = "batch.started", batch_id = %batch_id, operation = %operation, items = items);
}

/// Emit event: one item's remote call failed (warning level).
pub fn emit_item_failed(batch_id: &str, index: usize, cause: &str) {
    warn!(event = "batch.item_failed", batch_id = %batch_id, index = index, cause = %cause);
}

/// Emit event: per-item outcomes aggregated.
pub fn emit_batch_aggregated(batch_id: &str, status: &str, succeeded: usize, failed: usize) {
    info!(
        event = "batch.aggregated",
        batch_id = %batch_id,
        status = %status,
        succeeded = succeeded,
        failed = failed,
    );
}

/// Emit event: analysis call finished.
pub fn emit_analysis_finished(batch_id: &str, items: usize, duration_ms: u64, success: bool) {
    info!(
        event = "analysis.finished",
        batch_id = %batch_id,
        items = items,
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: a 2xx reply could not be decoded as JSON (warning level).
pub fn emit_malformed_response(endpoint: &str, error: &dyn std::fmt::Display) {
    warn!(event = "service.malformed_response", endpoint = %endpoint, error = %error);
}
