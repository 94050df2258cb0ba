//! Per-item outcome aggregation.
//!
//! [`aggregate`] folds the ordered outcomes of a batch of independent calls
//! into one [`BatchResult`], preserving submission order on both the
//! success and the failure side.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TriageError};
use crate::service::ServiceFailure;

/// A failed item, tagged with its position in the submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Zero-based position in the batch.
    pub index: usize,
    /// Record identifier, when the record carried one.
    pub identifier: Option<String>,
    pub message: String,
}

impl ItemFailure {
    pub fn new(index: usize, identifier: Option<String>, message: impl Into<String>) -> Self {
        ItemFailure {
            index,
            identifier,
            message: message.into(),
        }
    }

    /// Failure of the remote call for the item at `index`.
    pub fn from_service_failure(
        index: usize,
        identifier: Option<String>,
        failure: &ServiceFailure,
    ) -> Self {
        Self::new(index, identifier, failure.describe())
    }
}

impl fmt::Display for ItemFailure {
    /// `Item <1-based index> (ID: <identifier or N/A>): <message>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Item {} (ID: {}): {}",
            self.index + 1,
            self.identifier.as_deref().unwrap_or("N/A"),
            self.message
        )
    }
}

/// Outcome of one item's remote call.
pub type ItemOutcome = std::result::Result<Value, ItemFailure>;

/// Aggregated outcome of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchResult {
    /// Every item succeeded.
    AllOk { payloads: Vec<Value> },
    /// Both lists are non-empty.
    PartialOk {
        payloads: Vec<Value>,
        errors: Vec<String>,
    },
    /// Every item failed.
    AllFailed { errors: Vec<String> },
}

impl BatchResult {
    /// Successful payloads in submission order.
    pub fn payloads(&self) -> &[Value] {
        match self {
            BatchResult::AllOk { payloads } | BatchResult::PartialOk { payloads, .. } => payloads,
            BatchResult::AllFailed { .. } => &[],
        }
    }

    /// Formatted failure descriptions in submission order.
    pub fn errors(&self) -> &[String] {
        match self {
            BatchResult::PartialOk { errors, .. } | BatchResult::AllFailed { errors } => errors,
            BatchResult::AllOk { .. } => &[],
        }
    }

    /// `true` when at least one item succeeded.
    pub fn has_payloads(&self) -> bool {
        !matches!(self, BatchResult::AllFailed { .. })
    }

    /// Machine-readable name of the variant.
    pub fn status(&self) -> &'static str {
        match self {
            BatchResult::AllOk { .. } => "all_ok",
            BatchResult::PartialOk { .. } => "partial_ok",
            BatchResult::AllFailed { .. } => "all_failed",
        }
    }
}

/// Classify a batch of per-item outcomes.
///
/// Returns [`TriageError::InvalidInput`] for an empty batch: there is
/// nothing to report either way.
pub fn aggregate(outcomes: Vec<ItemOutcome>) -> Result<BatchResult> {
    let mut payloads = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(payload) => payloads.push(payload),
            Err(failure) => errors.push(failure.to_string()),
        }
    }

    match (payloads.len(), errors.len()) {
        (0, 0) => Err(TriageError::InvalidInput(
            "cannot aggregate an empty batch".to_string(),
        )),
        (_, 0) => Ok(BatchResult::AllOk { payloads }),
        (0, _) => Ok(BatchResult::AllFailed { errors }),
        _ => Ok(BatchResult::PartialOk { payloads, errors }),
    }
}
