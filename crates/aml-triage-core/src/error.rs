//! Error types for the triage console.

use thiserror::Error;

/// Errors produced by the triage library.
///
/// Per-item prediction failures are not represented here: they travel as
/// [`crate::batch::ItemFailure`] values until the aggregator decides the
/// fate of the whole batch.
#[derive(Debug, Error)]
pub enum TriageError {
    /// The remote call exceeded its timeout.
    #[error("{0}")]
    Timeout(String),

    /// The request never produced an HTTP response (DNS, connect, TLS, reset).
    #[error("{0}")]
    TransportFailure(String),

    /// The service answered with a non-2xx status.
    #[error("{0}")]
    RemoteError(String),

    /// The caller supplied something the console cannot submit.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A success body was not valid JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl TriageError {
    /// Short machine-readable name of the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TriageError::Timeout(_) => "timeout",
            TriageError::TransportFailure(_) => "transport_failure",
            TriageError::RemoteError(_) => "remote_error",
            TriageError::InvalidInput(_) => "invalid_input",
            TriageError::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(err: serde_json::Error) -> Self {
        TriageError::MalformedResponse(err.to_string())
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, TriageError>;
