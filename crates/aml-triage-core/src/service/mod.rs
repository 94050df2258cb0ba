//! Access to the remote prioritisation and analysis services.
//!
//! [`AlertService`] is the seam between the workflow drivers and the
//! network. [`HttpAlertService`] is the production implementation; tests
//! plug in in-memory fakes.

pub mod http;

use std::fmt;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{Result, TriageError};

pub use http::HttpAlertService;

/// Maximum number of characters of an unstructured error body quoted back
/// to the operator.
pub const RESPONSE_EXCERPT_CHARS: usize = 500;

/// Failure text of a timed-out prediction call.
pub const TIMEOUT_MESSAGE: &str = "Request timed out.";

/// Body of a non-2xx response.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteBody {
    /// The body parsed as JSON.
    Structured(Value),
    /// Anything else, kept verbatim.
    Unstructured(String),
}

impl RemoteBody {
    /// Classify an error body by whether it parses as JSON.
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => RemoteBody::Structured(value),
            Err(_) => RemoteBody::Unstructured(text.to_string()),
        }
    }
}

/// Why a single remote call failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceFailure {
    /// The call exceeded its timeout.
    Timeout,
    /// No HTTP response was obtained.
    Transport(String),
    /// The service answered with a non-2xx status.
    Remote {
        status: u16,
        reason: String,
        url: String,
        body: RemoteBody,
    },
}

impl ServiceFailure {
    /// Short machine-readable name of the cause, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceFailure::Timeout => "timeout",
            ServiceFailure::Transport(_) => "transport_failure",
            ServiceFailure::Remote { .. } => "remote_error",
        }
    }

    /// Operator-facing description.
    ///
    /// Structured error bodies are appended as pretty JSON, unstructured
    /// ones as an excerpt capped at [`RESPONSE_EXCERPT_CHARS`] characters.
    pub fn describe(&self) -> String {
        match self {
            ServiceFailure::Timeout => TIMEOUT_MESSAGE.to_string(),
            ServiceFailure::Transport(detail) => detail.clone(),
            ServiceFailure::Remote {
                status,
                reason,
                url,
                body,
            } => {
                let status_line = match status_class(*status) {
                    Some(class) => format!("{status} {class}: {reason} for url: {url}"),
                    None => format!("{status} {reason} for url: {url}"),
                };
                match body {
                    RemoteBody::Structured(value) => {
                        let pretty = serde_json::to_string_pretty(value)
                            .unwrap_or_else(|_| value.to_string());
                        format!("{status_line}\nDetails: {pretty}")
                    }
                    RemoteBody::Unstructured(text) => {
                        let excerpt: String = text.chars().take(RESPONSE_EXCERPT_CHARS).collect();
                        format!("{status_line}\nResponse: {excerpt}")
                    }
                }
            }
        }
    }

    /// Convert into a [`TriageError`] of the matching kind.
    ///
    /// `timeout_message` replaces the generic timeout text, so callers can
    /// tailor the advice to the operation that timed out.
    pub fn into_error(self, timeout_message: &str) -> TriageError {
        match self {
            ServiceFailure::Timeout => TriageError::Timeout(timeout_message.to_string()),
            ServiceFailure::Transport(_) => TriageError::TransportFailure(self.describe()),
            ServiceFailure::Remote { .. } => TriageError::RemoteError(self.describe()),
        }
    }
}

/// Error class shown in remote status lines.
fn status_class(status: u16) -> Option<&'static str> {
    match status / 100 {
        4 => Some("Client Error"),
        5 => Some("Server Error"),
        _ => None,
    }
}

impl fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// A 2xx response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply {
    Json(Value),
    /// The body was not valid JSON; kept verbatim.
    Raw(String),
}

impl ServiceReply {
    /// Decode a success body, degrading to [`ServiceReply::Raw`] when it is
    /// not JSON.
    pub fn from_body(endpoint: &str, text: String) -> Self {
        match decode_body(&text) {
            Ok(value) => ServiceReply::Json(value),
            Err(err) => {
                crate::obs::emit_malformed_response(endpoint, &err);
                ServiceReply::Raw(text)
            }
        }
    }

    /// JSON payload for downstream consumers.
    ///
    /// Raw replies become `{"raw_response": ...}` placeholders, tagged with
    /// `alert_index` when the reply belongs to one item of a batch.
    pub fn into_payload(self, alert_index: Option<usize>) -> Value {
        match self {
            ServiceReply::Json(value) => value,
            ServiceReply::Raw(text) => match alert_index {
                Some(index) => json!({ "raw_response": text, "alert_index": index }),
                None => json!({ "raw_response": text }),
            },
        }
    }
}

/// Parse a success body as JSON.
pub fn decode_body(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// The two remote operations the console depends on.
#[async_trait]
pub trait AlertService: Send + Sync {
    /// Score a single alert record.
    async fn predict(&self, alert: &Value) -> std::result::Result<ServiceReply, ServiceFailure>;

    /// Generate the narrative analysis for a whole batch in one call.
    async fn analyze(&self, alerts: &[Value])
        -> std::result::Result<ServiceReply, ServiceFailure>;
}
