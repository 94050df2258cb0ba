//! Prioritisation results.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::alert::{field_text, first_field_text};
use crate::batch::BatchResult;

/// Escalation priority assigned by the prioritisation model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
    /// Any other label, kept verbatim.
    Unknown(String),
}

impl Priority {
    /// Parse a label, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Unknown(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unknown(raw) => raw,
        }
    }

    /// Colour marker shown next to the label.
    pub fn badge(&self) -> &'static str {
        match self {
            Priority::High => "🔴",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
            Priority::Unknown(_) => "⚪",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.label().to_string()
    }
}

/// One scored alert, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub alert_id: Option<String>,
    pub focus_value: Option<String>,
    pub priority: Priority,
    /// `STRScenario`, falling back to `ScenarioName`.
    pub scenario: Option<String>,
    pub status: String,
    pub message: String,
    /// Body of a reply that was not JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl PredictionRecord {
    /// Extract the scored alerts of a batch in submission order.
    ///
    /// Reply envelopes carrying a `data` field are flattened (a list
    /// contributes every element, an object itself). Non-object
    /// predictions carry nothing displayable and are skipped.
    pub fn from_batch(result: &BatchResult) -> Vec<Self> {
        let (status, message) = match result {
            BatchResult::AllOk { .. } => ("200", "Success"),
            _ => ("Success", "Processed"),
        };

        result
            .payloads()
            .iter()
            .flat_map(flatten_envelope)
            .filter(|prediction| prediction.is_object())
            .map(|prediction| Self::from_value(prediction, status, message))
            .collect()
    }

    fn from_value(prediction: &Value, status: &str, message: &str) -> Self {
        PredictionRecord {
            alert_id: field_text(prediction, "AlertID"),
            focus_value: field_text(prediction, "FocusColumnValue"),
            priority: field_text(prediction, "Prediction")
                .map(|raw| Priority::parse(&raw))
                .unwrap_or_else(|| Priority::Unknown("N/A".to_string())),
            scenario: first_field_text(prediction, &["STRScenario", "ScenarioName"]),
            status: status.to_string(),
            message: message.to_string(),
            raw_response: field_text(prediction, "raw_response"),
        }
    }
}

fn flatten_envelope(payload: &Value) -> Vec<&Value> {
    match payload.get("data") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(data) => vec![data],
        None => vec![payload],
    }
}
