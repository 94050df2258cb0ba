//! Narrative analysis results.

use serde::Serialize;
use serde_json::Value;

use super::alert::first_field_text;

/// One generated analysis, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisItem {
    pub alert_id: Option<String>,
    pub customer_name: Option<String>,
    pub focus_value: Option<String>,
    /// Freeform report text, rendered through [`crate::report`].
    pub report: Option<String>,
    /// Model reasoning, present in audit mode.
    pub thinking: Option<String>,
    pub response_time_ms: f64,
    pub method: Option<String>,
    pub model: Option<String>,
}

impl AnalysisItem {
    /// Extract the analyses carried by a service reply.
    ///
    /// The list is read from `data`, then `Analysis`, then the reply
    /// itself. A scalar where a list is expected counts as a single item.
    pub fn from_response(response: &Value) -> Vec<Self> {
        let container = match response {
            Value::Object(fields) => fields
                .get("data")
                .or_else(|| fields.get("Analysis"))
                .unwrap_or(response),
            _ => response,
        };

        match container {
            Value::Array(items) => items.iter().map(Self::from_value).collect(),
            single => vec![Self::from_value(single)],
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => AnalysisItem {
                alert_id: first_field_text(value, &["AlertID", "Alert ID"]),
                customer_name: first_field_text(value, &["CustomerName", "Customer Name"])
                    .filter(|name| !name.is_empty() && name != "N/A"),
                focus_value: first_field_text(value, &["FocusColumnValue"]),
                report: report_text(value),
                thinking: first_field_text(value, &["thinking"]).filter(|t| !t.is_empty()),
                response_time_ms: value
                    .get("response_time_ms")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
                method: first_field_text(value, &["method"]),
                model: first_field_text(value, &["model"]),
            },
            Value::String(text) => AnalysisItem::from_report(text),
            Value::Null => AnalysisItem::from_report(""),
            other => AnalysisItem::from_report(&other.to_string()),
        }
    }

    fn from_report(text: &str) -> Self {
        AnalysisItem {
            alert_id: None,
            customer_name: None,
            focus_value: None,
            report: Some(text.to_string()).filter(|t| !t.is_empty()),
            thinking: None,
            response_time_ms: 0.0,
            method: None,
            model: None,
        }
    }
}

/// The report under the first present key, falling back to an undecoded
/// body. Non-string reports are shown as JSON.
fn report_text(value: &Value) -> Option<String> {
    let report = ["analysis", "Analysis", "AnalysisReport"]
        .iter()
        .find_map(|key| value.get(*key))
        .map(|report| match report {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .filter(|text| !text.is_empty());

    report.or_else(|| first_field_text(value, &["raw_response"]))
}
