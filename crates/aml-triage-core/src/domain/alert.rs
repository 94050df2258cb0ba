//! Alert record helpers.
//!
//! Alert records are opaque JSON objects owned by the remote services; the
//! console only reads a handful of well-known fields out of them.

use serde_json::Value;

use crate::error::{Result, TriageError};

/// Read `key` as display text. Strings are taken verbatim, numbers and
/// booleans are formatted, anything else counts as absent.
pub fn field_text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First of `keys` present as display text.
pub fn first_field_text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| field_text(record, key))
}

/// The record's `AlertID`, as text.
pub fn alert_identifier(alert: &Value) -> Option<String> {
    field_text(alert, "AlertID")
}

/// Parse an alert batch from JSON text.
///
/// Accepts an array of objects or a single object. Anything else is
/// [`TriageError::InvalidInput`].
pub fn parse_alert_batch(text: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| TriageError::InvalidInput(format!("alert file is not valid JSON: {e}")))?;

    let alerts = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        other => {
            return Err(TriageError::InvalidInput(format!(
                "expected a JSON array of alert objects, found {}",
                json_type_name(&other)
            )))
        }
    };

    if let Some(position) = alerts.iter().position(|alert| !alert.is_object()) {
        return Err(TriageError::InvalidInput(format!(
            "alert {} is {}, expected an object",
            position + 1,
            json_type_name(&alerts[position])
        )));
    }
    Ok(alerts)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alert_identifier_accepts_strings_and_numbers() {
        assert_eq!(alert_identifier(&json!({"AlertID": "A-7"})), Some("A-7".to_string()));
        assert_eq!(alert_identifier(&json!({"AlertID": 1001})), Some("1001".to_string()));
        assert_eq!(alert_identifier(&json!({"AlertID": null})), None);
        assert_eq!(alert_identifier(&json!({})), None);
    }

    #[test]
    fn test_first_field_text_prefers_earlier_keys() {
        let record = json!({"Customer Name": "B", "CustomerName": "A"});
        assert_eq!(
            first_field_text(&record, &["CustomerName", "Customer Name"]),
            Some("A".to_string())
        );
    }

    #[test]
    fn test_parse_alert_batch() {
        let alerts = parse_alert_batch(r#"[{"AlertID": 1}, {"AlertID": 2}]"#).unwrap();
        assert_eq!(alerts.len(), 2);

        let single = parse_alert_batch(r#"{"AlertID": 1}"#).unwrap();
        assert_eq!(single, vec![json!({"AlertID": 1})]);

        assert!(parse_alert_batch("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_alert_batch_rejects_non_objects() {
        let err = parse_alert_batch(r#"[{"AlertID": 1}, 5]"#).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: alert 2 is a number, expected an object");

        assert!(matches!(parse_alert_batch("\"x\""), Err(TriageError::InvalidInput(_))));
        assert!(matches!(parse_alert_batch("{"), Err(TriageError::InvalidInput(_))));
    }
}
