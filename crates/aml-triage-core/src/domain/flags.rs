//! Generation options for the analysis service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::alert::json_type_name;
use crate::config::parse_http_url;
use crate::error::{Result, TriageError};

/// Options attached to every record of an analysis batch.
///
/// Field names on the wire follow the service contract (`Cloud` is
/// capitalised, the rest are snake case).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFlags {
    /// Generate with the hosted cloud model.
    #[serde(rename = "Cloud")]
    pub cloud: bool,
    /// Generate with a self-hosted model server at [`AnalysisFlags::url`].
    pub llm_on_server: bool,
    /// Address of the self-hosted model server; empty when unused.
    pub url: String,
    /// Mask personally identifiable information before generation.
    pub anonymous: bool,
    /// Ask for the model's reasoning alongside the report.
    pub audit: bool,
    /// Run the evaluator pass over the generated report.
    pub evaluation: bool,
}

impl Default for AnalysisFlags {
    fn default() -> Self {
        AnalysisFlags {
            cloud: true,
            llm_on_server: false,
            url: String::new(),
            anonymous: false,
            audit: false,
            evaluation: false,
        }
    }
}

impl AnalysisFlags {
    /// Resolve the model selection before submission.
    ///
    /// - neither backend selected: fall back to cloud
    /// - both selected: cloud takes priority, a warning is logged
    /// - self-hosted only: a server URL is required
    ///
    /// A non-empty URL must be an absolute http(s) URL in every case.
    pub fn normalize(mut self) -> Result<Self> {
        self.url = self.url.trim().to_string();
        if !self.url.is_empty() {
            parse_http_url(&self.url, "model server url")?;
        }

        match (self.cloud, self.llm_on_server) {
            (false, false) => {
                info!("no model backend selected, defaulting to cloud");
                self.cloud = true;
            }
            (true, true) => {
                warn!("multiple model backends selected, priority: cloud > remote server");
            }
            (false, true) if self.url.is_empty() => {
                return Err(TriageError::InvalidInput(
                    "a model server url is required when the remote server backend is selected"
                        .to_string(),
                ));
            }
            _ => {}
        }
        Ok(self)
    }

    /// Copy `alert` with every flag field added, overwriting same-named keys.
    pub fn apply(&self, alert: &Value) -> Result<Value> {
        let Value::Object(fields) = alert else {
            return Err(TriageError::InvalidInput(format!(
                "analysis record is {}, expected an object",
                json_type_name(alert)
            )));
        };
        let mut record = fields.clone();
        if let Value::Object(flags) = serde_json::to_value(self)? {
            record.extend(flags);
        }
        Ok(Value::Object(record))
    }
}
