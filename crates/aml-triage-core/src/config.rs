//! Service endpoint configuration.
//!
//! Values come from the environment with built-in defaults; the CLI layers
//! its flags on top through the builder methods.

use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use crate::error::{Result, TriageError};

/// Default deployment of the prioritisation and analysis services.
pub const DEFAULT_BASE_URL: &str =
    "https://syedkhizarrayaz-bm-ai-analysis-and-alert-priorit-2625d69.hf.space";

/// Path of the per-alert prioritisation endpoint.
pub const PREDICT_PATH: &str = "/api/ai-service/predictalertpriority";

/// Path of the batch narrative analysis endpoint.
pub const ANALYSIS_PATH: &str = "/api/ai-service/generateamlanalysis";

pub const DEFAULT_PREDICTION_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(300);

pub const ENV_BASE_URL: &str = "AML_TRIAGE_BASE_URL";
pub const ENV_PREDICT_TIMEOUT: &str = "AML_TRIAGE_PREDICT_TIMEOUT_SECS";
pub const ENV_ANALYSIS_TIMEOUT: &str = "AML_TRIAGE_ANALYSIS_TIMEOUT_SECS";

/// Where the remote services live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL shared by both endpoints.
    pub base_url: String,
    /// Timeout of one prioritisation call.
    pub prediction_timeout: Duration,
    /// Timeout of the batch analysis call.
    pub analysis_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            prediction_timeout: DEFAULT_PREDICTION_TIMEOUT,
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Unparsable or zero timeouts are logged and replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let base_url = lookup(ENV_BASE_URL)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(defaults.base_url);

        ServiceConfig {
            base_url,
            prediction_timeout: timeout_from(
                &lookup,
                ENV_PREDICT_TIMEOUT,
                defaults.prediction_timeout,
            ),
            analysis_timeout: timeout_from(
                &lookup,
                ENV_ANALYSIS_TIMEOUT,
                defaults.analysis_timeout,
            ),
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim().to_string();
        self
    }

    /// Override either timeout; `None` keeps the current value.
    pub fn with_timeouts(
        mut self,
        prediction: Option<Duration>,
        analysis: Option<Duration>,
    ) -> Self {
        if let Some(prediction) = prediction {
            self.prediction_timeout = prediction;
        }
        if let Some(analysis) = analysis {
            self.analysis_timeout = analysis;
        }
        self
    }

    /// Reject base URLs that are not absolute http(s) URLs and zero timeouts.
    pub fn validate(&self) -> Result<()> {
        parse_http_url(&self.base_url, "base url")?;
        if self.prediction_timeout.is_zero() || self.analysis_timeout.is_zero() {
            return Err(TriageError::InvalidInput(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn prediction_url(&self) -> String {
        self.endpoint(PREDICT_PATH)
    }

    pub fn analysis_url(&self) -> String {
        self.endpoint(ANALYSIS_PATH)
    }

    /// Both endpoint URLs, prediction first.
    pub fn endpoints(&self) -> [String; 2] {
        [self.prediction_url(), self.analysis_url()]
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn timeout_from<F>(lookup: &F, name: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!(
                variable = name,
                value = %raw,
                default_secs = default.as_secs(),
                "ignoring invalid timeout"
            );
            default
        }
    }
}

/// Parse `raw` as an absolute http(s) URL with a host.
pub(crate) fn parse_http_url(raw: &str, what: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| TriageError::InvalidInput(format!("{what} '{raw}' is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(TriageError::InvalidInput(format!(
            "{what} '{raw}' must be an http(s) URL"
        )));
    }
    Ok(url)
}
