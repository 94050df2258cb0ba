//! HTTP client for the remote services.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{AlertService, RemoteBody, ServiceFailure, ServiceReply};
use crate::config::ServiceConfig;
use crate::error::{Result, TriageError};

/// [`AlertService`] backed by JSON-over-HTTP calls.
pub struct HttpAlertService {
    config: ServiceConfig,
    http_client: reqwest::Client,
}

impl HttpAlertService {
    /// Create a client for the given configuration.
    ///
    /// The configuration is validated first so that a bad base URL is
    /// reported before any alert is submitted.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(format!("aml-triage/{}", crate::VERSION))
            .build()
            .map_err(|e| {
                TriageError::TransportFailure(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(HttpAlertService {
            config,
            http_client,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ServiceConfig::from_env())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// POST `body` as JSON and return the raw 2xx body text.
    async fn post_json<B>(
        &self,
        url: &str,
        body: &B,
        timeout: Duration,
    ) -> std::result::Result<String, ServiceFailure>
    where
        B: Serialize + ?Sized + Sync,
    {
        debug!(url, timeout_secs = timeout.as_secs(), "posting to service");

        let response = self
            .http_client
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(failure_from)?;

        let status = response.status();
        let text = response.text().await.map_err(failure_from)?;

        if !status.is_success() {
            return Err(ServiceFailure::Remote {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                url: url.to_string(),
                body: RemoteBody::from_text(&text),
            });
        }
        Ok(text)
    }
}

fn failure_from(err: reqwest::Error) -> ServiceFailure {
    if err.is_timeout() {
        ServiceFailure::Timeout
    } else {
        ServiceFailure::Transport(format!("Request failed: {err}"))
    }
}

#[async_trait]
impl AlertService for HttpAlertService {
    async fn predict(&self, alert: &Value) -> std::result::Result<ServiceReply, ServiceFailure> {
        let url = self.config.prediction_url();
        let text = self
            .post_json(&url, alert, self.config.prediction_timeout)
            .await?;
        Ok(ServiceReply::from_body(&url, text))
    }

    async fn analyze(
        &self,
        alerts: &[Value],
    ) -> std::result::Result<ServiceReply, ServiceFailure> {
        let url = self.config.analysis_url();
        let text = self
            .post_json(&url, alerts, self.config.analysis_timeout)
            .await?;
        Ok(ServiceReply::from_body(&url, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let config = ServiceConfig::default().with_base_url("not a url");
        assert!(matches!(
            HttpAlertService::new(config),
            Err(TriageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_new_keeps_config() {
        let config = ServiceConfig::default().with_base_url("http://127.0.0.1:9");
        let service = HttpAlertService::new(config.clone()).unwrap();
        assert_eq!(service.config(), &config);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_failure() {
        // Port 9 (discard) is not expected to be listening.
        let config = ServiceConfig::default()
            .with_base_url("http://127.0.0.1:9")
            .with_timeouts(Some(Duration::from_secs(5)), None);
        let service = HttpAlertService::new(config).unwrap();

        let failure = service
            .predict(&serde_json::json!({"AlertID": "A1"}))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), "transport_failure");
        assert!(failure.describe().starts_with("Request failed: "));
    }
}
