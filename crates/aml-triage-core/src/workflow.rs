//! Drivers for the two triage workflows.
//!
//! [`predict_batch`] scores alerts one call at a time and aggregates the
//! per-item outcomes. [`generate_analysis`] submits a whole batch in a
//! single call and extracts the generated reports.

use std::time::Instant;

use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::batch::{aggregate, BatchResult, ItemFailure};
use crate::domain::{alert_identifier, AnalysisFlags, AnalysisItem};
use crate::error::{Result, TriageError};
use crate::obs;
use crate::service::AlertService;

/// Timeout advice for the analysis call, which routinely runs for minutes.
pub const ANALYSIS_TIMEOUT_MESSAGE: &str =
    "Request timed out. The analysis may take longer. Please try again.";

/// Score every alert, in order, and classify the batch.
///
/// Calls are issued sequentially. A failing item never stops the batch;
/// its failure is recorded with the item's position and `AlertID`.
pub async fn predict_batch(service: &dyn AlertService, alerts: &[Value]) -> Result<BatchResult> {
    let batch_id = Uuid::new_v4().to_string();
    let span = obs::batch_span(&batch_id, "predict");

    async {
        obs::emit_batch_started(&batch_id, "predict", alerts.len());

        let mut outcomes = Vec::with_capacity(alerts.len());
        for (index, alert) in alerts.iter().enumerate() {
            let outcome = match service.predict(alert).await {
                Ok(reply) => Ok(reply.into_payload(Some(index))),
                Err(failure) => {
                    obs::emit_item_failed(&batch_id, index, failure.kind());
                    Err(ItemFailure::from_service_failure(
                        index,
                        alert_identifier(alert),
                        &failure,
                    ))
                }
            };
            outcomes.push(outcome);
        }

        aggregate(outcomes).inspect(|result| {
            obs::emit_batch_aggregated(
                &batch_id,
                result.status(),
                result.payloads().len(),
                result.errors().len(),
            )
        })
    }
    .instrument(span)
    .await
}

/// Generate narrative analyses for a batch in one call.
///
/// Flags are normalised and attached to every record before submission.
/// Any failure fails the whole batch.
pub async fn generate_analysis(
    service: &dyn AlertService,
    alerts: &[Value],
    flags: &AnalysisFlags,
) -> Result<Vec<AnalysisItem>> {
    if alerts.is_empty() {
        return Err(TriageError::InvalidInput(
            "cannot analyse an empty batch".to_string(),
        ));
    }
    let flags = flags.clone().normalize()?;
    let records = alerts
        .iter()
        .map(|alert| flags.apply(alert))
        .collect::<Result<Vec<_>>>()?;

    let batch_id = Uuid::new_v4().to_string();
    let span = obs::batch_span(&batch_id, "analyze");

    async {
        obs::emit_batch_started(&batch_id, "analyze", records.len());
        let started = Instant::now();

        let reply = service.analyze(&records).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match reply {
            Ok(reply) => {
                let items = AnalysisItem::from_response(&reply.into_payload(None));
                obs::emit_analysis_finished(&batch_id, items.len(), duration_ms, true);
                Ok(items)
            }
            Err(failure) => {
                obs::emit_analysis_finished(&batch_id, 0, duration_ms, false);
                Err(failure.into_error(ANALYSIS_TIMEOUT_MESSAGE))
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{RemoteBody, ServiceFailure, ServiceReply};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    /// Answers each alert according to its `outcome` field and records the
    /// order of calls.
    #[derive(Default)]
    struct ScriptedService {
        seen: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl AlertService for ScriptedService {
        async fn predict(
            &self,
            alert: &Value,
        ) -> std::result::Result<ServiceReply, ServiceFailure> {
            self.seen.lock().unwrap().push(alert.clone());
            match alert["outcome"].as_str() {
                Some("timeout") => Err(ServiceFailure::Timeout),
                Some("raw") => Ok(ServiceReply::Raw("not json".to_string())),
                Some("reject") => Err(ServiceFailure::Remote {
                    status: 400,
                    reason: "Bad Request".to_string(),
                    url: "http://svc/predict".to_string(),
                    body: RemoteBody::Structured(json!({"detail": "bad"})),
                }),
                _ => Ok(ServiceReply::Json(json!({
                    "data": [{"AlertID": alert["AlertID"], "Prediction": "High"}]
                }))),
            }
        }

        async fn analyze(
            &self,
            alerts: &[Value],
        ) -> std::result::Result<ServiceReply, ServiceFailure> {
            self.seen.lock().unwrap().extend(alerts.iter().cloned());
            if alerts.iter().any(|a| a["outcome"] == "timeout") {
                return Err(ServiceFailure::Timeout);
            }
            Ok(ServiceReply::Json(json!({
                "data": alerts
                    .iter()
                    .map(|a| json!({"AlertID": a["AlertID"], "analysis": "Summary:\n- ok"}))
                    .collect::<Vec<_>>()
            })))
        }
    }

    #[tokio::test]
    async fn test_predict_all_ok_in_order() {
        let service = ScriptedService::default();
        let alerts = vec![json!({"AlertID": 1}), json!({"AlertID": 2}), json!({"AlertID": 3})];

        let result = predict_batch(&service, &alerts).await.unwrap();

        assert_eq!(result.status(), "all_ok");
        assert_eq!(result.payloads().len(), 3);
        assert_eq!(*service.seen.lock().unwrap(), alerts);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_predict_partial_failure_keeps_going() {
        let service = ScriptedService::default();
        let alerts = vec![
            json!({"AlertID": "A1"}),
            json!({"AlertID": "A2", "outcome": "timeout"}),
            json!({"outcome": "reject"}),
            json!({"AlertID": "A4"}),
        ];

        let result = predict_batch(&service, &alerts).await.unwrap();

        assert_eq!(result.payloads().len(), 2);
        assert_eq!(result.errors()[0], "Item 2 (ID: A2): Request timed out.");
        assert!(result.errors()[1].starts_with("Item 3 (ID: N/A): 400 Client Error: Bad Request"));
        assert_eq!(service.seen.lock().unwrap().len(), 4);
        assert!(logs_contain("batch.item_failed"));
        assert!(logs_contain("status=partial_ok"));
    }

    #[tokio::test]
    async fn test_predict_all_failed() {
        let service = ScriptedService::default();
        let alerts = vec![json!({"outcome": "timeout"})];
        let result = predict_batch(&service, &alerts).await.unwrap();
        assert_eq!(
            result,
            BatchResult::AllFailed {
                errors: vec!["Item 1 (ID: N/A): Request timed out.".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_predict_raw_reply_is_tagged_with_index() {
        let service = ScriptedService::default();
        let alerts = vec![json!({"AlertID": 1}), json!({"outcome": "raw"})];
        let result = predict_batch(&service, &alerts).await.unwrap();
        assert_eq!(
            result.payloads()[1],
            json!({"raw_response": "not json", "alert_index": 1})
        );
    }

    #[tokio::test]
    async fn test_predict_empty_batch_is_invalid() {
        let service = ScriptedService::default();
        assert!(matches!(
            predict_batch(&service, &[]).await,
            Err(TriageError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_analysis_attaches_flags() {
        let service = ScriptedService::default();
        let flags = AnalysisFlags {
            cloud: false,
            audit: true,
            ..AnalysisFlags::default()
        };

        let items = generate_analysis(&service, &[json!({"AlertID": 5})], &flags)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].alert_id.as_deref(), Some("5"));
        let seen = service.seen.lock().unwrap();
        assert_eq!(seen[0]["Cloud"], json!(true));
        assert_eq!(seen[0]["audit"], json!(true));
    }

    #[tokio::test]
    async fn test_analysis_timeout_has_analysis_advice() {
        let service = ScriptedService::default();
        let err = generate_analysis(
            &service,
            &[json!({"outcome": "timeout"})],
            &AnalysisFlags::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TriageError::Timeout(_)));
        assert_eq!(err.to_string(), ANALYSIS_TIMEOUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_analysis_rejects_bad_input_before_calling() {
        let service = ScriptedService::default();
        let flags = AnalysisFlags::default();

        assert!(matches!(
            generate_analysis(&service, &[], &flags).await,
            Err(TriageError::InvalidInput(_))
        ));
        assert!(matches!(
            generate_analysis(&service, &[json!("text")], &flags).await,
            Err(TriageError::InvalidInput(_))
        ));
        assert!(service.seen.lock().unwrap().is_empty());
    }
}
