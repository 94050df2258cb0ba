use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::{json, Value};
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("aml-triage").unwrap();
    cmd.env_remove("AML_TRIAGE_BASE_URL")
        .env_remove("AML_TRIAGE_PREDICT_TIMEOUT_SECS")
        .env_remove("AML_TRIAGE_ANALYSIS_TIMEOUT_SECS");
    cmd
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn endpoints_use_base_url_flag() {
    cmd()
        .args(["endpoints", "--base-url", "http://svc:9000/"])
        .assert()
        .success()
        .stdout(contains("http://svc:9000/api/ai-service/predictalertpriority"))
        .stdout(contains("http://svc:9000/api/ai-service/generateamlanalysis"));
}

#[test]
fn endpoints_read_environment() {
    cmd()
        .env("AML_TRIAGE_BASE_URL", "http://from-env:8000")
        .arg("endpoints")
        .assert()
        .success()
        .stdout(contains("http://from-env:8000/api/ai-service/predictalertpriority"));
}

#[test]
fn endpoints_reject_invalid_base_url() {
    cmd()
        .args(["endpoints", "--base-url", "ftp://svc"])
        .assert()
        .failure()
        .stderr(contains("must be an http(s) URL"));
}

#[test]
fn render_from_stdin_as_html() {
    cmd()
        .args(["render", "--format", "html"])
        .write_stdin("Summary:\n- item A\n- item B\n\nRisk: High\n<script>")
        .assert()
        .success()
        .stdout(contains("<h3 class=\"report-heading\">Summary</h3>"))
        .stdout(contains("<li>item B</li>"))
        .stdout(contains("&lt;script&gt;"));
}

#[test]
fn render_file_as_text() {
    let dir = TempDir::new().unwrap();
    let report = write_file(&dir, "report.txt", "Customer Details:\nName: Ayesha\n");
    cmd()
        .arg("render")
        .arg(&report)
        .assert()
        .success()
        .stdout(contains("Customer Details\n----------------\nName: Ayesha\n"));
}

#[test]
fn render_missing_file_fails() {
    cmd()
        .args(["render", "/nonexistent/report.txt"])
        .assert()
        .failure()
        .stderr(contains("Failed to read input file"));
}

#[test]
fn predict_partial_batch() {
    let server = MockServer::start();
    let ok = server.mock(|when, then| {
        when.method(POST)
            .path("/api/ai-service/predictalertpriority")
            .body_contains("\"AlertID\":1001");
        then.status(200).json_body(json!({
            "status": 200,
            "data": [{"AlertID": 1001, "Prediction": "High", "STRScenario": "Structuring"}]
        }));
    });
    let rejected = server.mock(|when, then| {
        when.method(POST)
            .path("/api/ai-service/predictalertpriority")
            .body_contains("\"AlertID\":1002");
        then.status(422).json_body(json!({"detail": "FocusColumnValue missing"}));
    });

    let dir = TempDir::new().unwrap();
    let alerts = write_file(&dir, "alerts.json", r#"[{"AlertID": 1001}, {"AlertID": 1002}]"#);

    cmd()
        .args(["predict", "--base-url", &server.base_url(), "--input"])
        .arg(&alerts)
        .assert()
        .success()
        .stdout(contains("Some alerts processed successfully, but some had errors:"))
        .stdout(contains("Item 2 (ID: 1002): 422 Unprocessable Entity"))
        .stdout(contains("FocusColumnValue missing"))
        .stdout(contains("Alert ID: 1001 - Structuring"))
        .stdout(contains("🔴 High"));

    ok.assert();
    rejected.assert();
}

#[test]
fn predict_all_failed_exits_with_status_two() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/ai-service/predictalertpriority");
        then.status(500).body("upstream exploded");
    });

    let dir = TempDir::new().unwrap();
    let alerts = write_file(&dir, "alerts.json", r#"{"AlertID": "A-1"}"#);

    let output = cmd()
        .args(["predict", "--format", "json", "--base-url", &server.base_url(), "--input"])
        .arg(&alerts)
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let result: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["status"], "all_failed");
    let error = result["errors"][0].as_str().unwrap();
    assert!(error.starts_with("Item 1 (ID: A-1): 500 Server Error: Internal Server Error"));
    assert!(error.ends_with("\nResponse: upstream exploded"));
}

#[test]
fn predict_rejects_invalid_alert_file() {
    let dir = TempDir::new().unwrap();
    let alerts = write_file(&dir, "alerts.json", "[1, 2]");
    cmd()
        .args(["predict", "--base-url", "http://127.0.0.1:9", "--input"])
        .arg(&alerts)
        .assert()
        .failure()
        .stderr(contains("expected an object"));
}

#[test]
fn analyze_writes_html_report() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/ai-service/generateamlanalysis")
            .body_contains("\"Cloud\":true")
            .body_contains("\"audit\":true");
        then.status(200).json_body(json!({
            "data": [{
                "AlertID": 7,
                "CustomerName": "Ayesha Malik",
                "analysis": "Transaction Pattern Analysis:\n- Cash deposits: 9,500 PKR\nRisk: High",
                "thinking": "Deposits sit just under the threshold.",
                "response_time_ms": 1200.5,
                "method": "hybrid",
                "model": "m-1"
            }]
        }));
    });

    let dir = TempDir::new().unwrap();
    let alerts = write_file(&dir, "alerts.json", r#"[{"AlertID": 7}]"#);
    let report = dir.path().join("report.html");

    cmd()
        .args(["analyze", "--audit", "--format", "html", "--base-url", &server.base_url()])
        .arg("--input")
        .arg(&alerts)
        .arg("--output")
        .arg(&report)
        .assert()
        .success();

    mock.assert();
    let html = std::fs::read_to_string(&report).unwrap();
    assert!(html.contains("<h3 class=\"report-heading\">Transaction Pattern Analysis</h3>"));
    assert!(html.contains("<li>Cash deposits: 9,500 PKR</li>"));
    assert!(html.contains("Deposits sit just under the threshold."));
    assert!(html.contains("1200.50 ms"));
}

#[test]
fn analyze_remote_server_requires_url() {
    let dir = TempDir::new().unwrap();
    let alerts = write_file(&dir, "alerts.json", r#"[{"AlertID": 7}]"#);
    cmd()
        .args(["analyze", "--llm-on-server", "--base-url", "http://127.0.0.1:9", "--input"])
        .arg(&alerts)
        .assert()
        .failure()
        .stderr(contains("model server url is required").and(contains("invalid input")));
}

#[test]
fn analyze_service_error_exits_with_status_two() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/ai-service/generateamlanalysis");
        then.status(503).json_body(json!({"detail": "model offline"}));
    });

    let dir = TempDir::new().unwrap();
    let alerts = write_file(&dir, "alerts.json", r#"[{"AlertID": 7}]"#);

    cmd()
        .args(["analyze", "--base-url", &server.base_url(), "--input"])
        .arg(&alerts)
        .assert()
        .code(2)
        .stdout(contains("❌ Error: 503 Service Unavailable"))
        .stdout(contains("model offline"));
}
