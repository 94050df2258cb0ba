//! AML Triage - alert prioritisation and analysis console
//!
//! The `aml-triage` command submits alert batches to the remote services and
//! presents the results.
//!
//! ## Commands
//!
//! - `predict`: Score every alert of a batch, one call per alert
//! - `analyze`: Generate narrative analyses for a batch in one call
//! - `render`: Render a freeform report file locally
//! - `endpoints`: Show the resolved service endpoints

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, Level};

use aml_triage_core::report::{to_html, to_plain_text};
use aml_triage_core::{
    generate_analysis, parse_alert_batch, predict_batch, present_analysis, present_predictions,
    render_with, to_html_page, to_terminal, AnalysisFlags, AnalysisItem, BatchResult, Block,
    Escape, HttpAlertService, PredictionRecord, ServiceConfig, TriageError,
};

/// Exit status when the remote calls of a command all failed.
const EXIT_SERVICE_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "aml-triage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AML alert prioritisation and analysis console", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the prioritisation and analysis services
    #[arg(long, global = true, env = "AML_TRIAGE_BASE_URL")]
    base_url: Option<String>,

    /// Timeout of one prioritisation call, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    predict_timeout: Option<u64>,

    /// Timeout of the analysis call, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    analysis_timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every alert of a batch (one call per alert, in order)
    Predict {
        /// JSON file holding an alert object or an array of them ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate narrative analyses for a batch in one call
    Analyze {
        /// JSON file holding an alert object or an array of them ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Generate with the hosted cloud model (the default)
        #[arg(long)]
        cloud: bool,

        /// Generate with a self-hosted model server
        #[arg(long)]
        llm_on_server: bool,

        /// Address of the self-hosted model server
        #[arg(long, value_name = "URL", default_value = "")]
        llm_url: String,

        /// Mask personally identifiable information before generation
        #[arg(long)]
        anonymous: bool,

        /// Include the model's reasoning in the result
        #[arg(long)]
        audit: bool,

        /// Run the evaluator pass over the generated report
        #[arg(long)]
        evaluation: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a freeform report file without contacting any service
    Render {
        /// Report text file ("-" for stdin)
        #[arg(default_value = "-")]
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the resolved service endpoints
    Endpoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    aml_triage_core::telemetry::init_tracing(cli.json, level);

    let config = service_config(&cli);

    match cli.command {
        Commands::Predict {
            input,
            format,
            output,
        } => cmd_predict(config, &input, format, output.as_deref()).await,
        Commands::Analyze {
            input,
            cloud,
            llm_on_server,
            llm_url,
            anonymous,
            audit,
            evaluation,
            format,
            output,
        } => {
            let flags = AnalysisFlags {
                cloud,
                llm_on_server,
                url: llm_url,
                anonymous,
                audit,
                evaluation,
            };
            cmd_analyze(config, &input, flags, format, output.as_deref()).await
        }
        Commands::Render {
            file,
            format,
            output,
        } => cmd_render(&file, format, output.as_deref()),
        Commands::Endpoints => cmd_endpoints(&config),
    }
}

/// Environment configuration with command-line overrides applied.
fn service_config(cli: &Cli) -> ServiceConfig {
    let mut config = ServiceConfig::from_env().with_timeouts(
        cli.predict_timeout.map(Duration::from_secs),
        cli.analysis_timeout.map(Duration::from_secs),
    );
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    config
}

/// Score a batch of alerts
async fn cmd_predict(
    config: ServiceConfig,
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let alerts = read_alerts(input)?;
    let service = HttpAlertService::new(config).context("Invalid service configuration")?;

    info!("Submitting {} alert(s) for prioritisation", alerts.len());
    let result = predict_batch(&service, &alerts).await?;

    write_output(output, &format_predictions(&result, format)?)?;
    if result.has_payloads() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_SERVICE_FAILURE))
    }
}

/// Generate analyses for a batch of alerts
async fn cmd_analyze(
    config: ServiceConfig,
    input: &Path,
    flags: AnalysisFlags,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let alerts = read_alerts(input)?;
    let service = HttpAlertService::new(config).context("Invalid service configuration")?;

    info!("Submitting {} alert(s) for analysis", alerts.len());
    let outcome = match generate_analysis(&service, &alerts, &flags).await {
        Err(err @ TriageError::InvalidInput(_)) => return Err(err.into()),
        outcome => outcome,
    };

    write_output(output, &format_analysis(&outcome, format)?)?;
    if outcome.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_SERVICE_FAILURE))
    }
}

/// Render a report file locally
fn cmd_render(file: &Path, format: OutputFormat, output: Option<&Path>) -> Result<ExitCode> {
    let text = read_input(file)?;
    write_output(output, &format_report(&text, format)?)?;
    Ok(ExitCode::SUCCESS)
}

/// Print both endpoint URLs
fn cmd_endpoints(config: &ServiceConfig) -> Result<ExitCode> {
    config.validate().context("Invalid service configuration")?;
    let [prediction, analysis] = config.endpoints();
    println!("Prediction: {prediction}");
    println!("Analysis:   {analysis}");
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ───────────────────────────────────────────────────

#[derive(Serialize)]
struct PredictionOutput<'a> {
    #[serde(flatten)]
    result: &'a BatchResult,
    predictions: Vec<PredictionRecord>,
}

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    #[serde(flatten)]
    item: &'a AnalysisItem,
    blocks: Vec<Block>,
}

fn format_predictions(result: &BatchResult, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => to_terminal(&present_predictions(result)),
        OutputFormat::Html => {
            to_html_page("AML Alert Prioritisation", &present_predictions(result))
        }
        OutputFormat::Json => {
            let out = PredictionOutput {
                result,
                predictions: PredictionRecord::from_batch(result),
            };
            serde_json::to_string_pretty(&out)?
        }
    })
}

fn format_analysis(
    outcome: &std::result::Result<Vec<AnalysisItem>, TriageError>,
    format: OutputFormat,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => to_terminal(&present_analysis(outcome, Escape::Terminal)),
        OutputFormat::Html => {
            to_html_page("AML Analysis", &present_analysis(outcome, Escape::Html))
        }
        OutputFormat::Json => {
            let envelope: Value = match outcome {
                Ok(items) => {
                    let items: Vec<AnalysisOutput> = items
                        .iter()
                        .map(|item| AnalysisOutput {
                            item,
                            blocks: item
                                .report
                                .as_deref()
                                .map(|text| render_with(text, Escape::Html))
                                .unwrap_or_default(),
                        })
                        .collect();
                    json!({ "ok": true, "items": items })
                }
                Err(err) => json!({
                    "ok": false,
                    "error": { "kind": err.kind(), "message": err.to_string() },
                }),
            };
            serde_json::to_string_pretty(&envelope)?
        }
    })
}

fn format_report(text: &str, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => to_plain_text(&render_with(text, Escape::Terminal)),
        OutputFormat::Html => to_html(&render_with(text, Escape::Html)),
        OutputFormat::Json => serde_json::to_string_pretty(&render_with(text, Escape::Html))?,
    })
}

// ── IO helpers ──────────────────────────────────────────────────────────

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read input file: {:?}", path))
}

fn read_alerts(path: &Path) -> Result<Vec<Value>> {
    let text = read_input(path)?;
    parse_alert_batch(&text).with_context(|| format!("Invalid alert batch in {:?}", path))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            info!("Wrote result to {:?}", path);
        }
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_flags_parse() {
        let cli = Cli::try_parse_from([
            "aml-triage",
            "analyze",
            "--input",
            "alerts.json",
            "--llm-on-server",
            "--llm-url",
            "http://ollama:11434",
            "--audit",
            "--format",
            "html",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                cloud,
                llm_on_server,
                llm_url,
                audit,
                format,
                ..
            } => {
                assert!(!cloud);
                assert!(llm_on_server);
                assert_eq!(llm_url, "http://ollama:11434");
                assert!(audit);
                assert_eq!(format, OutputFormat::Html);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_global_overrides_apply() {
        let cli = Cli::try_parse_from([
            "aml-triage",
            "endpoints",
            "--base-url",
            "http://svc:9000/",
            "--predict-timeout",
            "3",
        ])
        .unwrap();
        let config = service_config(&cli);
        assert_eq!(config.base_url, "http://svc:9000/");
        assert_eq!(config.prediction_timeout, Duration::from_secs(3));
        assert_eq!(
            config.prediction_url(),
            "http://svc:9000/api/ai-service/predictalertpriority"
        );
    }

    #[test]
    fn test_format_report_variants() {
        let text = "Summary:\n- a & b";
        assert_eq!(
            format_report(text, OutputFormat::Text).unwrap(),
            "Summary\n=======\n  • a & b\n"
        );
        assert!(format_report(text, OutputFormat::Html)
            .unwrap()
            .contains("<li>a &amp; b</li>"));

        let blocks: Value =
            serde_json::from_str(&format_report(text, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(blocks[0]["type"], "heading");
        assert_eq!(blocks[1]["items"][0], "a &amp; b");
    }

    #[test]
    fn test_format_predictions_json_envelope() {
        let result = BatchResult::PartialOk {
            payloads: vec![json!({"data": [{"AlertID": 1, "Prediction": "Low"}]})],
            errors: vec!["Item 2 (ID: N/A): Request timed out.".to_string()],
        };
        let rendered = format_predictions(&result, OutputFormat::Json).unwrap();
        let out: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(out["status"], "partial_ok");
        assert_eq!(out["errors"][0], "Item 2 (ID: N/A): Request timed out.");
        assert_eq!(out["predictions"][0]["priority"], "Low");
        assert_eq!(out["predictions"][0]["alert_id"], "1");
    }

    #[test]
    fn test_format_analysis_error_envelope() {
        let outcome = Err(TriageError::Timeout(
            "Request timed out. The analysis may take longer. Please try again.".to_string(),
        ));
        let out: Value =
            serde_json::from_str(&format_analysis(&outcome, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(out["ok"], false);
        assert_eq!(out["error"]["kind"], "timeout");

        let text = format_analysis(&outcome, OutputFormat::Text).unwrap();
        assert!(text.starts_with("❌ Error: Request timed out."));
    }
}
