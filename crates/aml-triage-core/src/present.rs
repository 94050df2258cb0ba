//! Result presentation.
//!
//! The presenter turns workflow outcomes into an ordered list of [`Display`]
//! instructions. Front ends decide how each instruction looks;
//! [`to_terminal`] and [`to_html_page`] are the two built-in renderings.

use serde::Serialize;

use crate::batch::BatchResult;
use crate::domain::{AnalysisItem, PredictionRecord};
use crate::error::TriageError;
use crate::report::{self, Block, Escape};

/// Severity of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Info,
    Warning,
    Error,
}

impl Tone {
    fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✅",
            Tone::Info => "ℹ️",
            Tone::Warning => "⚠️",
            Tone::Error => "❌",
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Info => "info",
            Tone::Warning => "warning",
            Tone::Error => "error",
        }
    }
}

/// One presentation instruction. Free text is unescaped; [`Display::Document`]
/// blocks were escaped by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Display {
    Banner { tone: Tone, text: String },
    Section { title: String },
    Caption { text: String },
    Metric { label: String, value: String },
    Reasoning { label: String, text: String },
    Document { title: String, blocks: Vec<Block> },
    Divider,
}

fn banner(tone: Tone, text: impl Into<String>) -> Display {
    Display::Banner {
        tone,
        text: text.into(),
    }
}

fn metric(label: &str, value: impl Into<String>) -> Display {
    Display::Metric {
        label: label.to_string(),
        value: value.into(),
    }
}

/// Presentation of a prediction batch.
///
/// Partial batches lead with a warning and one error line per failed item.
/// A fully failed batch shows only its joined errors.
pub fn present_predictions(result: &BatchResult) -> Vec<Display> {
    let mut out = Vec::new();
    match result {
        BatchResult::AllFailed { errors } => {
            out.push(banner(Tone::Error, format!("Error: {}", errors.join("\n"))));
            return out;
        }
        BatchResult::PartialOk { errors, .. } => {
            out.push(banner(
                Tone::Warning,
                "Some alerts processed successfully, but some had errors:",
            ));
            out.extend(errors.iter().map(|e| banner(Tone::Error, e.clone())));
        }
        BatchResult::AllOk { .. } => {}
    }

    out.push(banner(Tone::Success, "Prediction completed successfully!"));
    for record in PredictionRecord::from_batch(result) {
        out.push(Display::Section {
            title: format!(
                "Alert ID: {} - {}",
                record.alert_id.as_deref().unwrap_or("N/A"),
                record.scenario.as_deref().unwrap_or("Unknown")
            ),
        });
        out.push(metric("Alert ID", record.alert_id.as_deref().unwrap_or("N/A")));
        out.push(metric(
            "Focus Column",
            record.focus_value.as_deref().unwrap_or("N/A"),
        ));
        out.push(metric(
            "Prediction",
            format!("{} {}", record.priority.badge(), record.priority),
        ));
        out.push(metric("Scenario", record.scenario.as_deref().unwrap_or("N/A")));
        out.push(metric("Status", record.status.as_str()));
        out.push(metric("Message", record.message.as_str()));
        if let Some(raw) = &record.raw_response {
            out.push(Display::Caption {
                text: format!("Undecoded response: {raw}"),
            });
        }
    }
    out
}

/// Presentation of an analysis outcome.
///
/// Report documents are rendered with `escape`, which must match the
/// rendering the instructions are headed for.
pub fn present_analysis(
    outcome: &Result<Vec<AnalysisItem>, TriageError>,
    escape: Escape,
) -> Vec<Display> {
    let items = match outcome {
        Ok(items) => items,
        Err(err) => return vec![banner(Tone::Error, format!("Error: {err}"))],
    };

    let mut out = vec![banner(Tone::Success, "Analysis completed successfully!")];
    for item in items {
        let alert_id = item.alert_id.as_deref().unwrap_or("N/A");
        out.push(Display::Section {
            title: format!("Analysis Report - Alert ID: {alert_id}"),
        });
        if let Some(name) = &item.customer_name {
            out.push(Display::Caption {
                text: format!("Customer: {name}"),
            });
        }

        if let Some(thinking) = &item.thinking {
            out.push(Display::Divider);
            out.push(Display::Section {
                title: "Thinking Process (Audit Mode)".to_string(),
            });
            out.push(Display::Caption {
                text: "This section shows the model's reasoning process when Audit Mode is enabled."
                    .to_string(),
            });
            out.push(Display::Reasoning {
                label: "Model Reasoning".to_string(),
                text: thinking.clone(),
            });
        }

        match &item.report {
            Some(text) => {
                out.push(Display::Divider);
                out.push(Display::Document {
                    title: "Analysis Report".to_string(),
                    blocks: report::render_with(text, escape),
                });
            }
            None => out.push(banner(
                Tone::Warning,
                "No analysis text found in the response.",
            )),
        }

        out.push(metric(
            "Response Time",
            format!("{:.2} ms", item.response_time_ms),
        ));
        out.push(metric("Method", item.method.as_deref().unwrap_or("N/A")));
        out.push(metric("Model", item.model.as_deref().unwrap_or("N/A")));
        out.push(metric("Alert ID", alert_id));
        out.push(metric(
            "Focus Column",
            item.focus_value.as_deref().unwrap_or("N/A"),
        ));
    }
    out
}

// ── Renderings ──────────────────────────────────────────────────────────

const DIVIDER_WIDTH: usize = 40;

/// Plain terminal rendering. Documents must come from [`Escape::Terminal`].
pub fn to_terminal(displays: &[Display]) -> String {
    let clean = terminal_text;
    let mut out = String::new();
    for display in displays {
        match display {
            Display::Banner { tone, text } => {
                out.push_str(&format!("{} {}\n", tone.icon(), clean(text)));
            }
            Display::Section { title } => {
                let title = clean(title);
                out.push_str(&format!("\n{title}\n{}\n", "─".repeat(title.chars().count())));
            }
            Display::Caption { text } => out.push_str(&format!("  {}\n", clean(text))),
            Display::Metric { label, value } => {
                out.push_str(&format!("  {:<14} {}\n", format!("{}:", clean(label)), clean(value)));
            }
            Display::Reasoning { label, text } => {
                out.push_str(&format!("[{}]\n", clean(label)));
                for line in clean(text).lines() {
                    out.push_str(&format!("  │ {line}\n"));
                }
            }
            Display::Document { title, blocks } => {
                out.push_str(&format!("{}\n\n", clean(title)));
                out.push_str(&report::to_plain_text(blocks));
            }
            Display::Divider => out.push_str(&format!("{}\n", "─".repeat(DIVIDER_WIDTH))),
        }
    }
    out
}

/// Strip control characters line by line, keeping the line structure.
fn terminal_text(text: &str) -> String {
    text.split('\n')
        .map(|line| Escape::Terminal.apply(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Standalone HTML page. Documents must come from [`Escape::Html`].
pub fn to_html_page(title: &str, displays: &[Display]) -> String {
    let esc = |text: &str| Escape::Html.apply(text);
    let mut body = Vec::with_capacity(displays.len());
    for display in displays {
        match display {
            Display::Banner { tone, text } => body.push(format!(
                "<div class=\"banner {}\">{} {}</div>",
                tone.css_class(),
                tone.icon(),
                esc(text)
            )),
            Display::Section { title } => body.push(format!("<h2>{}</h2>", esc(title))),
            Display::Caption { text } => {
                body.push(format!("<p class=\"caption\">{}</p>", esc(text)))
            }
            Display::Metric { label, value } => body.push(format!(
                "<p class=\"metric\"><span class=\"metric-label\">{}</span> {}</p>",
                esc(label),
                esc(value)
            )),
            Display::Reasoning { label, text } => body.push(format!(
                "<section class=\"reasoning\"><h4>{}</h4><pre>{}</pre></section>",
                esc(label),
                esc(text)
            )),
            Display::Document { title, blocks } => body.push(format!(
                "<article class=\"report\">\n<h2>{}</h2>\n{}\n</article>",
                esc(title),
                report::to_html(blocks)
            )),
            Display::Divider => body.push("<hr>".to_string()),
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        esc(title),
        body.join("\n")
    )
}
