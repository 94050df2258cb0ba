//! AML Triage Core Library
//!
//! Everything the triage console needs apart from its command line:
//! freeform report rendering, batch outcome aggregation, access to the
//! remote prioritisation and analysis services, and result presentation.

pub mod batch;
pub mod config;
pub mod domain;
pub mod error;
pub mod obs;
pub mod present;
pub mod report;
pub mod service;
pub mod telemetry;
pub mod workflow;

pub use batch::{aggregate, BatchResult, ItemFailure, ItemOutcome};

pub use config::ServiceConfig;

pub use domain::{
    alert_identifier, parse_alert_batch, AnalysisFlags, AnalysisItem, PredictionRecord, Priority,
};

pub use error::{Result, TriageError};

pub use present::{present_analysis, present_predictions, to_html_page, to_terminal, Tone};

pub use report::{
    classify, render, render_with, Block, ClassifiedLine, Escape, HeadingLevel, LineKind,
};

pub use service::{AlertService, HttpAlertService, RemoteBody, ServiceFailure, ServiceReply};

pub use workflow::{generate_analysis, predict_batch};

/// Version of the triage library, sent in the HTTP user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
