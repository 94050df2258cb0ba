//! Payload escaping applied before blocks are constructed.

use serde::{Deserialize, Serialize};

/// Target the rendered payloads must be safe for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escape {
    /// Escape `& < > " '` so payloads can be embedded in HTML verbatim.
    #[default]
    Html,
    /// Drop control characters (tab excepted) so payloads cannot smuggle
    /// terminal escape sequences.
    Terminal,
}

impl Escape {
    /// Apply this escaping to a single payload.
    pub fn apply(self, text: &str) -> String {
        match self {
            Escape::Html => html_escape(text),
            Escape::Terminal => text
                .chars()
                .filter(|c| *c == '\t' || !c.is_control())
                .collect(),
        }
    }
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
