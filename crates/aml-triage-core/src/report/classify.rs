//! Line classification for freeform analysis reports.
//!
//! Every line is classified on its trimmed view alone; history (whether a
//! list is open) belongs to the renderer. Rules are tried in table order
//! and the first match wins, which is what settles the overlap between
//! main headers and sub-headers.

use serde::{Deserialize, Serialize};

/// Words that promote a short colon-terminated line to a main header.
pub const HEADER_KEYWORDS: [&str; 9] = [
    "report",
    "summary",
    "analysis",
    "conclusion",
    "recommendation",
    "assessment",
    "background",
    "pattern",
    "flow",
];

/// Main headers are strictly shorter than this many characters (colon included).
pub const MAIN_HEADER_MAX_CHARS: usize = 60;

/// Sub-headers are strictly shorter than this many characters (colon included).
pub const SUB_HEADER_MAX_CHARS: usize = 50;

/// Classification tag of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Blank,
    MainHeader,
    SubHeader,
    BoldStatement,
    ListItem,
    KeyValue,
    Paragraph,
}

/// A classified line with its extracted payload (unescaped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedLine {
    Blank,
    /// Header text without the trailing colon.
    MainHeader(String),
    /// Header text without the trailing colon.
    SubHeader(String),
    /// Text with every `**` marker removed.
    BoldStatement(String),
    /// Text without its leading bullet.
    ListItem(String),
    KeyValue { key: String, value: String },
    /// The trimmed line verbatim.
    Paragraph(String),
}

impl ClassifiedLine {
    /// The tag of this classification.
    pub fn kind(&self) -> LineKind {
        match self {
            ClassifiedLine::Blank => LineKind::Blank,
            ClassifiedLine::MainHeader(_) => LineKind::MainHeader,
            ClassifiedLine::SubHeader(_) => LineKind::SubHeader,
            ClassifiedLine::BoldStatement(_) => LineKind::BoldStatement,
            ClassifiedLine::ListItem(_) => LineKind::ListItem,
            ClassifiedLine::KeyValue { .. } => LineKind::KeyValue,
            ClassifiedLine::Paragraph(_) => LineKind::Paragraph,
        }
    }
}

/// One entry of the ordered rule cascade.
struct Rule {
    kind: LineKind,
    matches: fn(&str) -> bool,
    build: fn(&str) -> ClassifiedLine,
}

/// Evaluated top-down; [`LineKind::Paragraph`] is the fallback when none match.
const RULES: &[Rule] = &[
    Rule {
        kind: LineKind::Blank,
        matches: str::is_empty,
        build: |_| ClassifiedLine::Blank,
    },
    Rule {
        kind: LineKind::MainHeader,
        matches: is_main_header,
        build: |t| ClassifiedLine::MainHeader(header_text(t)),
    },
    Rule {
        kind: LineKind::SubHeader,
        matches: is_sub_header,
        build: |t| ClassifiedLine::SubHeader(header_text(t)),
    },
    Rule {
        kind: LineKind::BoldStatement,
        matches: is_bold_statement,
        build: |t| ClassifiedLine::BoldStatement(t.replace("**", "").trim().to_string()),
    },
    Rule {
        kind: LineKind::ListItem,
        matches: is_list_item,
        build: |t| {
            ClassifiedLine::ListItem(t.trim_start_matches(['-', '•']).trim().to_string())
        },
    },
    Rule {
        kind: LineKind::KeyValue,
        matches: is_key_value,
        build: build_key_value,
    },
];

/// Classify a single line of report text.
///
/// Total and deterministic: the result depends on the trimmed content only.
pub fn classify(line: &str) -> ClassifiedLine {
    let trimmed = line.trim();
    RULES
        .iter()
        .find(|rule| (rule.matches)(trimmed))
        .map_or_else(
            || ClassifiedLine::Paragraph(trimmed.to_string()),
            |rule| {
                let classified = (rule.build)(trimmed);
                debug_assert_eq!(classified.kind(), rule.kind);
                classified
            },
        )
}

// Classification only ever sees the trimmed view, so every candidate header
// is left-aligned by construction.
fn is_main_header(trimmed: &str) -> bool {
    if !trimmed.ends_with(':') || trimmed.chars().count() >= MAIN_HEADER_MAX_CHARS {
        return false;
    }
    let text = &trimmed[..trimmed.len() - 1];
    is_upper_latin(text) || has_header_keyword(text)
}

fn is_sub_header(trimmed: &str) -> bool {
    trimmed.ends_with(':') && trimmed.chars().count() < SUB_HEADER_MAX_CHARS
}

fn is_bold_statement(trimmed: &str) -> bool {
    trimmed.starts_with("**") && trimmed.ends_with("**")
}

fn is_list_item(trimmed: &str) -> bool {
    trimmed.starts_with('-') || trimmed.starts_with('•')
}

/// Exactly one colon. Times and URLs carry more and stay paragraphs.
fn is_key_value(trimmed: &str) -> bool {
    trimmed.matches(':').count() == 1
}

fn build_key_value(trimmed: &str) -> ClassifiedLine {
    let (key, value) = trimmed.split_once(':').unwrap_or((trimmed, ""));
    ClassifiedLine::KeyValue {
        key: key.trim().to_string(),
        value: value.trim().to_string(),
    }
}

fn header_text(trimmed: &str) -> String {
    trimmed
        .strip_suffix(':')
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}

fn has_header_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Upper-case test restricted to Latin script.
///
/// Text containing letters from any other script never counts as upper
/// case, leaving the keyword rule to decide.
fn is_upper_latin(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    if letters.peek().is_none() {
        return false;
    }
    letters.all(|c| is_latin_letter(c) && c.is_uppercase())
}

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{00C0}'..='\u{024F}').contains(&c)
        || ('\u{1E00}'..='\u{1EFF}').contains(&c)
}
