//! Freeform report rendering.
//!
//! [`render`] drives [`classify`] over every line and folds the results
//! through a two-state machine ([`ListState`]): consecutive list items
//! accumulate into one [`Block::List`], and any other line closes the
//! open list before its own block is emitted.
//!
//! A blank run becomes a single [`Block::Spacer`], except before the first
//! block. A final newline counts as a blank line.

use serde::{Deserialize, Serialize};

use super::classify::{classify, ClassifiedLine};
use super::escape::Escape;

/// Heading depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingLevel {
    Main,
    Sub,
}

/// One node of a rendered report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: HeadingLevel, text: String },
    Emphasis { text: String },
    List { items: Vec<String> },
    KeyValue { key: String, value: String },
    Paragraph { text: String },
    Spacer,
}

/// Renderer state between two lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Idle,
    InList(Vec<String>),
}

impl ListState {
    /// Advance by one classified line, appending finished blocks to `out`.
    pub fn step(self, line: ClassifiedLine, escape: Escape, out: &mut Vec<Block>) -> ListState {
        let block = match line {
            ClassifiedLine::ListItem(text) => {
                let mut items = match self {
                    ListState::InList(items) => items,
                    ListState::Idle => Vec::new(),
                };
                items.push(escape.apply(&text));
                return ListState::InList(items);
            }
            ClassifiedLine::Blank => {
                self.finish(out);
                if matches!(out.last(), Some(block) if *block != Block::Spacer) {
                    out.push(Block::Spacer);
                }
                return ListState::Idle;
            }
            ClassifiedLine::MainHeader(text) => Block::Heading {
                level: HeadingLevel::Main,
                text: escape.apply(&text),
            },
            ClassifiedLine::SubHeader(text) => Block::Heading {
                level: HeadingLevel::Sub,
                text: escape.apply(&text),
            },
            ClassifiedLine::BoldStatement(text) => Block::Emphasis {
                text: escape.apply(&text),
            },
            ClassifiedLine::KeyValue { key, value } => Block::KeyValue {
                key: escape.apply(&key),
                value: escape.apply(&value),
            },
            ClassifiedLine::Paragraph(text) => Block::Paragraph {
                text: escape.apply(&text),
            },
        };
        self.finish(out);
        out.push(block);
        ListState::Idle
    }

    /// Close an open list, if any.
    pub fn finish(self, out: &mut Vec<Block>) {
        if let ListState::InList(items) = self {
            out.push(Block::List { items });
        }
    }
}

/// Split report text into lines, keeping the empty line after a final
/// newline. A trailing `\r` is dropped from every line.
pub fn report_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Render a freeform report with HTML escaping.
pub fn render(text: &str) -> Vec<Block> {
    render_with(text, Escape::Html)
}

/// Render a freeform report with the given payload escaping.
pub fn render_with(text: &str, escape: Escape) -> Vec<Block> {
    let mut blocks = Vec::new();
    let state = report_lines(text)
        .map(classify)
        .fold(ListState::Idle, |state, line| {
            state.step(line, escape, &mut blocks)
        });
    state.finish(&mut blocks);
    blocks
}
