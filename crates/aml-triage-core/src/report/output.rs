//! Serializations of a rendered block sequence.
//!
//! Payloads are written as-is: escaping already happened in the renderer,
//! so callers must pair [`to_html`] with [`super::Escape::Html`] and
//! [`to_plain_text`] with [`super::Escape::Terminal`].

use super::render::{Block, HeadingLevel};

/// Render blocks as an HTML fragment, one element per line.
pub fn to_html(blocks: &[Block]) -> String {
    let mut html = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            Block::Heading {
                level: HeadingLevel::Main,
                text,
            } => html.push(format!("<h3 class=\"report-heading\">{text}</h3>")),
            Block::Heading {
                level: HeadingLevel::Sub,
                text,
            } => html.push(format!("<h4 class=\"report-subheading\">{text}</h4>")),
            Block::Emphasis { text } => html.push(format!(
                "<p class=\"report-emphasis\"><strong>{text}</strong></p>"
            )),
            Block::List { items } => {
                html.push("<ul class=\"report-list\">".to_string());
                for item in items {
                    html.push(format!("<li>{item}</li>"));
                }
                html.push("</ul>".to_string());
            }
            Block::KeyValue { key, value } => html.push(format!(
                "<p class=\"report-kv\">\
                 <span class=\"report-key\">{key}:</span> <span>{value}</span></p>"
            )),
            Block::Paragraph { text } => html.push(format!("<p>{text}</p>")),
            Block::Spacer => html.push("<br>".to_string()),
        }
    }
    html.join("\n")
}

/// Render blocks as plain terminal text.
pub fn to_plain_text(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let rule = match level {
                    HeadingLevel::Main => '=',
                    HeadingLevel::Sub => '-',
                };
                out.push_str(text);
                out.push('\n');
                out.extend(std::iter::repeat(rule).take(text.chars().count()));
                out.push('\n');
            }
            Block::Emphasis { text } => out.push_str(&format!("*{text}*\n")),
            Block::List { items } => {
                for item in items {
                    out.push_str(&format!("  • {item}\n"));
                }
            }
            Block::KeyValue { key, value } => out.push_str(&format!("{key}: {value}\n")),
            Block::Paragraph { text } => out.push_str(&format!("{text}\n")),
            Block::Spacer => out.push('\n'),
        }
    }
    out
}
