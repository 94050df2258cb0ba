//! Freeform analysis report rendering.
//!
//! Provides:
//! - [`classify::classify`]: line → [`ClassifiedLine`]
//! - [`render::render`] / [`render::render_with`]: text → ordered [`Block`]s
//! - [`output::to_html`] / [`output::to_plain_text`]: block serializations

pub mod classify;
pub mod escape;
pub mod output;
pub mod render;

pub use classify::{classify, ClassifiedLine, LineKind, HEADER_KEYWORDS};
pub use escape::Escape;
pub use output::{to_html, to_plain_text};
pub use render::{render, render_with, report_lines, Block, HeadingLevel, ListState};
