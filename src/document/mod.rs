//! Per-bug Markdown documents.
//!
//! The fetcher renders every [`BugRecord`](crate::models::BugRecord) into
//! one document and the analyzer parses it back. The layout is a small
//! line grammar:
//!
//! ```text
//! # <KEY>: <summary>
//!
//! - **Status:** <status>
//! - **Priority:** <priority>
//! - **Assignee:** <assignee>
//!
//! ## Description
//!
//! <free text | _No description._>
//!
//! ## Comments
//!
//! ### Comment 1
//!
//! - **Author:** <name>
//! - **Created:** <timestamp>
//!
//! <free text>
//! ```
//!
//! Free text lines that could be mistaken for structure (`#`, `\`,
//! `- **`, or a placeholder line) are written with one leading `\`.

mod parse;
mod render;

pub use parse::{parse_document, ParsedDocument};
pub use render::render_document;

pub(crate) const FIELD_STATUS: &str = "Status";
pub(crate) const FIELD_PRIORITY: &str = "Priority";
pub(crate) const FIELD_ASSIGNEE: &str = "Assignee";
pub(crate) const FIELD_AUTHOR: &str = "Author";
pub(crate) const FIELD_CREATED: &str = "Created";

pub(crate) const SECTION_DESCRIPTION: &str = "Description";
pub(crate) const SECTION_COMMENTS: &str = "Comments";

pub(crate) const NO_DESCRIPTION: &str = "_No description._";
pub(crate) const NO_COMMENTS: &str = "_No comments._";

const FIELD_PREFIX: &str = "- **";
const FIELD_SEPARATOR: &str = ":** ";
const ESCAPE: char = '\\';

/// Format a `- **Label:** value` line.
pub(crate) fn field_line(label: &str, value: &str) -> String {
    format!("{FIELD_PREFIX}{label}{FIELD_SEPARATOR}{value}")
}

/// Split a field line into label and value.
pub(crate) fn split_field_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(FIELD_PREFIX)?;
    let (label, value) = match rest.split_once(FIELD_SEPARATOR) {
        Some(parts) => parts,
        // "- **Label:**" with an empty value
        None => (rest.strip_suffix(":**")?, ""),
    };
    Some((label.trim(), value.trim()))
}

fn needs_escape(line: &str) -> bool {
    line.starts_with('#')
        || line.starts_with(ESCAPE)
        || line.starts_with(FIELD_PREFIX)
        || line == NO_DESCRIPTION
        || line == NO_COMMENTS
}

pub(crate) fn escape_line(line: &str) -> String {
    if needs_escape(line) {
        format!("{ESCAPE}{line}")
    } else {
        line.to_string()
    }
}

pub(crate) fn unescape_line(line: &str) -> &str {
    line.strip_prefix(ESCAPE).unwrap_or(line)
}
