//! Parsing bug documents back into structured fields.

use super::{
    split_field_line, unescape_line, FIELD_ASSIGNEE, FIELD_AUTHOR, FIELD_CREATED,
    FIELD_PRIORITY, FIELD_STATUS, NO_DESCRIPTION, SECTION_COMMENTS, SECTION_DESCRIPTION,
};
use crate::error::DocumentError;
use crate::models::{AnalysisEntry, Comment, IssueKey};

/// Everything the document grammar carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub key: IssueKey,
    pub summary: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub description: Option<String>,
    pub comments: Vec<Comment>,
}

impl ParsedDocument {
    /// Reduce to the fields the analyzer aggregates.
    pub fn into_entry(self, source_file: impl Into<String>) -> AnalysisEntry {
        AnalysisEntry {
            key: self.key,
            summary: self.summary,
            status: self.status,
            priority: self.priority,
            assignee: self.assignee,
            has_description: self.description.is_some(),
            comment_count: self.comments.len(),
            source_file: source_file.into(),
        }
    }
}

/// Parse a document produced by [`render_document`](super::render_document).
pub fn parse_document(text: &str) -> Result<ParsedDocument, DocumentError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut cursor = 0;

    while cursor < lines.len() && lines[cursor].trim().is_empty() {
        cursor += 1;
    }

    let header = lines
        .get(cursor)
        .and_then(|line| line.strip_prefix("# "))
        .ok_or(DocumentError::MissingHeader)?;
    let (key, summary) = parse_header(header)?;
    cursor += 1;

    let field_start = cursor;
    while cursor < lines.len() && section_name(lines[cursor]).is_none() {
        cursor += 1;
    }
    let fields: Vec<(&str, &str)> = lines[field_start..cursor]
        .iter()
        .filter_map(|line| split_field_line(line))
        .collect();

    let status = required_field(&fields, FIELD_STATUS)?;
    let priority = required_field(&fields, FIELD_PRIORITY)?;
    let assignee = required_field(&fields, FIELD_ASSIGNEE)?;

    let mut description = None;
    let mut comments = Vec::new();

    while cursor < lines.len() {
        let Some(name) = section_name(lines[cursor]) else {
            cursor += 1;
            continue;
        };
        cursor += 1;

        let body_start = cursor;
        while cursor < lines.len() && section_name(lines[cursor]).is_none() {
            cursor += 1;
        }
        let body = &lines[body_start..cursor];

        match name {
            SECTION_DESCRIPTION => description = parse_description(body),
            SECTION_COMMENTS => comments = parse_comments(body),
            _ => {}
        }
    }

    Ok(ParsedDocument {
        key,
        summary,
        status,
        priority,
        assignee,
        description,
        comments,
    })
}

fn parse_header(header: &str) -> Result<(IssueKey, String), DocumentError> {
    let (raw_key, summary) = match header.split_once(':') {
        Some((key, summary)) => (key, summary.trim()),
        None => (header, ""),
    };

    let key = IssueKey::parse(raw_key)
        .ok_or_else(|| DocumentError::InvalidKey(raw_key.trim().to_string()))?;

    Ok((key, summary.to_string()))
}

fn section_name(line: &str) -> Option<&str> {
    line.strip_prefix("## ").map(str::trim)
}

fn required_field(fields: &[(&str, &str)], label: &'static str) -> Result<String, DocumentError> {
    let mut values = fields.iter().filter(|(l, _)| *l == label).map(|(_, v)| *v);

    let value = values.next().ok_or(DocumentError::MissingField(label))?;
    if values.next().is_some() {
        return Err(DocumentError::DuplicateField(label));
    }

    Ok(value.to_string())
}

fn parse_description(body: &[&str]) -> Option<String> {
    let body = trim_blank(body);
    match body {
        [] => None,
        [only] if only.trim_end() == NO_DESCRIPTION => None,
        _ => Some(unescape(body)),
    }
}

fn parse_comments(body: &[&str]) -> Vec<Comment> {
    let starts: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, line)| line.starts_with("### "))
        .map(|(i, _)| i)
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(body.len());
            parse_comment(&body[start + 1..end])
        })
        .collect()
}

fn parse_comment(block: &[&str]) -> Comment {
    let mut author = None;
    let mut created = None;
    let mut cursor = 0;

    while cursor < block.len() {
        let line = block[cursor];
        if line.trim().is_empty() {
            cursor += 1;
            continue;
        }
        match split_field_line(line) {
            Some((FIELD_AUTHOR, value)) => author = Some(value.to_string()),
            Some((FIELD_CREATED, value)) => created = Some(value.to_string()),
            Some(_) => {}
            None => break,
        }
        cursor += 1;
    }

    Comment {
        author,
        created,
        body: unescape(trim_blank(&block[cursor..])),
    }
}

/// Drop leading and trailing blank lines.
fn trim_blank<'a, 'b>(lines: &'a [&'b str]) -> &'a [&'b str] {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => &lines[start..=end],
        _ => &[],
    }
}

fn unescape(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| unescape_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}
