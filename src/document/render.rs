//! Rendering bug records to Markdown documents.

use super::{
    escape_line, field_line, FIELD_ASSIGNEE, FIELD_AUTHOR, FIELD_CREATED, FIELD_PRIORITY,
    FIELD_STATUS, NO_COMMENTS, NO_DESCRIPTION, SECTION_COMMENTS, SECTION_DESCRIPTION,
};
use crate::models::{collapse_whitespace, BugRecord, Comment};

/// Render a record into its document text.
///
/// Rendering is deterministic: the same record always yields the same
/// bytes, so re-fetching unchanged issues rewrites identical files.
pub fn render_document(record: &BugRecord) -> String {
    let mut output = String::new();

    let summary = collapse_whitespace(&record.summary);
    if summary.is_empty() {
        output.push_str(&format!("# {}\n\n", record.key));
    } else {
        output.push_str(&format!("# {}: {}\n\n", record.key, summary));
    }

    output.push_str(&field_line(FIELD_STATUS, &record.status_label()));
    output.push('\n');
    output.push_str(&field_line(FIELD_PRIORITY, &record.priority_label()));
    output.push('\n');
    output.push_str(&field_line(FIELD_ASSIGNEE, &record.assignee_label()));
    output.push('\n');

    output.push_str(&format!("\n## {SECTION_DESCRIPTION}\n\n"));
    match record.description.as_deref() {
        Some(text) if !text.trim().is_empty() => push_free_text(&mut output, text),
        _ => {
            output.push_str(NO_DESCRIPTION);
            output.push('\n');
        }
    }

    output.push_str(&format!("\n## {SECTION_COMMENTS}\n\n"));
    if record.comments.is_empty() {
        output.push_str(NO_COMMENTS);
        output.push('\n');
    }
    for (i, comment) in record.comments.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        push_comment(&mut output, i + 1, comment);
    }

    output
}

fn push_comment(output: &mut String, number: usize, comment: &Comment) {
    output.push_str(&format!("### Comment {number}\n\n"));

    let author = comment.author.as_deref().map(collapse_whitespace);
    let created = comment.created.as_deref().map(collapse_whitespace);
    let mut wrote_fields = false;
    for (label, value) in [(FIELD_AUTHOR, author), (FIELD_CREATED, created)] {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            output.push_str(&field_line(label, &value));
            output.push('\n');
            wrote_fields = true;
        }
    }

    if !comment.body.trim().is_empty() {
        if wrote_fields {
            output.push('\n');
        }
        push_free_text(output, &comment.body);
    }
}

/// Append free text with leading/trailing blank lines dropped and
/// structural lines escaped.
fn push_free_text(output: &mut String, text: &str) {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    if let (Some(start), Some(end)) = (start, end) {
        for line in &lines[start..=end] {
            output.push_str(&escape_line(line.trim_end()));
            output.push('\n');
        }
    }
}
