//! Data models for the bug pipeline.
//!
//! This module contains the structures that flow between the fetcher,
//! the document layer, and the analyzer: issue keys, fetched bug records,
//! parsed analysis entries, and the aggregated report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status shown when the upstream issue has none.
pub const UNKNOWN_STATUS: &str = "Unknown";
/// Priority shown when the upstream issue has none.
pub const NO_PRIORITY: &str = "None";
/// Assignee shown when nobody is assigned.
pub const UNASSIGNED: &str = "Unassigned";

/// Identifier of an issue in the upstream tracker (e.g. `PROJ-123`).
///
/// Keys double as file stems, so only characters that are safe in a
/// file name are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueKey(String);

impl IssueKey {
    /// Parse a key, returning `None` when it is empty or not file-name safe.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('.') {
            return None;
        }

        let valid = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the document this key is persisted to.
    pub fn file_name(&self) -> String {
        format!("{}.md", self.0)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Display name of the author, if known.
    pub author: Option<String>,
    /// Creation timestamp as reported upstream.
    pub created: Option<String>,
    /// Comment text.
    pub body: String,
}

/// Everything fetched for one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugRecord {
    pub key: IssueKey,
    pub summary: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub description: Option<String>,
    /// Comments in upstream order.
    pub comments: Vec<Comment>,
}

impl BugRecord {
    /// Creates a record with only a key; other fields empty.
    pub fn new(key: IssueKey) -> Self {
        Self {
            key,
            summary: String::new(),
            status: None,
            priority: None,
            assignee: None,
            description: None,
            comments: Vec::new(),
        }
    }

    pub fn status_label(&self) -> String {
        label_or(self.status.as_deref(), UNKNOWN_STATUS)
    }

    pub fn priority_label(&self) -> String {
        label_or(self.priority.as_deref(), NO_PRIORITY)
    }

    pub fn assignee_label(&self) -> String {
        label_or(self.assignee.as_deref(), UNASSIGNED)
    }
}

/// Collapse whitespace runs to single spaces, falling back to `default`
/// when nothing is left.
fn label_or(value: Option<&str>, default: &str) -> String {
    let collapsed = value.map(collapse_whitespace).unwrap_or_default();
    if collapsed.is_empty() {
        default.to_string()
    } else {
        collapsed
    }
}

/// Collapse every whitespace run (newlines included) to one space.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fields recovered from a persisted bug document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub key: IssueKey,
    pub summary: String,
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub has_description: bool,
    pub comment_count: usize,
    /// File name the entry was read from.
    pub source_file: String,
}

impl AnalysisEntry {
    /// Whether the document carries any free text at all.
    pub fn has_content(&self) -> bool {
        self.has_description || self.comment_count > 0
    }

    /// The value this entry contributes to a grouping dimension.
    pub fn value_for(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Status => &self.status,
            Dimension::Priority => &self.priority,
            Dimension::Assignee => &self.assignee,
        }
    }
}

/// A field the report groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Status,
    Priority,
    Assignee,
}

impl Dimension {
    /// All dimensions in report order.
    pub const ALL: [Dimension; 3] = [Dimension::Status, Dimension::Priority, Dimension::Assignee];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Status => write!(f, "Status"),
            Dimension::Priority => write!(f, "Priority"),
            Dimension::Assignee => write!(f, "Assignee"),
        }
    }
}

/// One bucket of a grouping: a value and the keys that carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub count: usize,
    /// Member keys in read order.
    pub keys: Vec<IssueKey>,
}

/// All groups for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    pub dimension: Dimension,
    pub groups: Vec<Group>,
}

impl Grouping {
    /// Look up a group by value.
    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Sum of all group counts.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }
}

/// A document the analyzer could not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub file: String,
    pub reason: String,
}

/// Metadata about the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Directory the documents were read from.
    pub bugs_dir: String,
    /// Number of documents found.
    pub documents_scanned: usize,
    /// Number of documents that parsed.
    pub documents_parsed: usize,
    /// Number of documents excluded because they failed to parse.
    pub documents_failed: usize,
}

/// The aggregated bug report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// One grouping per dimension, in [`Dimension::ALL`] order.
    pub groupings: Vec<Grouping>,
    /// Keys of documents without description and comments.
    pub empty_bugs: Vec<IssueKey>,
    /// Documents excluded from the aggregates.
    pub failures: Vec<ParseFailure>,
}

impl Report {
    /// The grouping for a dimension.
    pub fn grouping(&self, dimension: Dimension) -> Option<&Grouping> {
        self.groupings.iter().find(|g| g.dimension == dimension)
    }
}
