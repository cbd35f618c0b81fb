//! JIRA API types

use crate::models::{BugRecord, Comment, IssueKey};
use serde::Deserialize;
use serde_json::Value;

/// Fields requested from `GET /rest/api/2/issue/{key}`.
pub const ISSUE_FIELDS: &str = "summary,status,priority,assignee,description,comment";

#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fields: JiraFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<JiraNamed>,
    #[serde(default)]
    pub priority: Option<JiraNamed>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    /// Wiki-markup string on API v2, an Atlassian Document on v3.
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub comment: Option<JiraCommentPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraNamed {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraUser {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JiraCommentPage {
    #[serde(default)]
    pub comments: Vec<JiraComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraComment {
    #[serde(default)]
    pub author: Option<JiraUser>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub created: Option<String>,
}

impl JiraIssue {
    /// Map the API response onto a record filed under `key`.
    ///
    /// The requested key is kept even when Jira answers with a moved
    /// issue's new key, so the output file name follows the input list.
    pub fn into_record(self, key: IssueKey) -> BugRecord {
        let fields = self.fields;

        let comments = fields
            .comment
            .map(|page| page.comments)
            .unwrap_or_default()
            .into_iter()
            .map(|c| Comment {
                author: c.author.and_then(|a| a.display_name),
                created: c.created,
                body: c.body.as_ref().and_then(plain_text).unwrap_or_default(),
            })
            .collect();

        BugRecord {
            key,
            summary: fields.summary.unwrap_or_default(),
            status: fields.status.and_then(|s| s.name),
            priority: fields.priority.and_then(|p| p.name),
            assignee: fields.assignee.and_then(|a| a.display_name),
            description: fields
                .description
                .as_ref()
                .and_then(plain_text)
                .filter(|d| !d.trim().is_empty()),
            comments,
        }
    }
}

/// Flatten a text field: strings pass through, documents are reduced to
/// their text nodes with one line per block.
fn plain_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => {
            let mut lines = Vec::new();
            collect_blocks(value, &mut lines);
            Some(lines.join("\n"))
        }
        other => Some(other.to_string()),
    }
}

fn collect_blocks(node: &Value, lines: &mut Vec<String>) {
    let children = node.get("content").and_then(Value::as_array);
    let has_block_children = children
        .map(|c| c.iter().any(|n| n.get("content").is_some()))
        .unwrap_or(false);

    match children {
        Some(children) if has_block_children => {
            for child in children {
                collect_blocks(child, lines);
            }
        }
        Some(children) => {
            let line: String = children
                .iter()
                .filter_map(|n| n.get("text").and_then(Value::as_str))
                .collect();
            lines.push(line);
        }
        None => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                lines.push(text.to_string());
            }
        }
    }
}
