//! Markdown report generation.
//!
//! This module renders the aggregated [`Report`] as a Markdown document
//! or as JSON.

use crate::models::{Dimension, Grouping, IssueKey, ParseFailure, Report, ReportMetadata};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Bug Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(report));

    for grouping in &report.groupings {
        output.push_str(&generate_grouping_section(grouping));
    }

    output.push_str(&generate_empty_bugs_section(&report.empty_bugs));
    output.push_str(&generate_failures_section(&report.failures));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated At:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Bugs Directory:** `{}`\n", metadata.bugs_dir));
    section.push_str(&format!(
        "- **Documents Scanned:** {}\n",
        metadata.documents_scanned
    ));
    section.push_str(&format!(
        "- **Documents Parsed:** {}\n",
        metadata.documents_parsed
    ));
    if metadata.documents_failed > 0 {
        section.push_str(&format!(
            "- **Documents Failed:** {}\n",
            metadata.documents_failed
        ));
    }
    section.push('\n');

    section
}

/// Generate the summary table: one column per status.
fn generate_summary_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    let Some(by_status) = report
        .grouping(Dimension::Status)
        .filter(|g| !g.groups.is_empty())
    else {
        section.push_str("No bug documents were parsed.\n\n");
        return section;
    };

    let headers: Vec<String> = by_status
        .groups
        .iter()
        .map(|g| escape_cell(&g.name))
        .collect();
    let counts: Vec<String> = by_status.groups.iter().map(|g| g.count.to_string()).collect();

    section.push_str(&format!("| {} | **Total** |\n", headers.join(" | ")));
    section.push_str(&format!("|{}:---:|\n", ":---:|".repeat(headers.len())));
    section.push_str(&format!(
        "| {} | **{}** |\n\n",
        counts.join(" | "),
        by_status.total()
    ));

    section
}

/// Generate the section for one grouping dimension.
fn generate_grouping_section(grouping: &Grouping) -> String {
    let mut section = String::new();

    section.push_str(&format!("## By {}\n\n", grouping.dimension));

    if grouping.groups.is_empty() {
        section.push_str("_No entries._\n\n");
        return section;
    }

    section.push_str(&format!("| {} | Count | Issues |\n", grouping.dimension));
    section.push_str("|:---|:---:|:---|\n");

    for group in &grouping.groups {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&group.name),
            group.count,
            key_list(&group.keys)
        ));
    }
    section.push('\n');

    section
}

/// Generate the list of bugs without description and comments.
fn generate_empty_bugs_section(keys: &[IssueKey]) -> String {
    if keys.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Empty Bugs\n\n");
    section.push_str("These issues have no description and no comments:\n\n");
    for key in keys {
        section.push_str(&format!("- {}\n", key));
    }
    section.push('\n');

    section
}

/// Generate the list of documents excluded from the aggregates.
fn generate_failures_section(failures: &[ParseFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Unparsed Documents\n\n");
    section.push_str("| File | Reason |\n");
    section.push_str("|:---|:---|\n");
    for failure in failures {
        section.push_str(&format!(
            "| `{}` | {} |\n",
            failure.file,
            escape_cell(&failure.reason)
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by bugdigest v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

fn key_list(keys: &[IssueKey]) -> String {
    keys.iter()
        .map(IssueKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pipes would end the table cell early.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write report output to a file, replacing any previous report.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Group;
    use chrono::Utc;

    fn key(s: &str) -> IssueKey {
        IssueKey::parse(s).unwrap()
    }

    fn group(name: &str, keys: &[&str]) -> Group {
        Group {
            name: name.to_string(),
            count: keys.len(),
            keys: keys.iter().map(|k| key(k)).collect(),
        }
    }

    fn create_test_report() -> Report {
        let metadata = ReportMetadata {
            generated_at: Utc::now(),
            bugs_dir: "bugs_md".to_string(),
            documents_scanned: 4,
            documents_parsed: 3,
            documents_failed: 1,
        };

        Report {
            metadata,
            groupings: vec![
                Grouping {
                    dimension: Dimension::Status,
                    groups: vec![group("Open", &["BUG-1", "BUG-3"]), group("Closed", &["BUG-2"])],
                },
                Grouping {
                    dimension: Dimension::Priority,
                    groups: vec![group("High", &["BUG-1", "BUG-2", "BUG-3"])],
                },
                Grouping {
                    dimension: Dimension::Assignee,
                    groups: vec![group("Jane | QA", &["BUG-1"]), group("Unassigned", &["BUG-2", "BUG-3"])],
                },
            ],
            empty_bugs: vec![key("BUG-3")],
            failures: vec![ParseFailure {
                file: "BUG-4.md".to_string(),
                reason: "missing '# <KEY>' header".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Bug Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("## By Status"));
        assert!(markdown.contains("## By Priority"));
        assert!(markdown.contains("## By Assignee"));
        assert!(markdown.contains("| Open | 2 | BUG-1, BUG-3 |"));
        assert!(markdown.contains("| Jane \\| QA | 1 | BUG-1 |"));
        assert!(markdown.contains("## Empty Bugs"));
        assert!(markdown.contains("## Unparsed Documents"));
        assert!(markdown.contains("`BUG-4.md`"));
    }

    #[test]
    fn test_generate_summary_section() {
        let report = create_test_report();
        let section = generate_summary_section(&report);

        assert!(section.contains("| Open | Closed | **Total** |"));
        assert!(section.contains("|:---:|:---:|:---:|"));
        assert!(section.contains("| 2 | 1 | **3** |"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let report = create_test_report();
        let section = generate_metadata_section(&report.metadata);

        assert!(section.contains("`bugs_md`"));
        assert!(section.contains("Documents Scanned:** 4"));
        assert!(section.contains("Documents Failed:** 1"));
    }

    #[test]
    fn test_optional_sections_omitted() {
        let mut report = create_test_report();
        report.empty_bugs.clear();
        report.failures.clear();
        for grouping in &mut report.groupings {
            grouping.groups.clear();
        }

        let markdown = generate_markdown_report(&report);
        assert!(!markdown.contains("## Empty Bugs"));
        assert!(!markdown.contains("## Unparsed Documents"));
        assert!(markdown.contains("No bug documents were parsed."));
        assert!(markdown.contains("_No entries._"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"groupings\""));
        assert!(json.contains("\"dimension\": \"status\""));
        assert!(json.contains("\"empty_bugs\""));
    }

    #[test]
    fn test_write_report_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("analyzer.md");

        write_report("first", &path).unwrap();
        write_report("second", &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
