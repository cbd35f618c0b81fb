//! Scan-then-aggregate stage.

use super::aggregator::{empty_bugs, group_all};
use crate::document::parse_document;
use crate::models::{AnalysisEntry, ParseFailure, Report, ReportMetadata};
use crate::scanner::DocumentScanner;
use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Documents read from a directory, split into parsed entries and
/// failures. Both keep read order.
#[derive(Debug, Clone, Default)]
pub struct ParsedDirectory {
    pub entries: Vec<AnalysisEntry>,
    pub failures: Vec<ParseFailure>,
}

impl ParsedDirectory {
    pub fn scanned(&self) -> usize {
        self.entries.len() + self.failures.len()
    }
}

/// Read and parse every document the scanner finds.
///
/// A document that cannot be read or parsed is logged and recorded as a
/// failure; only a missing directory is an error.
pub fn read_documents(scanner: &DocumentScanner) -> Result<ParsedDirectory> {
    let documents = scanner.scan()?;
    let mut parsed = ParsedDirectory::default();

    for doc in documents {
        let result = fs::read_to_string(&doc.path)
            .map_err(|e| format!("unreadable: {}", e))
            .and_then(|text| parse_document(&text).map_err(|e| e.to_string()));

        match result {
            Ok(document) => {
                let stem = doc.file_name.rsplit_once('.').map_or("", |(stem, _)| stem);
                if stem != document.key.as_str() {
                    warn!(
                        "{} holds issue {}; grouping it under {}",
                        doc.file_name, document.key, document.key
                    );
                }
                debug!("Parsed {}", doc.file_name);
                parsed.entries.push(document.into_entry(doc.file_name));
            }
            Err(reason) => {
                warn!("Skipping {}: {}", doc.file_name, reason);
                parsed.failures.push(ParseFailure {
                    file: doc.file_name,
                    reason,
                });
            }
        }
    }

    Ok(parsed)
}

/// Aggregate parsed documents into a report.
pub fn build_report(bugs_dir: &Path, parsed: ParsedDirectory) -> Report {
    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        bugs_dir: bugs_dir.display().to_string(),
        documents_scanned: parsed.scanned(),
        documents_parsed: parsed.entries.len(),
        documents_failed: parsed.failures.len(),
    };

    Report {
        metadata,
        groupings: group_all(&parsed.entries),
        empty_bugs: empty_bugs(&parsed.entries),
        failures: parsed.failures,
    }
}

/// Read, parse, and aggregate the documents in `bugs_dir`, skipping
/// `exclude` if given.
pub fn analyze_directory(bugs_dir: &Path, exclude: Option<&Path>) -> Result<Report> {
    let mut scanner = DocumentScanner::new(bugs_dir.to_path_buf());
    if let Some(path) = exclude {
        scanner = scanner.excluding(path);
    }

    let parsed = read_documents(&scanner)?;
    Ok(build_report(bugs_dir, parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::render_document;
    use crate::models::{BugRecord, Dimension, IssueKey};

    fn write_bug(dir: &Path, key: &str, status: &str) {
        let record = BugRecord {
            status: Some(status.to_string()),
            priority: Some("Medium".to_string()),
            description: Some("Something broke".to_string()),
            ..BugRecord::new(IssueKey::parse(key).unwrap())
        };
        fs::write(dir.join(format!("{}.md", key)), render_document(&record)).unwrap();
    }

    #[test]
    fn test_two_open_documents() {
        let dir = tempfile::tempdir().unwrap();
        write_bug(dir.path(), "BUG-1", "Open");
        write_bug(dir.path(), "BUG-2", "Open");

        let report = analyze_directory(dir.path(), None).unwrap();
        let open = report
            .grouping(Dimension::Status)
            .and_then(|g| g.get("Open"))
            .unwrap();

        assert_eq!(open.count, 2);
        let keys: Vec<&str> = open.keys.iter().map(IssueKey::as_str).collect();
        assert_eq!(keys, vec!["BUG-1", "BUG-2"]);
    }

    #[test]
    fn test_parse_failures_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write_bug(dir.path(), "BUG-1", "Open");
        write_bug(dir.path(), "BUG-2", "Closed");
        write_bug(dir.path(), "BUG-3", "Open");
        fs::write(dir.path().join("BUG-4.md"), "just some notes\n").unwrap();
        fs::write(dir.path().join("BUG-5.md"), "# BUG-5\n\n- **Status:** Open\n").unwrap();
        fs::write(dir.path().join("README.txt"), "not a document").unwrap();

        let report = analyze_directory(dir.path(), None).unwrap();

        assert_eq!(report.metadata.documents_scanned, 5);
        assert_eq!(report.metadata.documents_parsed, 3);
        assert_eq!(report.metadata.documents_failed, 2);

        let status_total = report.grouping(Dimension::Status).unwrap().total();
        assert_eq!(status_total, report.metadata.documents_scanned - report.failures.len());

        let failed: Vec<&str> = report.failures.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(failed, vec!["BUG-4.md", "BUG-5.md"]);
        assert!(report.failures[1].reason.contains("Priority"));
    }

    #[test]
    fn test_copies_of_one_key_count_per_document() {
        let dir = tempfile::tempdir().unwrap();
        write_bug(dir.path(), "BUG-1", "Open");
        fs::copy(dir.path().join("BUG-1.md"), dir.path().join("BUG-1-copy.md")).unwrap();

        let report = analyze_directory(dir.path(), None).unwrap();
        let open = report
            .grouping(Dimension::Status)
            .and_then(|g| g.get("Open"))
            .unwrap();

        assert_eq!(report.metadata.documents_parsed, 2);
        assert_eq!(open.count, 2);
        let keys: Vec<&str> = open.keys.iter().map(IssueKey::as_str).collect();
        assert_eq!(keys, vec!["BUG-1", "BUG-1"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = analyze_directory(dir.path(), None).unwrap();

        assert_eq!(report.metadata.documents_scanned, 0);
        assert_eq!(report.groupings.len(), 3);
        assert!(report.groupings.iter().all(|g| g.groups.is_empty()));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(analyze_directory(&dir.path().join("nope"), None).is_err());
    }

    #[test]
    fn test_empty_bugs_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_bug(dir.path(), "BUG-1", "Open");
        let bare = BugRecord::new(IssueKey::parse("BUG-2").unwrap());
        fs::write(dir.path().join("BUG-2.md"), render_document(&bare)).unwrap();

        let report = analyze_directory(dir.path(), None).unwrap();
        let empty: Vec<&str> = report.empty_bugs.iter().map(IssueKey::as_str).collect();
        assert_eq!(empty, vec!["BUG-2"]);
    }
}
