//! Fetch-then-persist stage.
//!
//! Keys are processed strictly one at a time, in input order. A failed
//! fetch or write is logged, recorded in the [`FetchSummary`], and the
//! loop moves on to the next key.

use crate::document::render_document;
use crate::error::FetchError;
use crate::models::{BugRecord, IssueKey};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Anything that can produce a [`BugRecord`] for a key.
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    async fn fetch_issue(&self, key: &IssueKey) -> Result<BugRecord, FetchError>;
}

/// Options for a fetch run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Directory documents are written to. Created if missing.
    pub output_dir: PathBuf,
    /// Whether to draw a progress bar.
    pub show_progress: bool,
}

/// A document written for one key.
#[derive(Debug, Clone)]
pub struct WrittenDocument {
    pub key: IssueKey,
    pub path: PathBuf,
    pub status: String,
}

/// A key that produced no document.
#[derive(Debug, Clone)]
pub struct SkippedKey {
    pub key: IssueKey,
    pub reason: String,
}

/// Outcome of a fetch run.
#[derive(Debug, Clone, Default)]
pub struct FetchSummary {
    pub written: Vec<WrittenDocument>,
    pub skipped: Vec<SkippedKey>,
}

impl FetchSummary {
    /// Count of written documents per status, in order of first appearance.
    pub fn status_counts(&self) -> Vec<(String, usize)> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for doc in &self.written {
            let count = counts.entry(doc.status.as_str()).or_insert(0);
            if *count == 0 {
                order.push(doc.status.clone());
            }
            *count += 1;
        }

        order
            .into_iter()
            .map(|status| {
                let count = counts.get(status.as_str()).copied().unwrap_or(0);
                (status, count)
            })
            .collect()
    }
}

/// Fetch every key from `source` and write one document per success.
///
/// Only failing to create the output directory is fatal; everything
/// per-key ends up in [`FetchSummary::skipped`].
pub async fn fetch_all<S: IssueSource>(
    source: &S,
    keys: &[IssueKey],
    options: &FetchOptions,
) -> Result<FetchSummary> {
    fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    let progress = progress_bar(keys.len(), options.show_progress);
    let mut summary = FetchSummary::default();

    for key in keys {
        progress.set_message(key.to_string());

        let outcome = match source.fetch_issue(key).await {
            Ok(record) => write_document(&options.output_dir, &record)
                .map(|path| WrittenDocument {
                    key: key.clone(),
                    path,
                    status: record.status_label(),
                })
                .map_err(|e| format!("failed to write document: {}", e)),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(doc) => {
                progress.suspend(|| info!("Wrote {}", doc.path.display()));
                summary.written.push(doc);
            }
            Err(reason) => {
                progress.suspend(|| warn!("Skipping {}: {}", key, reason));
                summary.skipped.push(SkippedKey {
                    key: key.clone(),
                    reason,
                });
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(summary)
}

/// Write the document for `record` to `<dir>/<key>.md`, replacing any
/// previous version.
pub fn write_document(dir: &Path, record: &BugRecord) -> std::io::Result<PathBuf> {
    let path = dir.join(record.key.file_name());
    fs::write(&path, render_document(record))?;
    Ok(path)
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Serves canned records; unknown keys answer 404.
    struct StubSource {
        records: HashMap<String, BugRecord>,
    }

    impl StubSource {
        fn new(records: Vec<BugRecord>) -> Self {
            Self {
                records: records
                    .into_iter()
                    .map(|r| (r.key.to_string(), r))
                    .collect(),
            }
        }
    }

    impl IssueSource for StubSource {
        async fn fetch_issue(&self, key: &IssueKey) -> Result<BugRecord, FetchError> {
            self.records
                .get(key.as_str())
                .cloned()
                .ok_or_else(|| FetchError::NotFound(key.to_string()))
        }
    }

    fn key(s: &str) -> IssueKey {
        IssueKey::parse(s).unwrap()
    }

    fn record(k: &str, status: &str) -> BugRecord {
        BugRecord {
            summary: format!("Summary of {}", k),
            status: Some(status.to_string()),
            ..BugRecord::new(key(k))
        }
    }

    fn options(dir: &Path) -> FetchOptions {
        FetchOptions {
            output_dir: dir.to_path_buf(),
            show_progress: false,
        }
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_failed_key_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource::new(vec![record("BUG-1", "Open")]);
        let keys = vec![key("BUG-1"), key("BUG-2")];

        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let summary = tracing::subscriber::with_default(subscriber, || {
            tokio_test::block_on(fetch_all(&source, &keys, &options(dir.path())))
        })
        .unwrap();

        let output = logs.contents();
        assert!(output.contains("WARN"));
        assert!(output.contains("Skipping BUG-2"));
        assert!(!output.contains("Skipping BUG-1"));

        assert_eq!(file_names(dir.path()), vec!["BUG-1.md"]);
        assert_eq!(summary.written.len(), 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].key.as_str(), "BUG-2");
        assert!(summary.skipped[0].reason.contains("not found"));
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("bugs");
        let source = StubSource::new(vec![record("BUG-1", "Open")]);

        tokio_test::block_on(fetch_all(&source, &[key("BUG-1")], &options(&nested))).unwrap();

        assert!(nested.join("BUG-1.md").is_file());
    }

    #[test]
    fn test_output_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, "").unwrap();
        let source = StubSource::new(vec![]);

        let result = tokio_test::block_on(fetch_all(&source, &[key("BUG-1")], &options(&file)));
        assert!(result.is_err());
    }

    #[test]
    fn test_refetch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource::new(vec![record("BUG-1", "Open"), record("BUG-2", "Closed")]);
        let keys = vec![key("BUG-1"), key("BUG-2")];

        tokio_test::block_on(fetch_all(&source, &keys, &options(dir.path()))).unwrap();
        let first_names = file_names(dir.path());
        let first_body = fs::read_to_string(dir.path().join("BUG-1.md")).unwrap();

        tokio_test::block_on(fetch_all(&source, &keys, &options(dir.path()))).unwrap();

        assert_eq!(file_names(dir.path()), first_names);
        assert_eq!(
            fs::read_to_string(dir.path().join("BUG-1.md")).unwrap(),
            first_body
        );
    }

    #[test]
    fn test_at_most_one_document_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource::new(vec![
            record("A-1", "Open"),
            record("A-2", "Open"),
            record("A-4", "Done"),
        ]);
        let keys: Vec<IssueKey> = ["A-1", "A-2", "A-3", "A-4"].iter().map(|k| key(k)).collect();

        let summary =
            tokio_test::block_on(fetch_all(&source, &keys, &options(dir.path()))).unwrap();

        let names = file_names(dir.path());
        assert!(names.len() <= keys.len());
        assert_eq!(names, vec!["A-1.md", "A-2.md", "A-4.md"]);
        assert_eq!(summary.written.len() + summary.skipped.len(), keys.len());
    }

    #[test]
    fn test_written_document_parses() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource::new(vec![record("BUG-5", "In Review")]);

        tokio_test::block_on(fetch_all(&source, &[key("BUG-5")], &options(dir.path()))).unwrap();

        let text = fs::read_to_string(dir.path().join("BUG-5.md")).unwrap();
        let doc = parse_document(&text).unwrap();
        assert_eq!(doc.status, "In Review");
        assert_eq!(doc.summary, "Summary of BUG-5");
    }

    #[test]
    fn test_status_counts_in_first_seen_order() {
        let doc = |k: &str, status: &str| WrittenDocument {
            key: key(k),
            path: PathBuf::from(format!("{}.md", k)),
            status: status.to_string(),
        };
        let summary = FetchSummary {
            written: vec![
                doc("A-1", "Closed"),
                doc("A-2", "Open"),
                doc("A-3", "Closed"),
            ],
            skipped: vec![],
        };

        assert_eq!(
            summary.status_counts(),
            vec![("Closed".to_string(), 2), ("Open".to_string(), 1)]
        );
    }
}
