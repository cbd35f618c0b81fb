//! Discovery of bug documents in a directory.
//!
//! Only regular `*.md` files directly inside the directory count as
//! documents. Everything else (subdirectories, hidden files, other
//! extensions) is ignored.

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension of bug documents.
pub const DOCUMENT_EXTENSION: &str = "md";

/// A document found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDocument {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name without directory.
    pub file_name: String,
}

/// Scanner for a directory of bug documents.
pub struct DocumentScanner {
    root: PathBuf,
    exclude: Option<PathBuf>,
}

impl DocumentScanner {
    /// Create a scanner for `root`.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            exclude: None,
        }
    }

    /// Skip `path` even if it looks like a document (the report file, when
    /// it is written into the scanned directory).
    pub fn excluding(mut self, path: &Path) -> Self {
        self.exclude = Some(canonical(path));
        self
    }

    /// List documents sorted by file name.
    pub fn scan(&self) -> Result<Vec<ScannedDocument>> {
        if !self.root.is_dir() {
            return Err(anyhow!(
                "Bugs directory not found: {}",
                self.root.display()
            ));
        }

        let mut documents = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Cannot read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().to_string();

            if !self.is_document(path, &file_name) {
                debug!("Ignoring {}", path.display());
                continue;
            }

            documents.push(ScannedDocument {
                path: path.to_path_buf(),
                file_name,
            });
        }

        Ok(documents)
    }

    fn is_document(&self, path: &Path, name: &str) -> bool {
        // Hidden files
        if name.starts_with('.') {
            return false;
        }

        // Follows symlinks, so a linked document still counts
        if !path.is_file() {
            return false;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION) {
            return false;
        }

        match self.exclude {
            Some(ref excluded) => canonical(path) != *excluded,
            None => true,
        }
    }
}

/// Canonical form of `path`; a file that does not exist yet is resolved
/// through its parent directory.
fn canonical(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(docs: &[ScannedDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.file_name.as_str()).collect()
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["BUG-2.md", "BUG-1.md", "notes.txt", ".hidden.md", "BUG-3.MD"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.md")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("BUG-9.md"), "x").unwrap();

        let docs = DocumentScanner::new(dir.path().to_path_buf()).scan().unwrap();
        assert_eq!(names(&docs), vec!["BUG-1.md", "BUG-2.md", "BUG-3.MD"]);
    }

    #[test]
    fn test_scan_excludes_report() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("BUG-1.md"), "x").unwrap();
        fs::write(dir.path().join("report.md"), "x").unwrap();

        let docs = DocumentScanner::new(dir.path().to_path_buf())
            .excluding(&dir.path().join("report.md"))
            .scan()
            .unwrap();
        assert_eq!(names(&docs), vec!["BUG-1.md"]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = DocumentScanner::new(dir.path().join("missing")).scan();
        assert!(result.is_err());
    }
}
