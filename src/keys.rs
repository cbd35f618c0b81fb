//! Loading the issue-key list.

use crate::error::KeyFileError;
use crate::models::IssueKey;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Read issue keys from a file, one per line, in file order.
///
/// Blank lines and `#` comments are skipped silently; malformed keys and
/// repeated keys are skipped with a warning. A file that yields no keys
/// is an error.
pub fn load_issue_keys(path: &Path) -> Result<Vec<IssueKey>, KeyFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| KeyFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let keys = parse_issue_keys(&content);
    if keys.is_empty() {
        return Err(KeyFileError::Empty(path.to_path_buf()));
    }

    debug!("Loaded {} issue keys from {}", keys.len(), path.display());
    Ok(keys)
}

/// Parse the contents of a key file.
pub fn parse_issue_keys(content: &str) -> Vec<IssueKey> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(key) = IssueKey::parse(line) else {
            warn!("Skipping malformed issue key on line {}: {:?}", index + 1, line);
            continue;
        };

        if !seen.insert(key.clone()) {
            warn!("Skipping duplicate issue key on line {}: {}", index + 1, key);
            continue;
        }

        keys.push(key);
    }

    keys
}
