//! Error types shared by the fetcher and the analyzer.
//!
//! Fatal setup problems surface as [`ConfigError`] or [`KeyFileError`];
//! per-item problems are [`FetchError`] and [`DocumentError`] and are
//! logged and skipped by the batch loops.

use std::path::PathBuf;
use thiserror::Error;

/// Problems resolving the fetcher's configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing Jira credential: {name} (set {env_var}, --{flag}, or [jira].{key} in the config file)")]
    MissingCredential {
        name: &'static str,
        env_var: &'static str,
        flag: &'static str,
        key: &'static str,
    },

    #[error("invalid Jira domain '{0}'")]
    InvalidDomain(String),

    #[error("invalid request timeout: {0}s (must be at least 1 second)")]
    InvalidTimeout(u64),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Problems reading the issue-key file.
#[derive(Error, Debug)]
pub enum KeyFileError {
    #[error("failed to read issue file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no issue keys found in {0}")]
    Empty(PathBuf),
}

/// A single remote fetch that failed. The key is skipped.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("issue not found: {0}")]
    NotFound(String),

    #[error("authentication rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Jira API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
}

/// A persisted bug document that does not follow the document layout.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    #[error("missing '# <KEY>' header")]
    MissingHeader,

    #[error("invalid issue key in header: '{0}'")]
    InvalidKey(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("duplicate field '{0}'")]
    DuplicateField(&'static str),
}
