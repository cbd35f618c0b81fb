//! BugDigest - Jira bug export and summary
//!
//! Two small pipelines sharing a directory of Markdown documents:
//!
//! - `bug-fetcher` reads issue keys, fetches each issue from Jira, and
//!   writes one `<KEY>.md` document per issue.
//! - `bug-analyzer` parses those documents back and writes a report
//!   grouping the issues by status, priority and assignee.
//!
//! The document layout shared by both sides lives in [`document`].

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod jira;
pub mod keys;
pub mod models;
pub mod report;
pub mod scanner;

use tracing_subscriber::FmtSubscriber;

/// Initialize logging at the given level.
pub fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
}
