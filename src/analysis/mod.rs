//! Analysis modules.
//!
//! Reading persisted bug documents back and aggregating them into a
//! [`Report`](crate::models::Report).

pub mod aggregator;
pub mod runner;

pub use aggregator::*;
pub use runner::{analyze_directory, build_report, read_documents, ParsedDirectory};
