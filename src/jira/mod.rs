//! Jira integration.
//!
//! Client and wire types for reading issues from the Jira REST API.

pub mod client;
pub mod types;

pub use client::JiraClient;
pub use types::JiraIssue;
