//! HTTP client for the Jira REST API.

use super::types::{JiraIssue, ISSUE_FIELDS};
use crate::config::Credentials;
use crate::error::FetchError;
use crate::fetcher::IssueSource;
use crate::models::{BugRecord, IssueKey};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body kept in [`FetchError::Api`].
const ERROR_BODY_LIMIT: usize = 200;

/// Read-only Jira client authenticated with an account email and API token.
pub struct JiraClient {
    http: reqwest::Client,
    credentials: Credentials,
}

impl JiraClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bugdigest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, credentials })
    }

    /// URL of the issue resource for `key`.
    pub fn issue_url(&self, key: &IssueKey) -> String {
        format!("{}/rest/api/2/issue/{}", self.credentials.domain, key)
    }

    async fn get_issue(&self, key: &IssueKey) -> Result<JiraIssue, FetchError> {
        let url = self.issue_url(key);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.email, Some(&self.credentials.token))
            .header(ACCEPT, "application/json")
            .query(&[("fields", ISSUE_FIELDS)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_status(status, key, &body)?;

        Ok(serde_json::from_str(&body)?)
    }
}

impl IssueSource for JiraClient {
    async fn fetch_issue(&self, key: &IssueKey) -> Result<BugRecord, FetchError> {
        let issue = self.get_issue(key).await?;
        if let Some(ref returned) = issue.key {
            if returned != key.as_str() {
                debug!("{} answered as {}", key, returned);
            }
        }
        Ok(issue.into_record(key.clone()))
    }
}

/// Map a non-success status to the matching error.
fn check_status(status: StatusCode, key: &IssueKey, body: &str) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::NOT_FOUND => Err(FetchError::NotFound(key.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Unauthorized {
            status: status.as_u16(),
        }),
        _ => Err(FetchError::Api {
            status: status.as_u16(),
            body: body.trim().chars().take(ERROR_BODY_LIMIT).collect(),
        }),
    }
}
