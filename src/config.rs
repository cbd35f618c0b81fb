//! Configuration file handling.
//!
//! This module handles loading the optional `.bugdigest.toml` file and
//! merging it with command-line flags and environment variables into the
//! [`Credentials`] the fetcher needs.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".bugdigest.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Jira connection settings.
    #[serde(default)]
    pub jira: JiraConfig,
}

/// Jira connection settings. Credentials are usually left out of the file
/// and supplied through the environment.
#[derive(Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Account email used for basic auth.
    #[serde(default)]
    pub email: Option<String>,

    /// API token used for basic auth.
    #[serde(default)]
    pub token: Option<String>,

    /// Base URL of the Jira site, e.g. `https://example.atlassian.net`.
    #[serde(default)]
    pub domain: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            email: None,
            token: None,
            domain: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("email", &self.email)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("domain", &self.domain)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

fn default_timeout() -> u64 {
    30
}

/// Resolved credentials for the Jira API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub token: String,
    /// Normalized base URL: has a scheme, no trailing slash.
    pub domain: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

impl Credentials {
    /// Build credentials, normalizing the domain.
    pub fn new(email: &str, token: &str, domain: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            email: email.to_string(),
            token: token.to_string(),
            domain: normalize_domain(domain)?,
        })
    }
}

/// Prepend `https://` when no scheme is given and drop trailing slashes.
fn normalize_domain(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidDomain(raw.to_string()));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else if trimmed.contains("://") {
        Err(ConfigError::InvalidDomain(raw.to_string()))
    } else {
        Ok(format!("https://{trimmed}"))
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        Self::load_optional(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load `path` if it exists.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with fetcher arguments.
    ///
    /// Flags (and the environment variables clap reads for them) take
    /// precedence over the config file.
    pub fn merge_with_args(&mut self, args: &crate::cli::FetchArgs) {
        if let Some(ref email) = args.jira_email {
            self.jira.email = Some(email.clone());
        }
        if let Some(ref token) = args.jira_token {
            self.jira.token = Some(token.clone());
        }
        if let Some(ref domain) = args.jira_domain {
            self.jira.domain = Some(domain.clone());
        }

        if let Some(timeout) = args.timeout {
            self.jira.timeout_seconds = timeout;
        }
    }

    /// Resolve the three credentials, failing on the first one missing.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let email = required(&self.jira.email, "account email", "JIRA_EMAIL", "jira-email", "email")?;
        let token = required(&self.jira.token, "API token", "JIRA_TOKEN", "jira-token", "token")?;
        let domain = required(&self.jira.domain, "API domain", "JIRA_DOMAIN", "jira-domain", "domain")?;

        Credentials::new(email, token, domain)
    }

    /// Per-request timeout; zero is rejected since it would fail every request.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        match self.jira.timeout_seconds {
            0 => Err(ConfigError::InvalidTimeout(0)),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn required<'a>(
    value: &'a Option<String>,
    name: &'static str,
    env_var: &'static str,
    flag: &'static str,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingCredential {
            name,
            env_var,
            flag,
            key,
        })
}
