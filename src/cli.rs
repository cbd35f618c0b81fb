//! Command-line interface argument parsing.
//!
//! This module defines the arguments of both binaries using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// bug-fetcher - download Jira issues as Markdown documents
///
/// Reads issue keys (one per line, `#` starts a comment) and writes one
/// `<KEY>.md` document per issue into the output directory.
///
/// Credentials come from flags, the JIRA_EMAIL / JIRA_TOKEN / JIRA_DOMAIN
/// environment variables, or the [jira] table of .bugdigest.toml.
///
/// Examples:
///   bug-fetcher --issue-file issues.txt --output-dir bugs_md
///   bug-fetcher --issue-file issues.txt --output-dir bugs_md --timeout 10
///   bug-fetcher --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct FetchArgs {
    /// File with one issue key per line
    #[arg(long, value_name = "FILE", required_unless_present = "init_config")]
    pub issue_file: Option<PathBuf>,

    /// Directory to write bug documents into (created if missing)
    #[arg(long, value_name = "DIR", required_unless_present = "init_config")]
    pub output_dir: Option<PathBuf>,

    /// Jira account email
    #[arg(long, value_name = "EMAIL", env = "JIRA_EMAIL")]
    pub jira_email: Option<String>,

    /// Jira API token
    #[arg(long, value_name = "TOKEN", env = "JIRA_TOKEN", hide_env_values = true)]
    pub jira_token: Option<String>,

    /// Jira base URL, e.g. https://example.atlassian.net
    #[arg(long, value_name = "URL", env = "JIRA_DOMAIN")]
    pub jira_domain: Option<String>,

    /// Per-request timeout in seconds
    ///
    /// A request that times out is skipped like any other failure.
    /// Default: from config or 30s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .bugdigest.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress bar)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .bugdigest.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// bug-analyzer - summarize a directory of bug documents
///
/// Parses every <KEY>.md document written by bug-fetcher and writes one
/// report grouping the issues by status, priority and assignee.
///
/// Examples:
///   bug-analyzer --bugs-dir bugs_md --output-file analyzer.md
///   bug-analyzer --bugs-dir bugs_md --output-file report.json --format json
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct AnalyzeArgs {
    /// Directory containing bug documents
    #[arg(long, value_name = "DIR")]
    pub bugs_dir: PathBuf,

    /// Report file to write (overwritten)
    #[arg(long, value_name = "FILE")]
    pub output_file: PathBuf,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl FetchArgs {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        match self.issue_file {
            Some(ref path) if !path.is_file() => {
                return Err(format!("Issue file does not exist: {}", path.display()));
            }
            None => return Err("--issue-file is required".to_string()),
            _ => {}
        }

        match self.output_dir {
            Some(ref path) if path.exists() && !path.is_dir() => {
                return Err(format!(
                    "Output path is not a directory: {}",
                    path.display()
                ));
            }
            None => return Err("--output-dir is required".to_string()),
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        log_level(self.verbose, self.quiet)
    }
}

impl AnalyzeArgs {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if !self.bugs_dir.exists() {
            return Err(format!(
                "Bugs directory does not exist: {}",
                self.bugs_dir.display()
            ));
        }
        if !self.bugs_dir.is_dir() {
            return Err(format!(
                "Bugs path is not a directory: {}",
                self.bugs_dir.display()
            ));
        }

        if self.output_file.is_dir() {
            return Err(format!(
                "Output file is a directory: {}",
                self.output_file.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        log_level(self.verbose, self.quiet)
    }
}

fn log_level(verbose: bool, quiet: bool) -> tracing::Level {
    if quiet {
        tracing::Level::ERROR
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    }
}
