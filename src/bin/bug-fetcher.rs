//! bug-fetcher - download Jira issues as Markdown documents
//!
//! Exit codes:
//!   0 - Run completed (individual issues may have been skipped)
//!   1 - Setup error (missing issue file, missing credentials, bad config)

use anyhow::{Context, Result};
use bugdigest::cli::FetchArgs;
use bugdigest::config::{Config, DEFAULT_CONFIG_FILE};
use bugdigest::fetcher::{fetch_all, FetchOptions, FetchSummary};
use bugdigest::jira::JiraClient;
use bugdigest::keys::load_issue_keys;
use std::path::Path;
use tracing::{debug, error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = FetchArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    bugdigest::init_logging(args.log_level());

    info!("bug-fetcher v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_fetch(&args).await {
        error!("Fetch failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .bugdigest.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Add email, token and domain under [jira], or export JIRA_EMAIL, JIRA_TOKEN and JIRA_DOMAIN.");
    Ok(())
}

/// Run the complete fetch workflow.
async fn run_fetch(args: &FetchArgs) -> Result<()> {
    let issue_file = args
        .issue_file
        .as_deref()
        .context("--issue-file is required")?;
    let output_dir = args
        .output_dir
        .as_deref()
        .context("--output-dir is required")?;

    // Configuration and credentials are resolved before any request
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    let credentials = config
        .credentials()
        .context("Jira credentials are not configured")?;
    let timeout = config.timeout()?;
    debug!("Using {:?}", credentials);

    let keys = load_issue_keys(issue_file)?;

    println!(
        "📥 Fetching {} issues from {}",
        keys.len(),
        credentials.domain
    );
    println!("   Output: {}", output_dir.display());
    println!("   Timeout: {}s per request\n", config.jira.timeout_seconds);

    let client = JiraClient::new(credentials, timeout).context("Failed to create HTTP client")?;

    let options = FetchOptions {
        output_dir: output_dir.to_path_buf(),
        show_progress: !args.quiet,
    };
    let summary = fetch_all(&client, &keys, &options).await?;

    print_summary(&summary, output_dir);
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &FetchArgs) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Ok(Config::load(config_path)?);
    }

    // Try default location; a file that exists but does not parse is fatal
    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn print_summary(summary: &FetchSummary, output_dir: &Path) {
    println!("\n📊 Fetch Summary:");
    println!(
        "   Written: {} | Skipped: {}",
        summary.written.len(),
        summary.skipped.len()
    );

    if summary.written.is_empty() {
        println!("   No bug data processed.");
    } else {
        println!("\n   Bug Status Summary:");
        for (status, count) in summary.status_counts() {
            println!("   - {}: {}", status, count);
        }
    }

    if !summary.skipped.is_empty() {
        println!("\n⚠️  Skipped issues:");
        for skipped in &summary.skipped {
            println!("   - {}: {}", skipped.key, skipped.reason);
        }
    }

    println!(
        "\n✅ Fetch complete! Documents saved to: {}",
        output_dir.display()
    );
}
