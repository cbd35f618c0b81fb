//! bug-analyzer - summarize a directory of bug documents
//!
//! Exit codes:
//!   0 - Report written (unparseable documents are listed, not fatal)
//!   1 - Setup error (missing directory, report not writable)

use anyhow::Result;
use bugdigest::analysis::{analyze_directory, generate_summary_text};
use bugdigest::cli::{AnalyzeArgs, OutputFormat};
use bugdigest::models::Dimension;
use bugdigest::report::{generate_json_report, generate_markdown_report, write_report};
use std::time::Instant;
use tracing::{debug, error, info};

fn main() {
    // Parse command-line arguments
    let args = AnalyzeArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    bugdigest::init_logging(args.log_level());

    info!("bug-analyzer v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_analysis(&args) {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Run the complete analysis workflow.
fn run_analysis(args: &AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    println!("🔍 Scanning bug documents in {}", args.bugs_dir.display());
    let report = analyze_directory(&args.bugs_dir, Some(&args.output_file))?;

    println!("\n📝 Generating report...");
    let output = match args.format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Markdown => generate_markdown_report(&report),
    };
    write_report(&output, &args.output_file)?;

    let metadata = &report.metadata;
    println!("\n📊 Analysis Summary:");
    println!("   Documents scanned: {}", metadata.documents_scanned);
    println!("   Documents parsed: {}", metadata.documents_parsed);
    if metadata.documents_failed > 0 {
        println!("   Documents failed: {}", metadata.documents_failed);
    }
    if let Some(by_status) = report.grouping(Dimension::Status) {
        for line in generate_summary_text(by_status).lines() {
            println!("   {}", line);
        }
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        args.output_file.display()
    );

    Ok(())
}
