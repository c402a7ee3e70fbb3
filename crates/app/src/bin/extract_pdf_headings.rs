use chrono::Utc;
use clap::Parser;
use pdf_outline_core::{generate_dataset, FuzzyHeadingMatcher, LopdfLineExtractor, MatchOptions};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build a labelled heading dataset (CSV) from PDFs and their ground-truth
/// outlines (`<name>.json` next to each `<name>.pdf`).
#[derive(Parser)]
#[command(name = "extract_pdf_headings", version)]
struct Cli {
    /// Folder with PDFs and optional ground-truth JSON files.
    input_dir: PathBuf,

    /// CSV file to write.
    output_csv: PathBuf,

    /// Minimum similarity ratio for a line to match a ground-truth heading.
    #[arg(long, env = "SIMILARITY_THRESHOLD", default_value_t = MatchOptions::default().similarity_threshold)]
    similarity_threshold: f64,
}

fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    if !(0.0..=1.0).contains(&cli.similarity_threshold) {
        anyhow::bail!(
            "similarity threshold must be between 0 and 1, got {}",
            cli.similarity_threshold
        );
    }

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "extract_pdf_headings boot"
    );

    let matcher = FuzzyHeadingMatcher::from(MatchOptions {
        similarity_threshold: cli.similarity_threshold,
    });
    let report = generate_dataset(&cli.input_dir, &cli.output_csv, &LopdfLineExtractor, &matcher)
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    for skipped in &report.skipped_files {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
    }

    info!(
        documents = report.documents,
        rows = report.rows_written,
        skipped = report.skipped_files.len(),
        "dataset written"
    );
    println!("Saved to {}", cli.output_csv.display());

    Ok(())
}
