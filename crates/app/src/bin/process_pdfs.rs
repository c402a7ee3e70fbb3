use chrono::Utc;
use clap::Parser;
use pdf_outline_core::{
    process_folder, LopdfLineExtractor, ModelBundle, ModelPaths, OutlineExtractor,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Write a `{title, outline}` JSON file for every PDF in a folder.
#[derive(Parser)]
#[command(name = "process_pdfs", version)]
struct Cli {
    /// Folder that contains the PDFs.
    #[arg(long, env = "INPUT_DIR", default_value = "input")]
    input: PathBuf,

    /// Folder that receives one JSON outline per PDF.
    #[arg(long, env = "OUTPUT_DIR", default_value = "output")]
    output: PathBuf,

    /// Heading/non-heading forest model.
    #[arg(long, env = "HEADING_MODEL_PATH", default_value_os_t = ModelPaths::default().heading)]
    heading_model: PathBuf,

    /// Heading level forest model.
    #[arg(long, env = "LEVEL_MODEL_PATH", default_value_os_t = ModelPaths::default().level)]
    level_model: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "process_pdfs boot"
    );

    let models = ModelBundle::load(&ModelPaths {
        heading: cli.heading_model,
        level: cli.level_model,
    })
    .map_err(|error| anyhow::anyhow!(error.to_string()))?;
    let extractor = OutlineExtractor::new(LopdfLineExtractor, models);

    let report = process_folder(&cli.input, &cli.output, &extractor)
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    if !report.skipped_files.is_empty() {
        warn!(
            "skipped_files={} for folder={}",
            report.skipped_files.len(),
            cli.input.display()
        );
        for skipped in &report.skipped_files {
            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
        }
    }

    for target in &report.written {
        println!("Processed {}", target.display());
    }
    info!(
        written = report.written.len(),
        skipped = report.skipped_files.len(),
        "outlines written"
    );

    Ok(())
}
