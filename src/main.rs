use anyhow::anyhow;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::error;

mod assess;
mod config;
mod domain;
mod error;
mod ingest;
mod logging;
mod output;
mod pipeline;

use crate::assess::AssessSeverity;
use crate::config::WrangleConfig;
use crate::pipeline::Assembler;

#[derive(Parser)]
#[command(name = "wrd_wrangler")]
#[command(about = "WeRateDogs tweet archive reconciliation pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full wrangle and write the master table plus its audit manifest
    Wrangle {
        /// TOML config naming sources and outputs (explicit flags override it)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Enhanced tweet archive CSV
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Image prediction table (tab-separated)
        #[arg(long)]
        predictions: Option<PathBuf>,
        /// Engagement metrics, CSV or line-delimited JSON
        #[arg(long)]
        metrics: Option<PathBuf>,
        /// Destination for the master CSV
        #[arg(long)]
        output: Option<PathBuf>,
        /// Destination for the audit manifest (defaults next to the master CSV)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Report quality issues in the raw tables without changing anything
    Assess {
        /// Enhanced tweet archive CSV
        #[arg(long)]
        archive: PathBuf,
        /// Image prediction table (tab-separated)
        #[arg(long)]
        predictions: PathBuf,
        /// Engagement metrics, CSV or line-delimited JSON
        #[arg(long)]
        metrics: PathBuf,
    },
}

struct RunPaths {
    archive: PathBuf,
    predictions: PathBuf,
    metrics: PathBuf,
    output: PathBuf,
    manifest: PathBuf,
}

fn resolve_paths(
    config: Option<&Path>,
    archive: Option<PathBuf>,
    predictions: Option<PathBuf>,
    metrics: Option<PathBuf>,
    output: Option<PathBuf>,
    manifest: Option<PathBuf>,
) -> anyhow::Result<RunPaths> {
    let (config_archive, config_predictions, config_metrics, config_output, config_manifest) =
        match config {
            Some(path) => {
                let cfg = WrangleConfig::load(path)?;
                (
                    Some(cfg.sources.archive),
                    Some(cfg.sources.predictions),
                    Some(cfg.sources.metrics),
                    Some(cfg.output.master),
                    cfg.output.manifest,
                )
            }
            None => (None, None, None, None, None),
        };

    let archive = archive
        .or(config_archive)
        .ok_or_else(|| anyhow!("no archive path: pass --archive or name it in --config"))?;
    let predictions = predictions
        .or(config_predictions)
        .ok_or_else(|| anyhow!("no predictions path: pass --predictions or name it in --config"))?;
    let metrics = metrics
        .or(config_metrics)
        .ok_or_else(|| anyhow!("no metrics path: pass --metrics or name it in --config"))?;
    let output = output
        .or(config_output)
        .ok_or_else(|| anyhow!("no output path: pass --output or name it in --config"))?;
    let manifest = manifest
        .or(config_manifest)
        .unwrap_or_else(|| output.with_extension("manifest.json"));

    Ok(RunPaths {
        archive,
        predictions,
        metrics,
        output,
        manifest,
    })
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Wrangle {
            config,
            archive,
            predictions,
            metrics,
            output,
            manifest,
        } => {
            println!("🚀 Running wrangle pipeline...");

            let paths = resolve_paths(
                config.as_deref(),
                archive,
                predictions,
                metrics,
                output,
                manifest,
            )?;

            let archive_rows = ingest::read_archive(&paths.archive)?;
            let prediction_rows = ingest::read_predictions(&paths.predictions)?;
            let metrics_rows = ingest::read_metrics(&paths.metrics)?;

            let assembler = Assembler::new();
            match assembler.run(archive_rows, prediction_rows, metrics_rows) {
                Ok(mut outcome) => {
                    if let Some(parent) = paths.output.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    let digest = output::write_master(&paths.output, &outcome.master)?;
                    outcome.manifest.output_sha256 = Some(digest);

                    if let Some(parent) = paths.manifest.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    output::write_manifest(&paths.manifest, &outcome.manifest)?;

                    println!("\n📊 Wrangle results:");
                    println!("   Master rows: {}", outcome.manifest.output_rows);
                    println!(
                        "   Retweets dropped: {}",
                        outcome.manifest.filter.retweets_dropped
                    );
                    println!(
                        "   Missing-URL rows dropped: {}",
                        outcome.manifest.filter.missing_url_dropped
                    );
                    println!(
                        "   Rows without metrics dropped: {}",
                        outcome.manifest.merge.missing_metrics_dropped
                    );
                    println!(
                        "   Ratings corrected: {}",
                        outcome.manifest.rating_corrections.len()
                    );
                    println!(
                        "   Names cleared: {}",
                        outcome.manifest.names_cleared.len()
                    );
                    println!("   Output file: {}", paths.output.display());
                    println!("   Manifest: {}", paths.manifest.display());
                    println!("\n✅ Wrangle completed successfully");
                }
                Err(e) => {
                    error!("Wrangle run failed: {}", e);
                    println!("❌ Wrangle run failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Assess {
            archive,
            predictions,
            metrics,
        } => {
            println!("🔎 Assessing raw tables...");

            let archive_rows = ingest::read_archive(&archive)?;
            let prediction_rows = ingest::read_predictions(&predictions)?;
            let metrics_rows = ingest::read_metrics(&metrics)?;

            let report = assess::assess(&archive_rows, &prediction_rows, &metrics_rows);
            if report.is_clean() {
                println!("✅ No quality issues found");
            } else {
                println!("\n📋 Assessment findings:");
                for issue in &report.issues {
                    let icon = match issue.severity {
                        AssessSeverity::Error => "❌",
                        AssessSeverity::Warning => "⚠️",
                        AssessSeverity::Info => "ℹ️",
                    };
                    println!(
                        "   {} [{}] {}: {}",
                        icon, issue.source, issue.description, issue.count
                    );
                }
                if report.has_errors() {
                    println!("\n❌ Errors present: a wrangle run would abort on these");
                }
            }
        }
    }
    Ok(())
}
