use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use cibil_core::ReportSink;
use cibil_ingest::{ExtractionResult, IngestError};
use cibil_parsing::{ExtractorConfigBuilder, ScoreExtractor};

mod output;
mod sink;

use output::ColorMode;
use sink::JsonLinesSink;

/// CIBIL score extractor - pull the credit score out of credit-report PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the score from one or more credit-report PDFs
    Check {
        /// PDF files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print one JSON object per file instead of text
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Number of leading pages to scan page by page before the whole-document scan
        #[arg(long)]
        fast_pages: Option<usize>,

        /// Do not accept unlabelled three-digit numbers as a score
        #[arg(long)]
        no_fallback: bool,

        /// Append successful results as JSON lines to this file
        #[arg(long)]
        report_log: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Check {
            files,
            json,
            no_color,
            fast_pages,
            no_fallback,
            report_log,
        } => {
            let all_ok = check(files, json, no_color, fast_pages, no_fallback, report_log).await?;
            if !all_ok {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn check(
    files: Vec<PathBuf>,
    json: bool,
    no_color: bool,
    fast_pages: Option<usize>,
    no_fallback: bool,
    report_log: Option<PathBuf>,
) -> anyhow::Result<bool> {
    let file_config = cibil_core::config_file::load_config();
    let extraction = file_config.extraction.unwrap_or_default();
    let output_config = file_config.output.unwrap_or_default();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let fast_pages = fast_pages.or_else(|| {
        std::env::var("CIBIL_FAST_PATH_PAGES")
            .ok()
            .and_then(|v| v.parse().ok())
    });
    let report_log = report_log
        .or_else(|| std::env::var("CIBIL_REPORT_LOG").ok().map(PathBuf::from))
        .or_else(|| output_config.report_log.map(PathBuf::from));
    let color = ColorMode(!no_color && !json && output_config.color.unwrap_or(true));

    let mut builder = ExtractorConfigBuilder::from_file_config(&extraction);
    if let Some(pages) = fast_pages {
        builder = builder.fast_path_pages(pages);
    }
    if no_fallback {
        builder = builder.fallback_scan(false);
    }
    let config = builder.build().context("invalid extraction config")?;
    let extractor = Arc::new(ScoreExtractor::with_config(config));

    let sink = match &report_log {
        Some(path) => Some(
            JsonLinesSink::open(path)
                .with_context(|| format!("opening report log {}", path.display()))?,
        ),
        None => None,
    };

    let spinner = if files.len() > 1 && !json {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
        pb.set_message(format!("Checking {} files...", files.len()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let mut tasks = JoinSet::new();
    for (index, path) in files.iter().cloned().enumerate() {
        let extractor = Arc::clone(&extractor);
        tasks.spawn_blocking(move || (index, cibil_ingest::extract_file(&path, &extractor)));
    }

    let mut results: Vec<Option<Result<ExtractionResult, IngestError>>> =
        (0..files.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.context("extraction task panicked")?;
        if let Some(pb) = &spinner {
            pb.inc(1);
        }
        results[index] = Some(result);
    }
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut all_ok = true;
    for (path, result) in files.iter().zip(results) {
        let name = path.display().to_string();
        match result {
            Some(Ok(result)) => {
                if json {
                    output::print_json(&mut out, &name, &result)?;
                } else {
                    output::print_result(&mut out, &name, &result, color)?;
                }
                if result.is_success() {
                    if let Some(sink) = &sink {
                        if let Err(e) = sink.record(&name, &result.report()) {
                            tracing::warn!(file = %name, error = %e, "failed to record report");
                        }
                    }
                } else {
                    all_ok = false;
                }
            }
            Some(Err(e)) => {
                all_ok = false;
                if json {
                    output::print_json_error(&mut out, &name, &e)?;
                } else {
                    output::print_error(&mut out, &name, &e.to_string(), color)?;
                }
            }
            None => all_ok = false,
        }
    }
    out.flush()?;

    Ok(all_ok)
}
