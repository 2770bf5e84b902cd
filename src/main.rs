//! CLI entry point for the sensor summary tool.
//!
//! Provides subcommands for summarizing reading files into per-province
//! averages and for checking a file's readings without aggregating them.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sensor_summary::{
    output::export_to,
    parser::import,
    pipeline::{self, PipelineReport, RunOutcome},
    reading::normalize_all,
    store::record_import,
};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sensor_summary")]
#[command(about = "Summarize sensor reading files into per-province averages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize one or more reading files
    Summarize {
        /// Reading files to process, each one independently
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Directory to write `<name>_summary.csv` files to (stdout when omitted)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// CSV ledger recording the status of every processed file
        #[arg(long, env = "SENSOR_SUMMARY_LEDGER")]
        ledger: Option<String>,

        /// Also log the full run report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Parse and validate a reading file, reporting every problem found
    Validate {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/sensor_summary.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("sensor_summary.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summarize {
            inputs,
            output_dir,
            ledger,
            json,
        } => {
            if let Some(dir) = &output_dir {
                std::fs::create_dir_all(dir)?;
            }

            let mut failed = 0;
            for input in &inputs {
                let output_dir = output_dir.as_deref();
                if let Err(e) = summarize_file(input, output_dir, ledger.as_deref(), json) {
                    error!(input = %input.display(), error = %e, "File could not be processed");
                    failed += 1;
                }
            }

            info!(files = inputs.len(), failed, "Finished processing all files");
            if failed > 0 {
                anyhow::bail!("{failed} of {} files could not be processed", inputs.len());
            }
        }
        Commands::Validate { input } => {
            validate_file(&input)?;
        }
    }

    Ok(())
}

/// Runs the pipeline over one file, writes its summary and records it in the ledger.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
fn summarize_file(
    input: &Path,
    output_dir: Option<&Path>,
    ledger: Option<&str>,
    json: bool,
) -> Result<()> {
    let source = input.display().to_string();
    let process = || pipeline::run_path(input);

    let report = match ledger {
        Some(ledger) => record_import(ledger, &source, Utc::now, process),
        None => process(),
    }
    .with_context(|| format!("processing {source}"))?;

    if json {
        info!("{}", serde_json::to_string_pretty(&report)?);
    }

    match report.outcome() {
        RunOutcome::NoReadings => warn!("No readings found, skipping file"),
        RunOutcome::NoValidReadings => warn!("No valid readings found, skipping file"),
        RunOutcome::NoAverages => warn!("No consistent groups found, skipping file"),
        RunOutcome::Summarized => write_summary(input, output_dir, &report)?,
    }

    Ok(())
}

fn write_summary(input: &Path, output_dir: Option<&Path>, report: &PipelineReport) -> Result<()> {
    match output_dir {
        Some(dir) => {
            let stem = input
                .file_stem()
                .and_then(OsStr::to_str)
                .unwrap_or("readings");
            let path = dir.join(format!("{stem}_summary.csv"));
            export_to(&report.averages, File::create(&path)?)?;
            info!(path = %path.display(), rows = report.averages.len(), "Summary written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            export_to(&report.averages, &mut stdout)?;
        }
    }
    Ok(())
}

/// Imports and normalizes one file, logging every parse and validation problem.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
fn validate_file(input: &Path) -> Result<()> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let imported = import(BufReader::new(file))?;

    for message in &imported.errors {
        warn!(error = %message, "Row could not be parsed");
    }

    let normalized = normalize_all(imported.readings);
    for rejected in &normalized.rejected {
        for message in rejected.violations.messages() {
            warn!(
                sensor_id = rejected.sensor_id,
                station_id = rejected.station_id,
                violation = %message,
                "Reading rejected"
            );
        }
    }

    info!(
        parse_errors = imported.errors.len(),
        valid = normalized.readings.len(),
        rejected = normalized.rejected.len(),
        "Validation complete"
    );
    Ok(())
}
