//! Import ledger: one CSV row per processed input file.
//!
//! This is the persistence side of a run. The summary stages never touch it;
//! the caller wraps each file's run in [`record_import`].

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::pipeline::PipelineReport;

/// Processing state of an imported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportStatus {
    New,
    Success,
    Error,
}

/// A single ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLogEntry {
    pub processed_at: DateTime<Utc>,
    pub source: String,
    pub status: ImportStatus,
    pub readings: usize,
    pub averages: usize,
    /// Every message of the run, joined with `" | "`.
    pub errors: String,
}

impl ImportLogEntry {
    /// An entry for a file that has been picked up but not yet processed.
    pub fn new(source: &str, processed_at: DateTime<Utc>) -> Self {
        Self {
            processed_at,
            source: source.to_string(),
            status: ImportStatus::New,
            readings: 0,
            averages: 0,
            errors: String::new(),
        }
    }

    /// An entry for a file that could not be processed at all.
    pub fn failed(source: &str, processed_at: DateTime<Utc>, error: &str) -> Self {
        Self {
            status: ImportStatus::Error,
            errors: error.to_string(),
            ..Self::new(source, processed_at)
        }
    }

    /// An entry describing a finished pipeline run.
    pub fn from_report(source: &str, processed_at: DateTime<Utc>, report: &PipelineReport) -> Self {
        Self {
            status: report.status(),
            readings: report.parsed,
            averages: report.averages.len(),
            errors: report.error_messages().join(" | "),
            ..Self::new(source, processed_at)
        }
    }
}

/// Appends an [`ImportLogEntry`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_import_log(path: &str, entry: &ImportLogEntry) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending import log entry");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(entry)?;
    writer.flush()?;

    Ok(())
}

/// Records `source` as `New`, runs `process`, then records how it ended.
///
/// The final entry is written whether `process` succeeds or fails, so a file
/// never stays `New` once it has been picked up. Timestamps come from `clock`.
pub fn record_import<F>(
    ledger: &str,
    source: &str,
    clock: impl Fn() -> DateTime<Utc>,
    process: F,
) -> Result<PipelineReport>
where
    F: FnOnce() -> Result<PipelineReport>,
{
    append_import_log(ledger, &ImportLogEntry::new(source, clock()))?;

    let run = process();
    let entry = match &run {
        Ok(report) => ImportLogEntry::from_report(source, clock(), report),
        Err(e) => ImportLogEntry::failed(source, clock(), &e.to_string()),
    };
    append_import_log(ledger, &entry)?;

    run
}

/// Reads every entry of a ledger written by [`append_import_log`].
pub fn read_import_log(path: &str) -> Result<Vec<ImportLogEntry>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();

    for result in reader.deserialize() {
        let entry: ImportLogEntry = result?;
        entries.push(entry);
    }

    Ok(entries)
}
