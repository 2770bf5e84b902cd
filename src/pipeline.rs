//! Runs one input through every stage and reports what happened.
//!
//! This is the only place in the library that logs; the stages themselves
//! just return data and messages.

use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::parser::import;
use crate::reading::{RejectedReading, normalize_all};
use crate::store::ImportStatus;
use crate::summary::{AverageProvinceData, GroupFailure, aggregate_all, group};

/// How far a run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// The file had no parseable data rows.
    NoReadings,
    /// Rows were parsed but none passed validation.
    NoValidReadings,
    /// Readings were valid but every group failed its consistency check.
    NoAverages,
    Summarized,
}

/// Everything a single run produced, successful or not.
#[derive(Debug, Default, Serialize)]
pub struct PipelineReport {
    pub parsed: usize,
    pub parse_errors: Vec<String>,
    pub rejected: Vec<RejectedReading>,
    pub group_failures: Vec<GroupFailure>,
    pub averages: Vec<AverageProvinceData>,
}

impl PipelineReport {
    pub fn outcome(&self) -> RunOutcome {
        if self.parsed == 0 {
            RunOutcome::NoReadings
        } else if self.rejected.len() == self.parsed {
            RunOutcome::NoValidReadings
        } else if self.averages.is_empty() {
            RunOutcome::NoAverages
        } else {
            RunOutcome::Summarized
        }
    }

    /// Ledger status for this run: `Success` whenever averages were produced.
    pub fn status(&self) -> ImportStatus {
        match self.outcome() {
            RunOutcome::Summarized => ImportStatus::Success,
            _ => ImportStatus::Error,
        }
    }

    /// Parse, validation and consistency messages, in stage order.
    pub fn error_messages(&self) -> Vec<String> {
        let rejected = self.rejected.iter().flat_map(|r| {
            r.violations
                .messages()
                .iter()
                .map(move |m| format!("Sensor {} at station {}: {}", r.sensor_id, r.station_id, m))
        });
        let groups = self.group_failures.iter().flat_map(|g| {
            g.violations
                .messages()
                .iter()
                .map(move |m| format!("Group {}/{}: {}", g.province, g.sensor_type_name, m))
        });

        self.parse_errors
            .iter()
            .cloned()
            .chain(rejected)
            .chain(groups)
            .collect()
    }
}

/// Imports `source`, normalizes, groups and aggregates its readings.
///
/// # Errors
///
/// Only structural failures are returned as errors (bad header, I/O). Bad
/// rows, invalid readings and inconsistent groups end up in the report.
pub fn run<R: Read + Seek>(source: R) -> Result<PipelineReport> {
    let imported = import(source)?;
    let mut report = PipelineReport {
        parsed: imported.readings.len(),
        parse_errors: imported.errors,
        ..Default::default()
    };
    info!(
        parsed = report.parsed,
        parse_errors = report.parse_errors.len(),
        "Import finished"
    );
    for message in &report.parse_errors {
        debug!(error = %message, "Row skipped");
    }

    if report.parsed == 0 {
        warn!("No readings in input");
        return Ok(report);
    }

    let normalized = normalize_all(imported.readings);
    report.rejected = normalized.rejected;
    info!(
        valid = normalized.readings.len(),
        rejected = report.rejected.len(),
        "Validation finished"
    );
    for rejected in &report.rejected {
        debug!(
            sensor_id = rejected.sensor_id,
            station_id = rejected.station_id,
            violations = %rejected.violations,
            "Reading rejected"
        );
    }

    if normalized.readings.is_empty() {
        warn!("No valid readings in input");
        return Ok(report);
    }

    let groups = group(normalized.readings);
    let (averages, failures) = aggregate_all(&groups);
    report.averages = averages;
    report.group_failures = failures;

    for failure in &report.group_failures {
        warn!(
            province = %failure.province,
            sensor = %failure.sensor_type_name,
            violations = %failure.violations,
            "Group not aggregated"
        );
    }
    info!(
        groups = groups.len(),
        averages = report.averages.len(),
        "Aggregation finished"
    );

    Ok(report)
}

/// Opens the file at `path` and runs it through [`run`].
pub fn run_path(path: &Path) -> Result<PipelineReport> {
    let file = File::open(path)?;
    run(BufReader::new(file))
}
