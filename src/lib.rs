//! Sensor reading summaries.
//!
//! Imports delimited air-quality sensor files, validates and normalizes each
//! reading, groups readings by province, sensor type and unit, and exports the
//! per-group averages as CSV.

pub mod error;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod reading;
pub mod store;
pub mod summary;
pub mod validate;

pub use error::{Error, Outcome, Result, Violations};
