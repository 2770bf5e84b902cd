//! Error types shared by every stage of the summary pipeline.
//!
//! [`Error`] covers structural failures that stop a run (a bad header, an I/O
//! fault). Expected problems with individual readings or groups are reported
//! as [`Violations`] instead and never abort the remaining work.

use serde::Serialize;
use std::fmt;

/// Result type alias for structural failures.
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a domain operation: a value, or the ordered list of rules it broke.
pub type Outcome<T> = std::result::Result<T, Violations>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The first line of the input does not name the expected columns.
    #[error("Invalid header values.")]
    InvalidHeader,

    /// An export was requested with nothing to export.
    #[error("Cannot export an empty list of averages.")]
    EmptyExport,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A non-empty, ordered list of human-readable violation messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<String>);

impl Violations {
    /// Wraps `messages`, or returns `None` when there is nothing to report.
    pub fn from_messages(messages: Vec<String>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self(messages))
        }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for symmetry with [`Violations::len`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.0.iter().any(|m| m == message)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl std::error::Error for Violations {}
