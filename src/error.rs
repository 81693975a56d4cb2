//! Error types for mailbox statistics

use thiserror::Error;

/// Errors that can occur while setting up or feeding an analysis run.
///
/// The statistics computations themselves never fail; these cover the
/// driver and the mail source surface around them.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A date string did not match the expected `DD-MM-YYYY` format
    #[error("Invalid date '{input}': expected DD-MM-YYYY (e.g. 01-03-2025)")]
    InvalidDate { input: String },

    /// End date lies before start date
    #[error("End date {end} is before start date {start}")]
    InvalidRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// The mail store could not be opened
    #[error("Mail source unavailable: {0}")]
    Source(String),

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration in {path}: {details}")]
    Config { path: String, details: String },

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for mailbox statistics operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// A single message field the mail source could not provide.
///
/// Field failures never abort a record; the normalizer substitutes the
/// zero value and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Field '{field}' unavailable: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// The field is simply absent from the message
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::new(field, "not present")
    }
}
