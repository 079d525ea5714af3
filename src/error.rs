//! Error types for the feature pipeline.
//!
//! Only contract violations are errors. Short window history, an undefined
//! previous close or a zero-variance denominator are not errors: they resolve
//! to the missing sentinel inside the feature columns.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised when the caller breaks the input contract.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A required base column is absent from the input table
    #[error("missing required column {0}")]
    MissingColumn(String),

    /// A base column holds a value that is not a finite number
    #[error("column {column} holds a non-numeric value at row {row}")]
    NonNumeric { column: String, row: usize },

    /// A timestamp cell could not be read as a calendar date
    #[error("invalid timestamp at row {row}")]
    InvalidTimestamp { row: usize },

    /// Two rows share the same timestamp after normalization
    #[error("duplicate timestamp {timestamp} at row {row}")]
    DuplicateTimestamp { timestamp: NaiveDate, row: usize },

    /// Timestamps decrease at the given row
    #[error("timestamps are not ascending at row {row}")]
    NonMonotonic { row: usize },

    /// A window parameter is not a positive integer
    #[error("window {name} must be a positive integer, got {value}")]
    InvalidWindow { name: String, value: usize },

    /// Trend windows are not strictly ordered fast < mid < slow
    #[error("trend windows must satisfy fast < mid < slow, got {fast}/{mid}/{slow}")]
    WindowOrder { fast: usize, mid: usize, slow: usize },

    /// Two features would be written under the same column name
    #[error("duplicate feature column {0}")]
    DuplicateColumn(String),

    /// A feature column does not match the table height
    #[error("column {column} has {actual} rows, table has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "frame")]
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FeatureError>;
