//! Error handling for the vacancy pipeline.
//!
//! Row-level problems (`MalformedRow`, `MalformedDate`, `MissingRate`) are
//! recoverable: the offending row is dropped and the run continues. Everything
//! else aborts the run without producing projections.

pub mod util;

use std::{io, path::PathBuf};

/// Specialized error type for the vacancy pipeline
#[derive(Debug, thiserror::Error)]
pub enum VacancyError {
    /// A row is missing a required field, has the wrong arity, or carries an
    /// unparseable salary
    #[error("Malformed row: {0}")]
    MalformedRow(String),

    /// The posting date does not start with a four digit year
    #[error("Malformed date: '{0}'")]
    MalformedDate(String),

    /// The currency code is absent from the currency table
    #[error("Unknown currency: '{0}'")]
    UnknownCurrency(String),

    /// The rate history knows the currency but has no quote for the month
    #[error("No {code} rate recorded for {month}")]
    MissingRate {
        /// Currency code
        code: String,
        /// Publication month, `YYYY-MM`
        month: String,
    },

    /// The CSV header lacks a required column
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Name of the absent column
        column: String,
    },

    /// A partition file holds records from more than one year
    #[error("Partition {} mixes years {expected} and {found}", .path.display())]
    PartitionMismatch {
        /// Partition file
        path: PathBuf,
        /// Year of the first record in the partition
        expected: i32,
        /// Conflicting year
        found: i32,
    },

    /// Two partitions produced a summary for the same year
    #[error("Year {0} was produced by more than one partition")]
    PartitionOverlap(i32),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error decoding JSON configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl VacancyError {
    /// Whether the error only disqualifies a single row
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedRow(_) | Self::MalformedDate(_) | Self::MissingRate { .. }
        )
    }
}

/// Result type for vacancy pipeline operations
pub type Result<T> = std::result::Result<T, VacancyError>;
