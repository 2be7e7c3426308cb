use std::path::PathBuf;

use thiserror::Error;

/// A date field that matched none of the accepted formats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column '{column}': cannot parse '{value}' as a month/day/year date")]
pub struct DateParseError {
    pub column: &'static str,
    pub value: String,
}

/// Why a single row could not be turned into an order record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error(transparent)]
    Date(#[from] DateParseError),

    #[error("column 'Sales': '{value}' is not a non-negative amount")]
    InvalidSales { value: String },

    #[error("column '{column}' is empty")]
    MissingField { column: &'static str },
}

/// Fatal dataset load failure.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("reading parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading arrow data")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("column '{column}' has unsupported type {found}")]
    UnsupportedColumnType { column: String, found: String },

    #[error("line {line}")]
    Row {
        line: u64,
        #[source]
        source: RowError,
    },
}
