//! Data layer error types.

use thiserror::Error;

/// Errors raised while loading or validating bar data.
#[derive(Debug, Error)]
pub enum DataError {
    /// File could not be opened
    #[error("file not found: {0} ({1})")]
    FileNotFound(String, String),

    /// Parquet/Arrow parse failure
    #[error("parse error: {0}")]
    ParseError(String),

    /// Required column missing from the file
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Column present but of an unexpected type
    #[error("invalid column type: {0}")]
    InvalidColumnType(String),

    /// Data fails an integrity check
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// File contained no rows
    #[error("empty data")]
    EmptyData,

    /// Universe alignment failed
    #[error("alignment failure: {0}")]
    AlignmentFailure(String),

    /// Invalid date range request
    #[error("invalid range: {0}")]
    InvalidRange(String),
}
