//! Engine errors: argument validation failures surfaced to the driver.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid field dimensions: {rows} rows x {columns} columns (both must be at least 1)")]
    InvalidDimensions { rows: usize, columns: usize },

    #[error("malformed contents: {reason}")]
    MalformedContents { reason: String },

    #[error("unknown jewel {symbol:?} at row {row}, column {column}")]
    UnknownJewel {
        row: usize,
        column: usize,
        symbol: char,
    },

    #[error("column {column} out of range (field has {columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },
}

impl EngineError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedContents {
            reason: reason.into(),
        }
    }
}
