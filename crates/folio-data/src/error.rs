//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// The workbook file or the requested sheet does not exist
    #[error("Source unavailable: {path} (sheet: {sheet})")]
    SourceUnavailable {
        /// Workbook path that was requested
        path: PathBuf,
        /// Sheet that was requested
        sheet: String,
    },

    /// A required logical column had no match after synonym resolution
    #[error("Schema mismatch in sheet {sheet}: missing {missing:?}")]
    SchemaMismatch {
        /// Sheet being loaded
        sheet: String,
        /// Logical columns that could not be resolved
        missing: Vec<String>,
    },

    /// Spreadsheet backend error
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Whether the error is contained to a single sheet rather than the whole workbook.
    pub const fn is_sheet_scoped(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. } | Self::SourceUnavailable { .. })
    }
}
