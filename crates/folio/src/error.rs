//! Error types for dataset assembly.

use folio_data::DataError;
use folio_output::ExportError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Errors that can occur while assembling or persisting a dataset.
#[derive(Debug, Error)]
pub enum FolioError {
    /// No workbook path was configured and none of the defaults exist
    #[error("No workbook found; pass a path or set FINANCIAL_DATA_XLSX")]
    WorkbookNotFound,

    /// A configured workbook path does not exist
    #[error("Workbook does not exist: {0}")]
    MissingWorkbook(PathBuf),

    /// Data layer error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Export error
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}
