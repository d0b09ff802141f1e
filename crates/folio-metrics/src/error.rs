//! Error types for derived metrics.

use thiserror::Error;

/// Result type for metric operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while building grids.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// Grid dimensions do not match the supplied keys
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// `(rows, columns)` implied by the keys
        expected: (usize, usize),
        /// `(rows, columns)` of the values
        found: (usize, usize),
    },

    /// A key appears twice on one axis
    #[error("Duplicate {axis} key: {key}")]
    DuplicateKey {
        /// `"row"` or `"column"`
        axis: &'static str,
        /// The repeated key
        key: String,
    },

    /// Unknown resampling frequency name
    #[error("Unknown frequency: {0}")]
    UnknownFrequency(String),
}
