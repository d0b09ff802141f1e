//! Error types for normalization.

use thiserror::Error;

/// Result type for normalization operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Errors raised by the fallible normalization APIs.
///
/// The pipeline itself drops unparseable rows instead of failing; these
/// errors only reach callers of the explicit `FromStr` and validation entry
/// points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// A period label matched none of the accepted shapes
    #[error("Unparseable period label: {0:?}")]
    UnparseablePeriod(String),

    /// A quarter number outside 1..=4
    #[error("Invalid quarter {0}, expected 1..=4")]
    InvalidQuarter(u8),

    /// A rule table entry with no keywords
    #[error("Rule for {company} producing {output:?} has no keywords")]
    EmptyRule {
        /// Company the rule belongs to
        company: String,
        /// Output of the offending rule
        output: String,
    },
}
