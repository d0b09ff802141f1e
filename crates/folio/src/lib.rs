#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dataset;
pub mod error;

// Re-export the pipeline crates
pub use folio_data as data;
pub use folio_metrics as metrics;
pub use folio_normalize as normalize;
pub use folio_output as output;

pub use config::{DEFAULT_WORKBOOKS, FolioConfig, WORKBOOK_ENV};
pub use dataset::Dataset;
pub use error::{FolioError, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
