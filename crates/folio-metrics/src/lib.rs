#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod delta;
pub mod error;
pub mod heatmap;
pub mod pivot;
pub mod prices;

pub use delta::{
    AnnualTableRow, DeltaKind, DerivedMetric, MetricSummary, annual_table, delta, derive_series,
    metric_history, summarize, yoy_column,
};
pub use error::{MetricsError, Result};
pub use heatmap::{
    metric_heatmap, quarterly_metric_heatmap, quarterly_segment_heatmap, segment_heatmap,
    stock_heatmap,
};
pub use pivot::{Aggregation, GridMode, Pivot};
pub use prices::{Frequency, ResampledPrice, filter_for_company, resample};

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
