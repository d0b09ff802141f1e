#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod names;
pub mod period;
pub mod quarters;
pub mod rules;
pub mod segments;
pub mod series;

pub use error::{NormalizeError, Result};
pub use names::{NameResolver, canonical_company, standard_resolver};
pub use period::{AxisLayout, PeriodKey, PeriodShape, build_axis, parse_period};
pub use quarters::{
    MagnitudeSelector, QuarterHeuristicConfig, QuarterRow, QuarterRowSelector, TrailingSelector,
    assign_quarters,
};
pub use rules::KeywordRule;
pub use segments::{SegmentClassifier, is_total_label};
pub use series::{MetricSeries, Observation};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
