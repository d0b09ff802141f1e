#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod columns;
pub mod error;
pub mod loader;
pub mod records;
pub mod sheets;
pub mod store;
pub mod table;
pub mod workbook;

pub use cache::{CacheConfig, CacheKey, CacheStats, SourceCache};
pub use columns::LogicalColumn;
pub use error::{DataError, Result};
pub use loader::SourceLoader;
pub use records::{
    AdRevenueRow, AnnualMetricsRow, CompanyInsight, EmployeeRow, MetricKey, MetricValues,
    MoneySupplyPoint, PricePoint, QuarterlyMetricsRow, QuarterlySegmentRow, SegmentInsight,
    SegmentRevenueRow,
};
pub use sheets::SheetReader;
pub use store::{ObservationStore, StoredObservation};
pub use table::RawTable;
pub use workbook::{CalamineBackend, Cell, InMemoryWorkbook, WorkbookBackend};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
