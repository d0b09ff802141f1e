//! Engine configuration and workbook discovery.

use folio_data::CacheConfig;
use folio_normalize::QuarterHeuristicConfig;
use folio_output::ColorConfig;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the workbook.
pub const WORKBOOK_ENV: &str = "FINANCIAL_DATA_XLSX";

/// Workbook locations tried, in order, when nothing is configured.
pub const DEFAULT_WORKBOOKS: [&str; 2] = [
    "attached_assets/Earnings + stocks  copy.xlsx",
    "Earnings + stocks  copy.xlsx",
];

/// Configuration for [`crate::Dataset`] and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Explicit workbook path
    pub workbook: Option<PathBuf>,
    /// Parsed-sheet cache sizing
    pub cache: CacheConfig,
    /// SQLite store location (default: `<cache dir>/folio/folio.db`)
    pub store_path: Option<PathBuf>,
    /// Quarter inference tuning
    pub quarters: QuarterHeuristicConfig,
    /// Segment colour tuning
    pub colors: ColorConfig,
}

impl FolioConfig {
    /// Config pointing at an explicit workbook.
    pub fn with_workbook(path: impl Into<PathBuf>) -> Self {
        Self {
            workbook: Some(path.into()),
            ..Self::default()
        }
    }

    /// Workbook to load: explicit path, then [`WORKBOOK_ENV`], then the first
    /// existing default relative to the working directory.
    pub fn resolve_workbook(&self) -> Option<PathBuf> {
        self.resolve_workbook_in(std::env::var_os(WORKBOOK_ENV), Path::new("."))
    }

    fn resolve_workbook_in(&self, env_value: Option<OsString>, base: &Path) -> Option<PathBuf> {
        if let Some(path) = &self.workbook {
            return Some(path.clone());
        }
        if let Some(value) = env_value.filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(value));
        }
        DEFAULT_WORKBOOKS
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|path| path.is_file())
    }

    /// SQLite store location.
    pub fn store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("folio")
                .join("folio.db")
        })
    }
}
