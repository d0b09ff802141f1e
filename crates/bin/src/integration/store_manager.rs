//! Observation store access for the CLI.
//!
//! The store lives under the platform cache directory unless a path is given:
//! - Linux: `~/.cache/folio/`
//! - macOS: `~/Library/Caches/folio/`
//! - Windows: `%LOCALAPPDATA%\folio\`

use folio::data::store::StoreStats;
use std::path::{Path, PathBuf};

/// Store path from the CLI flag, else the configured default.
pub(crate) fn store_path(flag: Option<PathBuf>, config: &folio::FolioConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.store_path())
}

/// Print store location and totals.
pub(crate) fn print_store_info(path: &Path, stats: &StoreStats) {
    println!("Store: {}", path.display());
    println!(
        "  {} observations, {} entities, {} metrics",
        stats.observations, stats.entities, stats.metrics
    );
}
