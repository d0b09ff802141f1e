//! In-memory workbook backend.

use super::{Cell, WorkbookBackend};
use crate::error::{DataError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Workbook contents held in memory, keyed by path and sheet name.
///
/// Used for fixtures and for callers that already hold sheet grids from
/// another source (for example a CSV export converted upstream).
#[derive(Debug, Default)]
pub struct InMemoryWorkbook {
    sheets: RwLock<HashMap<PathBuf, Vec<(String, Vec<Vec<Cell>>)>>>,
}

impl InMemoryWorkbook {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a sheet. Sheet order follows first insertion.
    pub fn insert_sheet(&self, path: impl Into<PathBuf>, sheet: &str, rows: Vec<Vec<Cell>>) {
        let mut sheets = self.sheets.write();
        let entry = sheets.entry(path.into()).or_default();
        if let Some(existing) = entry.iter_mut().find(|(name, _)| name == sheet) {
            existing.1 = rows;
        } else {
            entry.push((sheet.to_string(), rows));
        }
    }

    /// Convenience for building a sheet from string literals.
    ///
    /// Cells that parse as numbers become [`Cell::Number`], empty strings
    /// become [`Cell::Empty`], everything else is text.
    pub fn insert_text_sheet(&self, path: impl Into<PathBuf>, sheet: &str, rows: &[&[&str]]) {
        let grid = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|raw| {
                        if raw.is_empty() {
                            Cell::Empty
                        } else if let Ok(n) = raw.parse::<f64>() {
                            Cell::Number(n)
                        } else {
                            Cell::Text((*raw).to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        self.insert_sheet(path, sheet, grid);
    }
}

impl WorkbookBackend for InMemoryWorkbook {
    fn sheet_names(&self, path: &Path) -> Result<Vec<String>> {
        self.sheets
            .read()
            .get(path)
            .map(|sheets| sheets.iter().map(|(name, _)| name.clone()).collect())
            .ok_or_else(|| DataError::SourceUnavailable {
                path: path.to_path_buf(),
                sheet: "*".to_string(),
            })
    }

    fn read_sheet(&self, path: &Path, sheet: &str) -> Result<Vec<Vec<Cell>>> {
        self.sheets
            .read()
            .get(path)
            .and_then(|sheets| sheets.iter().find(|(name, _)| name == sheet))
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| DataError::SourceUnavailable {
                path: path.to_path_buf(),
                sheet: sheet.to_string(),
            })
    }
}
