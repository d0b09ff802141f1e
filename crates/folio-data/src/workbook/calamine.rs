//! Calamine-backed workbook reader for `.xlsx`, `.xls` and `.ods` files.

use super::{Cell, WorkbookBackend};
use crate::error::{DataError, Result};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

/// Reads workbooks from disk with calamine.
///
/// Each call opens the file afresh; memoization is the job of
/// [`SourceCache`](crate::cache::SourceCache), which keys on the file's
/// modification time.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalamineBackend;

impl CalamineBackend {
    /// Create a new backend.
    pub const fn new() -> Self {
        Self
    }

    fn convert_value(data: &Data) -> Cell {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }

    fn ensure_exists(path: &Path, sheet: &str) -> Result<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(DataError::SourceUnavailable {
                path: path.to_path_buf(),
                sheet: sheet.to_string(),
            })
        }
    }
}

impl WorkbookBackend for CalamineBackend {
    fn sheet_names(&self, path: &Path) -> Result<Vec<String>> {
        Self::ensure_exists(path, "*")?;
        let workbook = open_workbook_auto(path)?;
        Ok(workbook.sheet_names().to_vec())
    }

    fn read_sheet(&self, path: &Path, sheet: &str) -> Result<Vec<Vec<Cell>>> {
        Self::ensure_exists(path, sheet)?;
        let mut workbook = open_workbook_auto(path)?;
        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(DataError::SourceUnavailable {
                path: path.to_path_buf(),
                sheet: sheet.to_string(),
            });
        }

        let range = workbook.worksheet_range(sheet)?;
        let rows: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(Self::convert_value).collect())
            .collect();

        debug!(sheet, rows = rows.len(), "read sheet from workbook");
        Ok(rows)
    }
}
