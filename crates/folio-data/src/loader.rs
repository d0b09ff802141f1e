//! Sheet loading with column resolution and memoization.

use crate::cache::{CacheKey, SourceCache, file_mtime};
use crate::columns::{LogicalColumn, resolve_columns};
use crate::error::{DataError, Result};
use crate::table::RawTable;
use crate::workbook::{CalamineBackend, Cell, WorkbookBackend};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache column marker for loads that keep every source column.
const ALL_COLUMNS: &str = "*";

/// Loads sheets through a backend and a shared [`SourceCache`].
#[derive(Debug)]
pub struct SourceLoader<B: WorkbookBackend = CalamineBackend> {
    backend: B,
    cache: Arc<SourceCache>,
}

impl SourceLoader<CalamineBackend> {
    /// Loader reading real workbook files.
    pub fn new(cache: Arc<SourceCache>) -> Self {
        Self::with_backend(CalamineBackend::new(), cache)
    }
}

impl<B: WorkbookBackend> SourceLoader<B> {
    /// Loader over an arbitrary backend.
    pub const fn with_backend(backend: B, cache: Arc<SourceCache>) -> Self {
        Self { backend, cache }
    }

    /// The cache this loader publishes into.
    pub fn cache(&self) -> &Arc<SourceCache> {
        &self.cache
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Load `sheet` restricted to `columns`.
    ///
    /// # Errors
    /// - [`DataError::SourceUnavailable`] if the file or sheet is missing
    /// - [`DataError::SchemaMismatch`] if a required column has no match
    pub fn try_load(
        &self,
        path: &Path,
        sheet: &str,
        columns: &[LogicalColumn],
    ) -> Result<Arc<RawTable>> {
        let key = CacheKey::for_columns(path.to_path_buf(), sheet, columns, file_mtime(path));
        if let Some(table) = self.cache.get(&key) {
            return Ok(table);
        }

        let grid = self.backend.read_sheet(path, sheet)?;
        let (headers, body) = split_header(grid);
        let resolution = resolve_columns(&headers, columns);
        if !resolution.is_complete() {
            return Err(DataError::SchemaMismatch {
                sheet: sheet.to_string(),
                missing: resolution.missing,
            });
        }

        let rows: Vec<Vec<Cell>> = body
            .into_iter()
            .filter(|row| !row.iter().all(Cell::is_empty))
            .map(|row| {
                resolution
                    .indices
                    .iter()
                    .map(|idx| idx.and_then(|i| row.get(i).cloned()).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        let table = Arc::new(RawTable {
            sheet: sheet.to_string(),
            columns: columns.iter().map(|c| c.name.to_string()).collect(),
            rows,
        });
        debug!(sheet, rows = table.len(), "parsed sheet");
        self.cache.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Load every column of `sheet`, keeping the source headers as column names.
    pub fn try_load_all(&self, path: &Path, sheet: &str) -> Result<Arc<RawTable>> {
        let key = CacheKey::new(path.to_path_buf(), sheet, &[ALL_COLUMNS], file_mtime(path));
        if let Some(table) = self.cache.get(&key) {
            return Ok(table);
        }

        let grid = self.backend.read_sheet(path, sheet)?;
        let (headers, body) = split_header(grid);
        let width = headers.len();
        let rows: Vec<Vec<Cell>> = body
            .into_iter()
            .filter(|row| !row.iter().all(Cell::is_empty))
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        let table = Arc::new(RawTable {
            sheet: sheet.to_string(),
            columns: headers,
            rows,
        });
        self.cache.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// [`try_load`](Self::try_load) with failures contained to an empty table.
    pub fn load(&self, path: &Path, sheet: &str, columns: &[LogicalColumn]) -> Arc<RawTable> {
        self.try_load(path, sheet, columns)
            .unwrap_or_else(|err| degraded(sheet, &err))
    }

    /// [`try_load_all`](Self::try_load_all) with failures contained to an empty table.
    pub fn load_all(&self, path: &Path, sheet: &str) -> Arc<RawTable> {
        self.try_load_all(path, sheet)
            .unwrap_or_else(|err| degraded(sheet, &err))
    }

    /// Sheet names of the workbook, empty if it cannot be opened.
    pub fn sheet_names(&self, path: &Path) -> Vec<String> {
        self.backend.sheet_names(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "cannot list workbook sheets");
            Vec::new()
        })
    }
}

fn degraded(sheet: &str, err: &DataError) -> Arc<RawTable> {
    warn!(sheet, error = %err, "sheet load failed, continuing with empty table");
    Arc::new(RawTable::empty(sheet))
}

/// Split a grid into trimmed header names and data rows.
fn split_header(grid: Vec<Vec<Cell>>) -> (Vec<String>, Vec<Vec<Cell>>) {
    let mut rows = grid.into_iter();
    let headers = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_text().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    (headers, rows.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::InMemoryWorkbook;
    use std::path::PathBuf;

    const COMPANY: LogicalColumn = LogicalColumn::required("company", &["name"]);
    const YEAR: LogicalColumn = LogicalColumn::required("year", &[]);
    const EMPLOYEES: LogicalColumn = LogicalColumn::required("employees", &["employee count"]);

    fn loader() -> SourceLoader<InMemoryWorkbook> {
        let backend = InMemoryWorkbook::new();
        backend.insert_text_sheet(
            "book.xlsx",
            "Company_Employees",
            &[
                &["Name", "Year", "Employee Count"],
                &["Apple", "2023", "161000"],
                &["", "", ""],
                &["Microsoft", "2023", "221000"],
            ],
        );
        SourceLoader::with_backend(backend, Arc::new(SourceCache::default()))
    }

    #[test]
    fn test_load_resolves_synonyms_and_skips_blank_rows() {
        let loader = loader();
        let table = loader
            .try_load(
                &PathBuf::from("book.xlsx"),
                "Company_Employees",
                &[COMPANY, YEAR, EMPLOYEES],
            )
            .unwrap();

        assert_eq!(table.columns, vec!["company", "year", "employees"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "employees").as_number(), Some(221000.0));
    }

    #[test]
    fn test_second_load_is_served_from_cache() {
        let loader = loader();
        let path = PathBuf::from("book.xlsx");
        let first = loader.load(&path, "Company_Employees", &[COMPANY, YEAR]);
        let second = loader.load(&path, "Company_Employees", &[COMPANY, YEAR]);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cache().stats().hits, 1);
    }

    #[test]
    fn test_different_synonyms_are_cached_separately() {
        let loader = loader();
        let path = PathBuf::from("book.xlsx");
        let by_name = loader.load(&path, "Company_Employees", &[COMPANY, YEAR]);
        let no_synonym = LogicalColumn::optional("company", &[]);
        let unresolved = loader.load(&path, "Company_Employees", &[no_synonym, YEAR]);

        assert!(!Arc::ptr_eq(&by_name, &unresolved));
        assert_eq!(by_name.cell(0, "company").as_text().as_deref(), Some("Apple"));
        assert!(unresolved.cell(0, "company").is_empty());
        assert_eq!(loader.cache().stats().hits, 0);
        assert_eq!(loader.cache().stats().entries, 2);
    }

    #[test]
    fn test_schema_mismatch_is_scoped_to_sheet() {
        let loader = loader();
        let revenue = LogicalColumn::required("revenue", &[]);
        let err = loader
            .try_load(&PathBuf::from("book.xlsx"), "Company_Employees", &[revenue])
            .unwrap_err();
        assert!(matches!(err, DataError::SchemaMismatch { .. }));

        let table = loader.load(&PathBuf::from("book.xlsx"), "Company_Employees", &[revenue]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_sheet_degrades_to_empty() {
        let loader = loader();
        let err = loader
            .try_load(&PathBuf::from("book.xlsx"), "Nope", &[COMPANY])
            .unwrap_err();
        assert!(matches!(err, DataError::SourceUnavailable { .. }));
        assert!(loader.sheet_names(&PathBuf::from("missing.xlsx")).is_empty());
    }
}
