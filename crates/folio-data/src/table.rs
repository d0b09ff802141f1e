//! Raw tables produced by the loader.

use crate::workbook::Cell;

/// One loaded sheet restricted to the requested logical columns.
///
/// Immutable once built; the cache hands out shared references.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    /// Sheet the table was read from
    pub sheet: String,
    /// Column names: logical names when loaded by schema, source headers otherwise
    pub columns: Vec<String>,
    /// Data rows, each with one cell per column
    pub rows: Vec<Vec<Cell>>,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl RawTable {
    /// An empty table for `sheet`, used as the degraded result of a failed load.
    pub fn empty(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Cell at `(row, column name)`; missing columns read as empty.
    pub fn cell(&self, row: usize, column: &str) -> &Cell {
        self.column_index(column)
            .and_then(|idx| self.rows.get(row).and_then(|r| r.get(idx)))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Iterate rows as [`RowView`]s.
    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.rows.len()).map(move |index| RowView { table: self, index })
    }
}

/// Borrowed view of one row with name-based access.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a RawTable,
    index: usize,
}

impl<'a> RowView<'a> {
    /// Zero-based position in the source sheet's data rows.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Cell for a column name.
    pub fn get(&self, column: &str) -> &'a Cell {
        self.table.cell(self.index, column)
    }

    /// Trimmed text for a column.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).as_text()
    }

    /// Coerced number for a column.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).as_number()
    }

    /// Year for a column.
    pub fn year(&self, column: &str) -> Option<i32> {
        self.get(column).as_year()
    }
}
