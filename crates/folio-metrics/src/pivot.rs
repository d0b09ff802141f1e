//! Two-dimensional aggregation grids.

use crate::error::{MetricsError, Result};
use ndarray::Array2;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How values sharing one `(row, column)` cell are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Aggregation {
    /// Sum of values
    #[default]
    Sum,
    /// Arithmetic mean
    Mean,
    /// Last value in input order
    Last,
    /// Largest value
    Max,
}

#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
    last: f64,
    max: f64,
}

impl Accumulator {
    fn new(value: f64) -> Self {
        Self {
            sum: value,
            count: 1,
            last: value,
            max: value,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.last = value;
        self.max = self.max.max(value);
    }

    fn finish(&self, agg: Aggregation) -> f64 {
        match agg {
            Aggregation::Sum => self.sum,
            Aggregation::Mean => self.sum / self.count as f64,
            Aggregation::Last => self.last,
            Aggregation::Max => self.max,
        }
    }
}

/// Row keys × column keys → value or null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Array2<Option<f64>>,
}

impl Pivot {
    /// Build from keys and a value grid of matching shape.
    ///
    /// # Errors
    /// Shape mismatches and duplicate keys are rejected.
    pub fn new(rows: Vec<String>, columns: Vec<String>, values: Array2<Option<f64>>) -> Result<Self> {
        let expected = (rows.len(), columns.len());
        if values.dim() != expected {
            return Err(MetricsError::ShapeMismatch {
                expected,
                found: values.dim(),
            });
        }
        check_unique("row", &rows)?;
        check_unique("column", &columns)?;
        Ok(Self {
            rows,
            columns,
            values,
        })
    }

    /// Aggregate records into a grid shaped exactly `row_order × col_order`.
    ///
    /// Records whose keys are not in the requested orders are ignored;
    /// requested cells with no record are null. Duplicate keys in the orders
    /// are collapsed to their first occurrence.
    pub fn build<T, R, C, V>(
        records: &[T],
        row_key: R,
        col_key: C,
        value: V,
        agg: Aggregation,
        row_order: &[String],
        col_order: &[String],
    ) -> Self
    where
        R: Fn(&T) -> String,
        C: Fn(&T) -> String,
        V: Fn(&T) -> Option<f64>,
    {
        let rows = dedup(row_order);
        let columns = dedup(col_order);
        let row_index = index_of(&rows);
        let col_index = index_of(&columns);

        let mut cells: HashMap<(usize, usize), Accumulator> = HashMap::new();
        for record in records {
            let Some(v) = value(record).filter(|v| v.is_finite()) else {
                continue;
            };
            let (Some(&r), Some(&c)) = (
                row_index.get(row_key(record).as_str()),
                col_index.get(col_key(record).as_str()),
            ) else {
                continue;
            };
            cells
                .entry((r, c))
                .and_modify(|acc| acc.push(v))
                .or_insert_with(|| Accumulator::new(v));
        }

        let mut values = Array2::from_elem((rows.len(), columns.len()), None);
        for ((r, c), acc) in cells {
            values[[r, c]] = Some(acc.finish(agg));
        }
        Self {
            rows,
            columns,
            values,
        }
    }

    /// Row keys in order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Column keys in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The value grid.
    pub const fn values(&self) -> &Array2<Option<f64>> {
        &self.values
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every cell is null.
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Value at `(row, column)`.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|k| k == row)?;
        let c = self.columns.iter().position(|k| k == column)?;
        self.values[[r, c]]
    }

    /// One row's cells in column order.
    pub fn row_values(&self, row: &str) -> Option<Vec<Option<f64>>> {
        let r = self.rows.iter().position(|k| k == row)?;
        Some(self.values.row(r).to_vec())
    }

    /// Reshape to exactly `rows × columns`, keeping known cells and filling nulls.
    pub fn reindex(&self, rows: &[String], columns: &[String]) -> Self {
        let rows = dedup(rows);
        let columns = dedup(columns);
        let src_rows = index_of(&self.rows);
        let src_cols = index_of(&self.columns);

        let mut values = Array2::from_elem((rows.len(), columns.len()), None);
        for (r, row) in rows.iter().enumerate() {
            let Some(&sr) = src_rows.get(row.as_str()) else {
                continue;
            };
            for (c, col) in columns.iter().enumerate() {
                if let Some(&sc) = src_cols.get(col.as_str()) {
                    values[[r, c]] = self.values[[sr, sc]];
                }
            }
        }
        Self {
            rows,
            columns,
            values,
        }
    }

    /// Percentage change along each row: `(cell[j] / cell[j-1] - 1) * 100`.
    ///
    /// The first column, and any cell whose predecessor is null or zero, is null.
    pub fn change_transform(&self) -> Self {
        let mut values = Array2::from_elem(self.values.dim(), None);
        for ((r, c), slot) in values.indexed_iter_mut() {
            if c == 0 {
                continue;
            }
            if let (Some(cur), Some(prev)) = (self.values[[r, c]], self.values[[r, c - 1]]) {
                if prev != 0.0 {
                    *slot = Some((cur / prev - 1.0) * 100.0);
                }
            }
        }
        Self {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            values,
        }
    }

    /// Min-max scale non-null cells to `[0, 1]` over the whole grid.
    ///
    /// When every non-null cell is equal they all become `0.5`.
    pub fn normalize(&self) -> Self {
        let finite = self.values.iter().flatten().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let values = if min > max {
            self.values.clone()
        } else if min == max {
            self.values.mapv(|cell| cell.map(|_| 0.5))
        } else {
            let span = max - min;
            self.values
                .mapv(|cell| cell.filter(|v| v.is_finite()).map(|v| (v - min) / span))
        };
        Self {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            values,
        }
    }

    /// Apply a display transform.
    pub fn transform(&self, mode: GridMode) -> Self {
        match mode {
            GridMode::Values => self.clone(),
            GridMode::Change => self.change_transform(),
            GridMode::Normalized => self.normalize(),
        }
    }
}

/// Which values a grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GridMode {
    /// Raw values
    #[default]
    Values,
    /// Percentage change along rows
    Change,
    /// Min-max normalized values
    Normalized,
}

fn dedup(keys: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.iter()
        .filter(|k| seen.insert(k.as_str()))
        .cloned()
        .collect()
}

fn index_of(keys: &[String]) -> HashMap<&str, usize> {
    keys.iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect()
}

fn check_unique(axis: &'static str, keys: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    match keys.iter().find(|k| !seen.insert(k.as_str())) {
        Some(key) => Err(MetricsError::DuplicateKey {
            axis,
            key: key.clone(),
        }),
        None => Ok(()),
    }
}
