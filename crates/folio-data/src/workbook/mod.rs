//! Spreadsheet backends and the cell model shared by every sheet.
//!
//! A backend answers two questions about a workbook path: which sheets it
//! contains, and what the full grid of one sheet looks like. Sheets are always
//! read whole and column selection happens afterwards, so one logical load
//! costs one sheet read.

pub mod calamine;
pub mod memory;

pub use self::calamine::CalamineBackend;
pub use memory::InMemoryWorkbook;

use crate::error::Result;
use chrono::{Duration, NaiveDate};
use std::path::Path;

/// Values treated as missing regardless of column.
const MISSING_MARKERS: &[&str] = &["", "-", "#N/A", "N/A", "NA", "nan", "NaN", "None"];

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value
    Empty,
    /// Text value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Date or datetime stored as an Excel serial number
    DateTime(f64),
    /// Formula error such as `#DIV/0!`
    Error(String),
}

impl Cell {
    /// Whether the cell carries no usable value.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty | Self::Error(_) => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed text rendering of the cell, `None` when empty.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty | Self::Error(_) => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(n) => Some(format_plain(*n)),
            Self::Bool(b) => Some(b.to_string()),
            Self::DateTime(serial) => excel_serial_to_date(*serial).map(|d| d.to_string()),
        }
    }

    /// Numeric value with spreadsheet-style text coercion.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) | Self::DateTime(n) => n.is_finite().then_some(*n),
            Self::Text(s) => parse_number(s),
            Self::Bool(_) | Self::Empty | Self::Error(_) => None,
        }
    }

    /// Whole-number value, used for year columns stored as floats or text.
    pub fn as_year(&self) -> Option<i32> {
        let n = self.as_number()?;
        if n.fract() != 0.0 || !(1900.0..=2200.0).contains(&n) {
            return None;
        }
        Some(n as i32)
    }

    /// Calendar date from a date cell, an Excel serial or an ISO-like string.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::DateTime(serial) | Self::Number(serial) => excel_serial_to_date(*serial),
            Self::Text(s) => parse_date(s),
            _ => None,
        }
    }
}

/// Read access to a workbook.
pub trait WorkbookBackend: Send + Sync + std::fmt::Debug {
    /// Names of all sheets, in workbook order.
    fn sheet_names(&self, path: &Path) -> Result<Vec<String>>;

    /// Every row of a sheet, header row included.
    fn read_sheet(&self, path: &Path, sheet: &str) -> Result<Vec<Vec<Cell>>>;
}

/// Parse a numeric string the way the exported workbooks write them.
///
/// Currency signs, thousands separators and surrounding whitespace are
/// stripped. A lone comma with no dot is read as a decimal comma (`"85,2"`).
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return None;
    }
    let mut cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.matches(',').count() == 1 && !cleaned.contains('.') {
        let (_, tail) = cleaned.split_once(',').unwrap_or_default();
        // "1,234" is a thousands separator, "85,2" is a decimal comma.
        cleaned = if tail.len() == 3 {
            cleaned.replace(',', "")
        } else {
            cleaned.replace(',', ".")
        };
    } else {
        cleaned = cleaned.replace(',', "");
    }
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert an Excel 1900-system serial number to a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.trunc() as i64)?)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn format_plain(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1,234", Some(1234.0))]
    #[case("$1,234,567.5", Some(1_234_567.5))]
    #[case("85,2", Some(85.2))]
    #[case(" 42 ", Some(42.0))]
    #[case("-12.5", Some(-12.5))]
    #[case("-", None)]
    #[case("#N/A", None)]
    #[case("nan", None)]
    #[case("abc", None)]
    fn test_parse_number(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_number(raw), expected);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(44986.0),
            NaiveDate::from_ymd_opt(2023, 3, 1)
        );
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(1e15), None);
        assert_eq!(Cell::Number(1e15).as_date(), None);
        assert_eq!(Cell::DateTime(f64::MAX).as_date(), None);
    }

    #[test]
    fn test_cell_coercion() {
        assert_eq!(Cell::Text("2024".into()).as_year(), Some(2024));
        assert_eq!(Cell::Number(2024.0).as_year(), Some(2024));
        assert_eq!(Cell::Number(2024.5).as_year(), None);
        assert_eq!(Cell::Number(3.0).as_text().as_deref(), Some("3"));
        assert!(Cell::Text("   ".into()).is_empty());
        assert_eq!(
            Cell::Text("2024-03-28".into()).as_date(),
            NaiveDate::from_ymd_opt(2024, 3, 28)
        );
        assert_eq!(
            Cell::Text("2024-03-28 00:00:00".into()).as_date(),
            NaiveDate::from_ymd_opt(2024, 3, 28)
        );
    }
}
