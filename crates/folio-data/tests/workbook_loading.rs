//! Loading real `.xlsx` files through the calamine backend.

use folio_data::sheets::{ANNUAL_METRICS_SHEET, EMPLOYEES_SHEET, PRICES_SHEET};
use folio_data::{DataError, LogicalColumn, MetricKey, SheetReader, SourceCache, SourceLoader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

enum Value<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

use Value::{Blank, Number, Text};

fn write_sheet(book: &mut umya_spreadsheet::Spreadsheet, name: &str, rows: &[Vec<Value<'_>>]) {
    if book.get_sheet_by_name(name).is_none() {
        let _ = book.new_sheet(name);
    }
    let sheet = book.get_sheet_by_name_mut(name).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let coord = ((c + 1) as u32, (r + 1) as u32);
            match value {
                Text(s) => {
                    sheet.get_cell_mut(coord).set_value(*s);
                }
                Number(n) => {
                    sheet.get_cell_mut(coord).set_value_number(*n);
                }
                Blank => {}
            }
        }
    }
}

fn fixture(dir: &Path) -> PathBuf {
    let path = dir.join("earnings.xlsx");
    let mut book = umya_spreadsheet::new_file();

    write_sheet(
        &mut book,
        ANNUAL_METRICS_SHEET,
        &[
            vec![Text("Company"), Text("Year"), Text("Revenue"), Text("Debt")],
            vec![Text("Apple"), Number(2022.0), Number(394328.0), Number(120069.0)],
            vec![Text("Apple"), Number(2023.0), Number(383285.0), Blank],
            vec![Text("MFE"), Number(2023.0), Number(1.0), Number(1.0)],
        ],
    );
    write_sheet(
        &mut book,
        EMPLOYEES_SHEET,
        &[
            vec![Text("Company"), Text("Year"), Text("Employee Count")],
            vec![Text("Apple"), Number(2023.0), Text("161,000")],
        ],
    );
    write_sheet(
        &mut book,
        PRICES_SHEET,
        &[
            vec![Text("Date"), Text("Close"), Text("Name"), Text("Tag")],
            vec![Text("2024-01-02"), Number(185.64), Text("Apple"), Text("AAPL")],
            vec![Text("2024-01-03"), Number(184.25), Text("Apple"), Blank],
        ],
    );

    umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();
    path
}

#[test]
fn test_reads_typed_records_from_xlsx() {
    let dir = TempDir::new().unwrap();
    let path = fixture(dir.path());
    let loader = SourceLoader::new(Arc::new(SourceCache::default()));
    let reader = SheetReader::new(&loader, &path);

    let names = reader.sheet_names();
    assert!(names.iter().any(|n| n == ANNUAL_METRICS_SHEET));

    let metrics = reader.annual_metrics();
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].year, 2022);
    assert_eq!(metrics[0].metrics.get(&MetricKey::Debt), Some(&120069.0));
    assert!(!metrics[1].metrics.contains_key(&MetricKey::Debt));

    let employees = reader.employees();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].employees, 161000.0);

    let prices = reader.prices();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[0].tag, "AAPL");
    assert_eq!(prices[1].tag, "");
    assert_eq!(prices[1].date.to_string(), "2024-01-03");
}

#[test]
fn test_repeated_loads_hit_the_cache() {
    let dir = TempDir::new().unwrap();
    let path = fixture(dir.path());
    let cache = Arc::new(SourceCache::default());
    let loader = SourceLoader::new(Arc::clone(&cache));
    let reader = SheetReader::new(&loader, &path);

    let _ = reader.annual_metrics();
    let _ = reader.annual_metrics();

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_missing_file_is_source_unavailable() {
    let loader = SourceLoader::new(Arc::new(SourceCache::default()));
    let err = loader
        .try_load(
            Path::new("/no/such/workbook.xlsx"),
            ANNUAL_METRICS_SHEET,
            &[LogicalColumn::required("company", &[])],
        )
        .unwrap_err();
    assert!(matches!(err, DataError::SourceUnavailable { .. }));
}

#[test]
fn test_missing_column_fails_only_that_sheet() {
    let dir = TempDir::new().unwrap();
    let path = fixture(dir.path());
    let loader = SourceLoader::new(Arc::new(SourceCache::default()));

    let err = loader
        .try_load(
            &path,
            EMPLOYEES_SHEET,
            &[LogicalColumn::required("segment", &["segments"])],
        )
        .unwrap_err();
    assert!(matches!(err, DataError::SchemaMismatch { ref missing, .. } if missing == &["segment"]));

    let reader = SheetReader::new(&loader, &path);
    assert_eq!(reader.annual_metrics().len(), 2);
}
