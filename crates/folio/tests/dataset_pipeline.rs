//! End-to-end assembly of a workbook held in memory.

use folio::data::sheets::{
    AD_REVENUE_SHEET, ANNUAL_METRICS_SHEET, COMPANY_INSIGHTS_SHEET, EMPLOYEES_SHEET,
    QUARTERLY_METRICS_SHEET, SEGMENT_REVENUE_SHEET,
};
use folio::data::{InMemoryWorkbook, SheetReader, SourceCache, SourceLoader};
use folio::normalize::PeriodKey;
use folio::output::ExportFormat;
use folio::{Dataset, FolioConfig, FolioError};
use std::path::PathBuf;
use std::sync::Arc;

fn dataset() -> Dataset {
    let path = PathBuf::from("earnings.xlsx");
    let book = InMemoryWorkbook::new();
    book.insert_text_sheet(
        &path,
        ANNUAL_METRICS_SHEET,
        &[
            &["Company", "Year", "Revenue", "Debt"],
            &["Google", "2023", "307394", "13253"],
            &["Alphabet", "2024", "350018", "10883"],
            &["MFE", "2024", "1", "1"],
        ],
    );
    book.insert_text_sheet(
        &path,
        SEGMENT_REVENUE_SHEET,
        &[
            &["Company", "Year", "Segment", "Revenue"],
            &["Google", "2024", "YouTube Ads", "20000"],
            &["Google", "2024", "youtube ads", "16147"],
            &["Google", "2024", "Google Cloud", "43229"],
            &["Google", "2024", "Other Bets", "-1648"],
            &["Google", "2024", "Hedging gains", "0"],
            &["Google", "2024", "Total", "350018"],
        ],
    );
    book.insert_text_sheet(
        &path,
        "Alphabet Quarterly Segments",
        &[
            &["Quarter", "YouTube Ads", "Google Cloud"],
            &["4Q23", "9200", "9192"],
            &["1Q24", "8090", "9574"],
            &["Q5 24", "1", "1"],
        ],
    );
    book.insert_text_sheet(
        &path,
        QUARTERLY_METRICS_SHEET,
        &[
            &["Symbol", "Year", "Revenue"],
            &["GOOGL", "2024", "80539"],
            &["GOOGL", "2024", "84742"],
            &["GOOGL", "2024", "88268"],
            &["GOOGL", "2024", "96469"],
            &["GOOGL", "2024", "350018"],
        ],
    );
    book.insert_text_sheet(
        &path,
        EMPLOYEES_SHEET,
        &[
            &["Company", "Year", "Employee Count"],
            &["Alphabet", "2024", "183,323"],
        ],
    );
    book.insert_text_sheet(
        &path,
        AD_REVENUE_SHEET,
        &[
            &["Year ", "Google_Ads", "*WBD_Ads"],
            &["2023", "237855", ""],
            &["2024", "264590", "8500"],
        ],
    );
    book.insert_text_sheet(
        &path,
        COMPANY_INSIGHTS_SHEET,
        &[
            &["Company", "Year", "Insight", "Category"],
            &["Google", "2024", "Cloud turned profitable", "Growth"],
            &["Meta", "2024", "Capex doubled", ""],
        ],
    );

    let loader = SourceLoader::with_backend(book, Arc::new(SourceCache::default()));
    Dataset::from_reader(&SheetReader::new(&loader, &path), &FolioConfig::default())
}

#[test]
fn test_companies_and_years() {
    let ds = dataset();
    assert_eq!(ds.companies(), vec!["Alphabet", "Warner Bros Discovery"]);
    assert_eq!(ds.available_years("Google"), vec![2024, 2023]);
    assert!(ds.available_years("Acme").is_empty());
}

#[test]
fn test_segments_merge_aliases_and_sort_by_magnitude() {
    let segments = dataset().segments_for("Google", 2024);
    assert_eq!(
        segments,
        vec![
            ("Google Cloud".to_string(), 43229.0),
            ("YouTube ads".to_string(), 36147.0),
            ("Other bets".to_string(), -1648.0),
        ]
    );
}

#[test]
fn test_quarterly_segments_keep_parseable_periods() {
    let ds = dataset();
    let youtube = ds.metric_series("Alphabet", "YouTube ads");
    assert_eq!(youtube.get(PeriodKey::quarterly(2023, 4).unwrap()), Some(9200.0));
    assert_eq!(youtube.get(PeriodKey::quarterly(2024, 1).unwrap()), Some(8090.0));
    assert_eq!(youtube.get(PeriodKey::annual(2024)), Some(36147.0));
    assert_eq!(youtube.len(), 3);
}

#[test]
fn test_quarterly_metrics_drop_annual_total() {
    let ds = dataset();
    let revenue = ds.metric_series("Alphabet", "revenue");
    let quarters: Vec<(PeriodKey, f64)> = revenue
        .points()
        .iter()
        .copied()
        .filter(|(p, _)| !p.is_annual())
        .collect();
    assert_eq!(quarters.len(), 4);
    assert_eq!(quarters[3], (PeriodKey::quarterly(2024, 4).unwrap(), 96469.0));
    assert_eq!(revenue.get(PeriodKey::annual(2024)), Some(350018.0));
}

#[test]
fn test_ad_revenue_and_headcount() {
    let ds = dataset();
    let wbd: Vec<_> = ds
        .ad_revenue()
        .iter()
        .filter(|r| r.company == "Warner Bros Discovery")
        .collect();
    assert_eq!(wbd.len(), 1);
    assert!(wbd[0].estimated);

    let ads = ds.metric_series("Alphabet", "ad_revenue");
    assert_eq!(ads.get(PeriodKey::annual(2023)), Some(237855.0));
    let staff = ds.metric_series("Alphabet", "employees");
    assert_eq!(staff.get(PeriodKey::annual(2024)), Some(183_323.0));
}

#[test]
fn test_annual_table_changes() {
    let table = dataset().annual_table();
    let row = table
        .iter()
        .find(|r| r.entity == "Alphabet" && r.year == 2024)
        .unwrap();
    assert_eq!(row.values.get("revenue"), Some(&350018.0));
    assert_eq!(row.changes.get("revenue_yoy"), Some(&Some(13.9)));
    assert_eq!(row.changes.get("debt_yoy"), Some(&Some(-17.9)));
}

#[test]
fn test_insights_match_canonical_names() {
    let ds = dataset();
    let insights = ds.insights_for("Alphabet", 2024);
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].insight, "Cloud turned profitable");
    assert!(ds.insights_for("Alphabet", 2023).is_empty());
}

#[test]
fn test_stored_observations_cover_everything() {
    let ds = dataset();
    let stored = ds.stored_observations();
    assert_eq!(
        stored.len(),
        ds.observations().len() + ds.segment_observations().len()
    );
    assert!(stored.iter().any(|o| o.quarter == Some(4) && o.metric == "revenue"));
}

#[test]
fn test_missing_workbook_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = FolioConfig::with_workbook(dir.path().join("absent.xlsx"));
    assert!(matches!(
        Dataset::load(&config),
        Err(FolioError::MissingWorkbook(_))
    ));
}

#[test]
fn test_sheet_names_in_workbook_order() {
    let ds = dataset();
    assert_eq!(ds.sheet_names().first().map(String::as_str), Some(ANNUAL_METRICS_SHEET));
    assert_eq!(ds.sheet_names().len(), 7);
}

#[test]
fn test_persist_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("folio.db");
    let ds = dataset();

    let (written, stats) = ds.persist(&path).unwrap();
    assert_eq!(written, ds.stored_observations().len());
    assert_eq!(stats.observations, written);
    assert_eq!(stats.entities, 2);

    let (_, again) = ds.persist(&path).unwrap();
    assert_eq!(again, stats);
}

#[test]
fn test_export_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("observations.csv");
    let ds = dataset();

    let rows = ds.export(&path, ExportFormat::Csv).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), rows + 1);
    assert!(written.contains("Alphabet,YouTube ads,2024,1,Q1 2024,8090"));
}
