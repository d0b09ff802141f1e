//! Canonical quarterly segment rows through to deltas and grids.

use approx::assert_relative_eq;
use folio_data::QuarterlySegmentRow;
use folio_metrics::{DeltaKind, GridMode, derive_series, quarterly_segment_heatmap};
use folio_normalize::{
    MetricSeries, NameResolver, Observation, SegmentClassifier, build_axis, parse_period,
};

fn canonical(rows: &[(&str, &str, &str, f64)]) -> Vec<Observation> {
    let resolver = NameResolver::standard();
    let classifier = SegmentClassifier::new(resolver.clone());
    rows.iter()
        .map(|&(company, segment, period, revenue)| QuarterlySegmentRow {
            company: company.to_string(),
            period: period.to_string(),
            segment: segment.to_string(),
            revenue,
            sheet: format!("{company} Quarterly Segments"),
        })
        .filter_map(|row| {
            let entity = resolver.canonicalize(&row.company);
            Some(Observation {
                metric: classifier.classify(&entity, &row.segment)?,
                period: parse_period(&row.period)?,
                entity,
                value: row.revenue,
                source: row.sheet,
            })
        })
        .collect()
}

#[test]
fn test_youtube_quarter_over_quarter() {
    let observations = canonical(&[
        ("Alphabet", "YouTube Ads", "1Q24", 1000.0),
        ("Alphabet", "youtube ads", "2Q24", 1100.0),
    ]);
    let series = MetricSeries::group(&observations);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].metric(), "YouTube ads");

    let derived = derive_series(&series[0], DeltaKind::QuarterOverQuarter);
    assert_eq!(derived[0].value, None);
    assert_relative_eq!(derived[1].value.unwrap(), 10.0);
}

#[test]
fn test_quarterly_grid_and_axis() {
    let observations = canonical(&[
        ("Google", "YouTube Ads", "4Q23", 900.0),
        ("Google", "YouTube Ads", "1Q24", 1000.0),
        ("Google", "Google Cloud", "Q1 2024", 500.0),
        ("Google", "Total Revenue", "Q1 2024", 1500.0),
    ]);
    let grid = quarterly_segment_heatmap(&observations, "Alphabet", None, GridMode::Values);
    assert_eq!(grid.rows(), ["Google Cloud", "YouTube ads"]);
    assert_eq!(grid.columns(), ["Q4 2023", "Q1 2024"]);
    assert_eq!(grid.get("Google Cloud", "Q4 2023"), None);

    let axis = build_axis(grid.columns());
    assert_eq!(axis.category_order, ["Q4 2023", "gap-2023-0", "Q1 2024"]);
}
