//! Raw quarterly segment rows through classification, period parsing and series assembly.

use folio_data::QuarterlySegmentRow;
use folio_normalize::{MetricSeries, NameResolver, Observation, SegmentClassifier, parse_period};

fn raw(company: &str, segment: &str, period: &str, revenue: f64) -> QuarterlySegmentRow {
    QuarterlySegmentRow {
        company: company.to_string(),
        period: period.to_string(),
        segment: segment.to_string(),
        revenue,
        sheet: format!("{company} Quarterly Segments"),
    }
}

fn canonicalize(rows: &[QuarterlySegmentRow]) -> Vec<Observation> {
    let resolver = NameResolver::standard();
    let classifier = SegmentClassifier::new(resolver.clone());
    rows.iter()
        .filter_map(|row| {
            let entity = resolver.canonicalize(&row.company);
            Some(Observation {
                metric: classifier.classify(&entity, &row.segment)?,
                period: parse_period(&row.period)?,
                entity,
                value: row.revenue,
                source: row.sheet.clone(),
            })
        })
        .collect()
}

#[test]
fn test_alphabet_youtube_rows_collapse_to_one_series() {
    let rows = vec![
        raw("Alphabet", "YouTube Ads", "1Q24", 1000.0),
        raw("Alphabet", "youtube ads", "2Q24", 1100.0),
    ];
    let observations = canonicalize(&rows);
    assert!(observations.iter().all(|o| o.metric == "YouTube ads"));

    let series = MetricSeries::group(&observations);
    assert_eq!(series.len(), 1);
    let points = series[0].points();
    assert_eq!(points.len(), 2);
    assert_eq!((points[0].0.year, points[0].0.quarter), (2024, Some(1)));
    assert_eq!((points[1].0.year, points[1].0.quarter), (2024, Some(2)));
}

#[test]
fn test_totals_and_bad_periods_are_dropped() {
    let rows = vec![
        raw("Google", "Total Revenue", "1Q24", 80000.0),
        raw("Google", "Google Cloud", "FY24", 9000.0),
        raw("Google", "Google Cloud", "Q1 2024", 9574.0),
    ];
    let observations = canonicalize(&rows);
    assert_eq!(observations.len(), 1);
    assert_eq!(observations[0].entity, "Alphabet");
    assert_eq!(observations[0].metric, "Google Cloud");
}
