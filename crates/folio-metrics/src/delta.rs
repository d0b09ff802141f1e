//! Period-over-period percentage changes.

use folio_normalize::{MetricSeries, Observation, PeriodKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// Percentage change from `previous` to `current`.
///
/// Returns `None` when either value is missing or `previous` is zero.
/// A move from a loss to a profit is always positive, and a deepening loss
/// is always negative, whatever the sign of the raw ratio. Ordinary changes
/// are rounded to one decimal.
pub fn delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (current, previous) = (current?, previous?);
    if !current.is_finite() || !previous.is_finite() || previous == 0.0 {
        return None;
    }

    if previous < 0.0 && current > 0.0 {
        return Some(((current - previous) / previous.abs() * 100.0).abs());
    }
    if previous < 0.0 && current < 0.0 && current < previous {
        return Some(-((current - previous) / previous * 100.0).abs());
    }

    let pct = (current - previous) / previous * 100.0;
    Some((pct * 10.0).round() / 10.0)
}

/// Which earlier period a delta compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeltaKind {
    /// Same quarter (or full year) one year earlier
    YearOverYear,
    /// Immediately preceding quarter; Q1 compares with the prior Q4
    QuarterOverQuarter,
}

impl DeltaKind {
    /// The period `period` is compared against.
    pub const fn comparison_period(&self, period: PeriodKey) -> PeriodKey {
        match self {
            Self::YearOverYear => period.previous_year(),
            Self::QuarterOverQuarter => period.previous(),
        }
    }

    /// Short label used in column names.
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::YearOverYear => "yoy",
            Self::QuarterOverQuarter => "qoq",
        }
    }
}

/// A computed delta for one point of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetric {
    /// Metric the delta belongs to
    pub metric: String,
    /// Period of the current value
    pub period: PeriodKey,
    /// Delta kind
    pub kind: DeltaKind,
    /// Current value
    pub current: f64,
    /// Percentage change; `None` without a comparable previous period
    pub value: Option<f64>,
}

/// One [`DerivedMetric`] per point of `series`.
///
/// The comparison value is looked up by period, so gaps in the history
/// produce `None` rather than a comparison against an older point.
pub fn derive_series(series: &MetricSeries, kind: DeltaKind) -> Vec<DerivedMetric> {
    series
        .points()
        .iter()
        .map(|&(period, current)| {
            let previous = series.get(kind.comparison_period(period));
            DerivedMetric {
                metric: series.metric().to_string(),
                period,
                kind,
                current,
                value: delta(Some(current), previous),
            }
        })
        .collect()
}

/// Trailing annual history ending at `end_year`, with holes for missing years.
pub fn metric_history(series: &MetricSeries, end_year: i32, window: usize) -> Vec<(i32, Option<f64>)> {
    let window = i32::try_from(window).unwrap_or(i32::MAX).max(1);
    let start = end_year.saturating_sub(window - 1);
    (start..=end_year)
        .map(|year| (year, series.get(PeriodKey::annual(year))))
        .collect()
}

/// Column name of a metric's year-over-year change.
pub fn yoy_column(metric: &str) -> String {
    format!("{metric}_{}", DeltaKind::YearOverYear.suffix())
}

/// One company-year of an annual metrics table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnnualTableRow {
    /// Canonical company
    pub entity: String,
    /// Fiscal year
    pub year: i32,
    /// Metric values keyed by metric name
    pub values: BTreeMap<String, f64>,
    /// Year-over-year changes keyed by [`yoy_column`]
    pub changes: BTreeMap<String, Option<f64>>,
}

/// Wide annual table with a `<metric>_yoy` column per metric.
///
/// Rows are sorted by company then year. Changes are computed per company
/// in year order against the immediately preceding year.
pub fn annual_table(observations: &[Observation]) -> Vec<AnnualTableRow> {
    let annual: Vec<Observation> = observations
        .iter()
        .filter(|o| o.period.is_annual())
        .cloned()
        .collect();

    let mut rows: BTreeMap<(String, i32), AnnualTableRow> = BTreeMap::new();
    for series in MetricSeries::group(&annual) {
        for point in derive_series(&series, DeltaKind::YearOverYear) {
            let row = rows
                .entry((series.entity().to_string(), point.period.year))
                .or_insert_with(|| AnnualTableRow {
                    entity: series.entity().to_string(),
                    year: point.period.year,
                    ..Default::default()
                });
            row.values.insert(point.metric.clone(), point.current);
            row.changes.insert(yoy_column(&point.metric), point.value);
        }
    }
    rows.into_values().collect()
}

/// One metric of a company-year summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    /// Metric name
    pub metric: String,
    /// Value in the requested year
    pub value: Option<f64>,
    /// Value one year earlier
    pub previous: Option<f64>,
    /// Year-over-year change
    pub change: Option<f64>,
}

/// Requested metrics for one company and year, in the order given.
pub fn summarize(
    observations: &[Observation],
    company: &str,
    year: i32,
    metrics: &[&str],
) -> Vec<MetricSummary> {
    let lookup = |metric: &str, year: i32| {
        observations
            .iter()
            .filter(|o| o.entity == company && o.metric == metric)
            .filter(|o| o.period == PeriodKey::annual(year))
            .map(|o| o.value)
            .reduce(|a, b| a + b)
    };
    metrics
        .iter()
        .map(|&metric| {
            let value = lookup(metric, year);
            let previous = lookup(metric, year - 1);
            MetricSummary {
                metric: metric.to_string(),
                value,
                previous,
                change: delta(value, previous),
            }
        })
        .collect()
}
