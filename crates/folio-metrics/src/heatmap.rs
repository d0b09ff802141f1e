//! Heat-map grids over canonical observations and prices.
//!
//! Every builder returns a [`Pivot`] whose row and column order is fixed by
//! the request, so colour scales and axes stay stable as data changes.

use crate::pivot::{Aggregation, GridMode, Pivot};
use crate::prices::{Frequency, filter_for_company, resample};
use folio_data::PricePoint;
use folio_normalize::{NameResolver, Observation, PeriodKey, is_total_label};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use tracing::debug;

fn year_columns(years: &RangeInclusive<i32>) -> Vec<String> {
    years.clone().map(|y| y.to_string()).collect()
}

fn period_columns<'a>(periods: impl Iterator<Item = &'a PeriodKey>) -> Vec<String> {
    periods
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|p| p.to_string())
        .collect()
}

/// Distinct segment labels, sorted case-insensitively, totals excluded.
///
/// When `filter` is given its order wins and unknown labels still get rows.
fn segment_rows<'a>(
    labels: impl Iterator<Item = &'a str>,
    filter: Option<&[String]>,
) -> Vec<String> {
    if let Some(filter) = filter {
        return filter
            .iter()
            .filter(|s| !is_total_label(s))
            .cloned()
            .collect();
    }
    let mut rows: Vec<String> = labels
        .filter(|s| !is_total_label(s))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    rows.sort_by_key(|s| s.to_lowercase());
    rows
}

/// Companies × years for one annual metric.
pub fn metric_heatmap(
    observations: &[Observation],
    metric: &str,
    companies: &[String],
    years: RangeInclusive<i32>,
    mode: GridMode,
) -> Pivot {
    let annual: Vec<&Observation> = observations
        .iter()
        .filter(|o| o.metric == metric && o.period.is_annual())
        .collect();
    Pivot::build(
        &annual,
        |o| o.entity.clone(),
        |o| o.period.year.to_string(),
        |o| Some(o.value),
        Aggregation::Sum,
        companies,
        &year_columns(&years),
    )
    .transform(mode)
}

/// Segments × years for one company's annual segment revenues.
pub fn segment_heatmap(
    segments: &[Observation],
    company: &str,
    years: RangeInclusive<i32>,
    filter: Option<&[String]>,
    mode: GridMode,
) -> Pivot {
    let annual: Vec<&Observation> = segments
        .iter()
        .filter(|o| o.entity == company && o.period.is_annual())
        .collect();
    let rows = segment_rows(annual.iter().map(|o| o.metric.as_str()), filter);
    Pivot::build(
        &annual,
        |o| o.metric.clone(),
        |o| o.period.year.to_string(),
        |o| Some(o.value),
        Aggregation::Sum,
        &rows,
        &year_columns(&years),
    )
    .transform(mode)
}

/// Segments × quarters for one company, columns in period order.
pub fn quarterly_segment_heatmap(
    segments: &[Observation],
    company: &str,
    filter: Option<&[String]>,
    mode: GridMode,
) -> Pivot {
    let quarterly: Vec<&Observation> = segments
        .iter()
        .filter(|o| o.entity == company && !o.period.is_annual())
        .collect();
    let rows = segment_rows(quarterly.iter().map(|o| o.metric.as_str()), filter);
    let columns = period_columns(quarterly.iter().map(|o| &o.period));
    Pivot::build(
        &quarterly,
        |o| o.metric.clone(),
        |o| o.period.to_string(),
        |o| Some(o.value),
        Aggregation::Sum,
        &rows,
        &columns,
    )
    .transform(mode)
}

/// Companies × quarters for one metric, columns in period order.
pub fn quarterly_metric_heatmap(
    observations: &[Observation],
    metric: &str,
    companies: &[String],
    mode: GridMode,
) -> Pivot {
    let quarterly: Vec<&Observation> = observations
        .iter()
        .filter(|o| o.metric == metric && !o.period.is_annual())
        .filter(|o| companies.contains(&o.entity))
        .collect();
    let columns = period_columns(quarterly.iter().map(|o| &o.period));
    Pivot::build(
        &quarterly,
        |o| o.entity.clone(),
        |o| o.period.to_string(),
        |o| Some(o.value),
        Aggregation::Sum,
        companies,
        &columns,
    )
    .transform(mode)
}

/// Companies × resampled price buckets.
///
/// Each company's prices are matched by ticker or name and resampled to the
/// last observation per bucket. `period_limit` keeps only the trailing
/// buckets of the combined axis.
pub fn stock_heatmap(
    prices: &[PricePoint],
    companies: &[String],
    resolver: &NameResolver,
    frequency: Frequency,
    period_limit: Option<usize>,
    mode: GridMode,
) -> Pivot {
    let mut cells: Vec<(String, String, f64)> = Vec::new();
    let mut buckets = BTreeMap::new();
    for company in companies {
        let matched = filter_for_company(prices, company, resolver);
        debug!(company = %company, points = matched.len(), %frequency, "resampling prices");
        for row in resample(matched, frequency, None) {
            buckets.insert(row.bucket, row.label.clone());
            cells.push((company.clone(), row.label, row.price));
        }
    }

    let skip = period_limit.map_or(0, |limit| buckets.len().saturating_sub(limit));
    let columns: Vec<String> = buckets.into_values().skip(skip).collect();
    Pivot::build(
        &cells,
        |c| c.0.clone(),
        |c| c.1.clone(),
        |c| Some(c.2),
        Aggregation::Last,
        companies,
        &columns,
    )
    .transform(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn obs(entity: &str, metric: &str, period: PeriodKey, value: f64) -> Observation {
        Observation {
            entity: entity.to_string(),
            metric: metric.to_string(),
            period,
            value,
            source: "test".to_string(),
        }
    }

    fn q(year: i32, quarter: u8) -> PeriodKey {
        PeriodKey::quarterly(year, quarter).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_metric_heatmap_keeps_requested_shape() {
        let data = vec![
            obs("Apple", "revenue", PeriodKey::annual(2022), 100.0),
            obs("Apple", "revenue", PeriodKey::annual(2023), 120.0),
            obs("Apple", "revenue", q(2023, 1), 30.0),
            obs("Meta", "debt", PeriodKey::annual(2023), 5.0),
        ];
        let grid = metric_heatmap(
            &data,
            "revenue",
            &names(&["Meta", "Apple"]),
            2021..=2023,
            GridMode::Values,
        );
        assert_eq!(grid.rows(), names(&["Meta", "Apple"]).as_slice());
        assert_eq!(grid.columns(), names(&["2021", "2022", "2023"]).as_slice());
        assert_eq!(grid.get("Apple", "2023"), Some(120.0));
        assert_eq!(grid.row_values("Meta"), Some(vec![None, None, None]));

        let change = metric_heatmap(&data, "revenue", &names(&["Apple"]), 2022..=2023, GridMode::Change);
        assert_relative_eq!(change.get("Apple", "2023").unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_segment_heatmap_sorts_and_drops_totals() {
        let data = vec![
            obs("Apple", "iPhone", PeriodKey::annual(2023), 200.0),
            obs("Apple", "Mac", PeriodKey::annual(2023), 30.0),
            obs("Apple", "apps", PeriodKey::annual(2023), 20.0),
            obs("Apple", "Total Revenue", PeriodKey::annual(2023), 250.0),
            obs("Meta", "Ads", PeriodKey::annual(2023), 100.0),
        ];
        let grid = segment_heatmap(&data, "Apple", 2023..=2023, None, GridMode::Values);
        assert_eq!(grid.rows(), names(&["apps", "iPhone", "Mac"]).as_slice());

        let filter = names(&["Mac", "Wearables"]);
        let grid = segment_heatmap(&data, "Apple", 2023..=2023, Some(&filter), GridMode::Values);
        assert_eq!(grid.rows(), filter.as_slice());
        assert_eq!(grid.get("Wearables", "2023"), None);
    }

    #[test]
    fn test_quarterly_columns_follow_period_order() {
        let data = vec![
            obs("Alphabet", "YouTube ads", q(2024, 1), 1000.0),
            obs("Alphabet", "YouTube ads", q(2023, 4), 900.0),
            obs("Alphabet", "Google Cloud", q(2024, 2), 500.0),
        ];
        let grid = quarterly_segment_heatmap(&data, "Alphabet", None, GridMode::Values);
        assert_eq!(grid.columns(), names(&["Q4 2023", "Q1 2024", "Q2 2024"]).as_slice());
        assert_eq!(grid.rows(), names(&["Google Cloud", "YouTube ads"]).as_slice());
    }

    #[test]
    fn test_quarterly_metric_heatmap() {
        let data = vec![
            obs("Apple", "revenue", q(2024, 2), 2.0),
            obs("Apple", "revenue", q(2024, 1), 1.0),
            obs("Roku", "revenue", q(2023, 3), 9.0),
        ];
        let grid = quarterly_metric_heatmap(&data, "revenue", &names(&["Apple"]), GridMode::Values);
        assert_eq!(grid.columns(), names(&["Q1 2024", "Q2 2024"]).as_slice());
        assert_eq!(grid.get("Apple", "Q2 2024"), Some(2.0));
    }

    #[test]
    fn test_stock_heatmap_limits_trailing_buckets() {
        let day = |m: u32, d: u32| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let point = |date, price: f64, asset: &str| PricePoint {
            date,
            price,
            asset: asset.to_string(),
            tag: String::new(),
        };
        let prices = vec![
            point(day(1, 10), 10.0, "AAPL"),
            point(day(2, 10), 11.0, "AAPL"),
            point(day(3, 10), 12.0, "AAPL"),
            point(day(3, 20), 50.0, "NFLX"),
        ];
        let resolver = NameResolver::standard();
        let grid = stock_heatmap(
            &prices,
            &names(&["Apple", "Netflix"]),
            &resolver,
            Frequency::Monthly,
            Some(2),
            GridMode::Values,
        );
        assert_eq!(grid.columns(), names(&["2024-02", "2024-03"]).as_slice());
        assert_eq!(grid.get("Apple", "2024-03"), Some(12.0));
        assert_eq!(grid.get("Netflix", "2024-02"), None);
        assert_eq!(grid.get("Netflix", "2024-03"), Some(50.0));
    }
}
