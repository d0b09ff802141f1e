//! Canonical observations and per-metric series.

use crate::period::PeriodKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One canonical `(entity, period, metric, value)` fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Canonical entity name
    pub entity: String,
    /// Metric key or canonical segment label
    pub metric: String,
    /// Time bucket
    pub period: PeriodKey,
    /// Value
    pub value: f64,
    /// Sheet the value came from
    pub source: String,
}

/// Ascending, duplicate-free history of one metric for one entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MetricSeries {
    entity: String,
    metric: String,
    points: Vec<(PeriodKey, f64)>,
}

impl MetricSeries {
    /// Build a series, sorting by period and summing values that share one.
    pub fn from_points(
        entity: impl Into<String>,
        metric: impl Into<String>,
        points: impl IntoIterator<Item = (PeriodKey, f64)>,
    ) -> Self {
        let mut merged: BTreeMap<PeriodKey, f64> = BTreeMap::new();
        for (period, value) in points {
            *merged.entry(period).or_insert(0.0) += value;
        }
        Self {
            entity: entity.into(),
            metric: metric.into(),
            points: merged.into_iter().collect(),
        }
    }

    /// Group observations into one series per `(entity, metric)`, sorted by both.
    pub fn group(observations: &[Observation]) -> Vec<Self> {
        let mut groups: BTreeMap<(&str, &str), Vec<(PeriodKey, f64)>> = BTreeMap::new();
        for obs in observations {
            groups
                .entry((obs.entity.as_str(), obs.metric.as_str()))
                .or_default()
                .push((obs.period, obs.value));
        }
        groups
            .into_iter()
            .map(|((entity, metric), points)| Self::from_points(entity, metric, points))
            .collect()
    }

    /// Entity name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Metric name.
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Points in ascending period order.
    pub fn points(&self) -> &[(PeriodKey, f64)] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at `period`.
    pub fn get(&self, period: PeriodKey) -> Option<f64> {
        self.points
            .binary_search_by(|(p, _)| p.cmp(&period))
            .ok()
            .map(|idx| self.points[idx].1)
    }

    /// Most recent point.
    pub fn latest(&self) -> Option<(PeriodKey, f64)> {
        self.points.last().copied()
    }

    /// Points restricted to annual or to quarterly buckets.
    pub fn filter_annual(&self, annual: bool) -> Self {
        Self {
            entity: self.entity.clone(),
            metric: self.metric.clone(),
            points: self
                .points
                .iter()
                .copied()
                .filter(|(p, _)| p.is_annual() == annual)
                .collect(),
        }
    }
}
