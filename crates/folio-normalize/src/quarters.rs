//! Quarter inference for the quarterly company metrics export.
//!
//! That sheet lists rows per `(ticker, year)` without saying which quarter a
//! row is, and some blocks carry an extra annual-total row. A
//! [`QuarterRowSelector`] decides which rows are real quarters; quarters are
//! then numbered by position.

use crate::period::PeriodKey;
use folio_data::{MetricKey, MetricValues, QuarterlyMetricsRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Tuning for [`MagnitudeSelector`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuarterHeuristicConfig {
    /// A maximum at least this many times the runner-up is an annual total (default: 1.5)
    pub annual_ratio: f64,
    /// Rows kept per block (default: 4)
    pub max_quarters: usize,
}

impl Default for QuarterHeuristicConfig {
    fn default() -> Self {
        Self {
            annual_ratio: 1.5,
            max_quarters: 4,
        }
    }
}

/// Strategy choosing which rows of one `(ticker, year)` block are quarters.
pub trait QuarterRowSelector: Send + Sync + std::fmt::Debug {
    /// Strategy name for logging.
    fn name(&self) -> &str;

    /// Indices of the kept rows, ascending, given each row's reference value.
    fn select(&self, reference: &[Option<f64>]) -> Vec<usize>;
}

/// Drops magnitude outliers, then keeps the most recent rows.
///
/// If the block is longer than `max_quarters` and its largest reference
/// value is at least `annual_ratio` times the second-largest distinct value,
/// rows at that maximum are treated as injected annual totals and dropped.
/// The trailing `max_quarters` rows of what remains are kept.
///
/// This is a best-effort guess: nothing in the export marks totals.
#[derive(Debug, Clone, Default)]
pub struct MagnitudeSelector {
    config: QuarterHeuristicConfig,
}

impl MagnitudeSelector {
    /// Selector with explicit tuning.
    pub const fn with_config(config: QuarterHeuristicConfig) -> Self {
        Self { config }
    }

    /// Current tuning.
    pub const fn config(&self) -> &QuarterHeuristicConfig {
        &self.config
    }
}

impl QuarterRowSelector for MagnitudeSelector {
    fn name(&self) -> &str {
        "magnitude"
    }

    fn select(&self, reference: &[Option<f64>]) -> Vec<usize> {
        let max_quarters = self.config.max_quarters;
        let mut kept: Vec<usize> = (0..reference.len()).collect();
        if kept.len() <= max_quarters {
            return kept;
        }

        let mut distinct: Vec<f64> = reference.iter().flatten().copied().collect();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        if let [.., second, max] = distinct[..] {
            if second > 0.0 && max >= self.config.annual_ratio * second {
                let cutoff = self.config.annual_ratio * second;
                kept.retain(|&i| reference[i].is_none_or(|v| v < cutoff));
            }
        }

        if kept.len() > max_quarters {
            kept.drain(..kept.len() - max_quarters);
        }
        kept
    }
}

/// Keeps the trailing rows without looking at values.
#[derive(Debug, Clone, Copy)]
pub struct TrailingSelector {
    /// Rows kept per block
    pub max_quarters: usize,
}

impl Default for TrailingSelector {
    fn default() -> Self {
        Self { max_quarters: 4 }
    }
}

impl QuarterRowSelector for TrailingSelector {
    fn name(&self) -> &str {
        "trailing"
    }

    fn select(&self, reference: &[Option<f64>]) -> Vec<usize> {
        let start = reference.len().saturating_sub(self.max_quarters);
        (start..reference.len()).collect()
    }
}

/// A quarterly metrics row with its inferred period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterRow {
    /// Upper-cased ticker
    pub ticker: String,
    /// Inferred period
    pub period: PeriodKey,
    /// Reported metrics
    pub metrics: MetricValues,
}

/// Assign quarters to every `(ticker, year)` block.
///
/// Rows are grouped, ordered by their sheet position, filtered by `selector`
/// on the revenue column, and numbered 1.. in that order. Output is sorted by
/// ticker, then period.
pub fn assign_quarters(
    rows: &[QuarterlyMetricsRow],
    selector: &dyn QuarterRowSelector,
) -> Vec<QuarterRow> {
    let mut blocks: BTreeMap<(&str, i32), Vec<&QuarterlyMetricsRow>> = BTreeMap::new();
    for row in rows {
        blocks
            .entry((row.ticker.as_str(), row.year))
            .or_default()
            .push(row);
    }

    let mut out = Vec::with_capacity(rows.len());
    for ((ticker, year), mut block) in blocks {
        block.sort_by_key(|r| r.position);
        let reference: Vec<Option<f64>> = block
            .iter()
            .map(|r| r.metrics.get(&MetricKey::Revenue).copied())
            .collect();
        let kept = selector.select(&reference);
        if kept.len() != block.len() {
            debug!(
                ticker,
                year,
                rows = block.len(),
                kept = kept.len(),
                selector = selector.name(),
                "dropped non-quarter rows"
            );
        }
        for (n, idx) in kept.into_iter().enumerate() {
            let Ok(quarter) = u8::try_from(n + 1) else {
                break;
            };
            let Ok(period) = PeriodKey::quarterly(year, quarter) else {
                break;
            };
            out.push(QuarterRow {
                ticker: ticker.to_string(),
                period,
                metrics: block[idx].metrics.clone(),
            });
        }
    }
    out
}
