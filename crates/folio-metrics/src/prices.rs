//! Price history resampling and company matching.

use crate::error::{MetricsError, Result};
use chrono::{Datelike, Days, NaiveDate};
use folio_data::PricePoint;
use folio_normalize::{NameResolver, PeriodKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Resampling bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Frequency {
    /// Calendar years, labelled `2024`
    Yearly,
    /// Calendar quarters, labelled `Q1 2024`
    #[default]
    Quarterly,
    /// Calendar months, labelled `2024-01`
    Monthly,
    /// Weeks ending Sunday, labelled by that Sunday
    Weekly,
    /// Single days
    Daily,
}

impl Frequency {
    /// All frequencies, widest first.
    pub const ALL: [Self; 5] = [
        Self::Yearly,
        Self::Quarterly,
        Self::Monthly,
        Self::Weekly,
        Self::Daily,
    ];

    /// Sortable key of the bucket containing `date`.
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        let start = match self {
            Self::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1),
            Self::Quarterly => {
                let first_month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), first_month, 1)
            }
            Self::Monthly => date.with_day(1),
            Self::Weekly => {
                let to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
                date.checked_add_days(Days::new(u64::from(to_sunday)))
            }
            Self::Daily => Some(date),
        };
        start.unwrap_or(date)
    }

    /// Display label of the bucket keyed by `bucket`.
    pub fn label(&self, bucket: NaiveDate) -> String {
        match self {
            Self::Yearly => PeriodKey::annual(bucket.year()).to_string(),
            Self::Quarterly => format!("Q{} {}", bucket.month0() / 3 + 1, bucket.year()),
            Self::Monthly => bucket.format("%Y-%m").to_string(),
            Self::Weekly | Self::Daily => bucket.format("%Y-%m-%d").to_string(),
        }
    }

    /// Lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Quarterly => "quarterly",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::Daily => "daily",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yearly" | "annual" | "year" | "y" => Ok(Self::Yearly),
            "quarterly" | "quarter" | "q" => Ok(Self::Quarterly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "daily" | "day" | "d" => Ok(Self::Daily),
            _ => Err(MetricsError::UnknownFrequency(s.to_string())),
        }
    }
}

/// One resampled price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResampledPrice {
    /// Bucket key
    pub bucket: NaiveDate,
    /// Bucket label
    pub label: String,
    /// Last observed price in the bucket
    pub price: f64,
}

/// Last observation per bucket, ascending, optionally limited to the
/// trailing `period_limit` buckets.
///
/// Only buckets containing at least one observation are emitted.
pub fn resample<'a>(
    points: impl IntoIterator<Item = &'a PricePoint>,
    frequency: Frequency,
    period_limit: Option<usize>,
) -> Vec<ResampledPrice> {
    let mut ordered: Vec<&PricePoint> = points
        .into_iter()
        .filter(|p| p.price.is_finite())
        .collect();
    ordered.sort_by_key(|p| p.date);

    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in ordered {
        buckets.insert(frequency.bucket(point.date), point.price);
    }

    let skip = period_limit.map_or(0, |limit| buckets.len().saturating_sub(limit));
    buckets
        .into_iter()
        .skip(skip)
        .map(|(bucket, price)| ResampledPrice {
            bucket,
            label: frequency.label(bucket),
            price,
        })
        .collect()
}

/// Price points belonging to `company`.
///
/// A point matches when its asset or tag is one of the company's tickers,
/// or when the asset name contains the company name (case-insensitive).
pub fn filter_for_company<'a>(
    prices: &'a [PricePoint],
    company: &str,
    resolver: &NameResolver,
) -> Vec<&'a PricePoint> {
    let canonical = resolver.canonicalize(company);
    let tickers = resolver.tickers_for(&canonical);
    let needle = canonical.to_lowercase();

    prices
        .iter()
        .filter(|p| {
            let asset = p.asset.trim();
            let tag = p.tag.trim();
            let by_ticker = tickers
                .iter()
                .any(|t| t.eq_ignore_ascii_case(asset) || t.eq_ignore_ascii_case(tag));
            by_ticker || (!needle.is_empty() && asset.to_lowercase().contains(&needle))
        })
        .collect()
}
