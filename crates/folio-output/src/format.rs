//! Display strings for values, changes and prices.

use folio_data::MetricKey;
use serde::Serialize;
use std::fmt;

/// Shown for missing values.
pub const MISSING: &str = "N/A";

/// Insert `,` every three digits of an unsigned integer string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `value` with two decimals and thousands separators.
fn with_separators(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .map_or((formatted.as_str(), None), |(i, f)| (i, Some(f)));
    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{}.{frac}", group_thousands(int_part)),
        None => format!("{sign}{}", group_thousands(int_part)),
    }
}

/// Format a one-decimal number, dropping a trailing `.0`.
fn trim_one_decimal(value: f64) -> String {
    let text = format!("{value:.1}");
    text.strip_suffix(".0").map_or_else(|| text.clone(), str::to_string)
}

/// Compact amount given in millions: `1500 → "1.5B"`, `2000 → "2B"`, `850 → "850M"`.
pub fn format_number(millions: Option<f64>) -> String {
    match millions.filter(|v| v.is_finite()) {
        None => MISSING.to_string(),
        Some(v) if v.abs() >= 1000.0 => format!("{}B", trim_one_decimal(v / 1000.0)),
        Some(v) => format!("{}M", trim_one_decimal(v)),
    }
}

/// Raw dollar amount: `$1.50B`, `$12.30M`, `$1,234.56`.
pub fn format_large_number(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        None => MISSING.to_string(),
        Some(v) if v.abs() >= 1e9 => format!("${:.2}B", v / 1e9),
        Some(v) if v.abs() >= 1e6 => format!("${:.2}M", v / 1e6),
        Some(v) => format!("${}", with_separators(v, 2)),
    }
}

/// Whole count with separators: `183,000`.
pub fn format_count(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map_or_else(|| MISSING.to_string(), |v| with_separators(v.round(), 0))
}

/// Signed percentage change: `"+10.0%"`, `"-3.2%"`, `"0.0%"`; missing → `""`.
pub fn format_change(pct: Option<f64>) -> String {
    match pct.filter(|v| v.is_finite()) {
        None => String::new(),
        Some(v) if v > 0.0 => format!("+{v:.1}%"),
        Some(v) => format!("{v:.1}%"),
    }
}

/// Price with separators: `$1,234.56`.
pub fn format_price(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map_or_else(|| MISSING.to_string(), |v| format!("${}", with_separators(v, 2)))
}

/// Whether a change is good, bad or flat news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeClass {
    /// Improvement
    Positive,
    /// Deterioration
    Negative,
    /// Flat or unknown
    Neutral,
}

impl ChangeClass {
    /// Lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ChangeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a change for `metric`; rising debt counts as negative.
pub fn change_class(pct: Option<f64>, metric: &str) -> ChangeClass {
    let Some(pct) = pct.filter(|v| v.is_finite()) else {
        return ChangeClass::Neutral;
    };
    let inverted = MetricKey::parse(metric).is_some_and(|m| m.lower_is_better());
    match (pct > 0.0, pct < 0.0, inverted) {
        (true, _, false) | (_, true, true) => ChangeClass::Positive,
        (true, _, true) | (_, true, false) => ChangeClass::Negative,
        _ => ChangeClass::Neutral,
    }
}
