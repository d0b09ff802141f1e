//! Period keys, quarter label parsing and display axes.

use crate::error::{NormalizeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A `(year, quarter)` time bucket; `quarter == None` is the full year.
///
/// Ordering is by year, then quarter, with the annual bucket sorting after
/// the fourth quarter of the same year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Calendar or fiscal year
    pub year: i32,
    /// Quarter 1..=4, `None` for annual values
    pub quarter: Option<u8>,
}

impl PeriodKey {
    /// Annual bucket.
    pub const fn annual(year: i32) -> Self {
        Self {
            year,
            quarter: None,
        }
    }

    /// Quarterly bucket.
    ///
    /// # Errors
    /// [`NormalizeError::InvalidQuarter`] unless `quarter` is in `1..=4`.
    pub const fn quarterly(year: i32, quarter: u8) -> Result<Self> {
        if quarter >= 1 && quarter <= 4 {
            Ok(Self {
                year,
                quarter: Some(quarter),
            })
        } else {
            Err(NormalizeError::InvalidQuarter(quarter))
        }
    }

    /// Whether this is an annual bucket.
    pub const fn is_annual(&self) -> bool {
        self.quarter.is_none()
    }

    /// Same bucket one year earlier.
    pub const fn previous_year(&self) -> Self {
        Self {
            year: self.year - 1,
            quarter: self.quarter,
        }
    }

    /// Immediately preceding bucket of the same granularity.
    ///
    /// Q1 steps back to Q4 of the prior year; annual steps back one year.
    pub const fn previous(&self) -> Self {
        match self.quarter {
            Some(1) => Self {
                year: self.year - 1,
                quarter: Some(4),
            },
            Some(q) => Self {
                year: self.year,
                quarter: Some(q - 1),
            },
            None => self.previous_year(),
        }
    }

    /// Label in one of the accepted input shapes.
    pub fn label(&self, shape: PeriodShape) -> String {
        match self.quarter {
            None => self.year.to_string(),
            Some(q) => match shape {
                PeriodShape::QuarterFirst => format!("{}Q{}", q, self.year),
                PeriodShape::QuarterPrefixed => format!("Q{} {}", q, self.year),
                PeriodShape::YearFirst => format!("{}Q{}", self.year, q),
            },
        }
    }

    fn quarter_rank(&self) -> u8 {
        self.quarter.unwrap_or(5)
    }
}

impl Ord for PeriodKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.quarter_rank().cmp(&other.quarter_rank()))
    }
}

impl PartialOrd for PeriodKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quarter {
            Some(q) => write!(f, "Q{} {}", q, self.year),
            None => write!(f, "{}", self.year),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = NormalizeError;

    /// Accepts every quarter shape of [`parse_period`] plus a bare year.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(key) = parse_period(s) {
            return Ok(key);
        }
        let trimmed = s.trim();
        if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(year) = trimmed.parse() {
                return Ok(Self::annual(year));
            }
        }
        Err(NormalizeError::UnparseablePeriod(s.to_string()))
    }
}

/// Accepted quarter label shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodShape {
    /// `1Q24`, `1Q2024`
    QuarterFirst,
    /// `Q1 24`, `Q1 2024`
    QuarterPrefixed,
    /// `24Q1`, `2024 Q1`
    YearFirst,
}

const PATTERNS: [(PeriodShape, &str); 3] = [
    (PeriodShape::QuarterFirst, r"(?i)^([1-4])Q(\d{2,4})$"),
    (PeriodShape::QuarterPrefixed, r"(?i)^Q([1-4])\s*(\d{2,4})$"),
    (PeriodShape::YearFirst, r"(?i)^(\d{2,4})\s*Q([1-4])$"),
];

static QUARTER_PATTERNS: Lazy<Vec<(PeriodShape, Regex)>> = Lazy::new(|| {
    PATTERNS
        .iter()
        .filter_map(|(shape, pattern)| Regex::new(pattern).ok().map(|re| (*shape, re)))
        .collect()
});

static FOUR_DIGIT_YEAR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d{4})").ok());

/// Parse a quarter label such as `1Q24`, `Q1 2024` or `2024Q1`.
///
/// Two-digit years map to `2000 + yy`. Returns `None` for anything else;
/// callers drop such rows.
pub fn parse_period(label: &str) -> Option<PeriodKey> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    QUARTER_PATTERNS.iter().find_map(|(shape, re)| {
        let caps = re.captures(label)?;
        let (quarter, year) = match shape {
            PeriodShape::YearFirst => (caps.get(2)?, caps.get(1)?),
            PeriodShape::QuarterFirst | PeriodShape::QuarterPrefixed => {
                (caps.get(1)?, caps.get(2)?)
            }
        };
        let quarter: u8 = quarter.as_str().parse().ok()?;
        let mut year: i32 = year.as_str().parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        PeriodKey::quarterly(year, quarter).ok()
    })
}

/// Year embedded in a display label: parsed quarter first, else the first
/// four-digit run.
pub fn label_year(label: &str) -> Option<i32> {
    if let Some(key) = parse_period(label) {
        return Some(key.year);
    }
    FOUR_DIGIT_YEAR
        .as_ref()?
        .captures(label)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Category axis with synthetic gaps between year groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AxisLayout {
    /// Category order including gap categories
    pub category_order: Vec<String>,
    /// Tick positions, one per category
    pub tick_values: Vec<String>,
    /// Tick text; empty for gaps
    pub tick_text: Vec<String>,
}

impl AxisLayout {
    /// Number of synthetic gap categories.
    pub fn gap_count(&self) -> usize {
        self.tick_text.iter().filter(|t| t.is_empty()).count()
    }
}

/// Build a display axis over ordered labels.
///
/// A gap category `gap-<year>-<n>` with empty tick text is inserted between
/// two consecutive labels whenever their embedded year changes. Labels with
/// no recognizable year never trigger a gap.
pub fn build_axis<S: AsRef<str>>(labels: &[S]) -> AxisLayout {
    let mut axis = AxisLayout::default();
    let mut last_year: Option<i32> = None;
    let mut gap_index = 0usize;

    for label in labels {
        let label = label.as_ref();
        let year = label_year(label);
        if let (Some(prev), Some(current)) = (last_year, year) {
            if prev != current {
                let gap = format!("gap-{prev}-{gap_index}");
                axis.category_order.push(gap.clone());
                axis.tick_values.push(gap);
                axis.tick_text.push(String::new());
                gap_index += 1;
            }
        }
        axis.category_order.push(label.to_string());
        axis.tick_values.push(label.to_string());
        axis.tick_text.push(label.to_string());
        last_year = year;
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_patterns_compile() {
        assert_eq!(QUARTER_PATTERNS.len(), PATTERNS.len());
        assert!(FOUR_DIGIT_YEAR.is_some());
    }

    #[rstest]
    #[case("1Q24", 2024, 1)]
    #[case("4q2019", 2019, 4)]
    #[case("Q2 2023", 2023, 2)]
    #[case("q3 21", 2021, 3)]
    #[case("Q12022", 2022, 1)]
    #[case("2024Q1", 2024, 1)]
    #[case("2020 q4", 2020, 4)]
    #[case("24Q3", 2024, 3)]
    #[case(" 1Q24 ", 2024, 1)]
    fn test_parse_period(#[case] label: &str, #[case] year: i32, #[case] quarter: u8) {
        assert_eq!(
            parse_period(label),
            Some(PeriodKey::quarterly(year, quarter).unwrap())
        );
    }

    #[rstest]
    #[case("")]
    #[case("FY2024")]
    #[case("5Q24")]
    #[case("Q0 2024")]
    #[case("2024")]
    #[case("1Q")]
    fn test_unparseable_labels(#[case] label: &str) {
        assert_eq!(parse_period(label), None);
    }

    #[test]
    fn test_every_shape_round_trips() {
        for year in [2001, 2019, 2024] {
            for quarter in 1..=4 {
                let key = PeriodKey::quarterly(year, quarter).unwrap();
                for shape in [
                    PeriodShape::QuarterFirst,
                    PeriodShape::QuarterPrefixed,
                    PeriodShape::YearFirst,
                ] {
                    assert_eq!(parse_period(&key.label(shape)), Some(key), "{shape:?}");
                }
            }
        }
    }

    #[test]
    fn test_ordering_places_annual_after_q4() {
        let mut keys = vec![
            PeriodKey::annual(2023),
            PeriodKey::quarterly(2024, 1).unwrap(),
            PeriodKey::quarterly(2023, 4).unwrap(),
            PeriodKey::quarterly(2023, 1).unwrap(),
        ];
        keys.sort();
        assert_eq!(
            keys.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["Q1 2023", "Q4 2023", "2023", "Q1 2024"]
        );
    }

    #[test]
    fn test_previous_wraps_year() {
        let q1 = PeriodKey::quarterly(2024, 1).unwrap();
        assert_eq!(q1.previous(), PeriodKey::quarterly(2023, 4).unwrap());
        assert_eq!(q1.previous_year(), PeriodKey::quarterly(2023, 1).unwrap());
        assert_eq!(PeriodKey::annual(2024).previous(), PeriodKey::annual(2023));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("2024".parse::<PeriodKey>(), Ok(PeriodKey::annual(2024)));
        assert_eq!(
            "Q3 2022".parse::<PeriodKey>(),
            Ok(PeriodKey::quarterly(2022, 3).unwrap())
        );
        assert!(matches!(
            "H1 2022".parse::<PeriodKey>(),
            Err(NormalizeError::UnparseablePeriod(_))
        ));
        assert_eq!(PeriodKey::quarterly(2024, 5), Err(NormalizeError::InvalidQuarter(5)));
    }

    #[test]
    fn test_axis_inserts_one_gap_per_year_change() {
        let axis = build_axis(&["Q1 2020", "Q2 2020", "Q1 2021"]);
        assert_eq!(
            axis.category_order,
            vec!["Q1 2020", "Q2 2020", "gap-2020-0", "Q1 2021"]
        );
        assert_eq!(axis.tick_text, vec!["Q1 2020", "Q2 2020", "", "Q1 2021"]);
        assert_eq!(axis.tick_values, axis.category_order);
        assert_eq!(axis.gap_count(), 1);
    }

    #[test]
    fn test_axis_with_compact_labels_and_unknown_years() {
        let axis = build_axis(&["3Q23", "4Q23", "1Q24", "Other", "2Q24", "1Q25"]);
        assert_eq!(axis.gap_count(), 2);
        assert_eq!(axis.category_order.len(), 8);
        assert_eq!(axis.category_order[2], "gap-2023-0");
        assert_eq!(axis.category_order[7 - 1], "gap-2024-1");
    }
}
