//! Declarative keyword rule tables.
//!
//! A rule table is an ordered list of `(keywords, output)` pairs. Evaluation
//! walks the list in order and the first rule with any keyword contained in
//! the lower-cased input wins, so rule order is part of the data.

use crate::error::{NormalizeError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One `(keywords, output)` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule<T: 'static> {
    /// Lower-case substrings, any of which triggers the rule
    pub keywords: &'static [&'static str],
    /// Value produced when the rule fires
    pub output: T,
}

impl<T> KeywordRule<T> {
    /// Build a rule.
    pub const fn new(keywords: &'static [&'static str], output: T) -> Self {
        Self { keywords, output }
    }

    /// Whether any keyword is a substring of `key` (already lower-cased).
    pub fn matches(&self, key: &str) -> bool {
        self.keywords.iter().any(|k| key.contains(k))
    }
}

/// Output of the first rule matching `key`.
pub fn first_match<'a, T>(rules: &'a [KeywordRule<T>], key: &str) -> Option<&'a T> {
    rules.iter().find(|r| r.matches(key)).map(|r| &r.output)
}

/// Reject rules that can never fire.
pub fn validate<T: std::fmt::Debug>(company: &str, rules: &[KeywordRule<T>]) -> Result<()> {
    match rules.iter().find(|r| r.keywords.iter().all(|k| k.is_empty())) {
        Some(rule) => Err(NormalizeError::EmptyRule {
            company: company.to_string(),
            output: format!("{:?}", rule.output),
        }),
        None => Ok(()),
    }
}

/// Canonical label for all Disney parks-related segments.
pub const DISNEY_PARKS_LABEL: &str = "Parks, Experiences & Products";

/// Exact labels that are totals rather than segments.
pub const TOTAL_LABELS: &[&str] = &[
    "total",
    "totale",
    "total revenue",
    "total revenues",
    "revenue total",
];

const ALPHABET: &[KeywordRule<&str>] = &[
    KeywordRule::new(&["youtube"], "YouTube ads"),
    KeywordRule::new(&["search"], "Google Search & other"),
    KeywordRule::new(&["cloud"], "Google Cloud"),
    KeywordRule::new(&["network"], "Google Network"),
    KeywordRule::new(
        &["subs", "subscription", "platform", "device"],
        "Google subs, platforms and devices",
    ),
    KeywordRule::new(&["other bets"], "Other bets"),
    KeywordRule::new(&["hedging"], "Hedging gains"),
];

const SPOTIFY: &[KeywordRule<&str>] = &[
    KeywordRule::new(&["premium"], "Premium"),
    KeywordRule::new(&["ad"], "Ad Supported"),
];

const ROKU: &[KeywordRule<&str>] = &[
    KeywordRule::new(&["platform"], "Platform"),
    // Quarterly sheets say "Devices", insights say "Player".
    KeywordRule::new(&["player", "device"], "Player"),
];

const WARNER_BROS_DISCOVERY: &[KeywordRule<&str>] = &[
    KeywordRule::new(&["distrib"], "Distribution"),
    KeywordRule::new(&["advert"], "Advertising"),
    KeywordRule::new(&["content", "studio"], "Content"),
    KeywordRule::new(&["other", "corporate", "elimination"], "Other"),
];

const DISNEY: &[KeywordRule<&str>] = &[KeywordRule::new(
    &[
        "parks",
        "experiences",
        "resorts",
        "domestic parks",
        "international parks",
        "consumer products",
        "interactive media",
    ],
    DISNEY_PARKS_LABEL,
)];

/// Segment label rules per canonical company, in declaration order.
pub const SEGMENT_LABEL_RULES: &[(&str, &[KeywordRule<&str>])] = &[
    ("Alphabet", ALPHABET),
    ("Spotify", SPOTIFY),
    ("Roku", ROKU),
    ("Warner Bros Discovery", WARNER_BROS_DISCOVERY),
    ("Disney", DISNEY),
];

static SEGMENT_LABEL_INDEX: Lazy<HashMap<&'static str, &'static [KeywordRule<&'static str>]>> =
    Lazy::new(|| SEGMENT_LABEL_RULES.iter().copied().collect());

/// Segment label rules for a canonical company; empty when it has none.
pub fn segment_label_rules(company: &str) -> &'static [KeywordRule<&'static str>] {
    SEGMENT_LABEL_INDEX.get(company).copied().unwrap_or(&[])
}
