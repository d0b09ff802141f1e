//! Deterministic, brand-aware segment colours.
//!
//! Colours are assigned over the sorted segment labels: company keyword
//! rules first, then the company palette followed by a shared fallback
//! palette, skipping candidates that are perceptually too close to a colour
//! already used. A neutral grey closes the chain.

use derive_more::{Display, From, Into};
use folio_normalize::rules::first_match;
use folio_normalize::segments::segment_key;
use folio_normalize::{KeywordRule, canonical_company, is_total_label};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// An upper-case `#RRGGBB` colour.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
pub struct ColorToken(String);

impl ColorToken {
    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColorToken {
    fn from(hex: &str) -> Self {
        Self(hex.to_uppercase())
    }
}

/// Colour assignment tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Minimum RGB distance between two palette colours of one company (default: 38.0)
    pub min_distance: f64,
    /// Colour used when every candidate is exhausted (default: `#9CA3AF`)
    pub neutral: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            min_distance: 38.0,
            neutral: "#9CA3AF".to_string(),
        }
    }
}

/// An RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

/// Parse `#RRGGBB` (the `#` is optional).
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Upper-case `#RRGGBB`.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
}

/// Euclidean distance between two colours.
pub fn color_distance(a: Rgb, b: Rgb) -> f64 {
    let d = |x: u8, y: u8| (f64::from(x) - f64::from(y)).powi(2);
    (d(a.r, b.r) + d(a.g, b.g) + d(a.b, b.b)).sqrt()
}

/// `color * ratio + target * (1 - ratio)`, channel-wise.
pub fn blend(color: &str, target: &str, ratio: f64) -> Option<String> {
    let (base, target) = (hex_to_rgb(color)?, hex_to_rgb(target)?);
    let mix = |b: u8, t: u8| {
        (f64::from(b) * ratio + f64::from(t) * (1.0 - ratio))
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Some(rgb_to_hex(Rgb {
        r: mix(base.r, target.r),
        g: mix(base.g, target.g),
        b: mix(base.b, target.b),
    }))
}

/// Readable text colour on top of `background`.
pub fn contrast_text(background: &str) -> &'static str {
    let Some(rgb) = hex_to_rgb(background) else {
        return "#111827";
    };
    let luminance =
        (0.299 * f64::from(rgb.r) + 0.587 * f64::from(rgb.g) + 0.114 * f64::from(rgb.b)) / 255.0;
    if luminance > 0.6 { "#111827" } else { "#FFFFFF" }
}

/// Base palette used when expanding an empty palette.
pub const DEFAULT_BASE_PALETTE: &[&str] = &["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];

/// Deterministic tints of `base`, at most `needed` of them.
///
/// Each colour is blended toward white at ratios 1.0, 0.85 and 0.7; if that
/// is still short, toward black at 0.9 and 0.75. Duplicates are removed.
pub fn expand_palette(base: &[&str], needed: usize) -> Vec<String> {
    let base = if base.is_empty() {
        DEFAULT_BASE_PALETTE
    } else {
        base
    };
    let tint = |target: &str, ratios: &[f64]| -> Vec<String> {
        ratios
            .iter()
            .flat_map(|&ratio| base.iter().filter_map(move |c| blend(c, target, ratio)))
            .collect()
    };

    let mut palette = tint("#FFFFFF", &[1.0, 0.85, 0.7]);
    if palette.len() < needed {
        palette.extend(tint("#000000", &[0.9, 0.75]));
    }

    let mut seen = HashSet::new();
    palette.retain(|c| seen.insert(c.clone()));
    palette.truncate(needed);
    palette
}

const fn rule(keywords: &'static [&'static str], color: &'static str) -> KeywordRule<&'static str> {
    KeywordRule::new(keywords, color)
}

const ALPHABET_COLORS: &[KeywordRule<&str>] = &[
    rule(&["youtube"], "#FF0000"),
    rule(&["search", "ads"], "#4285F4"),
    rule(&["cloud"], "#34A853"),
    rule(&["network"], "#F59E0B"),
    rule(&["subs", "subscription", "platforms", "devices"], "#F6BF26"),
    rule(&["other bets"], "#8B9094"),
    rule(&["hedging", "other"], "#A3AAAE"),
];

const AMAZON_COLORS: &[KeywordRule<&str>] = &[
    rule(&["aws"], "#FFA826"),
    rule(&["online", "north america"], "#262626"),
    rule(&["third-party", "third party", "reseller", "seller services"], "#C98826"),
    rule(&["adv", "advertising", "ads"], "#FF9900"),
    rule(&["subscription"], "#C47500"),
    rule(&["physical"], "#4D4D4D"),
    rule(&["international", "other"], "#FFD89D"),
];

const APPLE_COLORS: &[KeywordRule<&str>] = &[
    rule(&["iphone"], "#111111"),
    rule(&["mac"], "#007AFF"),
    rule(&["ipad"], "#34C759"),
    rule(&["services"], "#5AC8FA"),
    rule(&["wearables", "wearable", "home", "accessories", "accessory"], "#AF52DE"),
    rule(&["ipod", "legacy"], "#353535"),
];

const META_COLORS: &[KeywordRule<&str>] = &[
    rule(&["family"], "#0668E1"),
    rule(&["reality"], "#2693FC"),
    rule(&["other"], "#1C2B33"),
];

const MICROSOFT_COLORS: &[KeywordRule<&str>] = &[
    rule(&["linkedin"], "#268BC0"),
    rule(&["search", "news", "online services"], "#FFB900"),
    rule(
        &[
            "productivity",
            "business processes",
            "office",
            "commercial licensing",
            "microsoft business division",
            "dynamics",
            "company services",
        ],
        "#F46A43",
    ),
    rule(
        &["intelligent cloud", "server and cloud", "server and tools", "server", "cloud"],
        "#0073A7",
    ),
    rule(&["gaming", "xbox"], "#34C759"),
    rule(&["devices", "device", "hardware", "surface"], "#737373"),
    rule(&["windows"], "#00A4EF"),
    rule(&["more personal computing", "phone", "entertainment", "computing"], "#00A4EF"),
    rule(&["commercial other", "corporate", "unallocated", "other"], "#737373"),
];

const NETFLIX_COLORS: &[KeywordRule<&str>] = &[
    rule(&["ucan"], "#E92E37"),
    rule(&["emea"], "#B20710"),
    rule(&["latam"], "#BE2C34"),
    rule(&["apac"], "#E50914"),
];

const DISNEY_COLORS: &[KeywordRule<&str>] = &[
    rule(
        &[
            "parks",
            "experiences",
            "resorts",
            "domestic parks",
            "international parks",
            "consumer products",
            "interactive media",
        ],
        "#00C2FF",
    ),
    rule(&["media networks", "linear", "espn"], "#081E66"),
    rule(&["direct-to", "dtc"], "#A2D0D7"),
    rule(&["studio"], "#FF9500"),
    rule(&["licensing", "content sales"], "#3559D6"),
    rule(&["elimination", "eliminations", "intrasegment"], "#6F878B"),
];

const COMCAST_COLORS: &[KeywordRule<&str>] = &[
    rule(&["nbc", "media"], "#0088D2"),
    rule(&["theme park", "theme parks"], "#00B345"),
    rule(&["corporate", "elimination", "eliminations"], "#A3AAAE"),
];

const WARNER_BROS_DISCOVERY_COLORS: &[KeywordRule<&str>] = &[
    rule(&["networks"], "#4D71D4"),
    rule(&["dtc"], "#2652CA"),
    rule(&["studios"], "#B18A26"),
    rule(&["advertising"], "#D0A22D"),
    rule(&["distribution"], "#DDBC67"),
    rule(&["corporate", "elimination", "eliminations", "other"], "#0034C1"),
];

const PARAMOUNT_COLORS: &[KeywordRule<&str>] = &[
    rule(&["tv media", "tv"], "#00C2FF"),
    rule(&["filmed"], "#1B73FF"),
    rule(&["advertising"], "#000A3B"),
    rule(&["affiliate"], "#262F58"),
    rule(&["licensing", "content"], "#4D5476"),
    rule(&["dtc"], "#737890"),
    rule(&["elimination", "eliminations"], "#A3AAAE"),
];

const SPOTIFY_COLORS: &[KeywordRule<&str>] = &[
    rule(&["premium"], "#1ED760"),
    rule(&["ad-supported", "ad supported", "ad"], "#111111"),
];

const ROKU_COLORS: &[KeywordRule<&str>] = &[
    rule(&["platform"], "#853CBD"),
    rule(&["device"], "#6F1AB1"),
];

/// Brand keyword rules per canonical company.
pub const SEGMENT_COLOR_RULES: &[(&str, &[KeywordRule<&str>])] = &[
    ("Alphabet", ALPHABET_COLORS),
    ("Amazon", AMAZON_COLORS),
    ("Apple", APPLE_COLORS),
    ("Meta", META_COLORS),
    ("Microsoft", MICROSOFT_COLORS),
    ("Netflix", NETFLIX_COLORS),
    ("Disney", DISNEY_COLORS),
    ("Comcast", COMCAST_COLORS),
    ("Warner Bros Discovery", WARNER_BROS_DISCOVERY_COLORS),
    ("Paramount", PARAMOUNT_COLORS),
    ("Spotify", SPOTIFY_COLORS),
    ("Roku", ROKU_COLORS),
];

/// Brand palettes per canonical company.
pub const COMPANY_PALETTES: &[(&str, &[&str])] = &[
    ("Alphabet", &["#4285F4", "#34A853", "#F59E0B", "#F6BF26", "#8B9094", "#A3AAAE"]),
    ("Amazon", &["#FFA826", "#262626", "#C98826", "#FF9900", "#C47500", "#4D4D4D", "#FFD89D"]),
    ("Apple", &["#111111", "#007AFF", "#34C759", "#5AC8FA", "#AF52DE", "#353535"]),
    ("Meta", &["#0668E1", "#2693FC", "#1C2B33"]),
    ("Microsoft", &["#0073A7", "#F46A43", "#00A4EF", "#268BC0", "#FFB900", "#737373"]),
    ("Netflix", &["#E92E37", "#B20710", "#BE2C34", "#E50914"]),
    ("Disney", &["#00C2FF", "#081E66", "#A2D0D7", "#FF9500", "#3559D6", "#6F878B"]),
    ("Comcast", &["#FFBA00", "#F56F02", "#CB1F47", "#645DAC", "#0088D2", "#00B345"]),
    (
        "Warner Bros Discovery",
        &["#4D71D4", "#2652CA", "#B18A26", "#D0A22D", "#DDBC67", "#0034C1"],
    ),
    (
        "Paramount",
        &["#00C2FF", "#1B73FF", "#000A3B", "#262F58", "#4D5476", "#737890", "#A3AAAE"],
    ),
    ("Spotify", &["#1ED760", "#40DD78", "#79E7A0"]),
    ("Roku", &["#853CBD", "#6F1AB1"]),
];

/// Shared palette appended after every brand palette.
pub const FALLBACK_PALETTE: &[&str] = &[
    "#1B73FF", "#00C2FF", "#34C759", "#FF9500", "#AF52DE", "#FF3B30", "#FFD60A", "#0F9D58",
    "#FF6D00",
];

/// Primary brand colour per canonical company, for cross-company charts.
pub const COMPANY_COLORS: &[(&str, &str)] = &[
    ("Alphabet", "#4285F4"),
    ("Apple", "#000000"),
    ("Meta", "#0668E1"),
    ("Microsoft", "#00A4EF"),
    ("Amazon", "#FF9900"),
    ("Netflix", "#E50914"),
    ("Disney", "#113CCF"),
    ("Comcast", "#FFBA00"),
    ("Warner Bros Discovery", "#D0A22D"),
    ("Paramount", "#000A3B"),
    ("Spotify", "#1ED760"),
    ("Roku", "#6F1AB1"),
];

fn lookup<T: Copy>(table: &[(&str, T)], company: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| *name == company)
        .map(|(_, value)| *value)
}

/// Brand colour of a company, if it has one.
pub fn company_color(company: &str) -> Option<ColorToken> {
    lookup(COMPANY_COLORS, &canonical_company(company)).map(ColorToken::from)
}

/// Assigns stable colours to a company's segments.
#[derive(Debug, Clone, Default)]
pub struct ColorAssigner {
    config: ColorConfig,
}

impl ColorAssigner {
    /// Assigner with explicit tuning.
    pub const fn new(config: ColorConfig) -> Self {
        Self { config }
    }

    /// Current tuning.
    pub const fn config(&self) -> &ColorConfig {
        &self.config
    }

    /// Colour per distinct segment label.
    ///
    /// Labels are deduplicated, totals dropped and the rest sorted
    /// case-insensitively before assignment, so the result depends only on
    /// the set of labels. Brand rule colours are placed first, in that
    /// order; a rule colour too close to one already placed is dropped and
    /// its segment goes to the palette pass with the unmatched ones.
    pub fn assign<S: AsRef<str>>(&self, company: &str, labels: &[S]) -> BTreeMap<String, ColorToken> {
        let company = canonical_company(company);
        let mut segments: Vec<&str> = labels
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty() && !is_total_label(s))
            .collect();
        segments.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));
        segments.dedup();

        let rules = lookup(SEGMENT_COLOR_RULES, &company).unwrap_or(&[]);
        let mut assigned = BTreeMap::new();
        let mut used: Vec<Rgb> = Vec::new();
        let mut remaining = Vec::new();
        for segment in segments.iter().copied() {
            match first_match(rules, &segment_key(segment)) {
                Some(color) if self.is_distinct(color, &used) => {
                    used.extend(hex_to_rgb(color));
                    assigned.insert(segment.to_string(), ColorToken::from(*color));
                }
                _ => remaining.push(segment),
            }
        }

        let candidates = self.candidates(&company, segments.len());
        let mut cursor = candidates.iter();
        for segment in remaining {
            let token = cursor
                .by_ref()
                .find(|c| self.is_distinct(c, &used))
                .map_or_else(
                    || ColorToken::from(self.config.neutral.as_str()),
                    |c| ColorToken::from(c.as_str()),
                );
            used.extend(hex_to_rgb(token.as_str()));
            assigned.insert(segment.to_string(), token);
        }
        assigned
    }

    /// Brand palette (tinted when shorter than `needed`) followed by the
    /// fallback palette, deduplicated.
    fn candidates(&self, company: &str, needed: usize) -> Vec<String> {
        let brand = lookup(COMPANY_PALETTES, company).unwrap_or(&[]);
        let brand: Vec<String> = if !brand.is_empty() && brand.len() < needed {
            expand_palette(brand, needed)
        } else {
            brand.iter().map(|c| c.to_uppercase()).collect()
        };

        let mut seen = HashSet::new();
        brand
            .into_iter()
            .chain(FALLBACK_PALETTE.iter().map(|c| c.to_uppercase()))
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }

    fn is_distinct(&self, candidate: &str, used: &[Rgb]) -> bool {
        hex_to_rgb(candidate).is_some_and(|rgb| {
            used.iter()
                .all(|u| color_distance(rgb, *u) >= self.config.min_distance)
        })
    }
}
