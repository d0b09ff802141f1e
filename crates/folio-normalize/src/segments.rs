//! Segment label classification.

use crate::names::NameResolver;
use crate::rules::{TOTAL_LABELS, first_match, segment_label_rules};

/// Lower-cased, trimmed comparison key for a segment label.
pub fn segment_key(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Whether a label is a total line rather than a real segment.
pub fn is_total_label(label: &str) -> bool {
    let key = segment_key(label);
    TOTAL_LABELS.contains(&key.as_str()) || key.starts_with("total ") || key.ends_with(" total")
}

/// Buckets raw segment labels into canonical per-company categories.
#[derive(Debug, Clone)]
pub struct SegmentClassifier {
    resolver: NameResolver,
}

impl SegmentClassifier {
    /// Classifier resolving company names with `resolver`.
    pub const fn new(resolver: NameResolver) -> Self {
        Self { resolver }
    }

    /// Canonical label for `raw_label`, or `None` for totals and blanks.
    ///
    /// Labels that match no rule of the company are returned trimmed.
    pub fn classify(&self, company: &str, raw_label: &str) -> Option<String> {
        let label = raw_label.trim();
        if label.is_empty() || is_total_label(label) {
            return None;
        }
        let company = self.resolver.canonicalize(company);
        let key = segment_key(label);
        let canonical = first_match(segment_label_rules(&company), &key)
            .map_or(label, |output| *output);
        Some(canonical.to_string())
    }

    /// The resolver used for company names.
    pub const fn resolver(&self) -> &NameResolver {
        &self.resolver
    }
}

impl Default for SegmentClassifier {
    fn default() -> Self {
        Self::new(NameResolver::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DISNEY_PARKS_LABEL;
    use rstest::rstest;

    #[rstest]
    #[case("Total")]
    #[case("  TOTALE ")]
    #[case("Total Revenue")]
    #[case("total revenues")]
    #[case("Revenue Total")]
    #[case("Total segment revenue")]
    #[case("Segments total")]
    fn test_totals_are_excluded_for_every_company(#[case] label: &str) {
        let classifier = SegmentClassifier::default();
        for company in ["Alphabet", "Apple", "Spotify", "Acme"] {
            assert_eq!(classifier.classify(company, label), None);
        }
    }

    #[rstest]
    #[case("Alphabet", "YouTube Ads", "YouTube ads")]
    #[case("Google", "youtube ads", "YouTube ads")]
    #[case("Alphabet", "Google Search & other", "Google Search & other")]
    #[case("Alphabet", "Google subscriptions, platforms, and devices", "Google subs, platforms and devices")]
    #[case("Alphabet", "Other Bets", "Other bets")]
    #[case("Spotify", "Ad-Supported", "Ad Supported")]
    #[case("Roku", "Devices", "Player")]
    #[case("Warner Bros. Discovery", "Studios", "Content")]
    #[case("Warner Bros", "Corporate and eliminations", "Other")]
    #[case("Walt Disney", "Experiences", DISNEY_PARKS_LABEL)]
    #[case("Apple", " iPhone ", "iPhone")]
    fn test_classify(#[case] company: &str, #[case] raw: &str, #[case] expected: &str) {
        let classifier = SegmentClassifier::default();
        assert_eq!(classifier.classify(company, raw).as_deref(), Some(expected));
    }

    #[test]
    fn test_blank_label_is_excluded() {
        assert_eq!(SegmentClassifier::default().classify("Apple", "   "), None);
    }
}
