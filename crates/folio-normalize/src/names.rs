//! Company name canonicalization.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Suffix some exports append to broadcaster entries.
const BROADCASTER_SUFFIX: &str = " (Broadcaster)";

/// Built-in alias table, alias → canonical name.
const COMPANY_ALIASES: &[(&str, &str)] = &[
    ("Google", "Alphabet"),
    ("Meta Platforms", "Meta"),
    ("Warner Bros. Discovery", "Warner Bros Discovery"),
    ("Warner Bros", "Warner Bros Discovery"),
    ("Warner Bros.", "Warner Bros Discovery"),
    ("Paramount Global", "Paramount"),
    ("Walt Disney", "Disney"),
];

/// Built-in ticker table, canonical name → tickers.
const COMPANY_TICKERS: &[(&str, &[&str])] = &[
    ("Alphabet", &["GOOGL", "GOOG"]),
    ("Apple", &["AAPL"]),
    ("Meta", &["META", "FB"]),
    ("Microsoft", &["MSFT"]),
    ("Amazon", &["AMZN"]),
    ("Netflix", &["NFLX"]),
    ("Disney", &["DIS"]),
    ("Comcast", &["CMCSA"]),
    ("Warner Bros Discovery", &["WBD"]),
    ("Paramount", &["PARA"]),
    ("Spotify", &["SPOT"]),
    ("Roku", &["ROKU"]),
];

static STANDARD: Lazy<NameResolver> = Lazy::new(NameResolver::standard);

/// Canonical company name using the built-in tables.
pub fn canonical_company(name: &str) -> String {
    STANDARD.canonicalize(name)
}

/// The shared resolver built from the built-in tables.
pub fn standard_resolver() -> &'static NameResolver {
    &STANDARD
}

/// Many-to-one alias resolution with a ticker directory.
///
/// Lookups ignore case and surrounding whitespace. The alias map is kept
/// flat (no alias points at another alias), which makes
/// `canonicalize(canonicalize(x)) == canonicalize(x)` hold for every input.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    // lower-cased alias -> canonical
    aliases: HashMap<String, String>,
    // upper-cased ticker -> canonical
    tickers: HashMap<String, String>,
    // canonical -> tickers in declaration order
    tickers_by_company: HashMap<String, Vec<String>>,
}

impl NameResolver {
    /// An empty resolver; every name maps to itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver loaded with the built-in alias and ticker tables.
    pub fn standard() -> Self {
        let mut resolver = Self::new();
        for (alias, canonical) in COMPANY_ALIASES {
            resolver.add_alias(alias, canonical);
        }
        for (company, tickers) in COMPANY_TICKERS {
            for ticker in *tickers {
                resolver.add_ticker(ticker, company);
            }
        }
        resolver
    }

    /// Register `alias → canonical`.
    ///
    /// The target is resolved first and aliases already pointing at `alias`
    /// are re-pointed, so chains never form. An alias of itself is ignored.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        let canonical = self.canonicalize(canonical);
        let key = alias.trim().to_lowercase();
        if key.is_empty() || key == canonical.to_lowercase() {
            return;
        }
        for target in self.aliases.values_mut() {
            if target.to_lowercase() == key {
                target.clone_from(&canonical);
            }
        }
        self.aliases.insert(key, canonical);
    }

    /// Register a ticker for a company.
    pub fn add_ticker(&mut self, ticker: &str, company: &str) {
        let company = self.canonicalize(company);
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return;
        }
        let listed = self.tickers_by_company.entry(company.clone()).or_default();
        if !listed.contains(&ticker) {
            listed.push(ticker.clone());
        }
        self.tickers.insert(ticker, company);
    }

    /// Canonical form of a company name; unmapped names pass through trimmed.
    pub fn canonicalize(&self, name: &str) -> String {
        let mut stripped = name.to_string();
        while stripped.contains(BROADCASTER_SUFFIX) {
            stripped = stripped.replace(BROADCASTER_SUFFIX, "");
        }
        let trimmed = stripped.trim();
        self.aliases
            .get(&trimmed.to_lowercase())
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// Canonical name from either a company name or an exact upper-case ticker.
    pub fn resolve(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let is_ticker_shaped = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.');
        if is_ticker_shaped {
            if let Some(company) = self.tickers.get(trimmed) {
                return company.clone();
            }
        }
        self.canonicalize(trimmed)
    }

    /// Company owning `ticker`, matched case-insensitively.
    pub fn company_for_ticker(&self, ticker: &str) -> Option<&str> {
        self.tickers
            .get(&ticker.trim().to_uppercase())
            .map(String::as_str)
    }

    /// Tickers listed for a company (any alias accepted).
    pub fn tickers_for(&self, company: &str) -> &[String] {
        self.tickers_by_company
            .get(&self.canonicalize(company))
            .map_or(&[], Vec::as_slice)
    }

    /// Every canonical company that has at least one ticker, sorted.
    pub fn known_companies(&self) -> Vec<&str> {
        let mut companies: Vec<&str> = self.tickers_by_company.keys().map(String::as_str).collect();
        companies.sort_unstable();
        companies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Google", "Alphabet")]
    #[case("  google ", "Alphabet")]
    #[case("Meta Platforms", "Meta")]
    #[case("Warner Bros.", "Warner Bros Discovery")]
    #[case("Warner Bros. Discovery", "Warner Bros Discovery")]
    #[case("Paramount Global", "Paramount")]
    #[case("Netflix (Broadcaster)", "Netflix")]
    #[case("Acme Corp", "Acme Corp")]
    fn test_canonicalize(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonical_company(raw), expected);
    }

    #[test]
    fn test_every_alias_is_idempotent() {
        let resolver = NameResolver::standard();
        for (alias, canonical) in COMPANY_ALIASES {
            let once = resolver.canonicalize(alias);
            assert_eq!(once, *canonical);
            assert_eq!(resolver.canonicalize(&once), once);
            assert_eq!(resolver.canonicalize(canonical), *canonical);
        }
    }

    #[rstest]
    #[case("Google (Broadcaster)", "Alphabet")]
    #[case("Google (Broadcaster) (Broadcaster)", "Alphabet")]
    #[case("Acme (Broadcaster) (Broadcaster) ", "Acme")]
    #[case("Acme (Broad (Broadcaster)caster)", "Acme")]
    fn test_broadcaster_suffix_is_fully_stripped(#[case] raw: &str, #[case] expected: &str) {
        let resolver = NameResolver::standard();
        let once = resolver.canonicalize(raw);
        assert_eq!(once, expected);
        assert_eq!(resolver.canonicalize(&once), once);
    }

    #[test]
    fn test_added_alias_never_chains() {
        let mut resolver = NameResolver::new();
        resolver.add_alias("GOOG Inc", "Google");
        resolver.add_alias("Google", "Alphabet");
        assert_eq!(resolver.canonicalize("GOOG Inc"), "Alphabet");
        assert_eq!(resolver.canonicalize("Alphabet"), "Alphabet");

        resolver.add_alias("Alphabet", "Alphabet");
        assert_eq!(resolver.canonicalize("Alphabet"), "Alphabet");
    }

    #[test]
    fn test_ticker_directory() {
        let resolver = standard_resolver();
        assert_eq!(resolver.company_for_ticker("googl"), Some("Alphabet"));
        assert_eq!(resolver.company_for_ticker("FB"), Some("Meta"));
        assert_eq!(resolver.tickers_for("Meta Platforms"), ["META", "FB"]);
        assert!(resolver.tickers_for("Acme").is_empty());
        assert_eq!(resolver.known_companies().len(), 12);
    }

    #[rstest]
    #[case("WBD", "Warner Bros Discovery")]
    #[case("Meta", "Meta")]
    #[case("META", "Meta")]
    #[case("Google", "Alphabet")]
    fn test_resolve_accepts_tickers(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(standard_resolver().resolve(raw), expected);
    }
}
