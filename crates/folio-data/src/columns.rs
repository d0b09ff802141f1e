//! Logical column definitions and header resolution.

use serde::Serialize;

/// A column a sheet loader asks for by meaning rather than by exact header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LogicalColumn {
    /// Canonical name; also the first header tried
    pub name: &'static str,
    /// Alternative headers, tried in order after `name`
    pub synonyms: &'static [&'static str],
    /// Whether the sheet is unusable without this column
    pub required: bool,
}

impl LogicalColumn {
    /// A required column.
    pub const fn required(name: &'static str, synonyms: &'static [&'static str]) -> Self {
        Self {
            name,
            synonyms,
            required: true,
        }
    }

    /// An optional column; absent columns read as empty cells.
    pub const fn optional(name: &'static str, synonyms: &'static [&'static str]) -> Self {
        Self {
            name,
            synonyms,
            required: false,
        }
    }

    /// Candidate headers in resolution order.
    pub fn candidates(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.synonyms.iter().copied())
    }

    /// Normalized name, `!` or `?` for required or optional, then the
    /// normalized synonyms joined by `|`.
    pub fn cache_spec(&self) -> String {
        let marker = if self.required { '!' } else { '?' };
        let synonyms: Vec<String> = self.synonyms.iter().map(|s| normalize_header(s)).collect();
        format!("{}{marker}{}", normalize_header(self.name), synonyms.join("|"))
    }
}

/// Header normalization used for every comparison: trimmed and lowercased.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Outcome of matching logical columns against a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolution {
    /// Source column index per requested logical column, `None` when unmatched
    pub indices: Vec<Option<usize>>,
    /// Required logical columns with no match
    pub missing: Vec<String>,
}

impl ColumnResolution {
    /// Whether every required column was found.
    pub const fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Resolve each logical column against `headers`.
///
/// For every column the exact name is tried first, then each synonym in
/// order; the first header that matches wins. Matching ignores case and
/// surrounding whitespace.
pub fn resolve_columns(headers: &[String], columns: &[LogicalColumn]) -> ColumnResolution {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let mut indices = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();

    for column in columns {
        let found = column.candidates().find_map(|candidate| {
            let wanted = normalize_header(candidate);
            normalized.iter().position(|h| *h == wanted)
        });
        if found.is_none() && column.required {
            missing.push(column.name.to_string());
        }
        indices.push(found);
    }

    ColumnResolution { indices, missing }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE: LogicalColumn =
        LogicalColumn::required("price", &["close", "close price", "adj close"]);
    const TAG: LogicalColumn = LogicalColumn::optional("tag", &[]);

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_exact_name_beats_synonym() {
        let res = resolve_columns(&headers(&["Close", "Price"]), &[PRICE]);
        assert_eq!(res.indices, vec![Some(1)]);
        assert!(res.is_complete());
    }

    #[test]
    fn test_synonym_order_is_respected() {
        let res = resolve_columns(&headers(&["adj close", " Close Price "]), &[PRICE]);
        assert_eq!(res.indices, vec![Some(1)]);
    }

    #[test]
    fn test_missing_required_and_optional() {
        let res = resolve_columns(&headers(&["date", "asset"]), &[PRICE, TAG]);
        assert_eq!(res.indices, vec![None, None]);
        assert_eq!(res.missing, vec!["price".to_string()]);
        assert!(!res.is_complete());
    }
}
