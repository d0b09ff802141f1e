//! Memoization of parsed sheets.
//!
//! Entries are keyed by `(path, sheet, normalized column spec, mtime)`. A
//! changed modification time produces a different key, so stale entries are
//! never returned; they are dropped as soon as a fresher table for the same
//! sheet and columns is published.

pub mod eviction;

pub use eviction::{EvictionPolicy, Lru, Unbounded};

use crate::columns::{LogicalColumn, normalize_header};
use crate::table::RawTable;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Identity of one cached table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Workbook path
    pub path: PathBuf,
    /// Sheet name
    pub sheet: String,
    /// Normalized column specs, in request order
    pub columns: Vec<String>,
    /// Modification time captured when the key was built
    pub mtime: u64,
}

impl CacheKey {
    /// Build a key, normalizing column names.
    pub fn new(path: PathBuf, sheet: &str, columns: &[&str], mtime: u64) -> Self {
        Self {
            path,
            sheet: sheet.to_string(),
            columns: columns.iter().map(|c| normalize_header(c)).collect(),
            mtime,
        }
    }

    /// Key for a load restricted to `columns`.
    ///
    /// Each column contributes its name, whether it is required and its
    /// synonyms, so two requests sharing names but resolving headers
    /// differently never share an entry.
    pub fn for_columns(path: PathBuf, sheet: &str, columns: &[LogicalColumn], mtime: u64) -> Self {
        let specs: Vec<String> = columns.iter().map(LogicalColumn::cache_spec).collect();
        let specs: Vec<&str> = specs.iter().map(String::as_str).collect();
        Self::new(path, sheet, &specs, mtime)
    }

    fn same_source(&self, other: &Self) -> bool {
        self.path == other.path && self.sheet == other.sheet && self.columns == other.columns
    }
}

/// Cache sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of tables held; `None` disables eviction (default: 32)
    pub capacity: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: Some(32) }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that required a fresh parse
    pub misses: u64,
    /// Entries removed by the eviction policy
    pub evictions: u64,
    /// Entries currently held
    pub entries: usize,
}

#[derive(Debug)]
struct CacheInner {
    entries: HashMap<CacheKey, Arc<RawTable>>,
    policy: Box<dyn EvictionPolicy>,
    stats: CacheStats,
}

/// Thread-safe table cache.
///
/// Tables are published as `Arc<RawTable>` under a single lock, so readers
/// always see either no entry or a complete one. Populating the same key
/// twice is harmless: both parses yield equivalent tables.
#[derive(Debug)]
pub struct SourceCache {
    inner: Mutex<CacheInner>,
}

impl SourceCache {
    /// Create a cache with an explicit eviction policy.
    pub fn with_policy(policy: Box<dyn EvictionPolicy>) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                policy,
                stats: CacheStats::default(),
            }),
        }
    }

    /// Create a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        match config.capacity {
            Some(capacity) => Self::with_policy(Box::new(Lru::new(capacity))),
            None => Self::with_policy(Box::new(Unbounded)),
        }
    }

    /// Look up a table, recording a hit or miss.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<RawTable>> {
        let mut inner = self.inner.lock();
        match inner.entries.get(key).cloned() {
            Some(table) => {
                inner.policy.touch(key);
                inner.stats.hits += 1;
                debug!(sheet = %key.sheet, "source cache hit");
                Some(table)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Publish a table, replacing stale versions of the same source.
    pub fn insert(&self, key: CacheKey, table: Arc<RawTable>) {
        let mut inner = self.inner.lock();

        let stale: Vec<CacheKey> = inner
            .entries
            .keys()
            .filter(|k| k.same_source(&key) && k.mtime != key.mtime)
            .cloned()
            .collect();
        for old in stale {
            inner.entries.remove(&old);
            inner.policy.forget(&old);
        }

        inner.policy.touch(&key);
        inner.entries.insert(key, table);

        while let Some(victim) = {
            let len = inner.entries.len();
            inner.policy.victim(len)
        } {
            if inner.entries.remove(&victim).is_some() {
                inner.stats.evictions += 1;
                debug!(sheet = %victim.sheet, "source cache eviction");
            }
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let keys: Vec<CacheKey> = inner.entries.keys().cloned().collect();
        for key in &keys {
            inner.policy.forget(key);
        }
        inner.entries.clear();
    }

    /// Current statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            ..inner.stats
        }
    }
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Best-effort file modification time in milliseconds since the epoch.
///
/// Returns `0` when the file is missing or the platform cannot report it.
pub fn file_mtime(path: &Path) -> u64 {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_millis() as u64)
}
