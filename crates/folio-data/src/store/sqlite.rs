//! SQLite persistence for canonical observations.
//!
//! The store is the hand-off point to external SQL tooling: one row per
//! `(entity, metric, year, quarter)` with the sheet it came from.

use crate::error::{DataError, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Quarter value written for annual observations.
const ANNUAL_QUARTER: i64 = 0;

/// One canonical `(entity, period, metric, value)` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObservation {
    /// Canonical entity name
    pub entity: String,
    /// Metric key
    pub metric: String,
    /// Calendar or fiscal year
    pub year: i32,
    /// Quarter 1..=4, `None` for annual values
    pub quarter: Option<u8>,
    /// Observed value
    pub value: f64,
    /// Source sheet
    pub source: String,
}

/// Row counts in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total observations
    pub observations: usize,
    /// Distinct entities
    pub entities: usize,
    /// Distinct metrics
    pub metrics: usize,
}

/// SQLite-backed observation store.
#[derive(Debug)]
pub struct ObservationStore {
    conn: Connection,
}

impl ObservationStore {
    /// Open (or create) a store at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS observations (
                entity TEXT NOT NULL,
                metric TEXT NOT NULL,
                year INTEGER NOT NULL,
                quarter INTEGER NOT NULL,
                value REAL NOT NULL,
                source TEXT NOT NULL,
                stored_at TEXT NOT NULL,
                PRIMARY KEY (entity, metric, year, quarter)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_observations_entity ON observations(entity)",
            [],
        )?;

        Ok(())
    }

    /// Upsert a batch of observations in one transaction.
    ///
    /// Rewriting an existing `(entity, metric, year, quarter)` replaces it.
    pub fn put_observations(&self, rows: &[StoredObservation]) -> Result<usize> {
        let stored_at = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        for row in rows {
            let quarter = match row.quarter {
                None => ANNUAL_QUARTER,
                Some(q @ 1..=4) => i64::from(q),
                Some(q) => {
                    return Err(DataError::Parse(format!(
                        "Invalid quarter {} for {} {}",
                        q, row.entity, row.metric
                    )));
                }
            };
            tx.execute(
                "INSERT OR REPLACE INTO observations
                 (entity, metric, year, quarter, value, source, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.entity, row.metric, row.year, quarter, row.value, row.source, stored_at
                ],
            )?;
        }

        tx.commit()?;
        debug!(rows = rows.len(), "stored observations");
        Ok(rows.len())
    }

    /// All observations for an entity, ordered by metric then period.
    pub fn get_observations(&self, entity: &str) -> Result<Vec<StoredObservation>> {
        let mut stmt = self.conn.prepare(
            "SELECT entity, metric, year, quarter, value, source
             FROM observations
             WHERE entity = ?1
             ORDER BY metric, year, quarter",
        )?;

        let rows = stmt
            .query_map(params![entity], |row| {
                let quarter: i64 = row.get(3)?;
                Ok(StoredObservation {
                    entity: row.get(0)?,
                    metric: row.get(1)?,
                    year: row.get(2)?,
                    quarter: u8::try_from(quarter).ok().filter(|q| *q != 0),
                    value: row.get(4)?,
                    source: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Distinct entity names in the store.
    pub fn entities(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT entity FROM observations ORDER BY entity")?;

        let entities = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(entities)
    }

    /// Delete every observation.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM observations", [])?;
        Ok(())
    }

    /// Row counts.
    pub fn get_stats(&self) -> Result<StoreStats> {
        let observations: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))?;

        let entities: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT entity) FROM observations",
            [],
            |row| row.get(0),
        )?;

        let metrics: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT metric) FROM observations",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            observations: observations as usize,
            entities: entities as usize,
            metrics: metrics as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(entity: &str, metric: &str, year: i32, quarter: Option<u8>, value: f64) -> StoredObservation {
        StoredObservation {
            entity: entity.to_string(),
            metric: metric.to_string(),
            year,
            quarter,
            value,
            source: "Company_metrics_earnings_values".to_string(),
        }
    }

    #[test]
    fn test_store_initialization() {
        let store = ObservationStore::in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = ObservationStore::in_memory().unwrap();
        store
            .put_observations(&[
                obs("Apple", "revenue", 2023, None, 383285.0),
                obs("Apple", "revenue", 2023, Some(4), 119575.0),
            ])
            .unwrap();
        store
            .put_observations(&[obs("Apple", "revenue", 2023, None, 383000.0)])
            .unwrap();

        let rows = store.get_observations("Apple").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].quarter, None);
        assert_eq!(rows[0].value, 383000.0);
        assert_eq!(rows[1].quarter, Some(4));
    }

    #[test]
    fn test_invalid_quarter_is_rejected() {
        let store = ObservationStore::in_memory().unwrap();
        let result = store.put_observations(&[obs("Apple", "revenue", 2023, Some(5), 1.0)]);
        assert!(matches!(result, Err(DataError::Parse(_))));
        assert_eq!(store.get_stats().unwrap().observations, 0);
    }

    #[test]
    fn test_stats_and_clear() {
        let store = ObservationStore::in_memory().unwrap();
        store
            .put_observations(&[
                obs("Apple", "revenue", 2023, None, 1.0),
                obs("Meta", "revenue", 2023, None, 2.0),
                obs("Meta", "net_income", 2023, None, 3.0),
            ])
            .unwrap();

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.observations, 3);
        assert_eq!(stats.entities, 2);
        assert_eq!(stats.metrics, 2);
        assert_eq!(store.entities().unwrap(), vec!["Apple", "Meta"]);

        store.clear().unwrap();
        assert_eq!(store.get_stats().unwrap().observations, 0);
    }
}
