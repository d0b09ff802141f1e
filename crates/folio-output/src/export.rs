//! CSV, JSON and DataFrame export of canonical tables and grids.

use folio_metrics::Pivot;
use folio_normalize::Observation;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// DataFrame construction error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty" | "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One canonical observation, flattened for tabular output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservationRecord {
    /// Canonical entity
    pub entity: String,
    /// Metric key or segment label
    pub metric: String,
    /// Year
    pub year: i32,
    /// Quarter, empty for annual values
    pub quarter: Option<u8>,
    /// Period label
    pub period: String,
    /// Value
    pub value: f64,
    /// Source sheet
    pub source: String,
}

impl From<&Observation> for ObservationRecord {
    fn from(obs: &Observation) -> Self {
        Self {
            entity: obs.entity.clone(),
            metric: obs.metric.clone(),
            year: obs.period.year,
            quarter: obs.period.quarter,
            period: obs.period.to_string(),
            value: obs.value,
            source: obs.source.clone(),
        }
    }
}

/// Flatten observations in their given order.
pub fn observation_records(observations: &[Observation]) -> Vec<ObservationRecord> {
    observations.iter().map(ObservationRecord::from).collect()
}

/// One grid cell in long form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridRecord {
    /// Row key
    pub row: String,
    /// Column key
    pub column: String,
    /// Cell value, empty when null
    pub value: Option<f64>,
}

/// Every cell of `grid`, row-major, nulls included.
pub fn grid_records(grid: &Pivot) -> Vec<GridRecord> {
    grid.values()
        .indexed_iter()
        .map(|((r, c), value)| GridRecord {
            row: grid.rows()[r].clone(),
            column: grid.columns()[c].clone(),
            value: *value,
        })
        .collect()
}

fn csv_string<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn records_to_string<T: Serialize>(records: &[T], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => csv_string(records),
        ExportFormat::Json => Ok(serde_json::to_string(records)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(records)?),
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for Vec<ObservationRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        records_to_string(self, format)
    }
}

impl Exporter for Vec<GridRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        records_to_string(self, format)
    }
}

/// Observation records as a DataFrame with one column per field.
pub fn observations_frame(records: &[ObservationRecord]) -> Result<DataFrame, ExportError> {
    let entity: Vec<&str> = records.iter().map(|r| r.entity.as_str()).collect();
    let metric: Vec<&str> = records.iter().map(|r| r.metric.as_str()).collect();
    let year: Vec<i32> = records.iter().map(|r| r.year).collect();
    let quarter: Vec<Option<i32>> = records.iter().map(|r| r.quarter.map(i32::from)).collect();
    let period: Vec<&str> = records.iter().map(|r| r.period.as_str()).collect();
    let value: Vec<f64> = records.iter().map(|r| r.value).collect();
    let source: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();

    Ok(DataFrame::new(vec![
        Series::new("entity".into(), entity).into(),
        Series::new("metric".into(), metric).into(),
        Series::new("year".into(), year).into(),
        Series::new("quarter".into(), quarter).into(),
        Series::new("period".into(), period).into(),
        Series::new("value".into(), value).into(),
        Series::new("source".into(), source).into(),
    ])?)
}

/// A grid as a DataFrame: a `row` key column, then one column per grid column.
pub fn grid_frame(grid: &Pivot) -> Result<DataFrame, ExportError> {
    let mut columns: Vec<Column> = Vec::with_capacity(grid.columns().len() + 1);
    let keys: Vec<&str> = grid.rows().iter().map(String::as_str).collect();
    columns.push(Series::new("row".into(), keys).into());
    for (c, name) in grid.columns().iter().enumerate() {
        let cells: Vec<Option<f64>> = grid.values().column(c).to_vec();
        columns.push(Series::new(name.as_str().into(), cells).into());
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_normalize::PeriodKey;
    use ndarray::array;

    fn sample() -> Vec<ObservationRecord> {
        let obs = |metric: &str, period: PeriodKey, value: f64| Observation {
            entity: "Alphabet".to_string(),
            metric: metric.to_string(),
            period,
            value,
            source: "Alphabet Quarterly Segments".to_string(),
        };
        observation_records(&[
            obs("YouTube ads", PeriodKey::quarterly(2024, 1).unwrap(), 1000.0),
            obs("revenue", PeriodKey::annual(2023), 307_394.0),
        ])
    }

    fn grid() -> Pivot {
        Pivot::new(
            vec!["Apple".to_string(), "Meta".to_string()],
            vec!["2022".to_string(), "2023".to_string()],
            array![[Some(1.0), None], [Some(3.0), Some(4.0)]],
        )
        .unwrap()
    }

    #[test]
    fn test_observations_csv() {
        let csv = sample().export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("entity,metric,year,quarter,period,value,source")
        );
        assert_eq!(
            lines.next(),
            Some("Alphabet,YouTube ads,2024,1,Q1 2024,1000.0,Alphabet Quarterly Segments")
        );
        assert!(lines.next().unwrap().starts_with("Alphabet,revenue,2023,,2023,"));
    }

    #[test]
    fn test_observations_json() {
        let json = sample().export_to_string(ExportFormat::Json).unwrap();
        let parsed: Vec<ObservationRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());

        let pretty = sample().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains("\n  "));
    }

    #[test]
    fn test_grid_records_keep_nulls() {
        let records = grid_records(&grid());
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].value, None);
        let csv = records.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("Apple,2023,\n"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("observations.{}", ExportFormat::Json.extension()));
        sample().export_to_file(&path, ExportFormat::Json).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"YouTube ads\""));
    }

    #[test]
    fn test_frames() {
        let df = observations_frame(&sample()).unwrap();
        assert_eq!(df.shape(), (2, 7));
        assert_eq!(df.column("quarter").unwrap().null_count(), 1);

        let df = grid_frame(&grid()).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("2023").unwrap().null_count(), 1);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("pretty".parse::<ExportFormat>().unwrap(), ExportFormat::PrettyJson);
        assert!(matches!(
            "xml".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }
}
