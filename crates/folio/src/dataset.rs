//! Whole-workbook assembly into canonical tables.

use crate::config::FolioConfig;
use crate::error::{FolioError, Result};
use folio_data::sheets::{
    AD_REVENUE_SHEET, ANNUAL_METRICS_SHEET, EMPLOYEES_SHEET, QUARTERLY_METRICS_SHEET,
    SEGMENT_REVENUE_SHEET,
};
use folio_data::store::StoreStats;
use folio_data::{
    AdRevenueRow, CompanyInsight, MoneySupplyPoint, ObservationStore, PricePoint, SegmentInsight,
    SheetReader, SourceCache, SourceLoader, StoredObservation, WorkbookBackend,
};
use folio_metrics::{AnnualTableRow, annual_table};
use folio_normalize::{
    MagnitudeSelector, MetricSeries, NameResolver, Observation, PeriodKey, SegmentClassifier,
    assign_quarters, parse_period,
};
use folio_output::{ExportFormat, Exporter, ObservationRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Metric name of employee headcount observations.
pub const EMPLOYEES_METRIC: &str = "employees";

/// Metric name of advertising revenue observations.
pub const AD_REVENUE_METRIC: &str = "ad_revenue";

/// Canonical tables built from one workbook.
///
/// Company metrics and segment revenues are kept apart because segment
/// labels are open-ended while metric names are fixed.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    workbook: PathBuf,
    sheet_names: Vec<String>,
    metrics: Vec<Observation>,
    segments: Vec<Observation>,
    ad_revenue: Vec<AdRevenueRow>,
    prices: Vec<PricePoint>,
    money_supply: Vec<MoneySupplyPoint>,
    company_insights: Vec<CompanyInsight>,
    segment_insights: Vec<SegmentInsight>,
    resolver: NameResolver,
}

/// Sum observations sharing `(entity, metric, period)`, ordered by that key.
fn collapse(observations: Vec<Observation>) -> Vec<Observation> {
    let mut merged: BTreeMap<(String, String, PeriodKey), Observation> = BTreeMap::new();
    for obs in observations {
        merged
            .entry((obs.entity.clone(), obs.metric.clone(), obs.period))
            .and_modify(|existing| existing.value += obs.value)
            .or_insert(obs);
    }
    merged.into_values().collect()
}

impl Dataset {
    /// Load the configured workbook with the calamine backend.
    ///
    /// # Errors
    /// Only a missing workbook is an error; problems inside individual sheets
    /// leave those sheets empty.
    pub fn load(config: &FolioConfig) -> Result<Self> {
        let path = config.resolve_workbook().ok_or(FolioError::WorkbookNotFound)?;
        if !path.is_file() {
            return Err(FolioError::MissingWorkbook(path));
        }
        let loader = SourceLoader::new(Arc::new(SourceCache::from_config(&config.cache)));
        Ok(Self::from_reader(&SheetReader::new(&loader, &path), config))
    }

    /// Assemble from any sheet reader.
    pub fn from_reader<B: WorkbookBackend>(reader: &SheetReader<'_, B>, config: &FolioConfig) -> Self {
        let resolver = NameResolver::standard();
        let classifier = SegmentClassifier::new(resolver.clone());

        let mut metrics = Vec::new();
        for row in reader.annual_metrics() {
            let entity = resolver.canonicalize(&row.company);
            metrics.extend(row.metrics.iter().map(|(metric, value)| Observation {
                entity: entity.clone(),
                metric: metric.key().to_string(),
                period: PeriodKey::annual(row.year),
                value: *value,
                source: ANNUAL_METRICS_SHEET.to_string(),
            }));
        }

        let selector = MagnitudeSelector::with_config(config.quarters);
        for row in assign_quarters(&reader.quarterly_metrics(), &selector) {
            let entity = resolver
                .company_for_ticker(&row.ticker)
                .map_or_else(|| row.ticker.clone(), str::to_string);
            metrics.extend(row.metrics.iter().map(|(metric, value)| Observation {
                entity: entity.clone(),
                metric: metric.key().to_string(),
                period: row.period,
                value: *value,
                source: QUARTERLY_METRICS_SHEET.to_string(),
            }));
        }

        metrics.extend(reader.employees().into_iter().map(|row| Observation {
            entity: resolver.canonicalize(&row.company),
            metric: EMPLOYEES_METRIC.to_string(),
            period: PeriodKey::annual(row.year),
            value: row.employees,
            source: EMPLOYEES_SHEET.to_string(),
        }));

        let ad_revenue: Vec<AdRevenueRow> = reader
            .ad_revenue()
            .into_iter()
            .map(|row| AdRevenueRow {
                company: resolver.resolve(&row.company),
                ..row
            })
            .collect();
        metrics.extend(ad_revenue.iter().map(|row| Observation {
            entity: row.company.clone(),
            metric: AD_REVENUE_METRIC.to_string(),
            period: PeriodKey::annual(row.year),
            value: row.revenue,
            source: AD_REVENUE_SHEET.to_string(),
        }));

        let mut segments = Vec::new();
        for row in reader.segment_revenues() {
            let entity = resolver.canonicalize(&row.company);
            if let Some(label) = classifier.classify(&entity, &row.segment) {
                segments.push(Observation {
                    entity,
                    metric: label,
                    period: PeriodKey::annual(row.year),
                    value: row.revenue,
                    source: SEGMENT_REVENUE_SHEET.to_string(),
                });
            }
        }
        let mut unparsed = 0usize;
        for row in reader.quarterly_segments() {
            let Some(period) = parse_period(&row.period) else {
                unparsed += 1;
                continue;
            };
            let entity = resolver.canonicalize(&row.company);
            if let Some(label) = classifier.classify(&entity, &row.segment) {
                segments.push(Observation {
                    entity,
                    metric: label,
                    period,
                    value: row.revenue,
                    source: row.sheet,
                });
            }
        }
        if unparsed > 0 {
            debug!(rows = unparsed, "dropped quarterly segment rows with unparseable periods");
        }

        let dataset = Self {
            workbook: reader.path().to_path_buf(),
            sheet_names: reader.sheet_names(),
            metrics: collapse(metrics),
            segments: collapse(segments),
            ad_revenue,
            prices: reader.prices(),
            money_supply: reader.money_supply(),
            company_insights: reader.company_insights(),
            segment_insights: reader.segment_insights(),
            resolver,
        };
        info!(
            workbook = %dataset.workbook.display(),
            metrics = dataset.metrics.len(),
            segments = dataset.segments.len(),
            prices = dataset.prices.len(),
            "dataset assembled"
        );
        dataset
    }

    /// Workbook the dataset was built from.
    pub fn workbook(&self) -> &Path {
        &self.workbook
    }

    /// Sheet names of the workbook, in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Resolver used for company names.
    pub const fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    /// Company metric observations (annual, quarterly, headcount, ad revenue).
    pub fn observations(&self) -> &[Observation] {
        &self.metrics
    }

    /// Canonical segment revenue observations.
    pub fn segment_observations(&self) -> &[Observation] {
        &self.segments
    }

    /// Every canonical observation.
    pub fn all_observations(&self) -> impl Iterator<Item = &Observation> {
        self.metrics.iter().chain(&self.segments)
    }

    /// Companies with any metric or segment data, sorted.
    pub fn companies(&self) -> Vec<&str> {
        self.all_observations()
            .map(|o| o.entity.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Years with annual data for `company`, most recent first.
    pub fn available_years(&self, company: &str) -> Vec<i32> {
        let company = self.resolver.canonicalize(company);
        let years: BTreeSet<i32> = self
            .all_observations()
            .filter(|o| o.entity == company && o.period.is_annual())
            .map(|o| o.period.year)
            .collect();
        years.into_iter().rev().collect()
    }

    /// One metric of one company as a series.
    pub fn metric_series(&self, company: &str, metric: &str) -> MetricSeries {
        let company = self.resolver.canonicalize(company);
        MetricSeries::from_points(
            company.as_str(),
            metric,
            self.all_observations()
                .filter(|o| o.entity == company && o.metric == metric)
                .map(|o| (o.period, o.value)),
        )
    }

    /// Annual segment revenues of `company` in `year`, largest magnitude first.
    ///
    /// Zero values are dropped; negative values (eliminations) are kept.
    pub fn segments_for(&self, company: &str, year: i32) -> Vec<(String, f64)> {
        let company = self.resolver.canonicalize(company);
        let period = PeriodKey::annual(year);
        let mut out: Vec<(String, f64)> = self
            .segments
            .iter()
            .filter(|o| o.entity == company && o.period == period && o.value != 0.0)
            .map(|o| (o.metric.clone(), o.value))
            .collect();
        out.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Company insights for `company` in `year`.
    pub fn insights_for(&self, company: &str, year: i32) -> Vec<&CompanyInsight> {
        let company = self.resolver.canonicalize(company);
        self.company_insights
            .iter()
            .filter(|i| i.year == year && self.resolver.canonicalize(&i.company) == company)
            .collect()
    }

    /// Segment insights for `company` in `year`.
    pub fn segment_insights_for(&self, company: &str, year: i32) -> Vec<&SegmentInsight> {
        let company = self.resolver.canonicalize(company);
        self.segment_insights
            .iter()
            .filter(|i| i.year == year && self.resolver.canonicalize(&i.company) == company)
            .collect()
    }

    /// Advertising revenue with canonical company names.
    pub fn ad_revenue(&self) -> &[AdRevenueRow] {
        &self.ad_revenue
    }

    /// Stock and crypto prices.
    pub fn prices(&self) -> &[PricePoint] {
        &self.prices
    }

    /// Money supply series.
    pub fn money_supply(&self) -> &[MoneySupplyPoint] {
        &self.money_supply
    }

    /// Wide annual metrics table with `<metric>_yoy` columns.
    pub fn annual_table(&self) -> Vec<AnnualTableRow> {
        annual_table(&self.metrics)
    }

    /// Every observation in store form.
    pub fn stored_observations(&self) -> Vec<StoredObservation> {
        self.all_observations()
            .map(|o| StoredObservation {
                entity: o.entity.clone(),
                metric: o.metric.clone(),
                year: o.period.year,
                quarter: o.period.quarter,
                value: o.value,
                source: o.source.clone(),
            })
            .collect()
    }

    /// Upsert every observation into the SQLite store at `path`.
    ///
    /// Returns the rows written and the store totals afterwards.
    ///
    /// # Errors
    /// Returns an error if the store cannot be opened or written.
    pub fn persist(&self, path: &Path) -> Result<(usize, StoreStats)> {
        let store = ObservationStore::new(path)?;
        let written = store.put_observations(&self.stored_observations())?;
        let stats = store.get_stats()?;
        info!(path = %path.display(), written, "observations persisted");
        Ok((written, stats))
    }

    /// Write every observation to `path` in `format`; returns the row count.
    ///
    /// # Errors
    /// Returns an error if serialization or the file write fails.
    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<usize> {
        let records: Vec<ObservationRecord> =
            self.all_observations().map(ObservationRecord::from).collect();
        records.export_to_file(path, format)?;
        Ok(records.len())
    }
}
