//! Workbook sheet schemas and conversion into typed records.
//!
//! Each reader loads one sheet through a [`SourceLoader`] and returns typed
//! rows. Failures are contained by the loader: a missing or malformed sheet
//! yields an empty vector and a warning, never an error.

use crate::columns::LogicalColumn;
use crate::loader::SourceLoader;
use crate::records::{
    AdRevenueRow, AnnualMetricsRow, CompanyInsight, EmployeeRow, MetricKey, MetricValues,
    MoneySupplyPoint, PricePoint, QuarterlyMetricsRow, QuarterlySegmentRow, SegmentInsight,
    SegmentRevenueRow,
};
use crate::table::RowView;
use crate::workbook::WorkbookBackend;
use std::path::Path;
use tracing::debug;

/// Annual per-company metrics.
pub const ANNUAL_METRICS_SHEET: &str = "Company_metrics_earnings_values";
/// Annual per-company segment revenues.
pub const SEGMENT_REVENUE_SHEET: &str = "Company_yearly_segments_values";
/// Employee headcount.
pub const EMPLOYEES_SHEET: &str = "Company_Employees";
/// Wide advertising revenue sheet.
pub const AD_REVENUE_SHEET: &str = "Company_advertising_revenue";
/// Stock and crypto prices.
pub const PRICES_SHEET: &str = "Stocks & Crypto";
/// Money supply series.
pub const MONEY_SUPPLY_SHEET: &str = "M2_values";
/// Company-level insights.
pub const COMPANY_INSIGHTS_SHEET: &str = "Company_insights_text";
/// Segment-level insights.
pub const SEGMENT_INSIGHTS_SHEET: &str = "Company_Segments_insights_text";
/// Exact name of the quarterly company metrics sheet.
pub const QUARTERLY_METRICS_SHEET: &str = "Quarterly_Company_metrics_earnings_values";
/// Prefix of the truncated quarterly metrics sheet name.
pub const QUARTERLY_METRICS_PREFIX: &str = "Company_Quarterly_segments_";
/// Marker identifying per-company quarterly segment sheets.
pub const QUARTERLY_SEGMENTS_MARKER: &str = "Quarterly Segments";

/// Marker of the granular quarterly sheet variant, which is skipped.
const GRANULAR_MARKER: &str = "Gran";

/// Internal placeholder company present in some exports.
const PLACEHOLDER_COMPANY: &str = "MFE";

const COMPANY: LogicalColumn = LogicalColumn::required("company", &["name"]);
const YEAR: LogicalColumn = LogicalColumn::required("year", &["fiscal year"]);
const SEGMENT: LogicalColumn = LogicalColumn::required("segment", &["segments"]);
const INSIGHT: LogicalColumn = LogicalColumn::required("insight", &["insights", "text"]);

/// Columns of [`ANNUAL_METRICS_SHEET`].
pub fn annual_metrics_columns() -> Vec<LogicalColumn> {
    let mut columns = vec![COMPANY, YEAR];
    columns.extend(MetricKey::ALL.iter().map(MetricKey::column));
    columns
}

/// Columns of [`SEGMENT_REVENUE_SHEET`].
pub const SEGMENT_REVENUE_COLUMNS: [LogicalColumn; 4] = [
    COMPANY,
    YEAR,
    SEGMENT,
    LogicalColumn::required("revenue", &["yearly segment revenue", "segment revenue"]),
];

/// Columns of [`EMPLOYEES_SHEET`].
pub const EMPLOYEE_COLUMNS: [LogicalColumn; 3] = [
    COMPANY,
    YEAR,
    LogicalColumn::required("employees", &["employee count", "employee_count"]),
];

/// Columns of [`PRICES_SHEET`].
pub const PRICE_COLUMNS: [LogicalColumn; 4] = [
    LogicalColumn::required("date", &["datetime", "timestamp"]),
    LogicalColumn::required(
        "price",
        &["close", "close price", "closing price", "adj close", "adj_close"],
    ),
    LogicalColumn::required("asset", &["name", "company", "symbol", "ticker"]),
    LogicalColumn::optional("tag", &[]),
];

/// Columns of [`MONEY_SUPPLY_SHEET`].
pub const MONEY_SUPPLY_COLUMNS: [LogicalColumn; 2] = [
    LogicalColumn::required("date", &["usd observation_date", "observation_date"]),
    LogicalColumn::required("value", &["wm2ns"]),
];

/// Columns of [`COMPANY_INSIGHTS_SHEET`].
pub const COMPANY_INSIGHT_COLUMNS: [LogicalColumn; 4] = [
    COMPANY,
    YEAR,
    INSIGHT,
    LogicalColumn::optional("category", &[]),
];

/// Columns of [`SEGMENT_INSIGHTS_SHEET`].
pub const SEGMENT_INSIGHT_COLUMNS: [LogicalColumn; 4] = [COMPANY, YEAR, SEGMENT, INSIGHT];

fn quarterly_metrics_columns() -> Vec<LogicalColumn> {
    let mut columns = vec![LogicalColumn::required("ticker", &["symbol"]), YEAR];
    columns.extend(MetricKey::ALL.iter().map(MetricKey::column));
    columns
}

fn is_placeholder(company: &str) -> bool {
    company == PLACEHOLDER_COMPANY
}

fn read_metrics(row: &RowView<'_>) -> MetricValues {
    MetricKey::ALL
        .into_iter()
        .filter_map(|metric| row.number(metric.key()).map(|v| (metric, v)))
        .collect()
}

/// Sheets holding per-company quarterly segments, in workbook order.
pub fn quarterly_segment_sheets(names: &[String]) -> Vec<&str> {
    names
        .iter()
        .map(String::as_str)
        .filter(|s| s.contains(QUARTERLY_SEGMENTS_MARKER) && !s.contains(GRANULAR_MARKER))
        .collect()
}

/// Company name encoded in a quarterly segment sheet name.
pub fn company_from_segment_sheet(sheet: &str) -> String {
    sheet.replace(QUARTERLY_SEGMENTS_MARKER, "").trim().to_string()
}

/// The quarterly metrics sheet: exact name or truncated prefix, first match wins.
pub fn quarterly_metrics_sheet(names: &[String]) -> Option<&str> {
    names
        .iter()
        .map(String::as_str)
        .find(|s| *s == QUARTERLY_METRICS_SHEET || s.starts_with(QUARTERLY_METRICS_PREFIX))
}

/// The price sheet: exact name, else any sheet mentioning stocks or crypto.
pub fn price_sheet(names: &[String]) -> Option<&str> {
    names
        .iter()
        .map(String::as_str)
        .find(|s| *s == PRICES_SHEET)
        .or_else(|| {
            names.iter().map(String::as_str).find(|s| {
                let lower = s.to_lowercase();
                lower.contains("stock") || lower.contains("crypto")
            })
        })
}

/// Company name and estimate flag from an advertising revenue column header.
///
/// `"*WBD_Ads"` becomes `("WBD", true)` and `"Google_Ads"` becomes `("Google", false)`.
pub fn ad_revenue_header(header: &str) -> Option<(String, bool)> {
    let estimated = header.contains('*');
    let cleaned = header.replace('*', "");
    let cleaned = cleaned.trim();
    let name = cleaned
        .strip_suffix("_Ads")
        .or_else(|| cleaned.strip_suffix("_ads"))
        .unwrap_or(cleaned)
        .replace('_', " ");
    let name = name.trim();
    (!name.is_empty()).then(|| (name.to_string(), estimated))
}

/// Typed readers over one workbook.
#[derive(Debug)]
pub struct SheetReader<'a, B: WorkbookBackend> {
    loader: &'a SourceLoader<B>,
    path: &'a Path,
}

impl<'a, B: WorkbookBackend> SheetReader<'a, B> {
    /// Readers for the workbook at `path`.
    pub const fn new(loader: &'a SourceLoader<B>, path: &'a Path) -> Self {
        Self { loader, path }
    }

    /// Every sheet name, empty if the workbook cannot be opened.
    pub fn sheet_names(&self) -> Vec<String> {
        self.loader.sheet_names(self.path)
    }

    /// Workbook path.
    pub const fn path(&self) -> &Path {
        self.path
    }

    /// Annual company metrics.
    pub fn annual_metrics(&self) -> Vec<AnnualMetricsRow> {
        let table = self
            .loader
            .load(self.path, ANNUAL_METRICS_SHEET, &annual_metrics_columns());
        table
            .iter()
            .filter_map(|row| {
                let company = row.text("company")?;
                if is_placeholder(&company) {
                    return None;
                }
                Some(AnnualMetricsRow {
                    company,
                    year: row.year("year")?,
                    metrics: read_metrics(&row),
                })
            })
            .collect()
    }

    /// Annual segment revenues.
    pub fn segment_revenues(&self) -> Vec<SegmentRevenueRow> {
        let table = self
            .loader
            .load(self.path, SEGMENT_REVENUE_SHEET, &SEGMENT_REVENUE_COLUMNS);
        table
            .iter()
            .filter_map(|row| {
                let company = row.text("company")?;
                if is_placeholder(&company) {
                    return None;
                }
                Some(SegmentRevenueRow {
                    company,
                    year: row.year("year")?,
                    segment: row.text("segment")?,
                    revenue: row.number("revenue")?,
                })
            })
            .collect()
    }

    /// Melted rows of every quarterly segment sheet.
    pub fn quarterly_segments(&self) -> Vec<QuarterlySegmentRow> {
        let names = self.sheet_names();
        let mut out = Vec::new();
        for sheet in quarterly_segment_sheets(&names) {
            let table = self.loader.load_all(self.path, sheet);
            let company = company_from_segment_sheet(sheet);
            let before = out.len();
            for row in &table.rows {
                let Some(period) = row.first().and_then(|c| c.as_text()) else {
                    continue;
                };
                for (segment, cell) in table.columns.iter().zip(row.iter()).skip(1) {
                    let segment = segment.trim();
                    if segment.is_empty() {
                        continue;
                    }
                    if let Some(revenue) = cell.as_number() {
                        out.push(QuarterlySegmentRow {
                            company: company.clone(),
                            period: period.clone(),
                            segment: segment.to_string(),
                            revenue,
                            sheet: sheet.to_string(),
                        });
                    }
                }
            }
            debug!(sheet, rows = out.len() - before, "melted quarterly segments");
        }
        out
    }

    /// Rows of the quarterly company metrics export, in sheet order.
    pub fn quarterly_metrics(&self) -> Vec<QuarterlyMetricsRow> {
        let names = self.sheet_names();
        let Some(sheet) = quarterly_metrics_sheet(&names) else {
            debug!("no quarterly metrics sheet");
            return Vec::new();
        };
        let table = self
            .loader
            .load(self.path, sheet, &quarterly_metrics_columns());
        table
            .iter()
            .filter_map(|row| {
                Some(QuarterlyMetricsRow {
                    ticker: row.text("ticker")?.to_uppercase(),
                    year: row.year("year")?,
                    position: row.index(),
                    metrics: read_metrics(&row),
                })
            })
            .collect()
    }

    /// Employee headcount.
    pub fn employees(&self) -> Vec<EmployeeRow> {
        let table = self
            .loader
            .load(self.path, EMPLOYEES_SHEET, &EMPLOYEE_COLUMNS);
        table
            .iter()
            .filter_map(|row| {
                let company = row.text("company")?;
                if is_placeholder(&company) {
                    return None;
                }
                Some(EmployeeRow {
                    company,
                    year: row.year("year")?,
                    employees: row.number("employees")?,
                })
            })
            .collect()
    }

    /// Advertising revenue melted from the wide sheet.
    pub fn ad_revenue(&self) -> Vec<AdRevenueRow> {
        let table = self.loader.load_all(self.path, AD_REVENUE_SHEET);
        let Some(year_idx) = table.column_index("year") else {
            return Vec::new();
        };
        let series: Vec<(usize, String, bool)> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != year_idx)
            .filter_map(|(idx, header)| {
                ad_revenue_header(header).map(|(company, estimated)| (idx, company, estimated))
            })
            .collect();

        let mut out = Vec::new();
        for row in &table.rows {
            let Some(year) = row.get(year_idx).and_then(|c| c.as_year()) else {
                continue;
            };
            for (idx, company, estimated) in &series {
                if let Some(revenue) = row.get(*idx).and_then(|c| c.as_number()) {
                    out.push(AdRevenueRow {
                        company: company.clone(),
                        year,
                        revenue,
                        estimated: *estimated,
                    });
                }
            }
        }
        out
    }

    /// Stock and crypto prices.
    pub fn prices(&self) -> Vec<PricePoint> {
        let names = self.sheet_names();
        let sheet = price_sheet(&names).unwrap_or(PRICES_SHEET);
        let table = self.loader.load(self.path, sheet, &PRICE_COLUMNS);
        table
            .iter()
            .filter_map(|row| {
                Some(PricePoint {
                    date: row.get("date").as_date()?,
                    price: row.number("price")?,
                    asset: row.text("asset")?,
                    tag: row.text("tag").unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Money supply series, in sheet order.
    pub fn money_supply(&self) -> Vec<MoneySupplyPoint> {
        let table = self
            .loader
            .load(self.path, MONEY_SUPPLY_SHEET, &MONEY_SUPPLY_COLUMNS);
        table
            .iter()
            .filter_map(|row| {
                Some(MoneySupplyPoint {
                    date: row.get("date").as_date()?,
                    value: row.number("value")?,
                })
            })
            .collect()
    }

    /// Company-level insights.
    pub fn company_insights(&self) -> Vec<CompanyInsight> {
        let table = self
            .loader
            .load(self.path, COMPANY_INSIGHTS_SHEET, &COMPANY_INSIGHT_COLUMNS);
        table
            .iter()
            .filter_map(|row| {
                Some(CompanyInsight {
                    company: row.text("company")?,
                    year: row.year("year")?,
                    insight: row.text("insight")?,
                    category: row.text("category"),
                })
            })
            .collect()
    }

    /// Segment-level insights.
    pub fn segment_insights(&self) -> Vec<SegmentInsight> {
        let table = self
            .loader
            .load(self.path, SEGMENT_INSIGHTS_SHEET, &SEGMENT_INSIGHT_COLUMNS);
        table
            .iter()
            .filter_map(|row| {
                Some(SegmentInsight {
                    company: row.text("company")?,
                    year: row.year("year")?,
                    segment: row.text("segment")?,
                    insight: row.text("insight")?,
                })
            })
            .collect()
    }
}
