//! Typed records produced at the ingestion boundary.
//!
//! Every sheet is converted once into one of these structs; later stages work
//! on typed fields and never look columns up by name again.

use crate::columns::LogicalColumn;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Financial metrics reported per company and period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    /// Total revenue
    Revenue,
    /// Net income
    NetIncome,
    /// Operating income
    OperatingIncome,
    /// Cost of revenue
    CostOfRevenue,
    /// Research and development expense
    Rd,
    /// Capital expenditure
    Capex,
    /// Total assets
    TotalAssets,
    /// Total debt
    Debt,
    /// Cash balance
    CashBalance,
    /// Market capitalization
    MarketCap,
}

impl MetricKey {
    /// Every metric, in display order.
    pub const ALL: [Self; 10] = [
        Self::Revenue,
        Self::NetIncome,
        Self::OperatingIncome,
        Self::CostOfRevenue,
        Self::Rd,
        Self::Capex,
        Self::TotalAssets,
        Self::Debt,
        Self::CashBalance,
        Self::MarketCap,
    ];

    /// Stable snake_case identifier.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::NetIncome => "net_income",
            Self::OperatingIncome => "operating_income",
            Self::CostOfRevenue => "cost_of_revenue",
            Self::Rd => "rd",
            Self::Capex => "capex",
            Self::TotalAssets => "total_assets",
            Self::Debt => "debt",
            Self::CashBalance => "cash_balance",
            Self::MarketCap => "market_cap",
        }
    }

    /// Human-readable label as it appears in the workbook.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::NetIncome => "Net Income",
            Self::OperatingIncome => "Operating Income",
            Self::CostOfRevenue => "Cost Of Revenue",
            Self::Rd => "R&D",
            Self::Capex => "Capex",
            Self::TotalAssets => "Total Assets",
            Self::Debt => "Debt",
            Self::CashBalance => "Cash Balance",
            Self::MarketCap => "Market Cap.",
        }
    }

    /// Parse either the key or the label, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ALL.into_iter().find(|m| {
            m.key().eq_ignore_ascii_case(needle) || m.label().eq_ignore_ascii_case(needle)
        })
    }

    /// Whether a rising value is bad news.
    pub const fn lower_is_better(&self) -> bool {
        matches!(self, Self::Debt)
    }

    /// Logical column for this metric; always optional.
    pub const fn column(&self) -> LogicalColumn {
        match self {
            Self::Revenue => LogicalColumn::optional("revenue", &[]),
            Self::NetIncome => LogicalColumn::optional("net_income", &["net income"]),
            Self::OperatingIncome => {
                LogicalColumn::optional("operating_income", &["operating income"])
            }
            Self::CostOfRevenue => {
                LogicalColumn::optional("cost_of_revenue", &["cost of revenue"])
            }
            Self::Rd => LogicalColumn::optional("rd", &["r&d", "r_d"]),
            Self::Capex => LogicalColumn::optional("capex", &[]),
            Self::TotalAssets => LogicalColumn::optional("total_assets", &["total assets"]),
            Self::Debt => LogicalColumn::optional("debt", &[]),
            Self::CashBalance => LogicalColumn::optional("cash_balance", &["cash balance"]),
            Self::MarketCap => {
                LogicalColumn::optional("market_cap", &["market cap.", "market cap"])
            }
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Metric values present on one row; absent metrics are simply missing.
pub type MetricValues = BTreeMap<MetricKey, f64>;

/// One row of the annual company metrics sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualMetricsRow {
    /// Company name as written in the sheet
    pub company: String,
    /// Fiscal year
    pub year: i32,
    /// Reported metrics
    pub metrics: MetricValues,
}

/// One row of the annual segment revenue sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRevenueRow {
    /// Company name as written in the sheet
    pub company: String,
    /// Fiscal year
    pub year: i32,
    /// Raw segment label
    pub segment: String,
    /// Segment revenue
    pub revenue: f64,
}

/// One melted cell of a per-company quarterly segment sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlySegmentRow {
    /// Company derived from the sheet name
    pub company: String,
    /// Raw period label from the first column
    pub period: String,
    /// Raw segment label from the column header
    pub segment: String,
    /// Segment revenue
    pub revenue: f64,
    /// Source sheet
    pub sheet: String,
}

/// One row of the quarterly company metrics export.
///
/// The sheet carries no quarter column; `position` preserves source order so
/// quarters can be inferred later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyMetricsRow {
    /// Upper-cased ticker
    pub ticker: String,
    /// Fiscal year
    pub year: i32,
    /// Zero-based row position in the sheet
    pub position: usize,
    /// Reported metrics
    pub metrics: MetricValues,
}

/// Employee headcount for a company and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRow {
    /// Company name as written in the sheet
    pub company: String,
    /// Fiscal year
    pub year: i32,
    /// Headcount
    pub employees: f64,
}

/// Advertising revenue for a company and year, melted from the wide sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRevenueRow {
    /// Company derived from the column header
    pub company: String,
    /// Year
    pub year: i32,
    /// Advertising revenue
    pub revenue: f64,
    /// Whether the header flagged the series as an estimate
    pub estimated: bool,
}

/// One stock or crypto price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date
    pub date: NaiveDate,
    /// Closing price
    pub price: f64,
    /// Asset name or ticker
    pub asset: String,
    /// Free-form tag, often a ticker; empty when absent
    pub tag: String,
}

/// One money-supply (M2) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneySupplyPoint {
    /// Observation date
    pub date: NaiveDate,
    /// Value in billions of USD
    pub value: f64,
}

/// Free-text insight about a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInsight {
    /// Company name as written in the sheet
    pub company: String,
    /// Year the insight refers to
    pub year: i32,
    /// Insight text
    pub insight: String,
    /// Optional category
    pub category: Option<String>,
}

/// Free-text insight about one segment of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInsight {
    /// Company name as written in the sheet
    pub company: String,
    /// Year the insight refers to
    pub year: i32,
    /// Raw segment label
    pub segment: String,
    /// Insight text
    pub insight: String,
}
