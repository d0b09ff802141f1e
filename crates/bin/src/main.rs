//! Folio CLI binary.
//!
//! Command-line access to the normalized workbook: summaries, segment
//! composition, heatmaps, exports and the SQLite hand-off.

mod integration;

use clap::{Args, Parser, Subcommand};
use folio::data::MetricKey;
use folio::dataset::{AD_REVENUE_METRIC, EMPLOYEES_METRIC};
use folio::metrics::{
    Frequency, GridMode, metric_heatmap, quarterly_metric_heatmap, segment_heatmap,
    stock_heatmap, summarize,
};
use folio::output::{
    ColorAssigner, ExportFormat, change_class, format_change, format_count, format_number,
};
use folio::{Dataset, FolioConfig, WORKBOOK_ENV};
use indicatif::{ProgressBar, ProgressStyle};
use integration::render::{CellKind, print_grid, print_header};
use integration::store_manager::{print_store_info, store_path};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio: normalized views of a financial dashboard workbook", long_about = None)]
#[command(version)]
struct Cli {
    /// Workbook to read
    #[arg(long, global = true, env = WORKBOOK_ENV)]
    workbook: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct ModeArgs {
    /// Show period-over-period change instead of values
    #[arg(long, conflicts_with = "normalize")]
    change: bool,

    /// Scale every row to 0..1
    #[arg(long)]
    normalize: bool,
}

impl ModeArgs {
    const fn mode(self) -> GridMode {
        if self.change {
            GridMode::Change
        } else if self.normalize {
            GridMode::Normalized
        } else {
            GridMode::Values
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List workbook sheets and what was loaded from them
    Sheets,

    /// Company metrics for one year with year-over-year change
    Summary {
        /// Company name or alias
        company: String,

        /// Fiscal year
        year: i32,
    },

    /// Segment composition for one year
    Segments {
        /// Company name or alias
        company: String,

        /// Fiscal year
        year: i32,

        /// Also show every segment across all available years
        #[arg(long)]
        history: bool,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Metric heatmap across companies
    Heatmap {
        /// Metric key (revenue, net_income, debt, ...)
        #[arg(long, default_value = "revenue")]
        metric: String,

        /// Companies to include (default: all)
        #[arg(long, num_args = 1..)]
        companies: Vec<String>,

        /// First year
        #[arg(long, default_value = "2019")]
        from: i32,

        /// Last year
        #[arg(long, default_value = "2024")]
        to: i32,

        /// Use quarterly columns instead of years
        #[arg(long)]
        quarterly: bool,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Resampled stock prices
    Prices {
        /// Companies to include
        #[arg(required = true)]
        companies: Vec<String>,

        /// Bucket size
        #[arg(long, default_value = "quarterly")]
        frequency: Frequency,

        /// Keep only the most recent buckets
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Export canonical observations
    Export {
        /// csv, json or pretty
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// Write canonical observations to the SQLite store
    Store {
        /// Store location (default: platform cache directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = FolioConfig {
        workbook: cli.workbook,
        ..FolioConfig::default()
    };
    let dataset = load_dataset(&config)?;

    match cli.command {
        Commands::Sheets => list_sheets(&dataset),
        Commands::Summary { company, year } => show_summary(&dataset, &company, year),
        Commands::Segments {
            company,
            year,
            history,
            mode,
        } => show_segments(&dataset, &config, &company, year, history, mode.mode()),
        Commands::Heatmap {
            metric,
            companies,
            from,
            to,
            quarterly,
            mode,
        } => show_heatmap(&dataset, &metric, companies, from..=to, quarterly, mode.mode()),
        Commands::Prices {
            companies,
            frequency,
            limit,
            mode,
        } => {
            print_header(&format!("PRICES ({frequency})"));
            let grid = stock_heatmap(
                dataset.prices(),
                &companies,
                dataset.resolver(),
                frequency,
                limit,
                mode.mode(),
            );
            print_grid(&grid, mode.mode(), CellKind::Price);
        }
        Commands::Export { format, out } => {
            let written = dataset.export(&out, format)?;
            println!("Wrote {written} observations to {}", out.display());
        }
        Commands::Store { path } => {
            let path = store_path(path, &config);
            let (written, stats) = dataset.persist(&path)?;
            println!("Wrote {written} observations");
            print_store_info(&path, &stats);
        }
    }

    Ok(())
}

fn load_dataset(config: &FolioConfig) -> Result<Dataset, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Loading workbook...");

    match Dataset::load(config) {
        Ok(dataset) => {
            pb.finish_with_message(format!(
                "Loaded {} ({} companies)",
                dataset.workbook().display(),
                dataset.companies().len()
            ));
            Ok(dataset)
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(e.into())
        }
    }
}

fn list_sheets(dataset: &Dataset) {
    print_header("WORKBOOK CONTENTS");
    println!("Workbook: {}", dataset.workbook().display());
    for sheet in dataset.sheet_names() {
        println!("  - {sheet}");
    }
    println!();
    println!("  Metric observations:  {}", dataset.observations().len());
    println!("  Segment observations: {}", dataset.segment_observations().len());
    println!("  Price points:         {}", dataset.prices().len());
    println!("  Money supply points:  {}", dataset.money_supply().len());
    println!();
    for company in dataset.companies() {
        let years = dataset.available_years(company);
        match (years.last(), years.first()) {
            (Some(first), Some(last)) => println!("  {company:<28} {first}-{last}"),
            _ => println!("  {company:<28} quarterly only"),
        }
    }
}

fn show_summary(dataset: &Dataset, company: &str, year: i32) {
    let company = dataset.resolver().canonicalize(company);
    print_header(&format!("{company} {year}"));

    let mut metrics: Vec<&str> = MetricKey::ALL.iter().map(MetricKey::key).collect();
    metrics.extend([EMPLOYEES_METRIC, AD_REVENUE_METRIC]);
    let rows = summarize(dataset.observations(), &company, year, &metrics);
    if rows.iter().all(|r| r.value.is_none()) {
        println!("No data for {company} in {year}.");
        return;
    }

    for row in rows.iter().filter(|r| r.value.is_some()) {
        let value = if row.metric == EMPLOYEES_METRIC {
            format_count(row.value)
        } else {
            format_number(row.value)
        };
        println!(
            "  {:<18} {:>10}  {:>8}  {}",
            row.metric,
            value,
            format_change(row.change),
            change_class(row.change, &row.metric)
        );
    }

    let insights = dataset.insights_for(&company, year);
    if !insights.is_empty() {
        println!("\nInsights:");
        for insight in insights {
            match &insight.category {
                Some(category) => println!("  [{category}] {}", insight.insight),
                None => println!("  {}", insight.insight),
            }
        }
    }
}

fn show_segments(
    dataset: &Dataset,
    config: &FolioConfig,
    company: &str,
    year: i32,
    history: bool,
    mode: GridMode,
) {
    let company = dataset.resolver().canonicalize(company);
    print_header(&format!("{company} SEGMENTS {year}"));

    let segments = dataset.segments_for(&company, year);
    if segments.is_empty() {
        println!("No segment data for {company} in {year}.");
    } else {
        let labels: Vec<&str> = segments.iter().map(|(label, _)| label.as_str()).collect();
        let colors = ColorAssigner::new(config.colors.clone()).assign(&company, &labels);
        let total: f64 = segments.iter().map(|(_, v)| v.max(0.0)).sum();
        for (label, value) in &segments {
            let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            let color = colors.get(label).map_or("", |c| c.as_str());
            println!(
                "  {label:<40} {:>10}  {share:>5.1}%  {color}",
                format_number(Some(*value))
            );
        }
        for insight in dataset.segment_insights_for(&company, year) {
            println!("  * {}: {}", insight.segment, insight.insight);
        }
    }

    if history {
        let years = dataset.available_years(&company);
        if let (Some(first), Some(last)) = (years.last(), years.first()) {
            println!();
            let grid = segment_heatmap(
                dataset.segment_observations(),
                &company,
                *first..=*last,
                None,
                mode,
            );
            print_grid(&grid, mode, CellKind::Amount);
        }
    }
}

fn show_heatmap(
    dataset: &Dataset,
    metric: &str,
    companies: Vec<String>,
    years: std::ops::RangeInclusive<i32>,
    quarterly: bool,
    mode: GridMode,
) {
    let companies: Vec<String> = if companies.is_empty() {
        dataset.companies().into_iter().map(str::to_string).collect()
    } else {
        companies
            .iter()
            .map(|c| dataset.resolver().canonicalize(c))
            .collect()
    };

    print_header(&format!("{} HEATMAP", metric.to_uppercase()));
    let grid = if quarterly {
        quarterly_metric_heatmap(dataset.observations(), metric, &companies, mode)
    } else {
        metric_heatmap(dataset.observations(), metric, &companies, years, mode)
    };
    print_grid(&grid, mode, CellKind::Amount);
}
