//! Command-line parsing for the `epi` binary.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! statistics and rendering code; `app` turns these structs into configs.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::stats::{DEFAULT_BOUNDS_WINDOW, DEFAULT_TAU, SmoothingKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "epi", version, about = "Epidemic curve statistics: daily counts, R number, growth factor, doubling time")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute statistics, print a summary, and optionally plot/export.
    Report(ReportArgs),
    /// Render one SVG summary chart per region.
    Chart(ChartArgs),
    /// Write a synthetic outbreak table as CSV.
    Sample(SampleArgs),
}

/// Input selection and statistics options shared by `report` and `chart`.
#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    /// CSV with `date`, optional `region`, and cumulative metric columns.
    #[arg(short, long, env = "EPI_DATA", value_name = "CSV")]
    pub data: PathBuf,

    /// Region to include (repeatable). Defaults to every region in the file.
    #[arg(short, long = "region", value_name = "NAME")]
    pub regions: Vec<String>,

    /// Metric column to include (repeatable). Defaults to every metric column.
    #[arg(short, long = "metric", value_name = "COLUMN")]
    pub metrics: Vec<String>,

    /// Generation interval (days) for the R number.
    #[arg(long, default_value_t = DEFAULT_TAU)]
    pub tau: usize,

    /// Trailing window (days) used for display bounds.
    #[arg(long, default_value_t = DEFAULT_BOUNDS_WINDOW)]
    pub bounds_window: usize,

    /// Smoothing applied to daily counts.
    #[arg(long, value_enum, default_value_t = SmoothingKind::Weak)]
    pub daily_smoothing: SmoothingKind,

    /// Smoothing applied to daily counts before the R number.
    #[arg(long, value_enum, default_value_t = SmoothingKind::SevenDayRolling)]
    pub r_smoothing: SmoothingKind,

    /// Smoothing applied to totals before the growth factor.
    #[arg(long, value_enum, default_value_t = SmoothingKind::SevenDayRolling)]
    pub growth_smoothing: SmoothingKind,

    /// Smoothing applied to the doubling time.
    #[arg(long, value_enum, default_value_t = SmoothingKind::Strong)]
    pub doubling_smoothing: SmoothingKind,

    /// Keep negative daily differences instead of dropping them.
    #[arg(long)]
    pub keep_negative: bool,

    /// Do not run a `weak` pass before `strong` smoothing.
    #[arg(long)]
    pub no_compound: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub stats: StatsArgs,

    /// Render ASCII plots of daily counts and the R number for each region and metric.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Write one CSV per region and metric into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_csv: Option<PathBuf>,

    /// Write all reports to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub stats: StatsArgs,

    /// Output directory for `<region>.svg` files.
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 1400)]
    pub height: u32,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,

    /// Region name written to the `region` column.
    #[arg(long, default_value = "Synthetic")]
    pub region: String,

    /// First date (YYYY-MM-DD).
    #[arg(long, default_value = "2020-03-01")]
    pub start: NaiveDate,

    /// Number of days to generate.
    #[arg(long, default_value_t = 120)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Expected new cases on the first day.
    #[arg(long, default_value_t = 20.0)]
    pub initial: f64,

    /// Reproduction number on the first day.
    #[arg(long, default_value_t = 2.5)]
    pub r_start: f64,

    /// Reproduction number on the last day.
    #[arg(long, default_value_t = 0.7)]
    pub r_end: f64,

    /// Generation interval (days).
    #[arg(long, default_value_t = 4.0)]
    pub generation_days: f64,

    /// Infection fatality ratio.
    #[arg(long, default_value_t = 0.01)]
    pub ifr: f64,

    /// Days from case report to death report.
    #[arg(long, default_value_t = 14)]
    pub death_lag: usize,

    /// Daily probability of a downward revision in confirmed totals.
    #[arg(long, default_value_t = 0.02)]
    pub correction_prob: f64,
}
