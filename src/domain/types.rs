//! Shared domain types.
//!
//! Reports are plain data: computed once by `app::pipeline`, then handed to
//! the formatter, the exporters and the renderers.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::stats::{Bounds, DEFAULT_BOUNDS_WINDOW, DEFAULT_TAU, SmoothingKind, TimeSeries};

/// How each derived series is computed for a report.
///
/// The defaults follow the usual chart layout: weakly smoothed daily counts,
/// R and growth factor from a 7-day Gaussian window, strongly smoothed
/// doubling time, bounds over the last four weeks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportConfig {
    pub daily_smoothing: SmoothingKind,
    pub r_smoothing: SmoothingKind,
    pub growth_smoothing: SmoothingKind,
    pub doubling_smoothing: SmoothingKind,
    /// Generation interval for the R number.
    pub tau: usize,
    /// Trailing window (days) for display bounds.
    pub bounds_window: usize,
    /// Drop negative daily differences (data corrections).
    pub drop_negative: bool,
    /// Let `strong` smoothing run on top of a `weak` pass.
    pub compound: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            daily_smoothing: SmoothingKind::Weak,
            r_smoothing: SmoothingKind::SevenDayRolling,
            growth_smoothing: SmoothingKind::SevenDayRolling,
            doubling_smoothing: SmoothingKind::Strong,
            tau: DEFAULT_TAU,
            bounds_window: DEFAULT_BOUNDS_WINDOW,
            drop_negative: true,
            compound: true,
        }
    }
}

/// Parameters of the synthetic outbreak generator.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub region: String,
    pub start: NaiveDate,
    pub days: usize,
    pub seed: u64,
    /// Expected new cases on the first day.
    pub initial: f64,
    /// Reproduction number at the start, interpolated linearly to `r_end`.
    pub r_start: f64,
    pub r_end: f64,
    /// Generation interval (days) used to turn R into a daily growth rate.
    pub generation_days: f64,
    /// Infection fatality ratio applied to lagged cases.
    pub ifr: f64,
    /// Days between a case being reported and a death being reported.
    pub death_lag: usize,
    /// Daily probability of a downward revision in the cumulative totals.
    pub correction_prob: f64,
}

/// All derived series for one metric (e.g. `confirmed`) of one region.
#[derive(Debug, Clone, Serialize)]
pub struct MetricReport {
    pub metric: String,
    pub cumulative: TimeSeries,
    pub daily: TimeSeries,
    pub daily_smoothed: TimeSeries,
    pub r_number: TimeSeries,
    pub r_bounds: Bounds,
    pub growth_factor: TimeSeries,
    pub growth_bounds: Bounds,
    pub doubling_time: TimeSeries,
    pub doubling_time_smoothed: TimeSeries,
    pub doubling_bounds: Bounds,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    pub region: String,
    pub metrics: Vec<MetricReport>,
}

impl RegionReport {
    pub fn metric(&self, name: &str) -> Option<&MetricReport> {
        self.metrics.iter().find(|m| m.metric == name)
    }
}

/// Where `epi report` writes its optional outputs.
#[derive(Debug, Clone, Default)]
pub struct ExportTargets {
    pub csv_dir: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}
