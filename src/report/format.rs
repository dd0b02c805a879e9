//! Terminal formatting for region reports.
//!
//! We keep formatting code in one place so the statistics stay free of
//! presentation concerns and output changes are localized.

use chrono::NaiveDate;

use crate::domain::{MetricReport, RegionReport, ReportConfig};
use crate::stats::{Bounds, TimeSeries};

/// Latest defined R number for one region and metric.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRank {
    pub region: String,
    pub date: NaiveDate,
    pub r_number: f64,
}

/// Regions ordered by their latest defined R number (highest first).
///
/// Regions without the metric or without any defined R value are left out.
pub fn rank_by_r_number(reports: &[RegionReport], metric: &str) -> Vec<RegionRank> {
    let mut ranks: Vec<RegionRank> = reports
        .iter()
        .filter_map(|report| {
            let (date, r_number) = report.metric(metric)?.r_number.last_defined()?;
            Some(RegionRank {
                region: report.region.clone(),
                date,
                r_number,
            })
        })
        .collect();
    ranks.sort_by(|a, b| {
        b.r_number
            .partial_cmp(&a.r_number)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.region.cmp(&b.region))
    });
    ranks
}

/// Format the per-metric summary for one region.
pub fn format_region_summary(report: &RegionReport, config: &ReportConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", report.region));
    for metric in &report.metrics {
        out.push_str(&format_metric(metric, config));
    }
    out
}

fn format_metric(m: &MetricReport, config: &ReportConfig) -> String {
    let mut out = String::new();
    let span = match (m.cumulative.first_date(), m.cumulative.last_date()) {
        (Some(a), Some(b)) => format!("{a}..{b}, {} days", m.cumulative.len()),
        _ => "no data".to_string(),
    };
    out.push_str(&format!("{} ({span})\n", m.metric));

    out.push_str(&row("total", &m.cumulative, 0, None));
    out.push_str(&row("daily", &m.daily, 0, None));
    out.push_str(&row(&format!("daily ({})", config.daily_smoothing), &m.daily_smoothed, 1, None));
    out.push_str(&row(
        &format!("R (tau={}, {})", config.tau, config.r_smoothing),
        &m.r_number,
        2,
        Some(m.r_bounds),
    ));
    out.push_str(&row(
        &format!("growth factor ({})", config.growth_smoothing),
        &m.growth_factor,
        3,
        Some(m.growth_bounds),
    ));
    out.push_str(&row("doubling time", &m.doubling_time, 1, Some(m.doubling_bounds)));
    out.push_str(&row(
        &format!("doubling time ({})", config.doubling_smoothing),
        &m.doubling_time_smoothed,
        1,
        None,
    ));
    out
}

fn row(label: &str, series: &TimeSeries, precision: usize, bounds: Option<Bounds>) -> String {
    let value = match series.last_defined() {
        Some((date, v)) => format!("{:>12}  {date}", format!("{v:.precision$}")),
        None => format!("{:>12}", "n/a"),
    };
    let line = match bounds {
        Some(b) => format!("  {label:<28} {value}  bounds [{:.2}, {:.2}]", b.min, b.max),
        None => format!("  {label:<28} {value}"),
    };
    format!("{}\n", line.trim_end())
}

/// Format the R ranking table.
pub fn format_rankings(ranks: &[RegionRank], metric: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Latest R number ({metric}), highest first:\n"));
    out.push_str(format!("{:<24} {:>8} {:<10}", "region", "R", "date").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<8} {:-<10}", "", "", "").trim_end());
    out.push('\n');
    for r in ranks {
        out.push_str(
            format!("{:<24} {:>8.2} {:<10}", truncate(&r.region, 24), r.r_number, r.date).trim_end(),
        );
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_metric_report;

    fn report(region: &str, daily_growth: f64) -> RegionReport {
        let mut total = 0.0;
        let values = (0..40)
            .map(|i| {
                total += 10.0 * daily_growth.powi(i);
                total
            })
            .collect();
        let cum = TimeSeries::daily_from(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(), values);
        RegionReport {
            region: region.to_string(),
            metrics: vec![build_metric_report("confirmed", cum, &ReportConfig::default()).unwrap()],
        }
    }

    #[test]
    fn ranks_regions_by_latest_r() {
        let reports = vec![report("Slow", 1.01), report("Fast", 1.10), report("Shrinking", 0.95)];
        let ranks = rank_by_r_number(&reports, "confirmed");
        let order: Vec<&str> = ranks.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(order, vec!["Fast", "Slow", "Shrinking"]);
        assert!(rank_by_r_number(&reports, "deaths").is_empty());
    }

    #[test]
    fn summary_lists_every_statistic() {
        let txt = format_region_summary(&report("Fast", 1.10), &ReportConfig::default());
        assert!(txt.starts_with("=== Fast ===\nconfirmed (2020-03-01..2020-04-09, 40 days)\n"));
        for label in ["total", "daily (weak)", "R (tau=4, 7dayrolling)", "growth factor (7dayrolling)", "doubling time (strong)"] {
            assert!(txt.contains(label), "missing {label}:\n{txt}");
        }
        assert!(txt.contains("bounds ["));
    }

    #[test]
    fn empty_series_prints_placeholder() {
        let line = row("R", &TimeSeries::empty(), 2, None);
        assert_eq!(line, format!("  {:<28} {:>12}\n", "R", "n/a"));
    }

    #[test]
    fn truncates_long_region_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
