//! Shared report pipeline used by both `epi report` and `epi chart`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! cumulative series -> daily / smoothed / R / growth / doubling -> bounds
//!
//! The front-ends then only deal with presentation (printing, exports, SVG).

use log::debug;
use rayon::prelude::*;

use crate::data::CaseTable;
use crate::domain::{MetricReport, RegionReport, ReportConfig};
use crate::error::AppError;
use crate::stats::{
    StatsError, TimeSeries, daily, doubling_time, growth_factor, min_max_default, r_number, smooth,
};

/// Compute every derived series for one cumulative series.
pub fn build_metric_report(
    metric: &str,
    cumulative: TimeSeries,
    config: &ReportConfig,
) -> Result<MetricReport, StatsError> {
    let daily_raw = daily(&cumulative, config.drop_negative);
    let daily_smoothed = smooth(&daily_raw, config.daily_smoothing, config.compound);

    let r = r_number(
        &smooth(&daily_raw, config.r_smoothing, config.compound),
        config.tau,
    )?;
    let r_bounds = min_max_default(&r, config.bounds_window)?;

    let growth = growth_factor(&smooth(&cumulative, config.growth_smoothing, config.compound));
    let growth_bounds = min_max_default(&growth, config.bounds_window)?;

    let doubling = doubling_time(&cumulative);
    let doubling_smoothed = smooth(&doubling, config.doubling_smoothing, config.compound);
    let doubling_bounds = min_max_default(&doubling, config.bounds_window)?;

    Ok(MetricReport {
        metric: metric.to_string(),
        cumulative,
        daily: daily_raw,
        daily_smoothed,
        r_number: r,
        r_bounds,
        growth_factor: growth,
        growth_bounds,
        doubling_time: doubling,
        doubling_time_smoothed: doubling_smoothed,
        doubling_bounds,
    })
}

/// Build the report for one region across the requested metrics.
pub fn build_region_report(
    table: &CaseTable,
    region: &str,
    metrics: &[String],
    config: &ReportConfig,
) -> Result<RegionReport, AppError> {
    let region = table.resolve_region(region)?;
    let mut out = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let metric = table.resolve_metric(metric)?;
        let cumulative = table.series(region, metric)?;
        debug!("{region}/{metric}: {} points", cumulative.len());
        let report = build_metric_report(metric, cumulative, config)
            .map_err(|e| AppError::new(2, format!("{region}/{metric}: {e}")))?;
        out.push(report);
    }
    Ok(RegionReport {
        region: region.to_string(),
        metrics: out,
    })
}

/// Build reports for many regions in parallel.
///
/// Empty `regions` means every region in the table; empty `metrics` means
/// every metric column. Output order follows the requested (or table) order.
pub fn build_reports(
    table: &CaseTable,
    regions: &[String],
    metrics: &[String],
    config: &ReportConfig,
) -> Result<Vec<RegionReport>, AppError> {
    let regions: Vec<String> = if regions.is_empty() {
        table.regions().map(str::to_string).collect()
    } else {
        regions.to_vec()
    };
    let metrics: Vec<String> = if metrics.is_empty() {
        table.metrics().to_vec()
    } else {
        metrics.to_vec()
    };

    regions
        .par_iter()
        .map(|region| build_region_report(table, region, &metrics, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_case_table;
    use crate::stats::SmoothingKind;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn exponential(days: usize, daily_growth: f64) -> TimeSeries {
        let mut total = 0.0;
        let values = (0..days)
            .map(|i| {
                total += 100.0 * daily_growth.powi(i as i32);
                total
            })
            .collect();
        TimeSeries::daily_from(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(), values)
    }

    #[test]
    fn metric_report_shapes_follow_the_transforms() {
        let cum = exponential(60, 1.05);
        let report = build_metric_report("confirmed", cum.clone(), &ReportConfig::default()).unwrap();

        assert_eq!(report.daily.len(), 59);
        assert_eq!(report.daily_smoothed.len(), 59);
        assert_eq!(report.r_number.len(), 59);
        assert_eq!(report.growth_factor.len(), 60);
        assert_eq!(report.doubling_time.len(), 60);
        assert_eq!(report.doubling_time_smoothed.len(), 60);
        // 7dayrolling leaves 3 NaN per side, then R loses tau-1 and tau more.
        assert_eq!(report.r_number.defined_count(), 59 - 6 - (2 * 4 - 1));
    }

    #[test]
    fn steady_exponential_growth_has_constant_r() {
        let growth: f64 = 1.05;
        let report = build_metric_report("confirmed", exponential(60, growth), &ReportConfig::default()).unwrap();
        let expected_r = growth.powi(4);
        for v in report.r_number.values().iter().filter(|v| !v.is_nan()) {
            assert_relative_eq!(*v, expected_r, epsilon = 1e-9);
        }
        assert!(report.r_bounds.max > expected_r);
        assert_eq!(report.r_bounds.min, 0.75);
    }

    #[test]
    fn custom_smoothing_is_respected() {
        let config = ReportConfig {
            daily_smoothing: SmoothingKind::SevenDayRolling,
            ..ReportConfig::default()
        };
        let report = build_metric_report("confirmed", exponential(20, 1.1), &config).unwrap();
        assert_eq!(report.daily_smoothed.defined_count(), 19 - 6);
    }

    #[test]
    fn zero_tau_is_rejected() {
        let config = ReportConfig {
            tau: 0,
            ..ReportConfig::default()
        };
        assert!(build_metric_report("confirmed", exponential(20, 1.1), &config).is_err());
    }

    #[test]
    fn builds_all_regions_and_metrics_by_default() {
        let csv = "date,region,confirmed,deaths\n\
            2020-03-01,A,1,0\n2020-03-02,A,2,0\n2020-03-03,A,4,1\n\
            2020-03-01,B,5,0\n2020-03-02,B,6,1\n2020-03-03,B,8,1\n";
        let table = read_case_table(csv.as_bytes()).unwrap();
        let reports = build_reports(&table, &[], &[], &ReportConfig::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].region, "A");
        assert_eq!(reports[1].region, "B");
        assert!(reports[0].metric("deaths").is_some());

        let only_b = build_reports(&table, &["b".to_string()], &["confirmed".to_string()], &ReportConfig::default())
            .unwrap();
        assert_eq!(only_b[0].region, "B");
        assert_eq!(only_b[0].metrics.len(), 1);
    }
}
