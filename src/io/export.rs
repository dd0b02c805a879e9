//! Export derived series to CSV.
//!
//! One file per region and metric, one row per cumulative date. Undefined
//! values are written as empty cells so spreadsheets treat them as missing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::data::CaseTable;
use crate::domain::{MetricReport, RegionReport};
use crate::error::AppError;
use crate::stats::TimeSeries;

const METRIC_HEADER: [&str; 8] = [
    "date",
    "cumulative",
    "daily",
    "daily_smoothed",
    "r_number",
    "growth_factor",
    "doubling_time",
    "doubling_time_smoothed",
];

/// Write every metric of every region into `dir`. Returns the written paths.
///
/// Fails before writing anything if two region/metric pairs sanitize to the
/// same file name.
pub fn write_reports_csv(dir: &Path, reports: &[RegionReport]) -> Result<Vec<PathBuf>, AppError> {
    let mut targets: HashMap<String, (&str, &str)> = HashMap::new();
    for report in reports {
        for metric in &report.metrics {
            let name = export_file_name(&report.region, &metric.metric);
            let previous = targets.insert(name.clone(), (report.region.as_str(), metric.metric.as_str()));
            if let Some((region, other)) = previous {
                return Err(AppError::new(
                    4,
                    format!(
                        "Export name clash: {region}/{other} and {}/{} both map to '{name}'.",
                        report.region, metric.metric
                    ),
                ));
            }
        }
    }

    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(4, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let mut written = Vec::new();
    for report in reports {
        for metric in &report.metrics {
            let path = dir.join(export_file_name(&report.region, &metric.metric));
            write_metric_csv(&path, metric)?;
            info!("wrote {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

/// Write one metric's derived series, aligned on the cumulative dates.
pub fn write_metric_csv(path: &Path, report: &MetricReport) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(METRIC_HEADER)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    let columns: [&TimeSeries; 7] = [
        &report.cumulative,
        &report.daily,
        &report.daily_smoothed,
        &report.r_number,
        &report.growth_factor,
        &report.doubling_time,
        &report.doubling_time_smoothed,
    ];

    for date in report.cumulative.dates() {
        let mut record = Vec::with_capacity(METRIC_HEADER.len());
        record.push(date.to_string());
        record.extend(columns.iter().map(|s| format_cell(s.get(*date))));
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV '{}': {e}", path.display())))
}

/// Write a case table back out in the long `date,region,<metrics>` layout.
pub fn write_case_table_csv(path: &Path, table: &CaseTable) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create CSV '{}': {e}", path.display())))?;

    let mut header = vec!["date".to_string(), "region".to_string()];
    header.extend(table.metrics().iter().cloned());
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(4, format!("Failed to write CSV header: {e}")))?;

    for (region, date, values) in table.records() {
        let mut record = vec![date.to_string(), region.to_string()];
        record.extend(values.iter().map(|v| format_cell(Some(*v))));
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(4, format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush CSV '{}': {e}", path.display())))
}

/// `<region>_<metric>.csv`, see [`sanitize_file_stem`].
pub fn export_file_name(region: &str, metric: &str) -> String {
    format!("{}_{}.csv", sanitize_file_stem(region), sanitize_file_stem(metric))
}

/// Map anything outside `[A-Za-z0-9-]` to `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v}"),
        _ => String::new(),
    }
}
