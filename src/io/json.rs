//! Whole-report JSON export.
//!
//! Undefined values serialize as `null` (serde_json writes non-finite floats
//! that way), so consumers never see `NaN` literals.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{RegionReport, ReportConfig};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    config: &'a ReportConfig,
    regions: &'a [RegionReport],
}

pub fn write_reports_json(path: &Path, config: &ReportConfig, reports: &[RegionReport]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create JSON '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_reports_json_to(&mut out, config, reports)?;
    out.flush()
        .map_err(|e| AppError::new(4, format!("Failed to write JSON '{}': {e}", path.display())))
}

pub fn write_reports_json_to<W: Write>(
    out: W,
    config: &ReportConfig,
    reports: &[RegionReport],
) -> Result<(), AppError> {
    serde_json::to_writer_pretty(
        out,
        &ReportDocument {
            config,
            regions: reports,
        },
    )
    .map_err(|e| AppError::new(4, format!("Failed to serialize report JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_metric_report;
    use crate::stats::TimeSeries;
    use chrono::NaiveDate;
    use serde_json::Value;

    #[test]
    fn undefined_values_become_null() {
        let cum = TimeSeries::daily_from(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(), vec![1.0, 2.0, 4.0]);
        let config = ReportConfig::default();
        let report = build_metric_report("confirmed", cum, &config).unwrap();
        let reports = vec![RegionReport {
            region: "X".to_string(),
            metrics: vec![report],
        }];

        let mut buf = Vec::new();
        write_reports_json_to(&mut buf, &config, &reports).unwrap();
        let doc: Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(doc["config"]["tau"], 4);
        let metric = &doc["regions"][0]["metrics"][0];
        assert_eq!(metric["metric"], "confirmed");
        assert_eq!(metric["doubling_time"]["values"][0], Value::Null);
        assert_eq!(metric["doubling_time"]["values"][1], 1.0);
        // Three points never fill a 7-day window.
        assert!(metric["growth_factor"]["values"].as_array().unwrap().iter().all(Value::is_null));
        assert_eq!(metric["cumulative"]["dates"][2], "2020-03-03");
    }
}
