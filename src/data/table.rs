//! CSV ingest for cumulative case tables.
//!
//! Expected layout (long format, one row per region and date):
//!
//! ```text
//! date,region,confirmed,deaths
//! 2020-03-01,Germany,130,0
//! 2020-03-01,Italy,1694,34
//! ```
//!
//! - `date` is required; `region` is optional (all rows then belong to
//!   [`DEFAULT_REGION`]); every other column is a metric.
//! - Blank metric cells are undefined values (`NaN`), not zero.
//! - Rows may come in any order. Duplicate dates within a region are not
//!   merged; they surface as an error when that series is requested.
//! - Unparseable rows are skipped and reported in `row_errors`.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use log::warn;

use crate::error::AppError;
use crate::stats::TimeSeries;

/// Region name used when the CSV has no `region` column.
pub const DEFAULT_REGION: &str = "all";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    date: NaiveDate,
    /// One value per entry of `CaseTable::metrics`.
    values: Vec<f64>,
}

/// Cumulative counts keyed by region, one column per metric.
#[derive(Debug, Clone, Default)]
pub struct CaseTable {
    metrics: Vec<String>,
    regions: BTreeMap<String, Vec<Row>>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl CaseTable {
    pub fn new(metrics: Vec<String>) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    /// Append one date for `region`. `values` must follow `metrics()` order.
    pub fn push(&mut self, region: &str, date: NaiveDate, values: Vec<f64>) -> Result<(), AppError> {
        if values.len() != self.metrics.len() {
            return Err(AppError::new(
                2,
                format!(
                    "Expected {} metric values for {region} on {date}, got {}.",
                    self.metrics.len(),
                    values.len()
                ),
            ));
        }
        self.regions
            .entry(region.to_string())
            .or_default()
            .push(Row { date, values });
        Ok(())
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Every stored row as `(region, date, values)`, regions in name order and
    /// rows in insertion order.
    pub fn records(&self) -> impl Iterator<Item = (&str, NaiveDate, &[f64])> {
        self.regions.iter().flat_map(|(region, rows)| {
            rows.iter()
                .map(move |row| (region.as_str(), row.date, row.values.as_slice()))
        })
    }

    pub fn rows_used(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }

    /// Find a region by exact name, ignoring ASCII case.
    pub fn resolve_region(&self, name: &str) -> Result<&str, AppError> {
        self.regions()
            .find(|r| r.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                AppError::new(
                    2,
                    format!(
                        "Unknown region '{name}'. Available: {}.",
                        self.regions().collect::<Vec<_>>().join(", ")
                    ),
                )
            })
    }

    pub fn resolve_metric(&self, name: &str) -> Result<&str, AppError> {
        let wanted = normalize_header_name(name);
        self.metrics
            .iter()
            .find(|m| **m == wanted)
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::new(
                    2,
                    format!("Unknown metric '{name}'. Available: {}.", self.metrics.join(", ")),
                )
            })
    }

    /// Date-sorted cumulative series for one region and metric.
    pub fn series(&self, region: &str, metric: &str) -> Result<TimeSeries, AppError> {
        let region = self.resolve_region(region)?;
        let metric = self.resolve_metric(metric)?;
        let col = self
            .metrics
            .iter()
            .position(|m| m == metric)
            .ok_or_else(|| AppError::new(2, format!("Unknown metric '{metric}'.")))?;

        let mut points: Vec<(NaiveDate, f64)> = self
            .regions
            .get(region)
            .map(|rows| rows.iter().map(|r| (r.date, r.values[col])).collect())
            .unwrap_or_default();
        points.sort_by_key(|(d, _)| *d);

        TimeSeries::from_points(points)
            .map_err(|e| AppError::new(2, format!("Invalid series for {region}/{metric}: {e}")))
    }
}

/// Load a case table from a CSV file.
pub fn load_case_table(path: &Path) -> Result<CaseTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let table = read_case_table(file)?;

    for err in &table.row_errors {
        warn!("{}: skipped line {}: {}", path.display(), err.line, err.message);
    }
    Ok(table)
}

/// Parse a case table from any CSV reader.
pub fn read_case_table<R: Read>(input: R) -> Result<CaseTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| AppError::new(2, "Missing required column: `date`"))?;
    let region_idx = header_map.get("region").copied();

    let metric_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != date_idx && Some(*idx) != region_idx)
        .map(|(idx, name)| (idx, normalize_header_name(name)))
        .collect();
    if metric_cols.is_empty() {
        return Err(AppError::new(
            2,
            "CSV has no metric columns (expected e.g. `confirmed`, `deaths`).",
        ));
    }

    let mut table = CaseTable::new(metric_cols.iter().map(|(_, name)| name.clone()).collect());

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and records() is 0-based.
        let line = idx + 2;
        table.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                table.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, region_idx, &metric_cols) {
            Ok((region, date, values)) => table.push(&region, date, values)?,
            Err(message) => table.row_errors.push(RowError { line, message }),
        }
    }

    if table.rows_used() == 0 {
        return Err(AppError::new(2, "No valid rows in CSV."));
    }

    Ok(table)
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    region_idx: Option<usize>,
    metric_cols: &[(usize, String)],
) -> Result<(String, NaiveDate, Vec<f64>), String> {
    let date_raw = get_cell(record, date_idx).ok_or("Missing required value: `date`")?;
    let date = parse_date(date_raw)?;

    let region = match region_idx {
        Some(idx) => get_cell(record, idx)
            .ok_or("Missing required value: `region`")?
            .to_string(),
        None => DEFAULT_REGION.to_string(),
    };

    let mut values = Vec::with_capacity(metric_cols.len());
    for (idx, name) in metric_cols {
        let value = match get_cell(record, *idx) {
            None => f64::NAN,
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| format!("Invalid number '{raw}' in column `{name}`"))?,
        };
        values.push(value);
    }

    Ok((region, date, values))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\u{feff}Date,Region,Confirmed,Deaths\n\
        2020-03-02,Germany,150,1\n\
        2020-03-01,Germany,130,0\n\
        2020-03-01,Italy,1694,34\n\
        2020-03-02,Italy,2036,\n\
        not-a-date,Italy,1,1\n\
        2020-03-03,Italy,abc,1\n";

    #[test]
    fn reads_long_format_and_sorts_by_date() {
        let table = read_case_table(CSV.as_bytes()).unwrap();
        assert_eq!(table.metrics(), &["confirmed".to_string(), "deaths".to_string()]);
        assert_eq!(table.regions().collect::<Vec<_>>(), vec!["Germany", "Italy"]);
        assert_eq!(table.rows_read, 6);
        assert_eq!(table.rows_used(), 4);

        let de = table.series("germany", "Confirmed").unwrap();
        assert_eq!(de.values(), &[130.0, 150.0]);
        assert_eq!(de.first_date(), NaiveDate::from_ymd_opt(2020, 3, 1));
    }

    #[test]
    fn blank_cells_are_undefined() {
        let table = read_case_table(CSV.as_bytes()).unwrap();
        let it = table.series("Italy", "deaths").unwrap();
        assert_eq!(it.values()[0], 34.0);
        assert!(it.values()[1].is_nan());
    }

    #[test]
    fn bad_rows_are_reported_with_line_numbers() {
        let table = read_case_table(CSV.as_bytes()).unwrap();
        let lines: Vec<usize> = table.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![6, 7]);
        assert!(table.row_errors[1].message.contains("confirmed"));
    }

    #[test]
    fn missing_region_column_uses_default_region() {
        let table = read_case_table("date,confirmed\n2020-03-01,1\n2020-03-02,3\n".as_bytes()).unwrap();
        assert_eq!(table.regions().collect::<Vec<_>>(), vec![DEFAULT_REGION]);
        assert_eq!(table.series(DEFAULT_REGION, "confirmed").unwrap().len(), 2);
    }

    #[test]
    fn duplicate_dates_fail_loudly() {
        let table =
            read_case_table("date,confirmed\n2020-03-01,1\n01/03/2020,3\n".as_bytes()).unwrap();
        let err = table.series(DEFAULT_REGION, "confirmed").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn unknown_region_and_metric_are_errors() {
        let table = read_case_table(CSV.as_bytes()).unwrap();
        assert!(table.resolve_region("France").is_err());
        assert!(table.resolve_metric("recovered").is_err());
    }

    #[test]
    fn missing_date_column_is_a_schema_error() {
        let err = read_case_table("day,confirmed\n1,2\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
