//! End-to-end: synthetic outbreak -> CSV -> reports -> exports.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use epi_curves::app::pipeline::build_reports;
use epi_curves::data::{generate_sample, load_case_table, read_case_table};
use epi_curves::domain::{ReportConfig, SampleConfig};
use epi_curves::io::{write_case_table_csv, write_reports_csv, write_reports_json};
use epi_curves::report::rank_by_r_number;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("epi-it-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn sample_config(region: &str, initial: f64, r_start: f64, r_end: f64) -> SampleConfig {
    SampleConfig {
        region: region.to_string(),
        start: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
        days: 90,
        seed: 11,
        initial,
        r_start,
        r_end,
        generation_days: 4.0,
        ifr: 0.02,
        death_lag: 10,
        correction_prob: 0.05,
    }
}

#[test]
fn sample_round_trips_into_reports() {
    let dir = scratch_dir("roundtrip");
    let csv_path = dir.join("sample.csv");

    let sample = generate_sample(&sample_config("Growland", 50.0, 2.0, 1.6)).unwrap();
    write_case_table_csv(&csv_path, &sample.table).unwrap();

    let table = load_case_table(&csv_path).unwrap();
    assert!(table.row_errors.is_empty());
    assert_eq!(table.rows_used(), 90);

    let config = ReportConfig::default();
    let reports = build_reports(&table, &[], &[], &config).unwrap();
    assert_eq!(reports.len(), 1);
    let confirmed = reports[0].metric("confirmed").unwrap();

    // Corrections are dropped, so the daily series never goes negative.
    assert!(confirmed.daily.values().iter().all(|v| *v >= 0.0));
    assert!(confirmed.daily.len() < 90);

    // R stays above 1 for an outbreak whose R path never drops below 1.6.
    let (_, last_r) = confirmed.r_number.last_defined().unwrap();
    assert!(last_r > 1.0, "last R = {last_r}");

    let written = write_reports_csv(&dir.join("csv"), &reports).unwrap();
    assert_eq!(written.len(), 2);
    let json_path = dir.join("report.json");
    write_reports_json(&json_path, &config, &reports).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(doc["regions"][0]["region"], "Growland");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn regions_rank_by_latest_r() {
    let mut combined = String::from("date,region,confirmed,deaths\n");
    for (region, initial, r_start, r_end) in [("Shrink", 1e5, 0.9, 0.7), ("Grow", 50.0, 2.0, 1.8)] {
        let config = SampleConfig {
            correction_prob: 0.0,
            ..sample_config(region, initial, r_start, r_end)
        };
        let sample = generate_sample(&config).unwrap();
        let confirmed = sample.table.series(region, "confirmed").unwrap();
        let deaths = sample.table.series(region, "deaths").unwrap();
        for ((date, c), d) in confirmed.iter().zip(deaths.values()) {
            combined.push_str(&format!("{date},{region},{c},{d}\n"));
        }
    }

    let table = read_case_table(combined.as_bytes()).unwrap();
    let reports = build_reports(&table, &[], &["confirmed".to_string()], &ReportConfig::default()).unwrap();
    let ranks = rank_by_r_number(&reports, "confirmed");

    assert_eq!(ranks.len(), 2);
    assert_eq!(ranks[0].region, "Grow");
    assert!(ranks[0].r_number > 1.0);
    assert!(ranks[1].r_number < 1.0);
}
