//! Synthetic outbreak generation.
//!
//! Produces a reproducible cumulative `confirmed`/`deaths` table for one region
//! so the whole pipeline can run without any external data. The model is
//! deliberately simple:
//!
//! - expected new cases grow by `R(t)^(1/g)` per day, where `R(t)` moves
//!   linearly from `r_start` to `r_end` and `g` is the generation interval
//! - reported cases are Poisson around that expectation
//! - deaths are Poisson around `ifr` times the cases reported `death_lag` days
//!   earlier
//! - with probability `correction_prob` a day carries a small downward revision
//!   of the cumulative confirmed total, the kind of artifact `daily` drops

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::Duration;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Poisson;

use crate::data::table::CaseTable;
use crate::domain::SampleConfig;
use crate::error::AppError;

/// Expected counts below this are treated as zero (Poisson needs `λ > 0`).
const MIN_LAMBDA: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub table: CaseTable,
    /// Noise-free expected new cases per day.
    pub expected_daily: Vec<f64>,
    /// Reproduction number used on each day.
    pub r_path: Vec<f64>,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(sample_seed(config));

    let mut expected_daily = Vec::with_capacity(config.days);
    let mut r_path = Vec::with_capacity(config.days);
    let mut new_cases = Vec::with_capacity(config.days);

    let mut lambda = config.initial;
    for day in 0..config.days {
        let r = r_at(config, day);
        if day > 0 {
            lambda *= r.powf(1.0 / config.generation_days);
        }
        r_path.push(r);
        expected_daily.push(lambda);
        new_cases.push(draw_poisson(&mut rng, lambda)?);
    }

    let mut table = CaseTable::new(vec!["confirmed".to_string(), "deaths".to_string()]);
    let mut confirmed = 0.0;
    let mut deaths = 0.0;
    let mut previous_reported: f64 = 0.0;

    for day in 0..config.days {
        confirmed += new_cases[day];

        let lagged = day
            .checked_sub(config.death_lag)
            .map(|d| new_cases[d])
            .unwrap_or(0.0);
        deaths += draw_poisson(&mut rng, config.ifr * lagged)?;

        // A revision reports less than yesterday; the next clean day jumps
        // back to the true total.
        let mut reported = confirmed;
        if day > 0 && rng.gen_bool(config.correction_prob) {
            let revision = (0.1 * previous_reported).ceil().max(1.0);
            reported = (previous_reported - revision).max(0.0);
        }
        previous_reported = reported;

        let date = config
            .start
            .checked_add_signed(Duration::days(day as i64))
            .ok_or_else(|| AppError::new(4, "Sample date range overflows the calendar."))?;
        table.push(&config.region, date, vec![reported, deaths])?;
    }

    Ok(SampleData {
        table,
        expected_daily,
        r_path,
    })
}

fn validate(config: &SampleConfig) -> Result<(), AppError> {
    if config.days == 0 {
        return Err(AppError::new(2, "Sample length (--days) must be > 0."));
    }
    if config.region.trim().is_empty() {
        return Err(AppError::new(2, "Sample region name must not be empty."));
    }
    if !(config.initial.is_finite() && config.initial > 0.0) {
        return Err(AppError::new(2, "Initial daily cases must be finite and > 0."));
    }
    if !(config.r_start.is_finite() && config.r_end.is_finite() && config.r_start > 0.0 && config.r_end > 0.0) {
        return Err(AppError::new(2, "R values must be finite and > 0."));
    }
    if !(config.generation_days.is_finite() && config.generation_days > 0.0) {
        return Err(AppError::new(2, "Generation interval must be finite and > 0."));
    }
    if !(0.0..=1.0).contains(&config.ifr) {
        return Err(AppError::new(2, "IFR must be within [0, 1]."));
    }
    if !(0.0..1.0).contains(&config.correction_prob) {
        return Err(AppError::new(2, "Correction probability must be within [0, 1)."));
    }
    Ok(())
}

fn r_at(config: &SampleConfig, day: usize) -> f64 {
    if config.days < 2 {
        return config.r_start;
    }
    let u = day as f64 / (config.days as f64 - 1.0);
    config.r_start + u * (config.r_end - config.r_start)
}

fn draw_poisson(rng: &mut StdRng, lambda: f64) -> Result<f64, AppError> {
    if !lambda.is_finite() {
        return Err(AppError::new(4, "Expected case count overflowed; lower --r-start or --days."));
    }
    if lambda < MIN_LAMBDA {
        return Ok(0.0);
    }
    let dist = Poisson::new(lambda).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    Ok(dist.sample(rng))
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.region.hash(&mut hasher);
    config.start.hash(&mut hasher);
    config.days.hash(&mut hasher);
    config.initial.to_bits().hash(&mut hasher);
    config.r_start.to_bits().hash(&mut hasher);
    config.r_end.to_bits().hash(&mut hasher);
    config.generation_days.to_bits().hash(&mut hasher);
    config.ifr.to_bits().hash(&mut hasher);
    config.death_lag.hash(&mut hasher);
    config.correction_prob.to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> SampleConfig {
        SampleConfig {
            region: "Testland".to_string(),
            start: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            days: 60,
            seed: 7,
            initial: 20.0,
            r_start: 2.0,
            r_end: 0.8,
            generation_days: 4.0,
            ifr: 0.01,
            death_lag: 14,
            correction_prob: 0.0,
        }
    }

    #[test]
    fn same_seed_same_table() {
        let a = generate_sample(&config()).unwrap();
        let b = generate_sample(&config()).unwrap();
        assert_eq!(
            a.table.series("Testland", "confirmed").unwrap(),
            b.table.series("Testland", "confirmed").unwrap()
        );

        let mut other = config();
        other.seed = 8;
        let c = generate_sample(&other).unwrap();
        assert_ne!(
            a.table.series("Testland", "confirmed").unwrap(),
            c.table.series("Testland", "confirmed").unwrap()
        );
    }

    #[test]
    fn totals_are_non_decreasing_without_corrections() {
        let sample = generate_sample(&config()).unwrap();
        for metric in ["confirmed", "deaths"] {
            let s = sample.table.series("Testland", metric).unwrap();
            assert_eq!(s.len(), 60);
            assert!(s.values().windows(2).all(|w| w[1] >= w[0]), "{metric} decreased");
        }
    }

    #[test]
    fn expected_growth_follows_r_path() {
        let sample = generate_sample(&config()).unwrap();
        assert_eq!(sample.r_path[0], 2.0);
        assert!((sample.r_path[59] - 0.8).abs() < 1e-12);
        let ratio = sample.expected_daily[1] / sample.expected_daily[0];
        assert!((ratio - sample.r_path[1].powf(0.25)).abs() < 1e-12);
    }

    #[test]
    fn deaths_start_after_the_lag() {
        let sample = generate_sample(&config()).unwrap();
        let deaths = sample.table.series("Testland", "deaths").unwrap();
        assert_eq!(deaths.values()[13], 0.0);
    }

    #[test]
    fn corrections_introduce_dips() {
        let mut cfg = config();
        cfg.correction_prob = 0.5;
        let sample = generate_sample(&cfg).unwrap();
        let s = sample.table.series("Testland", "confirmed").unwrap();
        assert!(s.values().windows(2).any(|w| w[1] < w[0]));
    }

    #[test]
    fn revisions_cut_at_least_a_tenth_of_the_previous_total() {
        let mut cfg = config();
        cfg.correction_prob = 0.3;
        let sample = generate_sample(&cfg).unwrap();
        let s = sample.table.series("Testland", "confirmed").unwrap();
        let mut dips = 0;
        for w in s.values().windows(2) {
            if w[1] < w[0] {
                dips += 1;
                let revision = (0.1 * w[0]).ceil().max(1.0);
                assert_eq!(w[1], (w[0] - revision).max(0.0));
            }
        }
        assert!(dips > 0);
    }

    #[test]
    fn rejects_invalid_settings() {
        let mut cfg = config();
        cfg.days = 0;
        assert_eq!(generate_sample(&cfg).unwrap_err().exit_code(), 2);

        let mut cfg = config();
        cfg.correction_prob = 1.0;
        assert!(generate_sample(&cfg).is_err());
    }
}
