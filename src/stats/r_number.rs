//! Effective reproduction number from two offset rolling means.

use crate::stats::{StatsError, TimeSeries};

/// Default generation interval, in days.
pub const DEFAULT_TAU: usize = 4;

/// Reproduction number with generation interval `tau`.
///
/// Takes the trailing `tau`-day mean `m` and reports `m[t + tau] / m[t]` at
/// date `t`, so each value is attributed to the generation that caused the
/// later infections. When both means are exactly zero the ratio is `1.0`;
/// any other zero denominator is `NaN`.
///
/// The output keeps the input's dates. The first `tau - 1` positions (no full
/// window yet) and the last `tau` positions (no later window) are `NaN`.
pub fn r_number(series: &TimeSeries, tau: usize) -> Result<TimeSeries, StatsError> {
    if tau == 0 {
        return Err(StatsError::InvalidWindow { name: "tau", value: tau });
    }

    let mean = trailing_mean(series.values(), tau);
    let n = mean.len();

    let out = (0..n)
        .map(|t| {
            let Some(&later) = mean.get(t + tau) else {
                return f64::NAN;
            };
            let earlier = mean[t];
            if later.is_nan() || earlier.is_nan() {
                f64::NAN
            } else if later == 0.0 && earlier == 0.0 {
                1.0
            } else if earlier == 0.0 {
                f64::NAN
            } else {
                later / earlier
            }
        })
        .collect();

    Ok(series.with_values(out))
}

/// Plain trailing mean; `NaN` unless all `window` inputs are defined.
fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return f64::NAN;
            }
            let slice = &values[i + 1 - window..=i];
            if slice.iter().any(|v| v.is_nan()) {
                return f64::NAN;
            }
            slice.iter().sum::<f64>() / window as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::daily_from(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(), values)
    }

    #[test]
    fn constant_series_has_r_of_one() {
        let r = r_number(&series(vec![7.0; 20]), 4).unwrap();
        assert_eq!(r.len(), 20);
        assert_eq!(r.defined_count(), 20 - 2 * 4 + 1);
        for v in r.values().iter().filter(|v| !v.is_nan()) {
            assert_relative_eq!(*v, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn edges_are_undefined() {
        let r = r_number(&series(vec![1.0; 12]), 4).unwrap();
        let defined: Vec<usize> = r
            .values()
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(defined, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn all_zero_series_is_exactly_one() {
        let r = r_number(&series(vec![0.0; 10]), 4).unwrap();
        assert_eq!(r.defined_count(), 3);
        for v in r.values().iter().filter(|v| !v.is_nan()) {
            assert_eq!(*v, 1.0);
        }
    }

    #[test]
    fn zero_to_positive_is_undefined() {
        let r = r_number(&series(vec![0.0, 0.0, 5.0, 5.0]), 2).unwrap();
        // means: [nan, 0, 2.5, 5]; r[1] = 5 / 0
        assert!(r.values()[1].is_nan());
        assert!(r.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn geometric_growth_matches_ratio() {
        // Daily counts doubling every tau days give R = 2.
        let tau = 4;
        let values: Vec<f64> = (0..24).map(|i| 2f64.powf(i as f64 / tau as f64)).collect();
        let r = r_number(&series(values), tau).unwrap();
        for v in r.values().iter().filter(|v| !v.is_nan()) {
            assert_relative_eq!(*v, 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn value_is_attributed_to_the_earlier_generation() {
        let values = vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0];
        let r = r_number(&series(values), 2).unwrap();
        // means: [nan, 1, 1, 1, 1.5, 2, 2, 2]
        assert_relative_eq!(r.values()[1], 1.0);
        assert_relative_eq!(r.values()[2], 1.5);
        assert_relative_eq!(r.values()[3], 2.0);
        assert_relative_eq!(r.values()[5], 1.0);
        assert!(r.values()[6].is_nan());
    }

    #[test]
    fn rejects_zero_tau() {
        assert_eq!(
            r_number(&series(vec![1.0]), 0).unwrap_err(),
            StatsError::InvalidWindow { name: "tau", value: 0 }
        );
    }
}
