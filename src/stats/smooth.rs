//! Gaussian-weighted rolling means with a fixed table of named profiles.
//!
//! Window alignment for a profile of width `W` centered on output `i`:
//! inputs `i + (W-1)/2 - (W-1) ..= i + (W-1)/2` (integer division), clipped to
//! the series. Even widths therefore lean one point into the past.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::stats::{StatsError, TimeSeries};

/// Named smoothing strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SmoothingKind {
    #[serde(rename = "weak")]
    #[value(name = "weak")]
    Weak,
    #[serde(rename = "strong")]
    #[value(name = "strong")]
    Strong,
    #[serde(rename = "7dayrolling")]
    #[value(name = "7dayrolling")]
    SevenDayRolling,
}

impl SmoothingKind {
    pub const ALL: [SmoothingKind; 3] = [
        SmoothingKind::Weak,
        SmoothingKind::Strong,
        SmoothingKind::SevenDayRolling,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SmoothingKind::Weak => "weak",
            SmoothingKind::Strong => "strong",
            SmoothingKind::SevenDayRolling => "7dayrolling",
        }
    }

    pub fn profile(self) -> &'static SmoothingProfile {
        match self {
            SmoothingKind::Weak => &WEAK,
            SmoothingKind::Strong => &STRONG,
            SmoothingKind::SevenDayRolling => &SEVEN_DAY_ROLLING,
        }
    }
}

impl fmt::Display for SmoothingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SmoothingKind {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SmoothingKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| StatsError::UnknownProfile(s.to_string()))
    }
}

/// Weighting kernel for a rolling window. Only Gaussian is used today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Gaussian,
}

/// Rolling-window parameters for one smoothing pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingProfile {
    pub window: usize,
    pub center: bool,
    pub kernel: Kernel,
    /// Minimum number of defined inputs in the window for a defined output.
    pub min_periods: usize,
    /// Standard deviation of the Gaussian kernel, in samples.
    pub std: f64,
}

pub const WEAK: SmoothingProfile = SmoothingProfile {
    window: 9,
    center: true,
    kernel: Kernel::Gaussian,
    min_periods: 1,
    std: 3.0,
};

pub const STRONG: SmoothingProfile = SmoothingProfile {
    window: 4,
    center: true,
    kernel: Kernel::Gaussian,
    min_periods: 1,
    std: 2.0,
};

pub const SEVEN_DAY_ROLLING: SmoothingProfile = SmoothingProfile {
    window: 7,
    center: true,
    kernel: Kernel::Gaussian,
    min_periods: 7,
    std: 3.0,
};

/// Every named profile, in `SmoothingKind::ALL` order.
pub const PROFILES: [SmoothingProfile; 3] = [WEAK, STRONG, SEVEN_DAY_ROLLING];

impl SmoothingProfile {
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.window == 0 {
            return Err(StatsError::InvalidProfile("window must be at least 1".to_string()));
        }
        if self.min_periods == 0 || self.min_periods > self.window {
            return Err(StatsError::InvalidProfile(format!(
                "min_periods must be in 1..={}, got {}",
                self.window, self.min_periods
            )));
        }
        if !(self.std.is_finite() && self.std > 0.0) {
            return Err(StatsError::InvalidProfile(format!(
                "std must be finite and positive, got {}",
                self.std
            )));
        }
        Ok(())
    }

    /// Kernel weights over the full window, peak `1.0` at the middle.
    pub fn weights(&self) -> Vec<f64> {
        match self.kernel {
            Kernel::Gaussian => gaussian_weights(self.window, self.std),
        }
    }
}

/// Symmetric Gaussian window: `exp(-0.5 * ((k - (m-1)/2) / std)^2)`.
pub fn gaussian_weights(m: usize, std: f64) -> Vec<f64> {
    let mid = (m as f64 - 1.0) / 2.0;
    (0..m)
        .map(|k| {
            let z = (k as f64 - mid) / std;
            (-0.5 * z * z).exp()
        })
        .collect()
}

/// Smooth with a named profile.
///
/// With `compound`, `Strong` first runs a `Weak` pass and then the `Strong`
/// pass on top of it. Other profiles ignore `compound`.
pub fn smooth(series: &TimeSeries, kind: SmoothingKind, compound: bool) -> TimeSeries {
    if kind == SmoothingKind::Strong && compound {
        let weak = weighted_rolling_mean(series, SmoothingKind::Weak.profile());
        return weighted_rolling_mean(&weak, kind.profile());
    }
    weighted_rolling_mean(series, kind.profile())
}

/// Rolling mean with an arbitrary (validated) profile.
pub fn rolling_gaussian_mean(
    series: &TimeSeries,
    profile: &SmoothingProfile,
) -> Result<TimeSeries, StatsError> {
    profile.validate()?;
    Ok(weighted_rolling_mean(series, profile))
}

fn weighted_rolling_mean(series: &TimeSeries, profile: &SmoothingProfile) -> TimeSeries {
    let values = series.values();
    let n = values.len() as isize;
    let w = profile.window as isize;
    let weights = profile.weights();
    let offset = if profile.center { (w - 1) / 2 } else { 0 };

    let out = (0..n)
        .map(|i| {
            // Weight `k` lines up with input `i + offset - (w - 1) + k`.
            let first = i + offset - (w - 1);
            let mut sum = 0.0;
            let mut total_weight = 0.0;
            let mut count = 0usize;
            for (k, &wk) in weights.iter().enumerate() {
                let idx = first + k as isize;
                if idx < 0 || idx >= n {
                    continue;
                }
                let v = values[idx as usize];
                if v.is_nan() {
                    continue;
                }
                sum += v * wk;
                total_weight += wk;
                count += 1;
            }
            if count < profile.min_periods.max(1) || total_weight == 0.0 {
                f64::NAN
            } else {
                sum / total_weight
            }
        })
        .collect();

    series.with_values(out)
}
