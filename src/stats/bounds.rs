//! Display bounds for derived series.

use serde::Serialize;

use crate::stats::{StatsError, TimeSeries};

/// Fixed visual margin added around the observed range.
const PADDING: f64 = 0.1;

/// Trailing window used by the charts, in days.
pub const DEFAULT_BOUNDS_WINDOW: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

/// Tunables for [`min_max`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeOptions {
    /// The bounds never shrink inside this interval.
    pub at_least: (f64, f64),
    /// Reserved; not used by the computation.
    pub alert: (f64, f64),
}

impl Default for RangeOptions {
    fn default() -> Self {
        Self {
            at_least: (0.75, 1.25),
            alert: (0.1, 100.0),
        }
    }
}

/// Padded (min, max) over the last `n` points, widened to at least
/// `options.at_least`.
///
/// `n` larger than the series is clamped. `+inf` and `NaN` are ignored. If no
/// defined value remains, `at_least` is returned as-is.
pub fn min_max(series: &TimeSeries, n: usize, options: RangeOptions) -> Result<Bounds, StatsError> {
    if n == 0 {
        return Err(StatsError::InvalidWindow { name: "n", value: n });
    }
    let values = series.values();
    let n = n.min(values.len());
    let window = &values[values.len() - n..];

    let defined = || {
        window
            .iter()
            .copied()
            .filter(|v| !v.is_nan() && *v != f64::INFINITY)
    };
    let lo = defined().reduce(f64::min).unwrap_or(f64::NAN) - PADDING;
    let hi = defined().reduce(f64::max).unwrap_or(f64::NAN) + PADDING;

    // NaN comparisons are false, so an empty window falls back to `at_least`.
    let (floor, ceil) = options.at_least;
    Ok(Bounds {
        min: if lo < floor { lo } else { floor },
        max: if hi > ceil { hi } else { ceil },
    })
}

pub fn min_max_default(series: &TimeSeries, n: usize) -> Result<Bounds, StatsError> {
    min_max(series, n, RangeOptions::default())
}
