//! Day-over-day growth factor.

use crate::stats::TimeSeries;

/// `value[t] / value[t-1]`, which equals `1 + percent change`.
///
/// `1.0` means no change, above one means growth. The first position and any
/// position with a zero or undefined predecessor are `NaN`.
pub fn growth_factor(series: &TimeSeries) -> TimeSeries {
    let values = series.values();
    let out = (0..values.len())
        .map(|i| {
            if i == 0 {
                return f64::NAN;
            }
            let prev = values[i - 1];
            if prev == 0.0 || prev.is_nan() {
                return f64::NAN;
            }
            values[i] / prev
        })
        .collect();

    series.with_values(out)
}
