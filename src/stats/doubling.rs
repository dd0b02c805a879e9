//! Doubling time from consecutive cumulative totals.

use std::f64::consts::LN_2;

use crate::stats::TimeSeries;

/// `ln 2 / ln(value[t] / value[t-1])`, i.e. days to double at today's pace.
///
/// Same index as the input; the first position is `NaN`. A zero predecessor,
/// an unchanged value, or a ratio that is not finite and positive also gives
/// `NaN`. Shrinking totals give a negative doubling time. The raw result is
/// spiky; callers usually run it through `smooth(.., Strong, ..)`.
pub fn doubling_time(cumulative: &TimeSeries) -> TimeSeries {
    let values = cumulative.values();
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if i == 0 {
            out.push(f64::NAN);
            continue;
        }
        let (prev, curr) = (values[i - 1], values[i]);
        if prev == 0.0 {
            out.push(f64::NAN);
            continue;
        }
        let ratio = curr / prev;
        let log_ratio = ratio.ln();
        if !(ratio.is_finite() && ratio > 0.0) || log_ratio == 0.0 {
            out.push(f64::NAN);
            continue;
        }
        out.push(LN_2 / log_ratio);
    }

    cumulative.with_values(out)
}
