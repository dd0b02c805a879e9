//! Cumulative totals to day-over-day changes.

use crate::stats::TimeSeries;

/// Day-over-day differences of a cumulative series.
///
/// The output is indexed from the second input date. The first point has no
/// predecessor and is dropped. Positions whose difference is undefined are
/// dropped too, and with `drop_negative` so is every negative difference
/// (downward revisions in the source data). Nothing is clamped or filled.
pub fn daily(cumulative: &TimeSeries, drop_negative: bool) -> TimeSeries {
    let dates = cumulative.dates();
    let values = cumulative.values();

    let points = (1..values.len()).filter_map(|i| {
        let delta = values[i] - values[i - 1];
        if delta.is_nan() || (drop_negative && delta < 0.0) {
            None
        } else {
            Some((dates[i], delta))
        }
    });

    TimeSeries::from_ordered(points)
}
