//! The one series type every transform consumes and produces.
//!
//! Values are `f64`; an undefined value is `f64::NAN`. There is no separate
//! "missing" marker, so a literal `0.0` always means a computed zero.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::stats::StatsError;

/// Day-resolution series with strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, validating that both columns have the same length and
    /// that dates are strictly increasing (no duplicates).
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, StatsError> {
        if dates.len() != values.len() {
            return Err(StatsError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }
        for (index, pair) in dates.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(StatsError::UnsortedDates {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(Self { dates, values })
    }

    pub fn from_points(points: Vec<(NaiveDate, f64)>) -> Result<Self, StatsError> {
        let (dates, values) = points.into_iter().unzip();
        Self::new(dates, values)
    }

    /// Consecutive daily series starting at `start`.
    pub fn daily_from(start: NaiveDate, values: Vec<f64>) -> Self {
        let dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Self { dates, values }
    }

    pub fn empty() -> Self {
        Self {
            dates: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `date`, if the date is part of the index.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| self.values[idx])
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Latest point whose value is not `NaN`.
    pub fn last_defined(&self) -> Option<(NaiveDate, f64)> {
        self.iter().rev().find(|(_, v)| !v.is_nan())
    }

    /// Number of positions holding a defined (non-`NaN`) value.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Same dates, new values. `values` must be index-aligned with `self`.
    pub(crate) fn with_values(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.dates.len());
        Self {
            dates: self.dates.clone(),
            values,
        }
    }

    /// Collect points taken in order from an existing series (so the date
    /// invariant already holds).
    pub(crate) fn from_ordered(points: impl Iterator<Item = (NaiveDate, f64)>) -> Self {
        let (dates, values) = points.unzip();
        Self { dates, values }
    }
}
