//! Precondition errors raised by the statistics transforms.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("series has {dates} dates but {values} values")]
    LengthMismatch { dates: usize, values: usize },

    #[error("dates must be strictly increasing: {current} at position {index} follows {previous}")]
    UnsortedDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("unknown smoothing profile '{0}' (expected one of: weak, strong, 7dayrolling)")]
    UnknownProfile(String),

    #[error("invalid smoothing profile: {0}")]
    InvalidProfile(String),

    #[error("window parameter `{name}` must be at least 1, got {value}")]
    InvalidWindow { name: &'static str, value: usize },
}
