//! Time-series statistics for cumulative case/death counts.
//!
//! Every transform here is a pure function: it borrows a [`TimeSeries`] and
//! returns a fresh one (or a [`Bounds`] pair). Numeric edge cases such as a zero
//! denominator or the log of a non-positive ratio never raise; they show up as
//! `NaN` at the affected position. Only precondition violations (unsorted
//! dates, unknown profile names, out-of-domain windows) return [`StatsError`].
//!
//! Typical chains:
//!
//! - `daily -> smooth(weak)` for new cases per day
//! - `daily -> smooth(7dayrolling) -> r_number` for the reproduction number
//! - `smooth(7dayrolling) -> growth_factor`
//! - `doubling_time -> smooth(strong)`

pub mod bounds;
pub mod daily;
pub mod doubling;
pub mod error;
pub mod growth;
pub mod r_number;
pub mod series;
pub mod smooth;

pub use bounds::*;
pub use daily::*;
pub use doubling::*;
pub use error::*;
pub use growth::*;
pub use r_number::*;
pub use series::*;
pub use smooth::*;
