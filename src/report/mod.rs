//! Reporting utilities: latest-value summaries, region rankings, and
//! formatted terminal output.

pub mod format;

pub use format::*;
