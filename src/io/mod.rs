//! Output helpers.
//!
//! - per-metric CSV exports and case-table CSV writing (`export`)
//! - whole-report JSON (`json`)

pub mod export;
pub mod json;

pub use export::*;
pub use json::*;
