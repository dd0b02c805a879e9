//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration resolved from CLI flags (`ReportConfig`, `SampleConfig`)
//! - computed outputs per metric and per region (`MetricReport`, `RegionReport`)

pub mod types;

pub use types::*;
