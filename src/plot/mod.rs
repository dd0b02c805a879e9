//! Chart renderers.
//!
//! - `ascii`: fixed-grid terminal plots (used by `epi report --plot`)
//! - `svg`: four-panel region summary (used by `epi chart`)

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
