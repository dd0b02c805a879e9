//! Data providers: local CSV tables and a synthetic outbreak generator.

pub mod sample;
pub mod table;

pub use sample::{SampleData, generate_sample};
pub use table::{CaseTable, DEFAULT_REGION, RowError, load_case_table, read_case_table};
