//! Terminal logger setup.
//!
//! Reports and charts go to stdout; log records go to stderr through
//! `simplelog` so piping `epi report` output stays clean.

use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::error::AppError;

/// Environment variable that sets the default level (`error` .. `trace`).
pub const LOG_ENV: &str = "EPI_LOG";

/// Resolve the level from `-v` occurrences, falling back to `EPI_LOG`, then `warn`.
pub fn resolve_level(verbose: u8, env_level: Option<&str>) -> LevelFilter {
    match verbose {
        0 => env_level
            .and_then(|s| s.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_logger(level: LevelFilter) -> Result<(), AppError> {
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
        .map_err(|e| AppError::new(4, format!("Failed to initialize logger: {e}")))
}
