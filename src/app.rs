//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads case tables or generates synthetic ones
//! - runs the report pipeline
//! - prints summaries/plots and writes optional exports and charts

use clap::Parser;
use log::info;

use crate::cli::{ChartArgs, Cli, Command, ReportArgs, SampleArgs, StatsArgs};
use crate::data::{CaseTable, generate_sample, load_case_table};
use crate::domain::{ExportTargets, ReportConfig, SampleConfig};
use crate::error::AppError;
use crate::logging::{LOG_ENV, init_logger, resolve_level};

pub mod pipeline;

/// Entry point for the `epi` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; flags and the real environment still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logger(resolve_level(cli.verbose, std::env::var(LOG_ENV).ok().as_deref()))?;

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Chart(args) => handle_chart(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args.stats);
    let targets = ExportTargets {
        csv_dir: args.export_csv.clone(),
        json_path: args.export_json.clone(),
    };

    let table = load_table(&args.stats)?;
    let reports = pipeline::build_reports(&table, &args.stats.regions, &args.stats.metrics, &config)?;

    for report in &reports {
        println!("{}", crate::report::format_region_summary(report, &config));

        if args.plot {
            for metric in &report.metrics {
                println!("{}", crate::plot::render_daily_plot(metric, args.width, args.height));
                println!("{}", crate::plot::render_r_plot(metric, args.width, args.height));
            }
        }
    }

    if reports.len() > 1 {
        let metrics: Vec<&str> = reports[0].metrics.iter().map(|m| m.metric.as_str()).collect();
        for metric in metrics {
            let ranks = crate::report::rank_by_r_number(&reports, metric);
            println!("{}", crate::report::format_rankings(&ranks, metric));
        }
    }

    if let Some(dir) = &targets.csv_dir {
        let written = crate::io::write_reports_csv(dir, &reports)?;
        info!("exported {} CSV file(s) to {}", written.len(), dir.display());
    }
    if let Some(path) = &targets.json_path {
        crate::io::write_reports_json(path, &config, &reports)?;
        info!("exported JSON report to {}", path.display());
    }

    Ok(())
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args.stats);
    let table = load_table(&args.stats)?;
    let reports = pipeline::build_reports(&table, &args.stats.regions, &args.stats.metrics, &config)?;

    for report in &reports {
        let path = crate::plot::write_region_svg(&args.out, report, args.width, args.height)?;
        info!("wrote chart {}", path.display());
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args);
    let sample = generate_sample(&config)?;
    crate::io::write_case_table_csv(&args.out, &sample.table)?;
    info!(
        "wrote {} synthetic day(s) for '{}' to {}",
        config.days,
        config.region,
        args.out.display()
    );
    println!("{}", args.out.display());
    Ok(())
}

fn load_table(args: &StatsArgs) -> Result<CaseTable, AppError> {
    let table = load_case_table(&args.data)?;
    info!(
        "loaded {}: {} row(s) used of {}, {} region(s), metrics [{}]",
        args.data.display(),
        table.rows_used(),
        table.rows_read,
        table.regions().count(),
        table.metrics().join(", ")
    );
    Ok(table)
}

pub fn report_config_from_args(args: &StatsArgs) -> ReportConfig {
    ReportConfig {
        daily_smoothing: args.daily_smoothing,
        r_smoothing: args.r_smoothing,
        growth_smoothing: args.growth_smoothing,
        doubling_smoothing: args.doubling_smoothing,
        tau: args.tau,
        bounds_window: args.bounds_window,
        drop_negative: !args.keep_negative,
        compound: !args.no_compound,
    }
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        region: args.region.clone(),
        start: args.start,
        days: args.days,
        seed: args.seed,
        initial: args.initial,
        r_start: args.r_start,
        r_end: args.r_end,
        generation_days: args.generation_days,
        ifr: args.ifr,
        death_lag: args.death_lag,
        correction_prob: args.correction_prob,
    }
}
