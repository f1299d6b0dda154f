//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments
//! - loads a CSV or generates a synthetic series
//! - runs the analysis pipeline and the forecasts
//! - prints the report as text or JSON

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DemoArgs, FitArgs, ModelArgs};
use crate::data::{SampleConfig, generate_series};
use crate::domain::{
    CompositeOptions, ExponentialOptions, FitConfig, OffsetWalkOptions, SimplexOptions, TimeSeries,
};
use crate::error::{AppError, Result};
use crate::report::{AnalysisReport, format_analysis};

pub mod pipeline;

/// Entry point for the `growth` binary.
pub fn run() -> Result<()> {
    // A missing .env file is fine; flags and real env vars still apply.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Ignore the error if a subscriber is already installed (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<()> {
    let ingested = crate::io::load_series(&args.csv)?;
    let series = match args.until {
        Some(date) => ingested.series.until(date),
        None => ingested.series,
    };
    let source = args.csv.display().to_string();
    analyze_and_print(&series, &args.model, source, ingested.row_errors.len())
}

fn handle_demo(args: DemoArgs) -> Result<()> {
    let sample = SampleConfig {
        years: args.years,
        annual_growth: args.growth,
        volatility: args.volatility,
        seed: args.seed,
        ..SampleConfig::default()
    };
    let series = generate_series(&sample)?;
    let source = format!(
        "synthetic (growth={}, volatility={}, seed={})",
        args.growth, args.volatility, args.seed
    );
    analyze_and_print(&series, &args.model, source, 0)
}

fn analyze_and_print(series: &TimeSeries, args: &ModelArgs, source: String, skipped_rows: usize) -> Result<()> {
    let config = fit_config_from_args(args);
    let analyzed = pipeline::analyze(series, &config)?;

    let as_of = args.as_of.unwrap_or(analyzed.last_date);
    let forecasts = args
        .horizons
        .iter()
        .map(|&n| analyzed.forecast(n, args.dividend, as_of))
        .collect::<Result<Vec<_>>>()?;

    let report = AnalysisReport::new(source, &analyzed, skipped_rows, forecasts);
    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Io(format!("failed to serialize report: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", format_analysis(&report));
    }
    Ok(())
}

/// Build the fit configuration from CLI flags; unspecified knobs keep their defaults.
pub fn fit_config_from_args(args: &ModelArgs) -> FitConfig {
    FitConfig {
        exponential: ExponentialOptions {
            x0: args.x0,
            simplex: SimplexOptions {
                max_iter: args.simplex_max_iter,
                tolerance: args.simplex_tolerance,
                ..SimplexOptions::default()
            },
            ..ExponentialOptions::default()
        },
        walk: OffsetWalkOptions {
            max_iter: args.walk_max_iter,
            ..OffsetWalkOptions::default()
        },
        composite: CompositeOptions { shift: args.shift },
    }
}
