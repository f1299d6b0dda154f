//! Command-line parsing for the growth-curve fitter.
//!
//! Argument parsing and command dispatch stay separate from the
//! modeling/math code. Every numeric knob can also come from a `GROWTH_*`
//! environment variable (a `.env` file is loaded before parsing).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "growth", version, about = "Price growth curves and ensemble forecasts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a local price CSV and print models and forecasts.
    Fit(FitArgs),
    /// Fit a seeded synthetic series (no input file needed).
    Demo(DemoArgs),
}

/// Options shared by every command that runs the fit.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Fixed anchor `x0` of the exponential model `a * b^(t - x0)`.
    #[arg(long, env = "GROWTH_X0", default_value_t = 2000.0)]
    pub x0: f64,

    /// Time shift applied before fitting the composite candidates.
    #[arg(long, env = "GROWTH_SHIFT", default_value_t = 2000.0)]
    pub shift: f64,

    /// Iteration budget of the simplex minimizer.
    #[arg(long, env = "GROWTH_SIMPLEX_MAX_ITER", default_value_t = 600_000)]
    pub simplex_max_iter: usize,

    /// Convergence tolerance on the simplex size.
    #[arg(long, env = "GROWTH_SIMPLEX_TOLERANCE", default_value_t = 1e-15)]
    pub simplex_tolerance: f64,

    /// Trial budget of the log-offset walk.
    #[arg(long, env = "GROWTH_WALK_MAX_ITER", default_value_t = 200_000)]
    pub walk_max_iter: usize,

    /// Forecast horizons in years (repeatable).
    #[arg(long = "horizon", env = "GROWTH_HORIZONS", value_delimiter = ',', default_values_t = vec![1.0, 5.0, 10.0])]
    pub horizons: Vec<f64>,

    /// Yearly dividend per share added linearly to each forecast.
    #[arg(long, env = "GROWTH_DIVIDEND", default_value_t = 0.0)]
    pub dividend: f64,

    /// Reference date forecasts start from (defaults to the last observation).
    #[arg(long = "as-of", value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// `growth fit`
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Price CSV with `date` and `low`/`high` (or `close`/`price`) columns.
    #[arg(long, value_name = "CSV", env = "GROWTH_CSV")]
    pub csv: PathBuf,

    /// Only use observations on or before this date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub until: Option<NaiveDate>,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// `growth demo`
#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Length of the synthetic series in years.
    #[arg(long, default_value_t = 12)]
    pub years: u32,

    /// Yearly growth rate of the trend (0.08 = 8%).
    #[arg(long, default_value_t = 0.08)]
    pub growth: f64,

    /// Standard deviation of the log-noise around the trend.
    #[arg(long, default_value_t = 0.03)]
    pub volatility: f64,

    /// Random seed.
    #[arg(long, env = "GROWTH_SEED", default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fit_with_repeated_horizons() {
        let cli = Cli::parse_from([
            "growth", "fit", "--csv", "p.csv", "--horizon", "2", "--horizon", "7.5", "--dividend", "1.2",
            "--as-of", "2024-06-30",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.csv, PathBuf::from("p.csv"));
        assert_eq!(args.model.horizons, vec![2.0, 7.5]);
        assert_eq!(args.model.dividend, 1.2);
        assert_eq!(args.model.as_of, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(args.model.simplex_max_iter, 600_000);
    }

    #[test]
    fn demo_defaults() {
        let cli = Cli::parse_from(["growth", "demo", "--seed", "9"]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.seed, 9);
        assert_eq!(args.years, 12);
        assert_eq!(args.model.horizons, vec![1.0, 5.0, 10.0]);
        assert!(!args.model.json);
    }
}
