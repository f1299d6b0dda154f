//! Synthetic price series generation.
//!
//! Produces a seeded series that grows geometrically at a fixed yearly rate,
//! with log-normal noise around the trend and a symmetric daily low/high range.
//! Used by `growth demo` and by tests that need realistic, reproducible data.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DataPoint, TimeSeries};
use crate::error::{AppError, Result};

/// Parameters of a synthetic series.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub start: NaiveDate,
    pub years: u32,
    /// Calendar days between observations.
    pub step_days: u32,
    pub start_price: f64,
    /// Yearly growth rate (0.08 = 8% per year).
    pub annual_growth: f64,
    /// Standard deviation of the log-noise around the trend.
    pub volatility: f64,
    /// Half-width of the low/high range relative to the medium price.
    pub range: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2010, 1, 4).unwrap_or_default(),
            years: 12,
            step_days: 7,
            start_price: 25.0,
            annual_growth: 0.08,
            volatility: 0.03,
            range: 0.01,
            seed: 42,
        }
    }
}

/// Generate a series from `config`.
pub fn generate_series(config: &SampleConfig) -> Result<TimeSeries> {
    if config.years == 0 || config.step_days == 0 {
        return Err(AppError::Config("sample needs years > 0 and step_days > 0".into()));
    }
    if !(config.start_price.is_finite() && config.start_price > 0.0) {
        return Err(AppError::Config(format!(
            "sample start price must be positive, got {}",
            config.start_price
        )));
    }
    if !(config.annual_growth.is_finite() && config.annual_growth > -1.0) {
        return Err(AppError::Config(format!(
            "sample growth must be > -100%, got {}",
            config.annual_growth
        )));
    }
    if !(config.volatility.is_finite() && config.volatility >= 0.0) {
        return Err(AppError::Config(format!(
            "sample volatility must be finite and >= 0, got {}",
            config.volatility
        )));
    }
    if !(config.range.is_finite() && (0.0..1.0).contains(&config.range)) {
        return Err(AppError::Config(format!(
            "sample range must be in [0, 1), got {}",
            config.range
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.volatility)
        .map_err(|e| AppError::Config(format!("noise distribution error: {e}")))?;

    let log_growth = (1.0 + config.annual_growth).ln();
    let end = config
        .start
        .checked_add_signed(Duration::days(i64::from(config.years) * 365))
        .ok_or_else(|| AppError::Config("sample end date out of range".into()))?;

    let mut points = Vec::new();
    let mut date = config.start;
    while date <= end {
        let elapsed_years = (date - config.start).num_days() as f64 / 365.25;
        let trend = config.start_price.ln() + log_growth * elapsed_years;
        let medium = (trend + normal.sample(&mut rng)).exp();
        points.push(DataPoint::new(
            date,
            medium * (1.0 - config.range),
            medium * (1.0 + config.range),
        ));

        date = match date.checked_add_signed(Duration::days(i64::from(config.step_days))) {
            Some(next) => next,
            None => break,
        };
    }

    TimeSeries::new(points)
}
