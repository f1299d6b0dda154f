//! Shared analysis pipeline used by every command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! series -> exponential fit + composite fit -> immutable `AnalyzedSeries`
//!
//! The commands then focus on where the series comes from and how results are
//! presented.

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{FitConfig, Forecast, ForecastRequest, TimeSeries};
use crate::error::{AppError, Result};
use crate::fit::{fit_composite_log, fit_exponential};
use crate::forecast::forecast;
use crate::math::rmse;
use crate::models::{CompositeLogModel, ExponentialModel, Regression};

/// Both fitted models of one series plus what the forecast needs.
///
/// Built once by [`analyze`]; callers that want caching hold on to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedSeries {
    pub exponential: ExponentialModel,
    pub composite: CompositeLogModel,
    /// Medium price of the most recent observation.
    pub last_price: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub n_points: usize,
    /// In-sample RMSE of each model against the medium prices.
    pub exponential_rmse: f64,
    pub composite_rmse: f64,
}

/// Fit both models to `series`.
pub fn analyze(series: &TimeSeries, config: &FitConfig) -> Result<AnalyzedSeries> {
    config.validate()?;
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(AppError::invalid_input("cannot analyze an empty series"));
    };
    if series.len() < 2 {
        return Err(AppError::invalid_input(format!(
            "analysis needs at least 2 observations, got {}",
            series.len()
        )));
    }
    info!(points = series.len(), from = %first.date, to = %last.date, "analyzing series");

    let exp_opts = &config.exponential;
    let exponential = fit_exponential(
        series,
        exp_opts.initial_a,
        exp_opts.initial_b,
        exp_opts.x0,
        exp_opts,
    )?;
    info!(r_squared = exponential.r_squared(), "exponential model fitted");

    let composite = fit_composite_log(series, config)?;
    info!(
        r_squared = composite.r_squared(),
        best = composite.best_variant().map(|v| v.display_name()),
        "composite model fitted"
    );

    let times = series.times();
    let prices = series.mediums();
    let in_sample = |model: &dyn Regression| {
        let predicted: Vec<f64> = times.iter().map(|&t| model.estimate(t)).collect();
        rmse(&predicted, &prices)
    };
    let exponential_rmse = in_sample(&exponential)?;
    let composite_rmse = in_sample(&composite)?;

    Ok(AnalyzedSeries {
        exponential,
        composite,
        last_price: last.medium(),
        first_date: first.date,
        last_date: last.date,
        n_points: series.len(),
        exponential_rmse,
        composite_rmse,
    })
}

impl AnalyzedSeries {
    /// Ensemble forecast `horizon_years` after `as_of`.
    pub fn forecast(&self, horizon_years: f64, dividend_per_share: f64, as_of: NaiveDate) -> Result<Forecast> {
        let request = ForecastRequest {
            horizon_years,
            dividend_per_share,
            last_price: self.last_price,
            as_of,
        };
        forecast(&self.exponential, &self.composite, &request)
    }

    /// Composite slope at the end of the fitted window, in price per year.
    pub fn slope_at_end(&self) -> f64 {
        self.composite.slope_at(crate::domain::year_index(self.last_date))
    }
}
