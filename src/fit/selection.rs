//! Composite (inverse-log) model: fit three candidates to `ln(price)` and
//! keep the best.
//!
//! Candidates, in this order:
//! 1. linear with offset (`xs = t - shift`, evaluated around `shift`)
//! 2. exponential on the log values (`x0 = shift`)
//! 3. log-offset, walked in the shifted frame
//!
//! Selection rules:
//! - rank by R² on the log target, highest first
//! - the sort is stable, so ties keep the earlier (simpler) candidate
//! - a candidate whose fit fails is skipped and logged; if every candidate
//!   fails the first error is returned
//!
//! The composite's own R² is then measured once on the raw prices.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::domain::{FitConfig, TimeSeries};
use crate::error::{AppError, Result};
use crate::fit::fitter::{fit_exponential_xy, fit_linear_with_offset};
use crate::fit::offset_walk::fit_log_offset_shifted;
use crate::math::r_squared;
use crate::models::{CompositeLogModel, FittedModel, Regression};

/// Fit the composite model to the medium prices of `series`.
pub fn fit_composite_log(series: &TimeSeries, config: &FitConfig) -> Result<CompositeLogModel> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(AppError::invalid_input("composite fit needs a non-empty series"));
    };

    let times = series.times();
    let prices = series.mediums();
    if let Some((i, p)) = prices.iter().enumerate().find(|(_, p)| !(**p > 0.0)) {
        return Err(AppError::degenerate(format!(
            "ln undefined for medium price {p} on {}",
            series.points()[i].date
        )));
    }
    let log_prices: Vec<f64> = prices.iter().map(|p| p.ln()).collect();

    let shift = config.composite.shift;
    let shifted: Vec<f64> = times.iter().map(|t| t - shift).collect();
    let exp_opts = &config.exponential;

    let attempts: [(&str, Result<FittedModel>); 3] = [
        ("linear", fit_linear_with_offset(&shifted, &log_prices, shift).map(FittedModel::from)),
        (
            "exponential",
            fit_exponential_xy(
                &times,
                &log_prices,
                exp_opts.initial_a,
                exp_opts.initial_b,
                shift,
                exp_opts,
            )
            .map(FittedModel::from),
        ),
        (
            "log-offset",
            fit_log_offset_shifted(&times, &log_prices, shift, &config.walk).map(FittedModel::from),
        ),
    ];

    let mut candidates = Vec::with_capacity(attempts.len());
    let mut first_error = None;
    for (name, attempt) in attempts {
        match attempt {
            Ok(model) => candidates.push(model),
            Err(err) => {
                warn!(candidate = name, error = %err, "composite candidate skipped");
                first_error.get_or_insert(err);
            }
        }
    }
    if candidates.is_empty() {
        return Err(first_error
            .unwrap_or_else(|| AppError::degenerate("no composite candidate could be fit")));
    }

    rank_candidates(&mut candidates);

    let best = &candidates[0];
    let predicted: Vec<f64> = times.iter().map(|&t| best.estimate(t).exp()).collect();
    let r2 = r_squared(&predicted, &prices)?;
    debug!(
        best = best.variant().display_name(),
        log_r_squared = best.r_squared(),
        r_squared = r2,
        "composite candidate selected"
    );

    Ok(CompositeLogModel::new(candidates, r2, shift, first.date, last.date))
}

/// Sort by R², highest first. NaN ranks last; equal R² keeps input order.
pub fn rank_candidates(candidates: &mut [FittedModel]) {
    candidates.sort_by(|a, b| compare_r_squared(b.r_squared(), a.r_squared()));
}

fn compare_r_squared(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
