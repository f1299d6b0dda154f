//! Two-model ensemble forecast.
//!
//! Each model is weighted by `(1 / (1 - R²))²`, the weights are normalized,
//! and the weighted estimate at `year_index(as_of) + N` gets a linear
//! dividend accrual of `N * dividend_per_share` added.
//!
//! A perfect fit would divide by zero; the unexplained-variance term is
//! floored at [`MIN_UNEXPLAINED_VARIANCE`] so the weight stays finite.

use tracing::debug;

use crate::domain::{Forecast, ForecastRequest, year_index};
use crate::error::{AppError, Result};
use crate::models::Regression;

/// Floor for `1 - R²` in the weight formula.
pub const MIN_UNEXPLAINED_VARIANCE: f64 = 1e-12;

/// Ensemble weight for a model with the given R².
///
/// `NaN` propagates; callers treat a `NaN` weight as degenerate.
pub fn ensemble_weight(r_squared: f64) -> f64 {
    // f64::max ignores NaN, so carry it through explicitly.
    if r_squared.is_nan() {
        return f64::NAN;
    }
    let unexplained = (1.0 - r_squared).max(MIN_UNEXPLAINED_VARIANCE);
    let w = 1.0 / unexplained;
    w * w
}

/// Normalized weights of two models.
pub fn normalized_weights(first: &dyn Regression, second: &dyn Regression) -> Result<[f64; 2]> {
    let (w1, w2) = (first.weight(), second.weight());
    for (w, model) in [(w1, first), (w2, second)] {
        if !(w.is_finite() && w > 0.0) {
            return Err(AppError::degenerate(format!(
                "{} model has unusable ensemble weight {w} (R²={})",
                model.variant().display_name(),
                model.r_squared()
            )));
        }
    }
    let total = w1 + w2;
    Ok([w1 / total, w2 / total])
}

/// Weighted blend of two models at `t`, kept inside the range of the two
/// estimates.
pub fn ensemble_estimate(first: &dyn Regression, second: &dyn Regression, t: f64) -> Result<f64> {
    let [w1, w2] = normalized_weights(first, second)?;
    blend(first.estimate(t), second.estimate(t), w1, w2)
}

fn blend(e1: f64, e2: f64, w1: f64, w2: f64) -> Result<f64> {
    if !(e1.is_finite() && e2.is_finite()) {
        return Err(AppError::degenerate(format!(
            "ensemble needs finite estimates, got {e1} and {e2}"
        )));
    }
    let lo = e1.min(e2);
    let hi = e1.max(e2);
    Ok((w1 * e1 + w2 * e2).clamp(lo, hi))
}

/// Blend two fitted models into an N-year forecast.
pub fn forecast(
    exponential: &dyn Regression,
    composite: &dyn Regression,
    request: &ForecastRequest,
) -> Result<Forecast> {
    let ForecastRequest {
        horizon_years,
        dividend_per_share,
        last_price,
        as_of,
    } = *request;

    if !(last_price.is_finite() && last_price > 0.0) {
        return Err(AppError::invalid_input(format!(
            "last price must be positive and finite, got {last_price}"
        )));
    }
    if !(horizon_years.is_finite() && horizon_years >= 0.0) {
        return Err(AppError::invalid_input(format!(
            "forecast horizon must be a non-negative number of years, got {horizon_years}"
        )));
    }
    if !dividend_per_share.is_finite() {
        return Err(AppError::invalid_input(format!(
            "dividend per share must be finite, got {dividend_per_share}"
        )));
    }

    let target_time = year_index(as_of) + horizon_years;
    let weights = normalized_weights(exponential, composite)?;
    let blended = blend(
        exponential.estimate(target_time),
        composite.estimate(target_time),
        weights[0],
        weights[1],
    )?;

    let absolute = blended + horizon_years * dividend_per_share;
    let percent = (absolute / last_price - 1.0) * 100.0;
    debug!(
        horizon_years,
        target_time,
        absolute,
        percent,
        w_exponential = weights[0],
        w_composite = weights[1],
        "ensemble forecast"
    );

    Ok(Forecast {
        horizon_years,
        target_time,
        absolute,
        percent,
        weights,
    })
}
