//! Fitting routines for the linear and exponential models.
//!
//! Given ordered `(t_i, y_i)` pairs we produce an immutable fitted model:
//! - linear: closed-form OLS, optionally evaluated around a caller-chosen `x0`
//! - exponential: `y = a * b^(t - x0)` with `x0` fixed, `(a, b)` found by
//!   Nelder–Mead on the scaled sum of squared residuals
//!
//! Every fit computes its R² once, against the same data it was fit on.

use std::cell::RefCell;

use nalgebra::DVector;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{ExponentialOptions, TimeSeries};
use crate::error::{AppError, Result};
use crate::math::{fit_line, minimize, r_squared};
use crate::models::{ExponentialModel, LinearModel, Regression, exponential};

/// Residuals per rayon task; shorter series stay on one thread.
const MIN_RESIDUALS_PER_TASK: usize = 1024;

/// Fit `y = m * x + c`.
pub fn fit_linear(xs: &[f64], ys: &[f64]) -> Result<LinearModel> {
    let line = fit_line(xs, ys)?;
    let predicted: Vec<f64> = xs.iter().map(|&x| line.eval(x)).collect();
    let r2 = r_squared(&predicted, ys)?;

    let model = LinearModel::new(line.slope, line.intercept, None, r2);
    debug!(model = %model, "linear fit");
    Ok(model)
}

/// Fit `y = m * x + c` on pre-shifted `xs` (`x = t - x0`).
///
/// The resulting model evaluates `m * (t - x0) + c` on absolute `t`; R² is
/// measured on the `xs` given here.
pub fn fit_linear_with_offset(xs: &[f64], ys: &[f64], x0: f64) -> Result<LinearModel> {
    if !x0.is_finite() {
        return Err(AppError::invalid_input(format!("linear offset must be finite, got {x0}")));
    }
    let line = fit_line(xs, ys)?;
    let predicted: Vec<f64> = xs.iter().map(|&x| line.eval(x)).collect();
    let r2 = r_squared(&predicted, ys)?;

    let model = LinearModel::new(line.slope, line.intercept, Some(x0), r2);
    debug!(model = %model, "linear fit with offset");
    Ok(model)
}

/// Fit `y = a * b^(t - x0)` to the medium prices of `series`.
///
/// `a0`/`b0` seed the simplex; `x0` is held fixed. Running out of iterations
/// is not an error: the best point found is kept and a warning is logged.
pub fn fit_exponential(
    series: &TimeSeries,
    a0: f64,
    b0: f64,
    x0: f64,
    opts: &ExponentialOptions,
) -> Result<ExponentialModel> {
    if series.is_empty() {
        return Err(AppError::invalid_input("exponential fit needs a non-empty series"));
    }
    fit_exponential_xy(&series.times(), &series.mediums(), a0, b0, x0, opts)
}

/// Fit `y = a * b^(t - x0)` to raw `(t, y)` pairs.
pub fn fit_exponential_xy(
    xs: &[f64],
    ys: &[f64],
    a0: f64,
    b0: f64,
    x0: f64,
    opts: &ExponentialOptions,
) -> Result<ExponentialModel> {
    if xs.is_empty() || xs.len() != ys.len() {
        return Err(AppError::invalid_input(format!(
            "exponential fit needs equal, non-empty inputs (x={}, y={})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(AppError::invalid_input("exponential fit inputs must be finite"));
    }
    if ![a0, b0, x0].iter().all(|v| v.is_finite()) {
        return Err(AppError::invalid_input(format!(
            "exponential seed must be finite (a0={a0}, b0={b0}, x0={x0})"
        )));
    }

    let scale = opts.residual_scale;
    // One buffer for the whole search; each parallel task owns one slot.
    let buffer = RefCell::new(vec![0.0; xs.len()]);
    let objective = |p: &DVector<f64>| {
        let (a, b) = (p[0], p[1]);
        let mut residuals = buffer.borrow_mut();
        residuals
            .par_iter_mut()
            .zip(xs.par_iter())
            .zip(ys.par_iter())
            .with_min_len(MIN_RESIDUALS_PER_TASK)
            .for_each(|((slot, &x), &y)| {
                let r = y - exponential(x, a, b, x0);
                *slot = scale * r * r;
            });
        // Sequential reduction keeps repeated fits bit-identical.
        residuals.iter().sum::<f64>()
    };

    let outcome = minimize(objective, &DVector::from_vec(vec![a0, b0]), &opts.simplex);
    if !outcome.converged {
        warn!(
            iterations = outcome.iterations,
            max_iter = opts.simplex.max_iter,
            "exponential fit stopped before the simplex converged; keeping best point"
        );
    }

    let (a, b) = (outcome.point[0], outcome.point[1]);
    let predicted: Vec<f64> = xs.iter().map(|&x| exponential(x, a, b, x0)).collect();
    let r2 = r_squared(&predicted, ys)?;

    let model = ExponentialModel::new(a, b, x0, r2, outcome.iterations, outcome.converged);
    debug!(
        model = %model,
        iterations = model.iterations(),
        converged = model.converged(),
        r_squared = model.r_squared(),
        "exponential fit"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataPoint, ModelParameters, SimplexOptions};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    #[test]
    fn linear_fit_is_exact_on_a_line() {
        // y = 2x + 1
        let model = fit_linear(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_abs_diff_eq!(model.slope(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(model.intercept(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(model.r_squared(), 1.0, epsilon = 1e-12);
        assert_eq!(model.parameters().len(), 2);
    }

    #[test]
    fn linear_fit_rejects_degenerate_input() {
        assert!(matches!(fit_linear(&[1.0], &[1.0]), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            fit_linear(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(fit_linear(&[1.0, 2.0], &[1.0]), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn offset_variant_evaluates_on_absolute_time() {
        let ts = [2010.0, 2011.0, 2012.0, 2013.0];
        let xs: Vec<f64> = ts.iter().map(|t| t - 2000.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 0.5 * x + 3.0).collect();

        let model = fit_linear_with_offset(&xs, &ys, 2000.0).unwrap();
        assert_eq!(model.parameters(), ModelParameters(vec![model.slope(), model.intercept(), 2000.0]));
        for (&t, &y) in ts.iter().zip(&ys) {
            assert_abs_diff_eq!(model.estimate(t), y, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(model.r_squared(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn exponential_recovers_twenty_percent_growth() {
        let xs = [2020.0, 2021.0, 2022.0, 2023.0, 2024.0];
        let ys = [100.0, 120.0, 144.0, 172.5, 207.5];
        let opts = ExponentialOptions::default();

        let model = fit_exponential_xy(&xs, &ys, 1.0, 1.0, 2000.0, &opts).unwrap();
        assert!(model.b() > 1.19 && model.b() < 1.21, "b = {}", model.b());
        assert!(model.r_squared() > 0.999);
        assert_eq!(model.x0(), 2000.0);
    }

    #[test]
    fn exponential_fit_is_repeatable() {
        let xs: Vec<f64> = (0..40).map(|i| 2015.0 + i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, &t)| 30.0 * 1.08f64.powf(t - 2015.0) * (1.0 + 0.01 * ((i % 5) as f64 - 2.0)))
            .collect();
        let opts = ExponentialOptions::default();

        let first = fit_exponential_xy(&xs, &ys, 1.0, 1.0, 2000.0, &opts).unwrap();
        let second = fit_exponential_xy(&xs, &ys, 1.0, 1.0, 2000.0, &opts).unwrap();
        assert_eq!(first.parameters(), second.parameters());
        assert_eq!(first.r_squared(), second.r_squared());
    }

    #[test]
    fn exponential_budget_exhaustion_keeps_best_point() {
        let xs = [2020.0, 2021.0, 2022.0];
        let ys = [10.0, 11.0, 12.1];
        let opts = ExponentialOptions {
            simplex: SimplexOptions {
                max_iter: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let model = fit_exponential_xy(&xs, &ys, 1.0, 1.0, 2000.0, &opts).unwrap();
        assert!(!model.converged());
        assert!(model.iterations() <= 3);
    }

    #[test]
    fn exponential_rejects_empty_series() {
        let empty = TimeSeries::new(Vec::new()).unwrap();
        let opts = ExponentialOptions::default();
        assert!(matches!(
            fit_exponential(&empty, 1.0, 1.0, 2000.0, &opts),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn exponential_fits_series_medium_prices() {
        let points = (0..5)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2020 + i, 1, 1).unwrap();
                let mid = 100.0 * 1.2f64.powi(i);
                DataPoint::new(date, mid - 1.0, mid + 1.0)
            })
            .collect();
        let series = TimeSeries::new(points).unwrap();
        let model = fit_exponential(&series, 1.0, 1.0, 2000.0, &ExponentialOptions::default()).unwrap();
        assert_abs_diff_eq!(model.b(), 1.2, epsilon = 0.01);
    }
}
