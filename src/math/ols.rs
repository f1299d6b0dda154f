//! Closed-form ordinary least squares for a single regressor.
//!
//! Every linear sub-problem in this crate has the shape `y = m * x + c`:
//! the linear model fits it on time directly, and the log-offset walk fits it
//! on `ln(t - X0)` once per trial offset. The walk runs this up to hundreds of
//! thousands of times, so the solve is a single pass over centered sums with
//! no allocation.
//!
//! Sums are centered on the means so large coordinates (years ~2000) do not
//! cancel catastrophically.

use crate::error::{AppError, Result};

/// Slope and intercept of a least-squares line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y = slope * x + intercept`.
///
/// Fails with `InvalidInput` for mismatched lengths, fewer than two points,
/// non-finite values, or zero variance in `xs`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LineFit> {
    fit_line_by(xs, ys, |x| x)
}

/// Fit `y = slope * ln(x) + intercept`.
///
/// Every `x` must be strictly positive.
pub fn fit_log_line(xs: &[f64], ys: &[f64]) -> Result<LineFit> {
    if let Some(x) = xs.iter().find(|x| !(**x > 0.0)) {
        return Err(AppError::degenerate(format!("ln undefined for x={x}")));
    }
    fit_line_by(xs, ys, f64::ln)
}

fn fit_line_by(xs: &[f64], ys: &[f64], transform: impl Fn(f64) -> f64) -> Result<LineFit> {
    if xs.len() != ys.len() {
        return Err(AppError::invalid_input(format!(
            "line fit needs equal lengths (x={}, y={})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(AppError::invalid_input(format!(
            "line fit needs at least 2 points, got {}",
            xs.len()
        )));
    }

    let n = xs.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        sum_x += transform(x);
        sum_y += y;
    }
    let mean_x = sum_x / n;
    let mean_y = sum_y / n;
    if !(mean_x.is_finite() && mean_y.is_finite()) {
        return Err(AppError::invalid_input("line fit inputs must be finite"));
    }

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = transform(x) - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx == 0.0 || !sxx.is_finite() {
        return Err(AppError::invalid_input("x has zero variance; slope is undefined"));
    }

    let slope = sxy / sxx;
    Ok(LineFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
