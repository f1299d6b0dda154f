//! `y = a * b^(t - x0)` with `x0` fixed by the caller.

use std::fmt;

use crate::domain::{ModelParameters, ModelVariant};
use crate::models::Regression;

#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialModel {
    a: f64,
    b: f64,
    x0: f64,
    r_squared: f64,
    /// Simplex iterations spent on the fit.
    iterations: usize,
    converged: bool,
}

impl ExponentialModel {
    pub(crate) fn new(a: f64, b: f64, x0: f64, r_squared: f64, iterations: usize, converged: bool) -> Self {
        Self {
            a,
            b,
            x0,
            r_squared,
            iterations,
            converged,
        }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    /// Growth factor per unit of time.
    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn x0(&self) -> f64 {
        self.x0
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// Evaluate the exponential curve; shared with the fitter's objective.
pub(crate) fn exponential(t: f64, a: f64, b: f64, x0: f64) -> f64 {
    a * b.powf(t - x0)
}

impl Regression for ExponentialModel {
    fn estimate(&self, t: f64) -> f64 {
        exponential(t, self.a, self.b, self.x0)
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }

    fn parameters(&self) -> ModelParameters {
        ModelParameters(vec![self.a, self.b, self.x0])
    }

    fn variant(&self) -> ModelVariant {
        ModelVariant::Exponential
    }
}

impl fmt::Display for ExponentialModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "y(t) = {:.6} * {:.6} ^ (t - {}) [R²={:.6}]",
            self.a, self.b, self.x0, self.r_squared
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_around_anchor() {
        let m = ExponentialModel::new(100.0, 1.2, 2020.0, 0.9, 10, true);
        assert_eq!(m.estimate(2020.0), 100.0);
        assert!((m.estimate(2021.0) - 120.0).abs() < 1e-9);
        assert!((m.estimate(2019.0) - 100.0 / 1.2).abs() < 1e-9);
        assert_eq!(m.parameters(), ModelParameters(vec![100.0, 1.2, 2020.0]));
    }
}
