//! `y = m * (t - x0) + c`

use std::fmt;

use crate::domain::{ModelParameters, ModelVariant};
use crate::models::Regression;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    slope: f64,
    intercept: f64,
    /// Evaluation offset; `None` for a plain `y = m * t + c` fit.
    x0: Option<f64>,
    r_squared: f64,
}

impl LinearModel {
    pub(crate) fn new(slope: f64, intercept: f64, x0: Option<f64>, r_squared: f64) -> Self {
        Self {
            slope,
            intercept,
            x0,
            r_squared,
        }
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn x0(&self) -> Option<f64> {
        self.x0
    }
}

impl Regression for LinearModel {
    fn estimate(&self, t: f64) -> f64 {
        self.slope * (t - self.x0.unwrap_or(0.0)) + self.intercept
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }

    fn parameters(&self) -> ModelParameters {
        let mut p = vec![self.slope, self.intercept];
        if let Some(x0) = self.x0 {
            p.push(x0);
        }
        ModelParameters(p)
    }

    fn variant(&self) -> ModelVariant {
        ModelVariant::Linear
    }
}

impl fmt::Display for LinearModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.x0 {
            Some(x0) => write!(
                f,
                "y(t) = {:.6} * (t - {}) + {:.6} [R²={:.6}]",
                self.slope, x0, self.intercept, self.r_squared
            ),
            None => write!(
                f,
                "y(t) = {:.6} * t + {:.6} [R²={:.6}]",
                self.slope, self.intercept, self.r_squared
            ),
        }
    }
}
