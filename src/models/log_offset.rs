//! `y = a * ln(t - X0) + b` with a searched offset `X0`.
//!
//! The model is fit in a frame shifted by `shift` (`u = t - shift`) to keep
//! the offset walk's steps meaningful next to year-sized coordinates. Queries
//! always take absolute `t`; the shift is applied here, never by callers.
//!
//! `constant_t` is the first fitted coordinate (in the shifted frame). Queries
//! before it are evaluated at `constant_t`, which extrapolates flat to the left
//! of the data instead of approaching the `ln` singularity.

use std::fmt;

use crate::domain::{ModelParameters, ModelVariant};
use crate::models::Regression;

#[derive(Debug, Clone, PartialEq)]
pub struct LogOffsetModel {
    a: f64,
    b: f64,
    /// Offset in the shifted frame.
    x0: f64,
    /// First fitted coordinate in the shifted frame.
    constant_t: f64,
    shift: f64,
    r_squared: f64,
    /// Walk iterations spent on the fit.
    iterations: usize,
}

impl LogOffsetModel {
    pub(crate) fn new(
        a: f64,
        b: f64,
        x0: f64,
        constant_t: f64,
        shift: f64,
        r_squared: f64,
        iterations: usize,
    ) -> Self {
        Self {
            a,
            b,
            x0,
            constant_t,
            shift,
            r_squared,
            iterations,
        }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// Discovered offset in absolute time.
    pub fn x0(&self) -> f64 {
        self.x0 + self.shift
    }

    /// First fitted time coordinate (absolute); the left clamp for estimates.
    pub fn constant_t(&self) -> f64 {
        self.constant_t + self.shift
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl Regression for LogOffsetModel {
    fn estimate(&self, t: f64) -> f64 {
        let u = t - self.shift;
        let u = if u < self.constant_t { self.constant_t } else { u };
        self.a * (u - self.x0).ln() + self.b
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }

    fn parameters(&self) -> ModelParameters {
        ModelParameters(vec![self.a, self.b, self.x0()])
    }

    fn variant(&self) -> ModelVariant {
        ModelVariant::LogOffset
    }
}

impl fmt::Display for LogOffsetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "y(t) = {:.6} * ln(t - {:.6}) + {:.6} [R²={:.6}]",
            self.a,
            self.x0(),
            self.b,
            self.r_squared
        )
    }
}
