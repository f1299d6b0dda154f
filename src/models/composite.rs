//! Composite "inverse-log" model.
//!
//! Three candidates are fit to `ln(medium price)`; the best by R² is used and
//! its estimates are mapped back with `exp`. The composite's own R² is measured
//! against the untransformed prices, so it is comparable with models fit
//! directly on prices.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::{ModelParameters, ModelVariant, days_between};
use crate::models::{FittedModel, Regression};

/// Step used for the central-difference slope.
const SLOPE_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLogModel {
    /// Candidates in descending R² order; the first one is used.
    candidates: Vec<FittedModel>,
    r_squared: f64,
    shift: f64,
    first_date: NaiveDate,
    last_date: NaiveDate,
}

impl CompositeLogModel {
    /// `candidates` must be non-empty and already ranked.
    pub(crate) fn new(
        candidates: Vec<FittedModel>,
        r_squared: f64,
        shift: f64,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Self {
        debug_assert!(!candidates.is_empty());
        Self {
            candidates,
            r_squared,
            shift,
            first_date,
            last_date,
        }
    }

    /// Winning candidate (fit in log space).
    pub fn best(&self) -> Option<&FittedModel> {
        self.candidates.first()
    }

    pub fn best_variant(&self) -> Option<ModelVariant> {
        self.best().map(Regression::variant)
    }

    /// All candidates, best first.
    pub fn candidates(&self) -> &[FittedModel] {
        &self.candidates
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }

    pub fn first_date(&self) -> NaiveDate {
        self.first_date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    /// Calendar days spanned by the fitted window.
    pub fn training_period_days(&self) -> i64 {
        days_between(self.first_date, self.last_date)
    }

    /// Price change per year at `t` (central difference).
    pub fn slope_at(&self, t: f64) -> f64 {
        (self.estimate(t + SLOPE_EPSILON) - self.estimate(t - SLOPE_EPSILON)) / (2.0 * SLOPE_EPSILON)
    }
}

impl Regression for CompositeLogModel {
    fn estimate(&self, t: f64) -> f64 {
        self.best().map_or(f64::NAN, |m| m.estimate(t).exp())
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }

    fn parameters(&self) -> ModelParameters {
        self.best()
            .map_or_else(|| ModelParameters(Vec::new()), Regression::parameters)
    }

    fn variant(&self) -> ModelVariant {
        ModelVariant::CompositeLog
    }
}

impl fmt::Display for CompositeLogModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best() {
            Some(best) => write!(f, "exp({best}) [R²={:.6}]", self.r_squared),
            None => write!(f, "exp(<none>) [R²={:.6}]", self.r_squared),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearModel;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn model() -> CompositeLogModel {
        // ln(y) = 0.1 * (t - 2000) + ln(50)
        let best = LinearModel::new(0.1, 50f64.ln(), Some(2000.0), 0.99);
        let worse = LinearModel::new(0.0, 4.0, Some(2000.0), 0.5);
        CompositeLogModel::new(
            vec![best.into(), worse.into()],
            0.98,
            2000.0,
            date(2010, 1, 1),
            date(2020, 1, 1),
        )
    }

    #[test]
    fn maps_best_candidate_back_with_exp() {
        let m = model();
        assert_abs_diff_eq!(m.estimate(2000.0), 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.estimate(2010.0), 50.0 * 1f64.exp(), epsilon = 1e-9);
        assert_eq!(m.best_variant(), Some(ModelVariant::Linear));
        assert_eq!(m.variant(), ModelVariant::CompositeLog);
        assert_eq!(m.parameters(), ModelParameters(vec![0.1, 50f64.ln(), 2000.0]));
        assert_eq!(m.r_squared(), 0.98);
    }

    #[test]
    fn slope_matches_derivative() {
        let m = model();
        // d/dt exp(0.1 (t - 2000) + ln 50) = 0.1 * y(t)
        let t = 2015.0;
        assert_abs_diff_eq!(m.slope_at(t), 0.1 * m.estimate(t), epsilon = 1e-4);
    }

    #[test]
    fn training_period_counts_calendar_days() {
        assert_eq!(model().training_period_days(), 3652);
    }
}
