//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - rendered to JSON by the report layer
//! - constructed directly by callers that bring their own price source

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::time_index::year_index;
use crate::error::{AppError, Result};

/// One observation of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub low: f64,
    pub high: f64,
}

impl DataPoint {
    pub fn new(date: NaiveDate, low: f64, high: f64) -> Self {
        Self { date, low, high }
    }

    /// Midpoint of the day's range; the value every model is fit against.
    pub fn medium(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Fractional-year coordinate of this observation.
    pub fn t(&self) -> f64 {
        year_index(self.date)
    }
}

/// An ordered price series: strictly increasing dates, finite prices.
///
/// The only way to build one is [`TimeSeries::new`], so every fitting function
/// can rely on the ordering invariant without re-checking it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    points: Vec<DataPoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<DataPoint>) -> Result<Self> {
        for (i, p) in points.iter().enumerate() {
            if !(p.low.is_finite() && p.high.is_finite()) {
                return Err(AppError::invalid_input(format!(
                    "non-finite price on {} (low={}, high={})",
                    p.date, p.low, p.high
                )));
            }
            if i > 0 && points[i - 1].date >= p.date {
                return Err(AppError::invalid_input(format!(
                    "dates must be strictly increasing: {} follows {}",
                    p.date,
                    points[i - 1].date
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    /// Time coordinates of all points.
    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(DataPoint::t).collect()
    }

    /// Medium prices of all points.
    pub fn mediums(&self) -> Vec<f64> {
        self.points.iter().map(DataPoint::medium).collect()
    }

    /// Sub-series of all points dated on or before `date`.
    pub fn until(&self, date: NaiveDate) -> TimeSeries {
        let end = self.points.partition_point(|p| p.date <= date);
        TimeSeries {
            points: self.points[..end].to_vec(),
        }
    }
}

/// Closed set of fitted model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelVariant {
    Linear,
    LogOffset,
    Exponential,
    CompositeLog,
}

impl ModelVariant {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelVariant::Linear => "Linear",
            ModelVariant::LogOffset => "Log-offset",
            ModelVariant::Exponential => "Exponential",
            ModelVariant::CompositeLog => "Inverse-log",
        }
    }
}

/// Ordered model parameters; meaning depends on the variant.
///
/// - linear: `[m, c]`, linear with offset: `[m, c, x0]`
/// - exponential: `[a, b, x0]`
/// - log-offset: `[a, b, x0]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelParameters(pub Vec<f64>);

impl ModelParameters {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Index<usize> for ModelParameters {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// Nelder–Mead settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOptions {
    pub max_iter: usize,
    /// Convergence threshold on the simplex size, relative to the best vertex.
    pub tolerance: f64,
    /// Relative size of the initial simplex around the seed point.
    pub initial_step: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Re-seeded runs from the incumbent after convergence.
    pub restarts: usize,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iter: 600_000,
            tolerance: 1e-15,
            initial_step: 0.05,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            restarts: 2,
        }
    }
}

/// Settings for the exponential fit `y = a * b^(t - x0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialOptions {
    pub initial_a: f64,
    pub initial_b: f64,
    /// Fixed horizontal anchor; keeps `b^(t - x0)` in range.
    pub x0: f64,
    /// Factor applied to every squared residual before summation.
    pub residual_scale: f64,
    pub simplex: SimplexOptions,
}

impl Default for ExponentialOptions {
    fn default() -> Self {
        Self {
            initial_a: 1.0,
            initial_b: 1.0,
            x0: 2000.0,
            residual_scale: 1e-16,
            simplex: SimplexOptions::default(),
        }
    }
}

/// Settings for the adaptive log-offset walk.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetWalkOptions {
    /// Offset of the first trial relative to the first time coordinate (< 0).
    pub initial_delta: f64,
    /// First step applied to the offset (< 0, walks away from the data).
    pub initial_step: f64,
    /// Step multiplier after an improvement.
    pub grow: f64,
    /// Step multiplier after a failed trial.
    pub shrink: f64,
    /// The walk stops once `|step|` falls below this.
    pub exit_step: f64,
    pub max_iter: usize,
}

impl Default for OffsetWalkOptions {
    fn default() -> Self {
        Self {
            initial_delta: -0.001,
            initial_step: -0.001,
            grow: 1.1,
            shrink: 0.5,
            exit_step: 1e-308,
            max_iter: 200_000,
        }
    }
}

/// Settings for the composite (inverse-log) model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeOptions {
    /// Pre-processing shift subtracted from time coordinates before fitting.
    pub shift: f64,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self { shift: 2000.0 }
    }
}

/// All numeric knobs of a fitting run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitConfig {
    pub exponential: ExponentialOptions,
    pub walk: OffsetWalkOptions,
    pub composite: CompositeOptions,
}

impl FitConfig {
    /// Reject settings that would make the fitters loop forever or divide by zero.
    pub fn validate(&self) -> Result<()> {
        let s = &self.exponential.simplex;
        if s.max_iter == 0 {
            return Err(AppError::Config("simplex max_iter must be > 0".into()));
        }
        if !(s.tolerance.is_finite() && s.tolerance > 0.0) {
            return Err(AppError::Config(format!("invalid simplex tolerance {}", s.tolerance)));
        }
        if !(s.initial_step.is_finite() && s.initial_step > 0.0) {
            return Err(AppError::Config(format!("invalid simplex initial step {}", s.initial_step)));
        }
        if !(self.exponential.x0.is_finite() && self.exponential.residual_scale > 0.0) {
            return Err(AppError::Config("invalid exponential x0 or residual scale".into()));
        }

        let w = &self.walk;
        if !(w.initial_delta < 0.0 && w.initial_step < 0.0) {
            return Err(AppError::Config(
                "offset walk must start left of the first observation (negative delta and step)".into(),
            ));
        }
        if !(w.grow > 1.0 && w.shrink > 0.0 && w.shrink < 1.0) {
            return Err(AppError::Config(format!(
                "offset walk needs grow > 1 and 0 < shrink < 1 (grow={}, shrink={})",
                w.grow, w.shrink
            )));
        }
        if !(w.exit_step > 0.0) || w.max_iter == 0 {
            return Err(AppError::Config("offset walk needs exit_step > 0 and max_iter > 0".into()));
        }

        if !self.composite.shift.is_finite() {
            return Err(AppError::Config("composite shift must be finite".into()));
        }
        Ok(())
    }
}

/// Inputs of an N-year ensemble forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub horizon_years: f64,
    pub dividend_per_share: f64,
    pub last_price: f64,
    /// Reference date ("today") the horizon is added to.
    pub as_of: NaiveDate,
}

/// Blended forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub horizon_years: f64,
    pub target_time: f64,
    /// Blended price plus accrued dividends.
    pub absolute: f64,
    /// `(absolute / last_price - 1) * 100`.
    pub percent: f64,
    /// Normalized weights of the two blended models (sum to 1).
    pub weights: [f64; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn medium_is_midpoint() {
        let p = DataPoint::new(date(2024, 1, 2), 99.0, 101.0);
        assert_eq!(p.medium(), 100.0);
    }

    #[test]
    fn series_rejects_unsorted_and_duplicate_dates() {
        let a = DataPoint::new(date(2024, 1, 2), 1.0, 2.0);
        let b = DataPoint::new(date(2024, 1, 3), 1.0, 2.0);
        assert!(TimeSeries::new(vec![a, b]).is_ok());
        assert!(matches!(TimeSeries::new(vec![b, a]), Err(AppError::InvalidInput(_))));
        assert!(matches!(TimeSeries::new(vec![a, a]), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn series_rejects_non_finite_prices() {
        let p = DataPoint::new(date(2024, 1, 2), f64::NAN, 2.0);
        assert!(TimeSeries::new(vec![p]).is_err());
    }

    #[test]
    fn until_is_inclusive() {
        let series = TimeSeries::new(
            (1..=5)
                .map(|d| DataPoint::new(date(2024, 1, d), 1.0, 1.0))
                .collect(),
        )
        .unwrap();
        assert_eq!(series.until(date(2024, 1, 3)).len(), 3);
        assert!(series.until(date(2023, 1, 1)).is_empty());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(FitConfig::default().validate().is_ok());

        let mut config = FitConfig::default();
        config.walk.initial_step = 0.001;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
