//! Reporting: a serializable view of an analysis and its terminal rendering.

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::pipeline::AnalyzedSeries;
use crate::domain::{Forecast, ModelParameters, ModelVariant};
use crate::models::Regression;

pub mod format;

pub use format::*;

/// One fitted model as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub variant: ModelVariant,
    pub equation: String,
    pub r_squared: f64,
    pub weight: f64,
    pub parameters: ModelParameters,
    /// In-sample RMSE on prices; not reported for log-space candidates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
}

impl ModelSummary {
    pub fn of<M: Regression + std::fmt::Display>(model: &M) -> Self {
        Self {
            variant: model.variant(),
            equation: model.to_string(),
            r_squared: model.r_squared(),
            weight: model.weight(),
            parameters: model.parameters(),
            rmse: None,
        }
    }

    pub fn with_rmse(mut self, rmse: f64) -> Self {
        self.rmse = Some(rmse);
        self
    }
}

/// Everything `growth fit` / `growth demo` print, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Where the series came from (file path or "synthetic").
    pub source: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub n_points: usize,
    pub skipped_rows: usize,
    pub training_days: i64,
    pub last_price: f64,
    pub exponential: ModelSummary,
    pub composite: ModelSummary,
    /// Composite candidates fit on log prices, best first.
    pub candidates: Vec<ModelSummary>,
    pub selected: Option<ModelVariant>,
    /// Composite slope at the last observation, in price per year.
    pub slope_at_end: f64,
    pub forecasts: Vec<Forecast>,
}

impl AnalysisReport {
    pub fn new(
        source: impl Into<String>,
        analyzed: &AnalyzedSeries,
        skipped_rows: usize,
        forecasts: Vec<Forecast>,
    ) -> Self {
        let composite = &analyzed.composite;
        Self {
            source: source.into(),
            first_date: analyzed.first_date,
            last_date: analyzed.last_date,
            n_points: analyzed.n_points,
            skipped_rows,
            training_days: composite.training_period_days(),
            last_price: analyzed.last_price,
            exponential: ModelSummary::of(&analyzed.exponential).with_rmse(analyzed.exponential_rmse),
            composite: ModelSummary::of(composite).with_rmse(analyzed.composite_rmse),
            candidates: composite.candidates().iter().map(ModelSummary::of).collect(),
            selected: composite.best_variant(),
            slope_at_end: analyzed.slope_at_end(),
            forecasts,
        }
    }
}
