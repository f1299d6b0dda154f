//! The fitted-model capability contract and the closed set of model variants.
//!
//! The fitters in `crate::fit` produce concrete model structs; anything that
//! needs to treat models uniformly (candidate ranking, the ensemble, reports)
//! goes through [`Regression`] or the [`FittedModel`] tagged union.
//!
//! All estimates take ABSOLUTE time coordinates (see `domain::time_index`).
//! Models that fit in a shifted frame convert internally.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::{ModelParameters, ModelVariant, year_index};
use crate::forecast::ensemble_weight;
use crate::models::{CompositeLogModel, ExponentialModel, LinearModel, LogOffsetModel};

/// Capabilities shared by every fitted model.
pub trait Regression {
    /// Point estimate at time coordinate `t`.
    fn estimate(&self, t: f64) -> f64;

    /// Point estimate at a calendar date.
    fn estimate_at(&self, date: NaiveDate) -> f64 {
        self.estimate(year_index(date))
    }

    /// R² computed once against the data used to fit.
    fn r_squared(&self) -> f64;

    /// Ensemble weight derived from R².
    fn weight(&self) -> f64 {
        ensemble_weight(self.r_squared())
    }

    fn parameters(&self) -> ModelParameters;

    fn variant(&self) -> ModelVariant;
}

/// Any fitted model.
#[derive(Debug, Clone, PartialEq)]
pub enum FittedModel {
    Linear(LinearModel),
    LogOffset(LogOffsetModel),
    Exponential(ExponentialModel),
    CompositeLog(CompositeLogModel),
}

impl FittedModel {
    fn inner(&self) -> &dyn Regression {
        match self {
            FittedModel::Linear(m) => m,
            FittedModel::LogOffset(m) => m,
            FittedModel::Exponential(m) => m,
            FittedModel::CompositeLog(m) => m,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeLogModel> {
        match self {
            FittedModel::CompositeLog(m) => Some(m),
            _ => None,
        }
    }
}

impl Regression for FittedModel {
    fn estimate(&self, t: f64) -> f64 {
        self.inner().estimate(t)
    }

    fn r_squared(&self) -> f64 {
        self.inner().r_squared()
    }

    fn parameters(&self) -> ModelParameters {
        self.inner().parameters()
    }

    fn variant(&self) -> ModelVariant {
        self.inner().variant()
    }
}

impl fmt::Display for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FittedModel::Linear(m) => fmt::Display::fmt(m, f),
            FittedModel::LogOffset(m) => fmt::Display::fmt(m, f),
            FittedModel::Exponential(m) => fmt::Display::fmt(m, f),
            FittedModel::CompositeLog(m) => fmt::Display::fmt(m, f),
        }
    }
}

impl From<LinearModel> for FittedModel {
    fn from(m: LinearModel) -> Self {
        FittedModel::Linear(m)
    }
}

impl From<LogOffsetModel> for FittedModel {
    fn from(m: LogOffsetModel) -> Self {
        FittedModel::LogOffset(m)
    }
}

impl From<ExponentialModel> for FittedModel {
    fn from(m: ExponentialModel) -> Self {
        FittedModel::Exponential(m)
    }
}

impl From<CompositeLogModel> for FittedModel {
    fn from(m: CompositeLogModel) -> Self {
        FittedModel::CompositeLog(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_union_delegates() {
        let linear = LinearModel::new(2.0, 1.0, Some(2000.0), 0.75);
        let model = FittedModel::from(linear.clone());

        assert_eq!(model.variant(), ModelVariant::Linear);
        assert_eq!(model.estimate(2001.0), linear.estimate(2001.0));
        assert_eq!(model.r_squared(), 0.75);
        assert_eq!(model.parameters(), ModelParameters(vec![2.0, 1.0, 2000.0]));
        assert_eq!(model.weight(), 16.0);
        assert!(model.as_composite().is_none());
        assert_eq!(model.to_string(), linear.to_string());
    }

    #[test]
    fn estimate_at_uses_year_index() {
        let model = FittedModel::from(LinearModel::new(1.0, 0.0, None, 1.0));
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(model.estimate_at(date), year_index(date));
    }
}
