//! Ensemble forecasting over fitted models.

pub mod ensemble;

pub use ensemble::*;
