//! Fitted growth-curve models.
//!
//! Each model is a small immutable value produced by a fitter in
//! `crate::fit`; all of them answer point estimates in absolute time.

pub mod composite;
pub mod exponential;
pub mod linear;
pub mod log_offset;
pub mod model;

pub use composite::*;
pub use exponential::*;
pub use linear::*;
pub use log_offset::*;
pub use model::*;
