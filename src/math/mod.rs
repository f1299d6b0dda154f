//! Numeric building blocks: goodness of fit, closed-form least squares and a
//! derivative-free minimizer.

pub mod goodness;
pub mod ols;
pub mod simplex;

pub use goodness::*;
pub use ols::*;
pub use simplex::*;
