//! Model fitting.
//!
//! Responsibilities:
//!
//! - closed-form linear fits and the simplex-driven exponential fit (`fitter`)
//! - the adaptive log-offset walk (`offset_walk`)
//! - composite candidate fitting and R² ranking (`selection`)

pub mod fitter;
pub mod offset_walk;
pub mod selection;

pub use fitter::*;
pub use offset_walk::*;
pub use selection::*;
