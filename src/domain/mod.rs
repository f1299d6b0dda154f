//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - price observations and validated series (`DataPoint`, `TimeSeries`)
//! - the date -> fractional-year mapping (`time_index`)
//! - fit configuration and forecast inputs/outputs

pub mod time_index;
pub mod types;

pub use time_index::*;
pub use types::*;
