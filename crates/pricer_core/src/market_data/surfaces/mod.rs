//! Optionlet volatility abstractions for caplet/floorlet pricing.
//!
//! This module provides:
//! - [`OptionletVolatility`]: Black variance lookup by fixing date and strike
//! - [`VolatilityType`]: Shifted-lognormal or normal quoting
//! - [`ConstantOptionletVolatility`]: Single volatility for all dates and strikes

mod constant;
mod traits;

pub use constant::ConstantOptionletVolatility;
pub use traits::{OptionletVolatility, VolatilityType};
