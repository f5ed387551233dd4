//! Core time and error types.
//!
//! This module provides:
//! - `time`: Time types (Date, DayCountConvention) for coupon calculations
//! - `error`: Structured error types for pricing and date operations
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level:
//! - [`Date`], [`DayCountConvention`] from `time`
//! - [`PricingError`], [`DateError`] from `error`

pub mod error;
pub mod time;

// Re-export commonly used types at module level
pub use error::{DateError, PricingError};
pub use time::{Date, DayCountConvention};
