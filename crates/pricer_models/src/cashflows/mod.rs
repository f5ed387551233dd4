//! Floating-rate cashflows.
//!
//! This module provides:
//! - [`IborIndex`]: Term-rate index with stored fixings and curve forecasts
//! - [`CouponData`]: What a coupon pricer reads from a coupon
//! - [`IborCoupon`]: Floating coupon, optionally capped/floored, with a
//!   lazily cached rate
//! - [`CouponError`]: Coupon construction errors

mod coupon;
mod error;
mod ibor_index;

pub use coupon::{CouponData, IborCoupon, IborCouponBuilder};
pub use error::CouponError;
pub use ibor_index::IborIndex;
