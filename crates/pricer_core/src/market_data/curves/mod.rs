//! Discount curve abstractions.
//!
//! This module provides:
//! - [`DiscountCurve`]: Date-based discount factor lookup
//! - [`FlatForwardCurve`]: Constant continuously compounded rate curve

mod flat;
mod traits;

pub use flat::FlatForwardCurve;
pub use traits::DiscountCurve;
