//! Market data structures consumed by the coupon pricers.
//!
//! # Components
//!
//! - [`curves`]: Date-based discount curves (FlatForwardCurve)
//! - [`surfaces`]: Optionlet volatility structures (ConstantOptionletVolatility)
//! - [`quotes`]: Observable scalar quotes (SimpleQuote)
//! - [`error`]: Market data error types (MarketDataError)
//!
//! Volatilities and quotes are observable; curves are immutable once built.
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::curves::{DiscountCurve, FlatForwardCurve};
//! use pricer_core::market_data::surfaces::{ConstantOptionletVolatility, OptionletVolatility};
//! use pricer_core::types::{Date, DayCountConvention};
//!
//! let today = Date::from_ymd(2024, 1, 2).unwrap();
//! let curve = FlatForwardCurve::new(today, 0.05, DayCountConvention::ActualActual365).unwrap();
//! let df = curve.discount(today.add_days(365).unwrap()).unwrap();
//! assert!((df - 0.951229).abs() < 1e-5);
//!
//! let vol = ConstantOptionletVolatility::new(today, 0.20, DayCountConvention::ActualActual365).unwrap();
//! assert_eq!(vol.volatility(), 0.20);
//! ```

pub mod curves;
pub mod error;
pub mod quotes;
pub mod surfaces;

// Re-export commonly used types
pub use curves::{DiscountCurve, FlatForwardCurve};
pub use error::MarketDataError;
pub use quotes::{Quote, SimpleQuote};
pub use surfaces::{ConstantOptionletVolatility, OptionletVolatility, VolatilityType};
