//! # pricer_core: Foundation for Coupon Pricing
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - Time types: `Date`, `DayCountConvention` (`types::time`)
//! - Error types: `PricingError`, `DateError` (`types::error`)
//! - Change notification: `Observable`, `Handle`, `DirtyFlag` (`observable`)
//! - Market data contracts: discount curves, optionlet volatilities, quotes (`market_data`)
//!
//! ## Minimal Dependencies
//!
//! Layer 1 has no dependencies on other pricer_* crates:
//! - chrono: Date arithmetic
//! - thiserror: Market data errors
//! - tracing: Notification events
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::types::{Date, DayCountConvention};
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 7, 1).unwrap();
//! let year_fraction = DayCountConvention::ActualActual360.year_fraction(start, end);
//! assert!((year_fraction - 182.0 / 360.0).abs() < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for Date, DayCountConvention and market data value types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod observable;
pub mod types;
