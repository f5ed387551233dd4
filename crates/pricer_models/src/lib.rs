//! # Pricer Models
//!
//! Analytical option formulas and Ibor coupon pricing.
//!
//! This crate provides:
//! - The Black-76 calculator with closed-form Greeks for plain vanilla,
//!   binary and gap payoffs
//! - The Bachelier formula for normal volatilities
//! - Ibor indices and floating coupons with optional caps and floors
//! - A coupon pricer with Black76 and bivariate-lognormal timing adjustments
//! - TOML configuration for the coupon pricer
//!
//! ## Design Principles
//!
//! - **Immutable kernels**: a `BlackCalculator` is fully evaluated at
//!   construction
//! - **Shared pricers**: market data lives in the pricer, per-coupon state in
//!   the valuation returned by `initialize`
//! - **Explicit evaluation date** passed to every valuation call
//!
//! ## Example
//!
//! ```rust
//! use pricer_models::analytical::{BlackCalculator, OptionType, Payoff};
//!
//! let payoff = Payoff::plain_vanilla(OptionType::Call, 100.0);
//! let calc = BlackCalculator::new(payoff, 100.0, 0.2, 1.0).unwrap();
//! assert!((calc.value() - 7.965567).abs() < 1e-6);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod cashflows;
pub mod config;
pub mod pricers;
