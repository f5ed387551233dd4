//! Analytical option formulas.
//!
//! This module provides closed-form valuation used by the coupon pricers:
//! - Black-76 calculator with the full set of closed-form Greeks
//! - Payoff kinds (plain vanilla, binaries, gap) and their specialisation
//! - Bachelier formula for normal volatilities
//!
//! ## Design Principles
//!
//! - **Build once, read many**: a calculator caches its coefficients at
//!   construction and is never mutated
//! - **Closed tagged union** for payoff kinds, specialised in one match
//! - **Numerical Stability**: erfc-based CDF, explicit degenerate regimes

pub mod bachelier;
pub mod black_calculator;
pub mod distributions;
pub mod error;
pub mod payoff;

// Re-export main types at module level
pub use bachelier::bachelier_black_formula;
pub use black_calculator::{BlackCalculator, GreekCoefficients};
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
pub use payoff::{OptionType, Payoff, PayoffKind};
