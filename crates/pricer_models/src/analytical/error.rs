//! Error types for analytical pricing operations.
//!
//! This module provides:
//! - `AnalyticalError`: Validation errors of the Black calculator and the
//!   Bachelier formula

use pricer_core::types::PricingError;
use thiserror::Error;

/// Analytical pricing errors.
///
/// # Variants
/// - `InvalidStrike`: Negative strike
/// - `InvalidForward`: Non-positive forward
/// - `InvalidStdDev`: Negative standard deviation
/// - `InvalidDiscount`: Non-positive discount factor
/// - `InvalidSpot`: Non-positive spot for spot Greeks
/// - `InvalidMaturity`: Negative maturity for time Greeks
/// - `UnsupportedPayoff`: Payoff kind the calculator cannot value
///
/// # Examples
/// ```
/// use pricer_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidForward { forward: -0.01 };
/// assert!(format!("{}", err).contains("forward"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Negative strike.
    #[error("Invalid strike: K = {strike} (must be non-negative)")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },

    /// Non-positive forward.
    #[error("Invalid forward: F = {forward} (must be positive)")]
    InvalidForward {
        /// The invalid forward value
        forward: f64,
    },

    /// Negative standard deviation.
    #[error("Invalid standard deviation: σ√T = {std_dev} (must be non-negative)")]
    InvalidStdDev {
        /// The invalid standard deviation
        std_dev: f64,
    },

    /// Non-positive discount factor.
    #[error("Invalid discount: D = {discount} (must be positive)")]
    InvalidDiscount {
        /// The invalid discount factor
        discount: f64,
    },

    /// Non-positive spot price.
    #[error("Invalid spot price: S = {spot} (must be positive)")]
    InvalidSpot {
        /// The invalid spot price value
        spot: f64,
    },

    /// Negative maturity.
    #[error("Invalid maturity: T = {maturity} (must be non-negative)")]
    InvalidMaturity {
        /// The invalid maturity value
        maturity: f64,
    },

    /// Payoff kind not handled by the calculator.
    #[error("Unsupported payoff type: {name}")]
    UnsupportedPayoff {
        /// Name of the payoff kind
        name: String,
    },
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        match err {
            AnalyticalError::UnsupportedPayoff { name } => PricingError::UnsupportedPayoff(name),
            _ => PricingError::InvalidInput(err.to_string()),
        }
    }
}
