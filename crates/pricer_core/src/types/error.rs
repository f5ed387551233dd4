//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors surfaced by pricing operations
//! - `DateError`: Errors from date construction and parsing

use std::fmt;

/// Categorised pricing errors.
///
/// Every failure of a pricing call is reported through one of these
/// variants. Nothing is recovered locally: the caller decides whether to
/// substitute a fallback or abort the valuation.
///
/// # Variants
/// - `InvalidInput`: Invalid market data or parameters (negative strike,
///   non-positive forward, zero accrual period, ...)
/// - `MissingVolatility`: A required optionlet volatility is absent
/// - `MissingCorrelation`: Bivariate timing adjustment requested without a
///   correlation source
/// - `UnsupportedPayoff`: Payoff kind not supported by the valuation kernel
/// - `MissingMarketData`: A curve, fixing or quote needed for the valuation
///   is not available
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("null accrual period".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: null accrual period");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Invalid input data or parameters
    InvalidInput(String),

    /// Optionlet volatility required but not linked
    MissingVolatility,

    /// Correlation required by the bivariate timing adjustment but not linked
    MissingCorrelation,

    /// Payoff kind not supported, carrying the payoff name
    UnsupportedPayoff(String),

    /// Market data required by the valuation is not available
    MissingMarketData(String),
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PricingError::MissingVolatility => write!(f, "Missing optionlet volatility"),
            PricingError::MissingCorrelation => write!(f, "No correlation given"),
            PricingError::UnsupportedPayoff(name) => {
                write!(f, "Unsupported payoff type: {}", name)
            }
            PricingError::MissingMarketData(msg) => write!(f, "Missing market data: {}", msg),
        }
    }
}

impl std::error::Error for PricingError {}

/// Date-related errors.
///
/// # Variants
/// - `InvalidDate`: Invalid date components (e.g., February 30th)
/// - `ParseError`: Failed to parse date string
/// - `OutOfRange`: Date arithmetic left the representable range
///
/// # Examples
/// ```
/// use pricer_core::types::DateError;
///
/// let err = DateError::InvalidDate { year: 2024, month: 2, day: 30 };
/// assert_eq!(format!("{}", err), "Invalid date: 2024-2-30");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Invalid date components (e.g., February 30th).
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component (1-12)
        month: u32,
        /// Day component (1-31)
        day: u32,
    },

    /// Failed to parse date string.
    ParseError(String),

    /// Date arithmetic overflowed the supported calendar range.
    OutOfRange(String),
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::InvalidDate { year, month, day } => {
                write!(f, "Invalid date: {}-{}-{}", year, month, day)
            }
            DateError::ParseError(msg) => write!(f, "Date parse error: {}", msg),
            DateError::OutOfRange(msg) => write!(f, "Date out of range: {}", msg),
        }
    }
}

impl std::error::Error for DateError {}

impl From<DateError> for PricingError {
    fn from(err: DateError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}
