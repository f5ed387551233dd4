//! Market data error types.
//!
//! This module provides structured error handling for curve, volatility and
//! quote lookups.

use crate::types::{Date, PricingError};
use thiserror::Error;

/// Market data operation errors.
///
/// # Variants
///
/// - `DateBeforeReference`: Query date earlier than the structure's reference date
/// - `InvalidVolatility`: Negative or non-finite volatility
/// - `InvalidRate`: Non-finite rate
/// - `InvalidPeriod`: Empty or reversed accrual period
/// - `MissingQuote`: Quote queried while holding no value
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InvalidVolatility { sigma: -0.1 };
/// assert!(format!("{}", err).contains("-0.1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Query date is before the reference date.
    #[error("Date {date} is before reference date {reference}")]
    DateBeforeReference {
        /// The queried date
        date: Date,
        /// The structure's reference date
        reference: Date,
    },

    /// Invalid volatility.
    #[error("Invalid volatility: sigma = {sigma}")]
    InvalidVolatility {
        /// The invalid volatility value
        sigma: f64,
    },

    /// Invalid (non-finite) rate.
    #[error("Invalid rate: r = {rate}")]
    InvalidRate {
        /// The invalid rate value
        rate: f64,
    },

    /// Period with non-positive length.
    #[error("Invalid period: {start} to {end}")]
    InvalidPeriod {
        /// Period start
        start: Date,
        /// Period end
        end: Date,
    },

    /// Quote has no value.
    #[error("Missing quote value")]
    MissingQuote,
}

impl From<MarketDataError> for PricingError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::MissingQuote => PricingError::MissingMarketData(err.to_string()),
            _ => PricingError::InvalidInput(err.to_string()),
        }
    }
}
