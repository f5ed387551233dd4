//! Optionlet volatility trait definition.

use std::fmt;

use crate::market_data::error::MarketDataError;
use crate::observable::Observe;
use crate::types::Date;

/// Quoting convention of an optionlet volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VolatilityType {
    /// Black volatility on the displaced rate (forward + displacement).
    #[default]
    ShiftedLognormal,
    /// Bachelier (absolute) volatility.
    Normal,
}

impl fmt::Display for VolatilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityType::ShiftedLognormal => write!(f, "ShiftedLognormal"),
            VolatilityType::Normal => write!(f, "Normal"),
        }
    }
}

/// Volatility structure for options on a single forward rate.
///
/// The structure is observable: implementations notify their
/// [`Observable`](crate::observable::Observable) whenever their quotes
/// change so that cached coupon rates are invalidated.
///
/// # Contract
///
/// - `black_variance(date, strike)` returns σ²·τ from the reference date to
///   `date`, in the units of [`volatility_type`](Self::volatility_type)
/// - `displacement()` is the shift applied to forward and strike for the
///   shifted-lognormal convention
pub trait OptionletVolatility: Observe + Send + Sync {
    /// Date from which option time is measured.
    fn reference_date(&self) -> Date;

    /// Total Black variance to the fixing `date` at `strike`.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::DateBeforeReference` - If `date` precedes the reference date
    fn black_variance(&self, date: Date, strike: f64) -> Result<f64, MarketDataError>;

    /// Quoting convention.
    fn volatility_type(&self) -> VolatilityType;

    /// Shift for shifted-lognormal volatilities.
    fn displacement(&self) -> f64 {
        0.0
    }
}
