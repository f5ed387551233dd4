//! Constant optionlet volatility.

use std::sync::RwLock;

use super::{OptionletVolatility, VolatilityType};
use crate::market_data::error::MarketDataError;
use crate::observable::{Observable, Observe};
use crate::types::{Date, DayCountConvention};

/// Optionlet volatility with one volatility for all fixing dates and strikes.
///
/// The volatility can be bumped in place with
/// [`set_volatility`](Self::set_volatility), which notifies observers.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::{ConstantOptionletVolatility, OptionletVolatility};
/// use pricer_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2024, 1, 2).unwrap();
/// let vol = ConstantOptionletVolatility::new(today, 0.20, DayCountConvention::ActualActual365).unwrap();
///
/// let one_year = today.add_days(365).unwrap();
/// let variance = vol.black_variance(one_year, 0.03).unwrap();
/// assert!((variance - 0.04).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct ConstantOptionletVolatility {
    reference_date: Date,
    volatility: RwLock<f64>,
    day_count: DayCountConvention,
    volatility_type: VolatilityType,
    displacement: f64,
    notifier: Observable,
}

fn check_volatility(sigma: f64) -> Result<f64, MarketDataError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(MarketDataError::InvalidVolatility { sigma });
    }
    Ok(sigma)
}

impl ConstantOptionletVolatility {
    /// Construct a shifted-lognormal volatility with zero displacement.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InvalidVolatility` - If `volatility` is negative or not finite
    pub fn new(
        reference_date: Date,
        volatility: f64,
        day_count: DayCountConvention,
    ) -> Result<Self, MarketDataError> {
        Ok(Self {
            reference_date,
            volatility: RwLock::new(check_volatility(volatility)?),
            day_count,
            volatility_type: VolatilityType::ShiftedLognormal,
            displacement: 0.0,
            notifier: Observable::new(),
        })
    }

    /// Sets the quoting convention (builder pattern).
    pub fn with_volatility_type(mut self, volatility_type: VolatilityType) -> Self {
        self.volatility_type = volatility_type;
        self
    }

    /// Sets the displacement (builder pattern).
    pub fn with_displacement(mut self, displacement: f64) -> Self {
        self.displacement = displacement;
        self
    }

    /// Current volatility.
    pub fn volatility(&self) -> f64 {
        match self.volatility.read() {
            Ok(sigma) => *sigma,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replaces the volatility and notifies observers.
    pub fn set_volatility(&self, volatility: f64) -> Result<(), MarketDataError> {
        let sigma = check_volatility(volatility)?;
        {
            let mut slot = match self.volatility.write() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            *slot = sigma;
        }
        tracing::debug!(volatility = sigma, "optionlet volatility updated");
        self.notifier.notify_observers();
        Ok(())
    }
}

impl Observe for ConstantOptionletVolatility {
    fn observable(&self) -> &Observable {
        &self.notifier
    }
}

impl OptionletVolatility for ConstantOptionletVolatility {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn black_variance(&self, date: Date, _strike: f64) -> Result<f64, MarketDataError> {
        if date < self.reference_date {
            return Err(MarketDataError::DateBeforeReference {
                date,
                reference: self.reference_date,
            });
        }
        let sigma = self.volatility();
        let t = self.day_count.year_fraction(self.reference_date, date);
        Ok(sigma * sigma * t)
    }

    fn volatility_type(&self) -> VolatilityType {
        self.volatility_type
    }

    fn displacement(&self) -> f64 {
        self.displacement
    }
}
