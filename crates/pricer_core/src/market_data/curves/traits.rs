//! Discount curve trait definition.

use crate::market_data::error::MarketDataError;
use crate::types::{Date, DayCountConvention};

/// Date-based discount curve.
///
/// # Contract
///
/// - `discount(date)` returns the discount factor D(date) seen from the
///   curve's reference date
/// - `forward_rate(start, end, dc)` returns the simply compounded forward
///   rate implied for the period
///
/// # Invariants
///
/// - D(reference_date) = 1
/// - D(date) > 0
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{DiscountCurve, FlatForwardCurve};
/// use pricer_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2024, 1, 2).unwrap();
/// let curve = FlatForwardCurve::new(today, 0.03, DayCountConvention::ActualActual365).unwrap();
///
/// assert_eq!(curve.discount(today).unwrap(), 1.0);
/// let one_year = today.add_days(365).unwrap();
/// assert!((curve.discount(one_year).unwrap() - (-0.03_f64).exp()).abs() < 1e-12);
/// ```
pub trait DiscountCurve: Send + Sync {
    /// Date from which discount factors are measured.
    fn reference_date(&self) -> Date;

    /// Return the discount factor for `date`.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::DateBeforeReference` - If `date` precedes the reference date
    fn discount(&self, date: Date) -> Result<f64, MarketDataError>;

    /// Return the simply compounded forward rate between `start` and `end`.
    ///
    /// # Default Implementation
    ///
    /// ```text
    /// f = (D(start) / D(end) - 1) / tau(start, end)
    /// ```
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InvalidPeriod` - If the year fraction is not positive
    fn forward_rate(
        &self,
        start: Date,
        end: Date,
        day_count: DayCountConvention,
    ) -> Result<f64, MarketDataError> {
        let tau = day_count.year_fraction(start, end);
        if tau <= 0.0 {
            return Err(MarketDataError::InvalidPeriod { start, end });
        }
        let df_start = self.discount(start)?;
        let df_end = self.discount(end)?;
        Ok((df_start / df_end - 1.0) / tau)
    }
}
