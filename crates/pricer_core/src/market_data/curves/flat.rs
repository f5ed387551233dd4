//! Flat forward discount curve.

use super::DiscountCurve;
use crate::market_data::error::MarketDataError;
use crate::types::{Date, DayCountConvention};

/// Discount curve with a constant continuously compounded rate.
///
/// ```text
/// D(date) = exp(-r * tau(reference_date, date))
/// ```
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{DiscountCurve, FlatForwardCurve};
/// use pricer_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2024, 1, 2).unwrap();
/// let curve = FlatForwardCurve::new(today, 0.05, DayCountConvention::ActualActual360).unwrap();
/// assert_eq!(curve.rate(), 0.05);
/// assert_eq!(curve.reference_date(), today);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatForwardCurve {
    reference_date: Date,
    rate: f64,
    day_count: DayCountConvention,
}

impl FlatForwardCurve {
    /// Construct a flat curve.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InvalidRate` - If `rate` is not finite
    pub fn new(
        reference_date: Date,
        rate: f64,
        day_count: DayCountConvention,
    ) -> Result<Self, MarketDataError> {
        if !rate.is_finite() {
            return Err(MarketDataError::InvalidRate { rate });
        }
        Ok(Self {
            reference_date,
            rate,
            day_count,
        })
    }

    /// Return the constant rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Return the day count used to measure time.
    #[inline]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }
}

impl DiscountCurve for FlatForwardCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn discount(&self, date: Date) -> Result<f64, MarketDataError> {
        if date < self.reference_date {
            return Err(MarketDataError::DateBeforeReference {
                date,
                reference: self.reference_date,
            });
        }
        let t = self.day_count.year_fraction(self.reference_date, date);
        Ok((-self.rate * t).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn today() -> Date {
        Date::from_ymd(2024, 1, 2).unwrap()
    }

    #[test]
    fn test_discount_at_reference_is_one() {
        let curve = FlatForwardCurve::new(today(), 0.04, DayCountConvention::ActualActual365).unwrap();
        assert_eq!(curve.discount(today()).unwrap(), 1.0);
    }

    #[test]
    fn test_discount_one_year() {
        let curve = FlatForwardCurve::new(today(), 0.04, DayCountConvention::ActualActual365).unwrap();
        let df = curve.discount(today().add_days(365).unwrap()).unwrap();
        assert_relative_eq!(df, (-0.04_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_discount_before_reference_fails() {
        let curve = FlatForwardCurve::new(today(), 0.04, DayCountConvention::ActualActual365).unwrap();
        let result = curve.discount(today().add_days(-1).unwrap());
        match result {
            Err(MarketDataError::DateBeforeReference { .. }) => {}
            _ => panic!("Expected DateBeforeReference error"),
        }
    }

    #[test]
    fn test_invalid_rate() {
        let result = FlatForwardCurve::new(today(), f64::NAN, DayCountConvention::ActualActual365);
        assert!(matches!(result, Err(MarketDataError::InvalidRate { .. })));
    }

    #[test]
    fn test_forward_rate_matches_simple_compounding() {
        let curve = FlatForwardCurve::new(today(), 0.03, DayCountConvention::ActualActual360).unwrap();
        let start = today().add_months(6).unwrap();
        let end = start.add_months(6).unwrap();
        let tau = DayCountConvention::ActualActual360.year_fraction(start, end);

        let fwd = curve
            .forward_rate(start, end, DayCountConvention::ActualActual360)
            .unwrap();
        assert_relative_eq!(fwd, ((0.03 * tau).exp() - 1.0) / tau, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_rate_discount_above_one() {
        let curve = FlatForwardCurve::new(today(), -0.005, DayCountConvention::ActualActual365).unwrap();
        let df = curve.discount(today().add_months(12).unwrap()).unwrap();
        assert!(df > 1.0);
    }
}
