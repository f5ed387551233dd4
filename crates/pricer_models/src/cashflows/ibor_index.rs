//! Term-rate (Ibor-style) index.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use pricer_core::market_data::DiscountCurve;
use pricer_core::observable::{Observable, Observe};
use pricer_core::types::{Date, DateError, DayCountConvention, PricingError};

/// Floating-rate index fixing a simply compounded rate over a fixed tenor.
///
/// Dates are rolled in calendar days; holiday calendars are not modelled.
///
/// - value date = fixing date + fixing days
/// - maturity date = value date + tenor
/// - forecast fixing = (D(value) / D(maturity) − 1) / τ(value, maturity)
///
/// Stored past fixings take precedence over forecasts. Adding a fixing
/// notifies observers of the index.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use pricer_core::market_data::FlatForwardCurve;
/// use pricer_core::types::{Date, DayCountConvention};
/// use pricer_models::cashflows::IborIndex;
///
/// let today = Date::from_ymd(2024, 1, 2).unwrap();
/// let curve = FlatForwardCurve::new(today, 0.03, DayCountConvention::ActualActual365).unwrap();
/// let index = IborIndex::new("Euribor6M", 6, 2, DayCountConvention::ActualActual360)
///     .with_forwarding_curve(Arc::new(curve));
///
/// let fixing_date = Date::from_ymd(2024, 7, 1).unwrap();
/// assert_eq!(index.value_date(fixing_date).unwrap(), Date::from_ymd(2024, 7, 3).unwrap());
/// let rate = index.fixing(fixing_date, today).unwrap();
/// assert!(rate > 0.029 && rate < 0.031);
/// ```
pub struct IborIndex {
    name: String,
    tenor_months: u32,
    fixing_days: u32,
    day_count: DayCountConvention,
    forwarding_curve: Option<Arc<dyn DiscountCurve>>,
    fixings: RwLock<BTreeMap<Date, f64>>,
    notifier: Observable,
}

impl IborIndex {
    /// Creates an index without a forwarding curve.
    pub fn new(
        name: impl Into<String>,
        tenor_months: u32,
        fixing_days: u32,
        day_count: DayCountConvention,
    ) -> Self {
        Self {
            name: name.into(),
            tenor_months,
            fixing_days,
            day_count,
            forwarding_curve: None,
            fixings: RwLock::new(BTreeMap::new()),
            notifier: Observable::new(),
        }
    }

    /// Sets the curve used to forecast fixings (builder pattern).
    pub fn with_forwarding_curve(mut self, curve: Arc<dyn DiscountCurve>) -> Self {
        self.forwarding_curve = Some(curve);
        self
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tenor in months.
    pub fn tenor_months(&self) -> u32 {
        self.tenor_months
    }

    /// Days between fixing and value date.
    pub fn fixing_days(&self) -> u32 {
        self.fixing_days
    }

    /// Day count of the fixed rate.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Forecasting curve, if any.
    pub fn forwarding_curve(&self) -> Option<&Arc<dyn DiscountCurve>> {
        self.forwarding_curve.as_ref()
    }

    /// Start of the deposit underlying a fixing.
    pub fn value_date(&self, fixing_date: Date) -> Result<Date, DateError> {
        fixing_date.add_days(i64::from(self.fixing_days))
    }

    /// Fixing date for a deposit starting on `value_date`.
    pub fn fixing_date(&self, value_date: Date) -> Result<Date, DateError> {
        value_date.add_days(-i64::from(self.fixing_days))
    }

    /// End of the deposit starting on `value_date`.
    pub fn maturity_date(&self, value_date: Date) -> Result<Date, DateError> {
        let months = i32::try_from(self.tenor_months)
            .map_err(|_| DateError::OutOfRange(format!("tenor of {} months", self.tenor_months)))?;
        value_date.add_months(months)
    }

    /// Stores a published fixing and notifies observers.
    pub fn add_fixing(&self, fixing_date: Date, value: f64) {
        {
            let mut fixings = match self.fixings.write() {
                Ok(fixings) => fixings,
                Err(poisoned) => poisoned.into_inner(),
            };
            fixings.insert(fixing_date, value);
        }
        tracing::debug!(index = %self.name, %fixing_date, value, "fixing added");
        self.notifier.notify_observers();
    }

    /// Published fixing for a date, if stored.
    pub fn past_fixing(&self, fixing_date: Date) -> Option<f64> {
        let fixings = match self.fixings.read() {
            Ok(fixings) => fixings,
            Err(poisoned) => poisoned.into_inner(),
        };
        fixings.get(&fixing_date).copied()
    }

    /// Fixing implied by the forwarding curve.
    ///
    /// # Errors
    /// - `MissingMarketData` if no forwarding curve is set
    pub fn forecast_fixing(&self, fixing_date: Date) -> Result<f64, PricingError> {
        let curve = self.forwarding_curve.as_ref().ok_or_else(|| {
            PricingError::MissingMarketData(format!("no forwarding curve for {}", self.name))
        })?;
        let value_date = self.value_date(fixing_date)?;
        let maturity_date = self.maturity_date(value_date)?;
        Ok(curve.forward_rate(value_date, maturity_date, self.day_count)?)
    }

    /// Fixing seen from `evaluation_date`.
    ///
    /// Past fixing dates require a stored fixing. On the evaluation date a
    /// stored fixing is used when available, the forecast otherwise.
    ///
    /// # Errors
    /// - `MissingMarketData` for a past date without stored fixing, or a
    ///   forecast without forwarding curve
    pub fn fixing(&self, fixing_date: Date, evaluation_date: Date) -> Result<f64, PricingError> {
        if fixing_date < evaluation_date {
            return self.past_fixing(fixing_date).ok_or_else(|| {
                PricingError::MissingMarketData(format!(
                    "missing {} fixing for {}",
                    self.name, fixing_date
                ))
            });
        }
        if fixing_date == evaluation_date {
            if let Some(value) = self.past_fixing(fixing_date) {
                return Ok(value);
            }
        }
        self.forecast_fixing(fixing_date)
    }
}

impl Observe for IborIndex {
    fn observable(&self) -> &Observable {
        &self.notifier
    }
}

impl fmt::Debug for IborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IborIndex")
            .field("name", &self.name)
            .field("tenor_months", &self.tenor_months)
            .field("fixing_days", &self.fixing_days)
            .field("day_count", &self.day_count)
            .field("forwarding_curve", &self.forwarding_curve.is_some())
            .finish()
    }
}
