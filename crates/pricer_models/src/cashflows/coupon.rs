//! Floating-rate coupons on a term-rate index.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use pricer_core::observable::{DirtyFlag, Observe, Observer};
use pricer_core::types::{Date, DayCountConvention, PricingError};

use super::error::CouponError;
use super::ibor_index::IborIndex;
use crate::pricers::BlackIborCouponPricer;

/// Data a coupon pricer reads from the coupon it values.
pub trait CouponData: Send + Sync {
    /// Multiplier applied to the index fixing.
    fn gearing(&self) -> f64;

    /// Additive spread over the geared fixing.
    fn spread(&self) -> f64;

    /// Accrual year fraction.
    fn accrual_period(&self) -> f64;

    /// Underlying index.
    fn index(&self) -> &IborIndex;

    /// Date the index rate is observed.
    fn fixing_date(&self) -> Date;

    /// Index fixing for this coupon seen from `evaluation_date`.
    fn index_fixing(&self, evaluation_date: Date) -> Result<f64, PricingError> {
        self.index().fixing(self.fixing_date(), evaluation_date)
    }

    /// Payment date.
    fn date(&self) -> Date;

    /// Whether the rate is fixed at the end of the accrual period.
    fn is_in_arrears(&self) -> bool;
}

/// Floating coupon paying `nominal · τ · (gearing · fixing + spread)`,
/// optionally capped and/or floored.
///
/// The coupon rate is computed lazily through the attached pricer and
/// cached per evaluation date. Changes to the pricer's market data or to
/// the index fixings mark the cache dirty; the rate is recomputed on the
/// next read.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use pricer_core::market_data::FlatForwardCurve;
/// use pricer_core::types::{Date, DayCountConvention};
/// use pricer_models::cashflows::{CouponData, IborCoupon, IborIndex};
///
/// let today = Date::from_ymd(2024, 1, 2).unwrap();
/// let curve = FlatForwardCurve::new(today, 0.03, DayCountConvention::ActualActual365).unwrap();
/// let index = Arc::new(
///     IborIndex::new("Euribor6M", 6, 2, DayCountConvention::ActualActual360)
///         .with_forwarding_curve(Arc::new(curve)),
/// );
///
/// let coupon = IborCoupon::builder()
///     .nominal(1_000_000.0)
///     .accrual_start(Date::from_ymd(2024, 7, 3).unwrap())
///     .accrual_end(Date::from_ymd(2025, 1, 3).unwrap())
///     .payment_date(Date::from_ymd(2025, 1, 3).unwrap())
///     .index(index)
///     .spread(0.001)
///     .build()
///     .unwrap();
///
/// assert_eq!(coupon.fixing_date(), Date::from_ymd(2024, 7, 1).unwrap());
/// assert!(!coupon.is_in_arrears());
/// ```
pub struct IborCoupon {
    nominal: f64,
    payment_date: Date,
    accrual_start: Date,
    accrual_end: Date,
    day_count: DayCountConvention,
    fixing_date: Date,
    index: Arc<IborIndex>,
    gearing: f64,
    spread: f64,
    in_arrears: bool,
    cap: Option<f64>,
    floor: Option<f64>,
    pricer: Option<Arc<BlackIborCouponPricer>>,
    dirty: Arc<DirtyFlag>,
    cached_rate: Mutex<Option<(Date, f64)>>,
}

impl IborCoupon {
    /// Starts building a coupon.
    pub fn builder() -> IborCouponBuilder {
        IborCouponBuilder::new()
    }

    fn flag_observer(&self) -> Weak<dyn Observer> {
        let weak: Weak<dyn Observer> = Arc::downgrade(&self.dirty) as Weak<dyn Observer>;
        weak
    }

    /// Notional.
    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    /// Accrual start date.
    pub fn accrual_start(&self) -> Date {
        self.accrual_start
    }

    /// Accrual end date.
    pub fn accrual_end(&self) -> Date {
        self.accrual_end
    }

    /// Accrual day count.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Cap on the coupon rate.
    pub fn cap(&self) -> Option<f64> {
        self.cap
    }

    /// Floor on the coupon rate.
    pub fn floor(&self) -> Option<f64> {
        self.floor
    }

    /// Attached pricer.
    pub fn pricer(&self) -> Option<&Arc<BlackIborCouponPricer>> {
        self.pricer.as_ref()
    }

    /// Whether the cached rate is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    /// Attaches a pricer, replacing any previous one.
    pub fn set_pricer(&mut self, pricer: Arc<BlackIborCouponPricer>) {
        let observer = self.flag_observer();
        if let Some(old) = self.pricer.take() {
            old.observable().unregister_observer(&observer);
        }
        pricer.observable().register_observer(observer);
        self.pricer = Some(pricer);
        self.dirty.mark_dirty();
    }

    /// Cap and floor on the index fixing implied by the rate bounds and
    /// the gearing, as `(cap, floor)`. A negative gearing swaps the roles.
    fn effective_bounds(&self) -> Result<(Option<f64>, Option<f64>), PricingError> {
        if self.cap.is_none() && self.floor.is_none() {
            return Ok((None, None));
        }
        if self.gearing == 0.0 {
            return Err(PricingError::InvalidInput(
                "null gearing on a capped/floored coupon".to_string(),
            ));
        }
        let (cap, floor) = if self.gearing > 0.0 {
            (self.cap, self.floor)
        } else {
            (self.floor, self.cap)
        };
        let effective = |rate: f64| (rate - self.spread) / self.gearing;
        Ok((cap.map(effective), floor.map(effective)))
    }

    fn compute_rate(&self, evaluation_date: Date) -> Result<f64, PricingError> {
        let pricer = self
            .pricer
            .as_ref()
            .ok_or_else(|| PricingError::InvalidInput("pricer not set".to_string()))?;
        let valuation = pricer.initialize(self, evaluation_date)?;
        let swaplet_rate = valuation.swaplet_rate()?;

        let (cap, floor) = self.effective_bounds()?;
        let floorlet_rate = match floor {
            Some(strike) => valuation.floorlet_rate(strike)?,
            None => 0.0,
        };
        let caplet_rate = match cap {
            Some(strike) => valuation.caplet_rate(strike)?,
            None => 0.0,
        };
        Ok(swaplet_rate + floorlet_rate - caplet_rate)
    }

    /// Coupon rate seen from `evaluation_date`.
    ///
    /// # Errors
    /// - `InvalidInput` if no pricer is attached
    /// - Any pricing error of the attached pricer
    pub fn rate(&self, evaluation_date: Date) -> Result<f64, PricingError> {
        let mut cache = match self.cached_rate.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !self.dirty.is_dirty() {
            if let Some((date, rate)) = *cache {
                if date == evaluation_date {
                    return Ok(rate);
                }
            }
        }

        tracing::debug!(
            index = %self.index.name(),
            payment_date = %self.payment_date,
            %evaluation_date,
            "recomputing coupon rate"
        );
        *cache = None;
        self.dirty.clear();
        let rate = self.compute_rate(evaluation_date)?;
        *cache = Some((evaluation_date, rate));
        Ok(rate)
    }

    /// Cash amount `nominal · τ · rate`.
    pub fn amount(&self, evaluation_date: Date) -> Result<f64, PricingError> {
        Ok(self.rate(evaluation_date)? * self.accrual_period() * self.nominal)
    }
}

impl CouponData for IborCoupon {
    fn gearing(&self) -> f64 {
        self.gearing
    }

    fn spread(&self) -> f64 {
        self.spread
    }

    fn accrual_period(&self) -> f64 {
        self.day_count
            .year_fraction(self.accrual_start, self.accrual_end)
    }

    fn index(&self) -> &IborIndex {
        &self.index
    }

    fn fixing_date(&self) -> Date {
        self.fixing_date
    }

    fn date(&self) -> Date {
        self.payment_date
    }

    fn is_in_arrears(&self) -> bool {
        self.in_arrears
    }
}

impl fmt::Debug for IborCoupon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IborCoupon")
            .field("nominal", &self.nominal)
            .field("payment_date", &self.payment_date)
            .field("accrual_start", &self.accrual_start)
            .field("accrual_end", &self.accrual_end)
            .field("fixing_date", &self.fixing_date)
            .field("index", &self.index.name())
            .field("gearing", &self.gearing)
            .field("spread", &self.spread)
            .field("in_arrears", &self.in_arrears)
            .field("cap", &self.cap)
            .field("floor", &self.floor)
            .finish()
    }
}

/// Builder for [`IborCoupon`].
///
/// Day count and fixing days default to the index's; gearing defaults to
/// 1, spread to 0, and the coupon fixes in advance.
#[derive(Default)]
pub struct IborCouponBuilder {
    nominal: Option<f64>,
    payment_date: Option<Date>,
    accrual_start: Option<Date>,
    accrual_end: Option<Date>,
    index: Option<Arc<IborIndex>>,
    day_count: Option<DayCountConvention>,
    fixing_days: Option<u32>,
    gearing: Option<f64>,
    spread: f64,
    in_arrears: bool,
    cap: Option<f64>,
    floor: Option<f64>,
    pricer: Option<Arc<BlackIborCouponPricer>>,
}

impl IborCouponBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the notional.
    pub fn nominal(mut self, nominal: f64) -> Self {
        self.nominal = Some(nominal);
        self
    }

    /// Sets the payment date.
    pub fn payment_date(mut self, date: Date) -> Self {
        self.payment_date = Some(date);
        self
    }

    /// Sets the accrual start date.
    pub fn accrual_start(mut self, date: Date) -> Self {
        self.accrual_start = Some(date);
        self
    }

    /// Sets the accrual end date.
    pub fn accrual_end(mut self, date: Date) -> Self {
        self.accrual_end = Some(date);
        self
    }

    /// Sets the index.
    pub fn index(mut self, index: Arc<IborIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the accrual day count.
    pub fn day_count(mut self, dc: DayCountConvention) -> Self {
        self.day_count = Some(dc);
        self
    }

    /// Sets the fixing lag in days.
    pub fn fixing_days(mut self, days: u32) -> Self {
        self.fixing_days = Some(days);
        self
    }

    /// Sets the gearing.
    pub fn gearing(mut self, gearing: f64) -> Self {
        self.gearing = Some(gearing);
        self
    }

    /// Sets the spread.
    pub fn spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    /// Fixes at the end of the accrual period.
    pub fn in_arrears(mut self, in_arrears: bool) -> Self {
        self.in_arrears = in_arrears;
        self
    }

    /// Caps the coupon rate.
    pub fn cap(mut self, cap: f64) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Floors the coupon rate.
    pub fn floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Attaches a pricer.
    pub fn pricer(mut self, pricer: Arc<BlackIborCouponPricer>) -> Self {
        self.pricer = Some(pricer);
        self
    }

    /// Builds the coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Notional, dates or index are missing
    /// - Accrual start is not before accrual end
    /// - Cap is below floor
    /// - The fixing date cannot be computed
    pub fn build(self) -> Result<IborCoupon, CouponError> {
        let nominal = self
            .nominal
            .ok_or(CouponError::MissingField { field: "nominal" })?;
        let accrual_start = self
            .accrual_start
            .ok_or(CouponError::MissingField { field: "accrual_start" })?;
        let accrual_end = self
            .accrual_end
            .ok_or(CouponError::MissingField { field: "accrual_end" })?;
        let index = self
            .index
            .ok_or(CouponError::MissingField { field: "index" })?;
        let payment_date = self.payment_date.unwrap_or(accrual_end);

        if accrual_start >= accrual_end {
            return Err(CouponError::InvalidAccrualPeriod {
                start: accrual_start,
                end: accrual_end,
            });
        }
        if let (Some(cap), Some(floor)) = (self.cap, self.floor) {
            if cap < floor {
                return Err(CouponError::CapBelowFloor { cap, floor });
            }
        }

        let fixing_days = self.fixing_days.unwrap_or(index.fixing_days());
        let reference = if self.in_arrears {
            accrual_end
        } else {
            accrual_start
        };
        let fixing_date = reference.add_days(-i64::from(fixing_days))?;

        let mut coupon = IborCoupon {
            nominal,
            payment_date,
            accrual_start,
            accrual_end,
            day_count: self.day_count.unwrap_or(index.day_count()),
            fixing_date,
            index,
            gearing: self.gearing.unwrap_or(1.0),
            spread: self.spread,
            in_arrears: self.in_arrears,
            cap: self.cap,
            floor: self.floor,
            pricer: None,
            dirty: DirtyFlag::new(),
            cached_rate: Mutex::new(None),
        };
        coupon
            .index
            .observable()
            .register_observer(coupon.flag_observer());
        if let Some(pricer) = self.pricer {
            coupon.set_pricer(pricer);
        }
        Ok(coupon)
    }
}
