//! Black pricer for Ibor coupons with timing adjustment.
//!
//! [`BlackIborCouponPricer`] holds the shared market data (optionlet
//! volatility, correlation) and the timing-adjustment model. Valuing a
//! coupon goes through [`BlackIborCouponPricer::initialize`], which
//! captures the coupon's accrual, discount and spread leg into an
//! [`IborCouponValuation`] exposing swaplet, caplet and floorlet prices and
//! rates.
//!
//! ## Timing adjustment
//!
//! With f the index fixing, τ the index accrual, V the Black variance to
//! the fixing date and s the displacement:
//!
//! ```text
//! shifted lognormal: adj = (f + s)² · V · τ / (1 + f·τ)
//! normal:            adj = V · τ / (1 + f·τ)
//! ```
//!
//! The bivariate model subtracts a correlated cross term built from the
//! forward f₂ over [value date, payment date] with accrual τ₂. When the
//! coupon is paid at or after the index maturity, the convexity term is
//! dropped and f₂, τ₂ run over [maturity date, payment date]:
//!
//! ```text
//! shifted lognormal: ρ · τ₂ · V · (f + s)(f₂ + s) / (1 + f₂·τ₂)
//! normal:            ρ · τ₂ · V / (1 + f₂·τ₂)
//! ```

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use pricer_core::market_data::{OptionletVolatility, Quote, SimpleQuote, VolatilityType};
use pricer_core::observable::{Handle, Observable, Observe, Observer};
use pricer_core::types::{Date, PricingError};

use super::timing::TimingAdjustment;
use crate::analytical::{bachelier_black_formula, BlackCalculator, OptionType, Payoff};
use crate::cashflows::CouponData;
use crate::config::{ConfigError, CouponPricerConfig};

/// Black/Bachelier pricer for Ibor coupons, shareable between coupons.
///
/// The pricer registers with its volatility and correlation handles and
/// relays their notifications to the coupons registered with it.
pub struct BlackIborCouponPricer {
    caplet_volatility: RwLock<Handle<dyn OptionletVolatility>>,
    timing_adjustment: TimingAdjustment,
    correlation: Handle<dyn Quote>,
    notifier: Arc<Observable>,
}

impl BlackIborCouponPricer {
    /// Creates a pricer.
    pub fn new(
        caplet_volatility: Handle<dyn OptionletVolatility>,
        timing_adjustment: TimingAdjustment,
        correlation: Handle<dyn Quote>,
    ) -> Self {
        let notifier = Arc::new(Observable::new());
        let relay = Self::relay_of(&notifier);
        caplet_volatility.observable().register_observer(relay.clone());
        correlation.observable().register_observer(relay);
        Self {
            caplet_volatility: RwLock::new(caplet_volatility),
            timing_adjustment,
            correlation,
            notifier,
        }
    }

    /// Creates a pricer from configuration, with a correlation quote
    /// holding `config.correlation`.
    pub fn from_config(
        config: &CouponPricerConfig,
        caplet_volatility: Handle<dyn OptionletVolatility>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let quote: Arc<dyn Quote> = Arc::new(SimpleQuote::new(config.correlation));
        Ok(Self::new(
            caplet_volatility,
            config.timing_adjustment,
            Handle::new(quote),
        ))
    }

    fn relay_of(notifier: &Arc<Observable>) -> Weak<dyn Observer> {
        let weak: Weak<dyn Observer> = Arc::downgrade(notifier) as Weak<dyn Observer>;
        weak
    }

    /// Timing-adjustment model.
    pub fn timing_adjustment(&self) -> TimingAdjustment {
        self.timing_adjustment
    }

    /// Correlation handle.
    pub fn correlation(&self) -> &Handle<dyn Quote> {
        &self.correlation
    }

    /// Current volatility handle.
    pub fn caplet_volatility(&self) -> Handle<dyn OptionletVolatility> {
        match self.caplet_volatility.read() {
            Ok(handle) => handle.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the volatility handle and notifies dependents.
    pub fn set_caplet_volatility(&self, caplet_volatility: Handle<dyn OptionletVolatility>) {
        let relay = Self::relay_of(&self.notifier);
        {
            let mut slot = match self.caplet_volatility.write() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            slot.observable().unregister_observer(&relay);
            caplet_volatility.observable().register_observer(relay);
            *slot = caplet_volatility;
        }
        tracing::debug!("caplet volatility replaced");
        self.notifier.notify_observers();
    }

    /// Captures the per-coupon data needed to price `coupon`.
    ///
    /// The discount factor comes from the index forwarding curve: 1 when the
    /// payment date is not after the curve's reference date.
    ///
    /// # Errors
    /// - `InvalidInput` for a null accrual period
    /// - `MissingMarketData` if the index has no forwarding curve
    pub fn initialize<'a>(
        &'a self,
        coupon: &'a dyn CouponData,
        evaluation_date: Date,
    ) -> Result<IborCouponValuation<'a>, PricingError> {
        let accrual_period = coupon.accrual_period();
        if accrual_period == 0.0 {
            return Err(PricingError::InvalidInput("null accrual period".to_string()));
        }

        let index = coupon.index();
        let curve = index.forwarding_curve().ok_or_else(|| {
            PricingError::MissingMarketData(format!("no forwarding curve for {}", index.name()))
        })?;
        let payment_date = coupon.date();
        let discount = if payment_date > curve.reference_date() {
            curve.discount(payment_date)?
        } else {
            1.0
        };

        let gearing = coupon.gearing();
        let spread = coupon.spread();
        let spread_leg_value = spread * accrual_period * discount;

        tracing::debug!(
            index = %index.name(),
            %payment_date,
            accrual_period,
            discount,
            spread_leg_value,
            "coupon pricer initialised"
        );

        Ok(IborCouponValuation {
            pricer: self,
            coupon,
            evaluation_date,
            caplet_volatility: self.caplet_volatility().current(),
            gearing,
            spread,
            accrual_period,
            discount,
            spread_leg_value,
        })
    }
}

impl Observe for BlackIborCouponPricer {
    fn observable(&self) -> &Observable {
        &self.notifier
    }
}

impl fmt::Debug for BlackIborCouponPricer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlackIborCouponPricer")
            .field("timing_adjustment", &self.timing_adjustment)
            .field("caplet_volatility", &self.caplet_volatility())
            .field("correlation", &self.correlation)
            .finish()
    }
}

/// Per-coupon valuation produced by [`BlackIborCouponPricer::initialize`].
///
/// Holds the coupon's accrual, discount and spread leg as of
/// initialisation; re-initialise after the evaluation date or the curves
/// change.
pub struct IborCouponValuation<'a> {
    pricer: &'a BlackIborCouponPricer,
    coupon: &'a dyn CouponData,
    evaluation_date: Date,
    caplet_volatility: Option<Arc<dyn OptionletVolatility>>,
    gearing: f64,
    spread: f64,
    accrual_period: f64,
    discount: f64,
    spread_leg_value: f64,
}

impl IborCouponValuation<'_> {
    /// Discount factor to the payment date.
    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Accrual period.
    pub fn accrual_period(&self) -> f64 {
        self.accrual_period
    }

    /// Spread · accrual · discount.
    pub fn spread_leg_value(&self) -> f64 {
        self.spread_leg_value
    }

    /// Gearing of the coupon.
    pub fn gearing(&self) -> f64 {
        self.gearing
    }

    /// Spread of the coupon.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    fn volatility(&self) -> Result<&Arc<dyn OptionletVolatility>, PricingError> {
        self.caplet_volatility
            .as_ref()
            .ok_or(PricingError::MissingVolatility)
    }

    fn annuity(&self) -> f64 {
        self.accrual_period * self.discount
    }

    /// Present value of the floating leg without optionality.
    pub fn swaplet_price(&self) -> Result<f64, PricingError> {
        let fixing = self.adjusted_fixing(None)?;
        Ok(self.gearing * fixing * self.annuity() + self.spread_leg_value)
    }

    /// Coupon rate without optionality.
    pub fn swaplet_rate(&self) -> Result<f64, PricingError> {
        Ok(self.swaplet_price()? / self.annuity())
    }

    /// Present value of a caplet on the index at `effective_cap`.
    pub fn caplet_price(&self, effective_cap: f64) -> Result<f64, PricingError> {
        Ok(self.gearing * self.optionlet_price(OptionType::Call, effective_cap)?)
    }

    /// Caplet value expressed as a rate.
    pub fn caplet_rate(&self, effective_cap: f64) -> Result<f64, PricingError> {
        Ok(self.caplet_price(effective_cap)? / self.annuity())
    }

    /// Present value of a floorlet on the index at `effective_floor`.
    pub fn floorlet_price(&self, effective_floor: f64) -> Result<f64, PricingError> {
        Ok(self.gearing * self.optionlet_price(OptionType::Put, effective_floor)?)
    }

    /// Floorlet value expressed as a rate.
    pub fn floorlet_rate(&self, effective_floor: f64) -> Result<f64, PricingError> {
        Ok(self.floorlet_price(effective_floor)? / self.annuity())
    }

    /// Present value of an option on the index fixing, per unit gearing.
    ///
    /// Determined fixings pay intrinsic value. Otherwise the forward is the
    /// adjusted fixing and the volatility type picks Black (with
    /// displacement) or Bachelier.
    ///
    /// # Errors
    /// - `MissingVolatility` for an undetermined fixing without volatility
    pub fn optionlet_price(
        &self,
        option_type: OptionType,
        effective_strike: f64,
    ) -> Result<f64, PricingError> {
        let fixing_date = self.coupon.fixing_date();
        let payoff = Payoff::plain_vanilla(option_type, effective_strike);

        if fixing_date <= self.evaluation_date {
            let fixing = self.coupon.index_fixing(self.evaluation_date)?;
            tracing::trace!(%fixing_date, fixing, "optionlet on determined fixing");
            return Ok(payoff.evaluate(fixing) * self.annuity());
        }

        let volatility = self.volatility()?;
        let std_dev = volatility
            .black_variance(fixing_date, effective_strike)?
            .sqrt();
        let forward = self.adjusted_fixing(None)?;

        let undiscounted = match volatility.volatility_type() {
            VolatilityType::ShiftedLognormal => {
                let shift = volatility.displacement();
                tracing::trace!(forward, std_dev, shift, "black optionlet");
                BlackCalculator::with_displacement(payoff, forward, std_dev, 1.0, shift)?.value()
            }
            VolatilityType::Normal => {
                tracing::trace!(forward, std_dev, "bachelier optionlet");
                bachelier_black_formula(option_type, effective_strike, forward, std_dev, 1.0)?
            }
        };
        Ok(undiscounted * self.annuity())
    }

    /// Index fixing corrected for payment timing.
    ///
    /// Uses the coupon's index fixing when `fixing` is `None`.
    ///
    /// # Errors
    /// - `MissingVolatility` when an adjustment is needed without volatility
    /// - `MissingCorrelation` in bivariate mode without a correlation value
    pub fn adjusted_fixing(&self, fixing: Option<f64>) -> Result<f64, PricingError> {
        let fixing = match fixing {
            Some(value) => value,
            None => self.coupon.index_fixing(self.evaluation_date)?,
        };

        let mode = self.pricer.timing_adjustment;
        if !self.coupon.is_in_arrears() && mode == TimingAdjustment::Black76 {
            return Ok(fixing);
        }

        let volatility = self.volatility()?;
        let fixing_date = self.coupon.fixing_date();
        if fixing_date <= volatility.reference_date() {
            tracing::trace!(%fixing_date, "fixing already observed, no timing adjustment");
            return Ok(fixing);
        }

        let index = self.coupon.index();
        let value_date = index.value_date(fixing_date)?;
        let maturity_date = index.maturity_date(value_date)?;
        let tau = index.day_count().year_fraction(value_date, maturity_date);
        let variance = volatility.black_variance(fixing_date, fixing)?;
        let shift = volatility.displacement();
        let shifted_lognormal = volatility.volatility_type() == VolatilityType::ShiftedLognormal;

        let mut adjustment = if shifted_lognormal {
            (fixing + shift) * (fixing + shift) * variance * tau / (1.0 + fixing * tau)
        } else {
            variance * tau / (1.0 + fixing * tau)
        };

        if mode == TimingAdjustment::BivariateLognormal {
            let correlation = self
                .pricer
                .correlation
                .current()
                .ok_or(PricingError::MissingCorrelation)?
                .value()
                .map_err(|_| PricingError::MissingCorrelation)?;

            // Paid at or after the index maturity: the cross term runs over
            // [maturity, payment] and replaces the convexity term.
            let payment_date = self.coupon.date();
            let paid_after_maturity = payment_date >= maturity_date;
            let cross_start = if paid_after_maturity {
                maturity_date
            } else {
                value_date
            };
            let tau2 = index.day_count().year_fraction(cross_start, payment_date);
            if paid_after_maturity {
                adjustment = 0.0;
            }
            if tau2 > 0.0 {
                let curve = index.forwarding_curve().ok_or_else(|| {
                    PricingError::MissingMarketData(format!(
                        "no forwarding curve for {}",
                        index.name()
                    ))
                })?;
                let fixing2 =
                    (curve.discount(cross_start)? / curve.discount(payment_date)? - 1.0) / tau2;
                let cross = if shifted_lognormal {
                    correlation * tau2 * variance * (fixing + shift) * (fixing2 + shift)
                        / (1.0 + fixing2 * tau2)
                } else {
                    correlation * tau2 * variance / (1.0 + fixing2 * tau2)
                };
                adjustment -= cross;
            } else if !paid_after_maturity {
                tracing::warn!(
                    %payment_date,
                    %value_date,
                    "payment before rate start, using black76 in-arrears adjustment"
                );
            }
        }

        tracing::debug!(
            %mode,
            %fixing_date,
            fixing,
            adjustment,
            "timing adjustment"
        );
        Ok(fixing + adjustment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflows::{IborCoupon, IborIndex};
    use approx::assert_relative_eq;
    use pricer_core::market_data::{ConstantOptionletVolatility, FlatForwardCurve};
    use pricer_core::observable::DirtyFlag;
    use pricer_core::types::DayCountConvention;

    fn today() -> Date {
        Date::from_ymd(2024, 1, 2).unwrap()
    }

    fn index() -> Arc<IborIndex> {
        let curve =
            FlatForwardCurve::new(today(), 0.03, DayCountConvention::ActualActual365).unwrap();
        Arc::new(
            IborIndex::new("Euribor6M", 6, 2, DayCountConvention::ActualActual360)
                .with_forwarding_curve(Arc::new(curve)),
        )
    }

    fn vol_handle(sigma: f64) -> Handle<dyn OptionletVolatility> {
        let vol: Arc<dyn OptionletVolatility> = Arc::new(
            ConstantOptionletVolatility::new(today(), sigma, DayCountConvention::ActualActual365)
                .unwrap(),
        );
        Handle::new(vol)
    }

    fn pricer(mode: TimingAdjustment, correlation: f64) -> BlackIborCouponPricer {
        let config = CouponPricerConfig::new()
            .with_timing_adjustment(mode)
            .with_correlation(correlation);
        BlackIborCouponPricer::from_config(&config, vol_handle(0.2)).unwrap()
    }

    fn coupon(in_arrears: bool) -> IborCoupon {
        IborCoupon::builder()
            .nominal(1.0)
            .accrual_start(Date::from_ymd(2025, 1, 3).unwrap())
            .accrual_end(Date::from_ymd(2025, 7, 3).unwrap())
            .index(index())
            .in_arrears(in_arrears)
            .build()
            .unwrap()
    }

    // ==========================================================
    // Initialisation
    // ==========================================================

    #[test]
    fn test_initialize_captures_discount_and_spread_leg() {
        let p = pricer(TimingAdjustment::Black76, 1.0);
        let c = IborCoupon::builder()
            .nominal(1.0)
            .accrual_start(Date::from_ymd(2025, 1, 3).unwrap())
            .accrual_end(Date::from_ymd(2025, 7, 3).unwrap())
            .index(index())
            .spread(0.002)
            .build()
            .unwrap();
        let v = p.initialize(&c, today()).unwrap();

        let t = DayCountConvention::ActualActual365.year_fraction(today(), c.date());
        assert_relative_eq!(v.discount(), (-0.03 * t).exp(), epsilon = 1e-14);
        assert_relative_eq!(
            v.spread_leg_value(),
            0.002 * c.accrual_period() * v.discount(),
            epsilon = 1e-16
        );
    }

    #[test]
    fn test_initialize_requires_forwarding_curve() {
        let p = pricer(TimingAdjustment::Black76, 1.0);
        let bare = Arc::new(IborIndex::new("Bare3M", 3, 2, DayCountConvention::ActualActual360));
        let c = IborCoupon::builder()
            .nominal(1.0)
            .accrual_start(Date::from_ymd(2025, 1, 3).unwrap())
            .accrual_end(Date::from_ymd(2025, 4, 3).unwrap())
            .index(bare)
            .build()
            .unwrap();
        assert!(matches!(
            p.initialize(&c, today()),
            Err(PricingError::MissingMarketData(_))
        ));
    }

    // ==========================================================
    // Timing adjustment
    // ==========================================================

    #[test]
    fn test_in_advance_black76_is_unadjusted() {
        let p = pricer(TimingAdjustment::Black76, 1.0);
        let c = coupon(false);
        let v = p.initialize(&c, today()).unwrap();
        assert_eq!(v.adjusted_fixing(Some(0.0315)).unwrap(), 0.0315);
    }

    #[test]
    fn test_in_arrears_black76_adjustment() {
        let p = pricer(TimingAdjustment::Black76, 1.0);
        let c = coupon(true);
        let v = p.initialize(&c, today()).unwrap();
        let f = 0.03;

        let d1 = c.fixing_date();
        let d2 = c.index().value_date(d1).unwrap();
        let d3 = c.index().maturity_date(d2).unwrap();
        let tau = DayCountConvention::ActualActual360.year_fraction(d2, d3);
        let variance = 0.04 * DayCountConvention::ActualActual365.year_fraction(today(), d1);
        let expected = f + f * f * variance * tau / (1.0 + f * tau);

        assert_relative_eq!(v.adjusted_fixing(Some(f)).unwrap(), expected, epsilon = 1e-15);
    }

    #[test]
    fn test_bivariate_zero_correlation_matches_black76() {
        let c = coupon(true);
        let black = pricer(TimingAdjustment::Black76, 1.0);
        let bivariate = pricer(TimingAdjustment::BivariateLognormal, 0.0);

        let a = black.initialize(&c, today()).unwrap().adjusted_fixing(Some(0.03)).unwrap();
        let b = bivariate.initialize(&c, today()).unwrap().adjusted_fixing(Some(0.03)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bivariate_payment_on_rate_start_falls_back() {
        // In arrears: payment date equals the index value date
        let c = coupon(true);
        assert_eq!(c.date(), c.index().value_date(c.fixing_date()).unwrap());

        let black = pricer(TimingAdjustment::Black76, 1.0);
        let bivariate = pricer(TimingAdjustment::BivariateLognormal, 0.9);
        let a = black.initialize(&c, today()).unwrap().adjusted_fixing(Some(0.03)).unwrap();
        let b = bivariate.initialize(&c, today()).unwrap().adjusted_fixing(Some(0.03)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bivariate_paid_at_index_maturity_is_unadjusted() {
        // In advance: payment date equals the index maturity
        let c = coupon(false);
        let d2 = c.index().value_date(c.fixing_date()).unwrap();
        assert_eq!(c.date(), c.index().maturity_date(d2).unwrap());

        let bivariate = pricer(TimingAdjustment::BivariateLognormal, 0.9);
        let v = bivariate.initialize(&c, today()).unwrap();
        assert_eq!(v.adjusted_fixing(Some(0.03)).unwrap(), 0.03);
    }

    #[test]
    fn test_bivariate_paid_after_index_maturity() {
        let c = IborCoupon::builder()
            .nominal(1.0)
            .accrual_start(Date::from_ymd(2025, 1, 3).unwrap())
            .accrual_end(Date::from_ymd(2025, 7, 3).unwrap())
            .payment_date(Date::from_ymd(2025, 10, 3).unwrap())
            .index(index())
            .build()
            .unwrap();
        let rho = 0.9;
        let f = 0.03;
        let p = pricer(TimingAdjustment::BivariateLognormal, rho);
        let v = p.initialize(&c, today()).unwrap();

        let d1 = c.fixing_date();
        let d2 = c.index().value_date(d1).unwrap();
        let d3 = c.index().maturity_date(d2).unwrap();
        let d4 = c.date();
        assert!(d4 > d3);
        let tau2 = DayCountConvention::ActualActual360.year_fraction(d3, d4);
        let curve = c.index().forwarding_curve().unwrap();
        let f2 = (curve.discount(d3).unwrap() / curve.discount(d4).unwrap() - 1.0) / tau2;
        let variance = 0.2 * 0.2 * DayCountConvention::ActualActual365.year_fraction(today(), d1);
        let cross = rho * tau2 * variance * f * f2 / (1.0 + f2 * tau2);

        let adjusted = v.adjusted_fixing(Some(f)).unwrap();
        assert!(adjusted < f);
        assert_relative_eq!(adjusted, f - cross, epsilon = 1e-15);
    }

    #[test]
    fn test_bivariate_cross_term_reduces_adjustment() {
        let c = IborCoupon::builder()
            .nominal(1.0)
            .accrual_start(Date::from_ymd(2025, 1, 3).unwrap())
            .accrual_end(Date::from_ymd(2025, 7, 3).unwrap())
            .payment_date(Date::from_ymd(2025, 10, 3).unwrap())
            .index(index())
            .in_arrears(true)
            .build()
            .unwrap();

        let black = pricer(TimingAdjustment::Black76, 1.0);
        let low = pricer(TimingAdjustment::BivariateLognormal, 0.2);
        let high = pricer(TimingAdjustment::BivariateLognormal, 0.9);

        let a = black.initialize(&c, today()).unwrap().adjusted_fixing(Some(0.03)).unwrap();
        let b = low.initialize(&c, today()).unwrap().adjusted_fixing(Some(0.03)).unwrap();
        let h = high.initialize(&c, today()).unwrap().adjusted_fixing(Some(0.03)).unwrap();
        assert!(h < b && b < a);
    }

    #[test]
    fn test_missing_volatility() {
        let p = BlackIborCouponPricer::new(
            Handle::empty(),
            TimingAdjustment::Black76,
            Handle::empty(),
        );
        let c = coupon(true);
        let v = p.initialize(&c, today()).unwrap();
        assert_eq!(v.adjusted_fixing(Some(0.03)), Err(PricingError::MissingVolatility));
        assert_eq!(
            v.caplet_price(0.03),
            Err(PricingError::MissingVolatility)
        );
    }

    #[test]
    fn test_missing_correlation() {
        let p = BlackIborCouponPricer::new(
            vol_handle(0.2),
            TimingAdjustment::BivariateLognormal,
            Handle::empty(),
        );
        let c = coupon(false);
        let v = p.initialize(&c, today()).unwrap();
        assert_eq!(v.adjusted_fixing(Some(0.03)), Err(PricingError::MissingCorrelation));
    }

    // ==========================================================
    // Prices and rates
    // ==========================================================

    #[test]
    fn test_swaplet_rate_is_geared_fixing_plus_spread() {
        let p = pricer(TimingAdjustment::Black76, 1.0);
        let c = IborCoupon::builder()
            .nominal(1.0)
            .accrual_start(Date::from_ymd(2025, 1, 3).unwrap())
            .accrual_end(Date::from_ymd(2025, 7, 3).unwrap())
            .index(index())
            .gearing(1.5)
            .spread(0.001)
            .build()
            .unwrap();
        let v = p.initialize(&c, today()).unwrap();
        let fixing = c.index_fixing(today()).unwrap();
        assert_relative_eq!(v.swaplet_rate().unwrap(), 1.5 * fixing + 0.001, epsilon = 1e-14);
    }

    #[test]
    fn test_caplet_floorlet_parity() {
        let p = pricer(TimingAdjustment::Black76, 1.0);
        let c = coupon(false);
        let v = p.initialize(&c, today()).unwrap();
        let fixing = v.adjusted_fixing(None).unwrap();
        let strike = 0.028;

        let cap = v.caplet_rate(strike).unwrap();
        let floor = v.floorlet_rate(strike).unwrap();
        assert_relative_eq!(cap - floor, fixing - strike, epsilon = 1e-14);
    }

    #[test]
    fn test_normal_volatility_uses_bachelier() {
        let vol: Arc<dyn OptionletVolatility> = Arc::new(
            ConstantOptionletVolatility::new(today(), 0.006, DayCountConvention::ActualActual365)
                .unwrap()
                .with_volatility_type(VolatilityType::Normal),
        );
        let p = BlackIborCouponPricer::from_config(&CouponPricerConfig::default(), Handle::new(vol))
            .unwrap();
        let c = coupon(false);
        let v = p.initialize(&c, today()).unwrap();

        let fixing = v.adjusted_fixing(None).unwrap();
        let variance = 0.006 * 0.006
            * DayCountConvention::ActualActual365.year_fraction(today(), c.fixing_date());
        let expected = bachelier_black_formula(OptionType::Call, 0.05, fixing, variance.sqrt(), 1.0)
            .unwrap()
            * v.accrual_period()
            * v.discount();
        assert_relative_eq!(v.caplet_price(0.05).unwrap(), expected, epsilon = 1e-15);
    }

    #[test]
    fn test_determined_fixing_pays_intrinsic() {
        let p = pricer(TimingAdjustment::Black76, 1.0);
        let c = coupon(false);
        let evaluation = Date::from_ymd(2025, 2, 3).unwrap();
        c.index().add_fixing(c.fixing_date(), 0.04);

        let v = p.initialize(&c, evaluation).unwrap();
        assert_relative_eq!(v.caplet_rate(0.035).unwrap(), 0.005, epsilon = 1e-15);
        assert_eq!(v.floorlet_rate(0.035).unwrap(), 0.0);
    }

    #[test]
    fn test_null_accrual_period() {
        struct Degenerate(Arc<IborIndex>);

        impl CouponData for Degenerate {
            fn gearing(&self) -> f64 {
                1.0
            }
            fn spread(&self) -> f64 {
                0.0
            }
            fn accrual_period(&self) -> f64 {
                0.0
            }
            fn index(&self) -> &IborIndex {
                &self.0
            }
            fn fixing_date(&self) -> Date {
                Date::from_ymd(2025, 1, 1).unwrap()
            }
            fn date(&self) -> Date {
                Date::from_ymd(2025, 7, 3).unwrap()
            }
            fn is_in_arrears(&self) -> bool {
                false
            }
        }

        let p = pricer(TimingAdjustment::Black76, 1.0);
        let c = Degenerate(index());
        match p.initialize(&c, today()) {
            Err(PricingError::InvalidInput(msg)) => assert!(msg.contains("accrual")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    // ==========================================================
    // Notifications
    // ==========================================================

    #[test]
    fn test_volatility_change_reaches_pricer_observers() {
        let vol = Arc::new(
            ConstantOptionletVolatility::new(today(), 0.2, DayCountConvention::ActualActual365)
                .unwrap(),
        );
        let as_dyn: Arc<dyn OptionletVolatility> = vol.clone();
        let p = BlackIborCouponPricer::new(
            Handle::new(as_dyn),
            TimingAdjustment::Black76,
            Handle::empty(),
        );

        let flag = DirtyFlag::new();
        flag.clear();
        let weak: Weak<dyn Observer> = Arc::downgrade(&flag) as Weak<dyn Observer>;
        p.observable().register_observer(weak);

        vol.set_volatility(0.25).unwrap();
        assert!(flag.clear());

        p.set_caplet_volatility(vol_handle(0.3));
        assert!(flag.clear());

        // The old surface is detached
        vol.set_volatility(0.35).unwrap();
        assert!(!flag.is_dirty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_bivariate_adjustment_decreases_with_correlation(
                rho_low in -1.0..1.0f64,
                delta in 0.0..0.5f64,
                fixing in 0.005..0.08f64,
            ) {
                let rho_high = (rho_low + delta).min(1.0);
                let c = IborCoupon::builder()
                    .nominal(1.0)
                    .accrual_start(Date::from_ymd(2025, 1, 3).unwrap())
                    .accrual_end(Date::from_ymd(2025, 7, 3).unwrap())
                    .payment_date(Date::from_ymd(2025, 9, 3).unwrap())
                    .index(index())
                    .in_arrears(true)
                    .build()
                    .unwrap();

                let low = pricer(TimingAdjustment::BivariateLognormal, rho_low);
                let high = pricer(TimingAdjustment::BivariateLognormal, rho_high);
                let a = low.initialize(&c, today()).unwrap().adjusted_fixing(Some(fixing)).unwrap();
                let b = high.initialize(&c, today()).unwrap().adjusted_fixing(Some(fixing)).unwrap();
                prop_assert!(b <= a);
                prop_assert!(a.is_finite() && b.is_finite());
            }
        }
    }
}
