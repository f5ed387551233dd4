//! Black-76 calculator with closed-form Greeks.
//!
//! The calculator values a striked payoff on a forward under lognormal
//! dynamics given the total standard deviation σ = vol·√T and a discount
//! factor D:
//!
//! ```text
//! V = D · (F·α + X·β)
//! ```
//!
//! where α and β are payoff-dependent coefficients built from N(d1) and
//! N(d2), and X is the effective strike (the cash amount for
//! cash-or-nothing, the second strike for gap payoffs). Every Greek is a
//! chain rule through d1 and d2 applied to the cached coefficients.
//!
//! Spot Greeks assume F = S·exp((r − q)T) and D = exp(−rT), so that
//! `delta(spot)` is ∂V/∂S at fixed σ and D, and `theta` follows from the
//! Black-Scholes PDE.
//!
//! ## Degenerate regimes
//!
//! - σ ≥ ε and K ≈ 0: d1 = d2 = +∞, N = 1, n = 0 (always exercised)
//! - σ < ε and F ≈ K: d1 = d2 = 0, N = ½, n = 1/√(2π)
//! - σ < ε and F > K: d1 = d2 = +∞, N = 1, n = 0
//! - σ < ε and F < K: d1 = d2 = −∞, N = 0, n = 0
//!
//! Chain-rule factors of the form n(d)/(σ·scale) evaluate to 0 when the
//! density or the scale vanishes, or when σ < ε, so no Greek returns NaN.

use super::distributions::{norm_cdf, norm_pdf, FRAC_1_SQRT_2PI};
use super::error::AnalyticalError;
use super::payoff::{OptionType, Payoff, PayoffKind};

/// Machine epsilon used for the degenerate-regime tests.
const EPSILON: f64 = f64::EPSILON;

/// Floating-point closeness within 42 ulps.
fn close(x: f64, y: f64) -> bool {
    if x == y {
        return true;
    }
    let diff = (x - y).abs();
    let tolerance = 42.0 * EPSILON;
    if x == 0.0 || y == 0.0 {
        return diff < tolerance * tolerance;
    }
    diff <= tolerance * x.abs() && diff <= tolerance * y.abs()
}

/// Coefficients derived once from the market state and the payoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreekCoefficients {
    /// d1 = ln(F/K)/σ + σ/2
    pub d1: f64,
    /// d2 = d1 − σ
    pub d2: f64,
    /// N(d1)
    pub cum_d1: f64,
    /// N(d2)
    pub cum_d2: f64,
    /// n(d1)
    pub n_d1: f64,
    /// n(d2)
    pub n_d2: f64,
    /// Forward coefficient
    pub alpha: f64,
    /// Effective strike coefficient
    pub beta: f64,
    /// ∂α/∂d1
    pub d_alpha_d_d1: f64,
    /// ∂β/∂d2
    pub d_beta_d_d2: f64,
    /// Effective strike X
    pub x: f64,
    /// ∂X/∂S
    pub dx_ds: f64,
    /// ∂X/∂K
    pub dx_dstrike: f64,
}

impl GreekCoefficients {
    fn new(option_type: OptionType, strike: f64, forward: f64, std_dev: f64) -> Self {
        let (d1, d2, cum_d1, cum_d2, n_d1, n_d2) = if std_dev >= EPSILON {
            if close(strike, 0.0) {
                (f64::INFINITY, f64::INFINITY, 1.0, 1.0, 0.0, 0.0)
            } else {
                let d1 = (forward / strike).ln() / std_dev + 0.5 * std_dev;
                let d2 = d1 - std_dev;
                (d1, d2, norm_cdf(d1), norm_cdf(d2), norm_pdf(d1), norm_pdf(d2))
            }
        } else if close(forward, strike) {
            (0.0, 0.0, 0.5, 0.5, FRAC_1_SQRT_2PI, FRAC_1_SQRT_2PI)
        } else if forward > strike {
            (f64::INFINITY, f64::INFINITY, 1.0, 1.0, 0.0, 0.0)
        } else {
            (f64::NEG_INFINITY, f64::NEG_INFINITY, 0.0, 0.0, 0.0, 0.0)
        };

        let (alpha, beta) = match option_type {
            OptionType::Call => (cum_d1, -cum_d2),
            OptionType::Put => (cum_d1 - 1.0, 1.0 - cum_d2),
        };

        Self {
            d1,
            d2,
            cum_d1,
            cum_d2,
            n_d1,
            n_d2,
            alpha,
            beta,
            d_alpha_d_d1: n_d1,
            d_beta_d_d2: -n_d2,
            x: strike,
            dx_ds: 0.0,
            dx_dstrike: 1.0,
        }
    }
}

/// Rewrites the vanilla coefficients for the payoff kind.
///
/// `displacement` is the shift already applied to the forward and the
/// strikes. An asset-or-nothing payoff pays the unshifted level, so it
/// carries a cash leg of −displacement on the exercise region.
fn specialize(
    payoff: &Payoff,
    displacement: f64,
    c: &mut GreekCoefficients,
) -> Result<(), AnalyticalError> {
    let call = payoff.option_type() == OptionType::Call;
    match payoff.kind() {
        PayoffKind::PlainVanilla => {}
        PayoffKind::CashOrNothing { cash_payoff } => {
            c.alpha = 0.0;
            c.d_alpha_d_d1 = 0.0;
            c.x = cash_payoff;
            c.dx_dstrike = 0.0;
            if call {
                c.beta = c.cum_d2;
                c.d_beta_d_d2 = c.n_d2;
            } else {
                c.beta = 1.0 - c.cum_d2;
                c.d_beta_d_d2 = -c.n_d2;
            }
        }
        PayoffKind::AssetOrNothing => {
            if call {
                c.alpha = c.cum_d1;
                c.d_alpha_d_d1 = c.n_d1;
            } else {
                c.alpha = 1.0 - c.cum_d1;
                c.d_alpha_d_d1 = -c.n_d1;
            }
            if displacement == 0.0 {
                c.beta = 0.0;
                c.d_beta_d_d2 = 0.0;
            } else {
                c.x = -displacement;
                c.dx_dstrike = 0.0;
                if call {
                    c.beta = c.cum_d2;
                    c.d_beta_d_d2 = c.n_d2;
                } else {
                    c.beta = 1.0 - c.cum_d2;
                    c.d_beta_d_d2 = -c.n_d2;
                }
            }
        }
        PayoffKind::Gap { second_strike } => {
            c.x = second_strike;
            c.dx_dstrike = 0.0;
        }
        other @ PayoffKind::SuperFund { .. } => {
            return Err(AnalyticalError::UnsupportedPayoff {
                name: other.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Black-76 calculator for a single payoff and market state.
///
/// Built once per valuation and read-only afterwards.
///
/// # Examples
/// ```
/// use pricer_models::analytical::{BlackCalculator, OptionType};
///
/// let call = BlackCalculator::plain_vanilla(OptionType::Call, 100.0, 100.0, 0.2, 1.0).unwrap();
/// assert!((call.value() - 7.965567).abs() < 1e-6);
///
/// let put = BlackCalculator::plain_vanilla(OptionType::Put, 100.0, 100.0, 0.2, 1.0).unwrap();
/// assert!((call.value() - put.value()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BlackCalculator {
    payoff: Payoff,
    strike: f64,
    forward: f64,
    std_dev: f64,
    discount: f64,
    variance: f64,
    coefficients: GreekCoefficients,
}

impl BlackCalculator {
    /// Creates a calculator.
    ///
    /// # Arguments
    /// * `payoff` - Striked payoff
    /// * `forward` - Forward F (> 0)
    /// * `std_dev` - Total standard deviation σ = vol·√T (≥ 0)
    /// * `discount` - Discount factor D (> 0)
    ///
    /// # Errors
    /// - `InvalidStrike`, `InvalidForward`, `InvalidStdDev`, `InvalidDiscount`
    ///   on out-of-range inputs
    /// - `UnsupportedPayoff` for payoff kinds without a Black formula
    pub fn new(
        payoff: Payoff,
        forward: f64,
        std_dev: f64,
        discount: f64,
    ) -> Result<Self, AnalyticalError> {
        Self::build(payoff, forward, std_dev, discount, 0.0)
    }

    fn build(
        payoff: Payoff,
        forward: f64,
        std_dev: f64,
        discount: f64,
        displacement: f64,
    ) -> Result<Self, AnalyticalError> {
        let strike = payoff.strike();
        if !(strike >= 0.0) {
            return Err(AnalyticalError::InvalidStrike { strike });
        }
        if !(forward > 0.0) {
            return Err(AnalyticalError::InvalidForward { forward });
        }
        if !(std_dev >= 0.0) {
            return Err(AnalyticalError::InvalidStdDev { std_dev });
        }
        if !(discount > 0.0) {
            return Err(AnalyticalError::InvalidDiscount { discount });
        }

        let mut coefficients =
            GreekCoefficients::new(payoff.option_type(), strike, forward, std_dev);
        specialize(&payoff, displacement, &mut coefficients)?;

        tracing::trace!(
            payoff = %payoff,
            forward,
            std_dev,
            discount,
            d1 = coefficients.d1,
            d2 = coefficients.d2,
            "black calculator initialised"
        );

        Ok(Self {
            payoff,
            strike,
            forward,
            std_dev,
            discount,
            variance: std_dev * std_dev,
            coefficients,
        })
    }

    /// Plain vanilla call or put.
    pub fn plain_vanilla(
        option_type: OptionType,
        strike: f64,
        forward: f64,
        std_dev: f64,
        discount: f64,
    ) -> Result<Self, AnalyticalError> {
        Self::new(
            Payoff::plain_vanilla(option_type, strike),
            forward,
            std_dev,
            discount,
        )
    }

    /// Shifted-lognormal calculator: forward and strike levels are moved by
    /// `displacement` before valuation.
    ///
    /// Payoffs still pay in unshifted terms: an asset-or-nothing option
    /// delivers F, not F + displacement.
    pub fn with_displacement(
        payoff: Payoff,
        forward: f64,
        std_dev: f64,
        discount: f64,
        displacement: f64,
    ) -> Result<Self, AnalyticalError> {
        Self::build(
            payoff.shifted(displacement),
            forward + displacement,
            std_dev,
            discount,
            displacement,
        )
    }

    // ----------------------------------------------------------------
    // Accessors
    // ----------------------------------------------------------------

    /// Payoff being valued (after any displacement).
    pub fn payoff(&self) -> &Payoff {
        &self.payoff
    }

    /// Forward.
    pub fn forward(&self) -> f64 {
        self.forward
    }

    /// Strike.
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Total standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Discount factor.
    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Cached coefficients.
    pub fn coefficients(&self) -> &GreekCoefficients {
        &self.coefficients
    }

    /// Forward coefficient α.
    pub fn alpha(&self) -> f64 {
        self.coefficients.alpha
    }

    /// Effective strike coefficient β.
    pub fn beta(&self) -> f64 {
        self.coefficients.beta
    }

    /// N(d2): probability of finishing in the money under the forward measure.
    pub fn itm_cash_probability(&self) -> f64 {
        self.coefficients.cum_d2
    }

    /// N(d1): in-the-money probability under the asset measure.
    pub fn itm_asset_probability(&self) -> f64 {
        self.coefficients.cum_d1
    }

    // ----------------------------------------------------------------
    // Value and Greeks
    // ----------------------------------------------------------------

    /// n(d)/(σ·scale), zero in the degenerate regimes.
    fn chain(&self, density: f64, scale: f64) -> f64 {
        if density == 0.0 || scale == 0.0 || self.std_dev < EPSILON {
            0.0
        } else {
            density / (self.std_dev * scale)
        }
    }

    /// Second-order term −first/level·(1 + d/σ), zero when the first-order
    /// term vanishes.
    fn second(&self, first: f64, level: f64, d: f64) -> f64 {
        if first == 0.0 {
            0.0
        } else {
            -first / level * (1.0 + d / self.std_dev)
        }
    }

    fn check_spot(spot: f64) -> Result<(), AnalyticalError> {
        if !(spot > 0.0) {
            return Err(AnalyticalError::InvalidSpot { spot });
        }
        Ok(())
    }

    fn check_maturity(maturity: f64) -> Result<(), AnalyticalError> {
        if !(maturity >= 0.0) {
            return Err(AnalyticalError::InvalidMaturity { maturity });
        }
        Ok(())
    }

    /// Discounted value D·(F·α + X·β).
    pub fn value(&self) -> f64 {
        let c = &self.coefficients;
        self.discount * (self.forward * c.alpha + c.x * c.beta)
    }

    /// Sensitivity to the forward.
    pub fn delta_forward(&self) -> f64 {
        let c = &self.coefficients;
        let d_alpha_d_f = self.chain(c.d_alpha_d_d1, self.forward);
        let d_beta_d_f = self.chain(c.d_beta_d_d2, self.forward);
        self.discount * (d_alpha_d_f * self.forward + c.alpha + d_beta_d_f * c.x)
    }

    /// Sensitivity to the spot.
    ///
    /// # Errors
    /// - `InvalidSpot` if `spot` ≤ 0
    pub fn delta(&self, spot: f64) -> Result<f64, AnalyticalError> {
        Self::check_spot(spot)?;
        let c = &self.coefficients;
        let d_forward_d_s = self.forward / spot;
        let d_alpha_d_s = self.chain(c.d_alpha_d_d1, spot);
        let d_beta_d_s = self.chain(c.d_beta_d_d2, spot);
        Ok(self.discount
            * (d_alpha_d_s * self.forward
                + c.alpha * d_forward_d_s
                + d_beta_d_s * c.x
                + c.beta * c.dx_ds))
    }

    /// Percentage change in value per percentage change in the spot.
    ///
    /// Returns 0 when both value and delta are negligible, and
    /// `f64::MAX` / `f64::MIN` (by the sign of delta) when only the value is.
    pub fn elasticity(&self, spot: f64) -> Result<f64, AnalyticalError> {
        let value = self.value();
        let delta = self.delta(spot)?;
        Ok(Self::elasticity_of(value, delta, spot))
    }

    /// Elasticity with respect to the forward.
    pub fn elasticity_forward(&self) -> f64 {
        Self::elasticity_of(self.value(), self.delta_forward(), self.forward)
    }

    fn elasticity_of(value: f64, delta: f64, level: f64) -> f64 {
        if value > EPSILON {
            delta / value * level
        } else if delta.abs() < EPSILON {
            0.0
        } else if delta > 0.0 {
            f64::MAX
        } else {
            f64::MIN
        }
    }

    /// Second derivative with respect to the forward.
    pub fn gamma_forward(&self) -> f64 {
        let c = &self.coefficients;
        let f = self.forward;
        let d_alpha_d_f = self.chain(c.d_alpha_d_d1, f);
        let d_beta_d_f = self.chain(c.d_beta_d_d2, f);
        let d2_alpha_d_f2 = self.second(d_alpha_d_f, f, c.d1);
        let d2_beta_d_f2 = self.second(d_beta_d_f, f, c.d2);
        self.discount * (d2_alpha_d_f2 * f + 2.0 * d_alpha_d_f + d2_beta_d_f2 * c.x)
    }

    /// Second derivative with respect to the spot.
    ///
    /// # Errors
    /// - `InvalidSpot` if `spot` ≤ 0
    pub fn gamma(&self, spot: f64) -> Result<f64, AnalyticalError> {
        Self::check_spot(spot)?;
        let c = &self.coefficients;
        let d_forward_d_s = self.forward / spot;
        let d_alpha_d_s = self.chain(c.d_alpha_d_d1, spot);
        let d_beta_d_s = self.chain(c.d_beta_d_d2, spot);
        let d2_alpha_d_s2 = self.second(d_alpha_d_s, spot, c.d1);
        let d2_beta_d_s2 = self.second(d_beta_d_s, spot, c.d2);
        Ok(self.discount
            * (d2_alpha_d_s2 * self.forward
                + 2.0 * d_alpha_d_s * d_forward_d_s
                + d2_beta_d_s2 * c.x
                + 2.0 * d_beta_d_s * c.dx_ds))
    }

    /// Time decay per year, −∂V/∂T.
    ///
    /// # Errors
    /// - `InvalidMaturity` if `maturity` < 0
    /// - `InvalidSpot` if `spot` ≤ 0
    pub fn theta(&self, spot: f64, maturity: f64) -> Result<f64, AnalyticalError> {
        Self::check_maturity(maturity)?;
        if close(maturity, 0.0) {
            return Ok(0.0);
        }
        let delta = self.delta(spot)?;
        let gamma = self.gamma(spot)?;
        Ok(-(self.discount.ln() * self.value()
            + (self.forward / spot).ln() * spot * delta
            + 0.5 * self.variance * spot * spot * gamma)
            / maturity)
    }

    /// Time decay per calendar day.
    pub fn theta_per_day(&self, spot: f64, maturity: f64) -> Result<f64, AnalyticalError> {
        Ok(self.theta(spot, maturity)? / 365.0)
    }

    /// Sensitivity to the annualised volatility.
    ///
    /// # Errors
    /// - `InvalidMaturity` if `maturity` < 0
    pub fn vega(&self, maturity: f64) -> Result<f64, AnalyticalError> {
        Self::check_maturity(maturity)?;
        let c = &self.coefficients;
        let (d_alpha_d_sigma, d_beta_d_sigma) = if self.std_dev < EPSILON {
            (0.0, 0.0)
        } else {
            let log_moneyness = (self.strike / self.forward).ln() / self.variance;
            let da = if c.d_alpha_d_d1 == 0.0 {
                0.0
            } else {
                c.d_alpha_d_d1 * (log_moneyness + 0.5)
            };
            let db = if c.d_beta_d_d2 == 0.0 {
                0.0
            } else {
                c.d_beta_d_d2 * (log_moneyness - 0.5)
            };
            (da, db)
        };
        Ok(self.discount
            * maturity.sqrt()
            * (d_alpha_d_sigma * self.forward + d_beta_d_sigma * c.x))
    }

    /// Sensitivity to the financing rate.
    ///
    /// # Errors
    /// - `InvalidMaturity` if `maturity` < 0
    pub fn rho(&self, maturity: f64) -> Result<f64, AnalyticalError> {
        Self::check_maturity(maturity)?;
        let c = &self.coefficients;
        let d_alpha_d_r = self.chain(c.d_alpha_d_d1, 1.0);
        let d_beta_d_r = self.chain(c.d_beta_d_d2, 1.0);
        let undiscounted =
            d_alpha_d_r * self.forward + c.alpha * self.forward + d_beta_d_r * c.x;
        Ok(maturity * (self.discount * undiscounted - self.value()))
    }

    /// Sensitivity to the dividend (foreign) rate.
    ///
    /// # Errors
    /// - `InvalidMaturity` if `maturity` < 0
    pub fn dividend_rho(&self, maturity: f64) -> Result<f64, AnalyticalError> {
        Self::check_maturity(maturity)?;
        let c = &self.coefficients;
        let d_alpha_d_q = -self.chain(c.d_alpha_d_d1, 1.0);
        let d_beta_d_q = -self.chain(c.d_beta_d_d2, 1.0);
        let undiscounted =
            d_alpha_d_q * self.forward - c.alpha * self.forward + d_beta_d_q * c.x;
        Ok(maturity * self.discount * undiscounted)
    }

    /// Sensitivity to the strike.
    pub fn strike_sensitivity(&self) -> f64 {
        let c = &self.coefficients;
        let d_alpha_d_k = -self.chain(c.d_alpha_d_d1, self.strike);
        let d_beta_d_k = -self.chain(c.d_beta_d_d2, self.strike);
        self.discount
            * (d_alpha_d_k * self.forward + d_beta_d_k * c.x + c.beta * c.dx_dstrike)
    }
}
