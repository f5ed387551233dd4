//! Bachelier (normal) option formula.
//!
//! Used for optionlets quoted in normal volatility, where the forward rate
//! and the strike may be negative.
//!
//! ## Mathematical Formula
//!
//! **Price**: V = D · (σ·φ(h) + ω(F − K)·N(h)),  h = ω(F − K)/σ
//!
//! Where ω = +1 for calls and −1 for puts, σ is the total standard
//! deviation and D the discount factor.

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use super::payoff::OptionType;

/// Discounted Bachelier price of a call or put.
///
/// # Arguments
/// * `option_type` - Call or put
/// * `strike` - Strike (any sign)
/// * `forward` - Forward (any sign)
/// * `std_dev` - Total normal standard deviation (≥ 0)
/// * `discount` - Discount factor (> 0)
///
/// # Errors
/// - `InvalidStdDev` if `std_dev` < 0
/// - `InvalidDiscount` if `discount` ≤ 0
///
/// # Examples
/// ```
/// use pricer_models::analytical::{bachelier_black_formula, OptionType};
///
/// let call = bachelier_black_formula(OptionType::Call, 0.01, 0.01, 0.005, 1.0).unwrap();
/// let put = bachelier_black_formula(OptionType::Put, 0.01, 0.01, 0.005, 1.0).unwrap();
/// assert!((call - put).abs() < 1e-15);
///
/// // Negative forward
/// let floor = bachelier_black_formula(OptionType::Put, 0.0, -0.002, 0.004, 1.0).unwrap();
/// assert!(floor > 0.002);
/// ```
pub fn bachelier_black_formula(
    option_type: OptionType,
    strike: f64,
    forward: f64,
    std_dev: f64,
    discount: f64,
) -> Result<f64, AnalyticalError> {
    if !(std_dev >= 0.0) {
        return Err(AnalyticalError::InvalidStdDev { std_dev });
    }
    if !(discount > 0.0) {
        return Err(AnalyticalError::InvalidDiscount { discount });
    }

    let moneyness = (forward - strike) * option_type.sign();
    if std_dev == 0.0 {
        return Ok(discount * moneyness.max(0.0));
    }
    let h = moneyness / std_dev;
    Ok(discount * (std_dev * norm_pdf(h) + moneyness * norm_cdf(h)))
}
