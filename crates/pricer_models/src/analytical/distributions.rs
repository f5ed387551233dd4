//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)
//!
//! The CDF is built on the complementary error function from `statrs`,
//! which keeps full double precision in both tails. Finite-difference
//! checks of the Black Greeks rely on that accuracy.

use statrs::function::erf::erfc;

/// Square root of 2.
const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// 1 / sqrt(2 * pi)
pub const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal cumulative distribution function.
///
/// # Mathematical Definition
/// Φ(x) = (1/2) * erfc(-x / sqrt(2))
///
/// Infinite arguments map to the limits 0 and 1.
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert_eq!(norm_cdf(f64::INFINITY), 1.0);
/// assert_eq!(norm_cdf(f64::NEG_INFINITY), 0.0);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal probability density function.
///
/// # Mathematical Definition
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0) - 0.3989422804).abs() < 1e-10);
/// assert_eq!(norm_pdf(f64::INFINITY), 0.0);
/// ```
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}
