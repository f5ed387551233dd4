//! Configuration for the Black Ibor coupon pricer.

use serde::Deserialize;
use thiserror::Error;

use crate::pricers::TimingAdjustment;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// TOML could not be parsed.
    #[error("Failed to parse TOML: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for [`BlackIborCouponPricer`](crate::pricers::BlackIborCouponPricer).
///
/// # Default Values
///
/// | Parameter | Default | Description |
/// |-----------|---------|-------------|
/// | `timing_adjustment` | `black76` | Timing-adjustment model |
/// | `correlation` | 1.0 | Correlation quote used by the bivariate model |
///
/// # Examples
///
/// ```rust
/// use pricer_models::config::CouponPricerConfig;
/// use pricer_models::pricers::TimingAdjustment;
///
/// let config = CouponPricerConfig::from_toml_str(
///     r#"
///     timing_adjustment = "bivariate_lognormal"
///     correlation = 0.8
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.timing_adjustment, TimingAdjustment::BivariateLognormal);
/// assert_eq!(config.correlation, 0.8);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CouponPricerConfig {
    /// Timing-adjustment model (default: Black76).
    pub timing_adjustment: TimingAdjustment,

    /// Correlation between the index rate and the rate to payment
    /// (default: 1.0).
    pub correlation: f64,
}

impl Default for CouponPricerConfig {
    fn default() -> Self {
        Self {
            timing_adjustment: TimingAdjustment::Black76,
            correlation: 1.0,
        }
    }
}

impl CouponPricerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timing-adjustment model.
    pub fn with_timing_adjustment(mut self, timing_adjustment: TimingAdjustment) -> Self {
        self.timing_adjustment = timing_adjustment;
        self
    }

    /// Sets the correlation.
    pub fn with_correlation(mut self, correlation: f64) -> Self {
        self.correlation = correlation;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.correlation.is_finite() || !(-1.0..=1.0).contains(&self.correlation) {
            return Err(ConfigError::Invalid(format!(
                "correlation {} must be within [-1, 1]",
                self.correlation
            )));
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CouponPricerConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
