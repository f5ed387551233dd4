//! Timing-adjustment models for coupons paid off their natural schedule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Model for the convexity correction of a forward rate paid at a date
/// other than its natural payment date.
///
/// - `Black76`: lognormal (or normal) forward with the correction applied
///   to in-arrears coupons only
/// - `BivariateLognormal`: joint model of the index rate and the rate to
///   the payment date, with a correlation between the two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingAdjustment {
    /// Single-rate Black-76 adjustment.
    #[default]
    Black76,
    /// Two correlated lognormal rates.
    BivariateLognormal,
}

impl TimingAdjustment {
    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            TimingAdjustment::Black76 => "black76",
            TimingAdjustment::BivariateLognormal => "bivariate_lognormal",
        }
    }
}

impl fmt::Display for TimingAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TimingAdjustment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "black76" => Ok(TimingAdjustment::Black76),
            "bivariate_lognormal" | "bivariatelognormal" => {
                Ok(TimingAdjustment::BivariateLognormal)
            }
            _ => Err(format!("unknown timing adjustment: {}", s)),
        }
    }
}
