//! Coupon construction error types.

use pricer_core::types::{Date, DateError, PricingError};
use thiserror::Error;

/// Errors that can occur while building a coupon.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CouponError {
    /// Missing required field in builder.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Accrual start must be before accrual end.
    #[error("Accrual start {start} must be before accrual end {end}")]
    InvalidAccrualPeriod {
        /// The accrual start date.
        start: Date,
        /// The accrual end date.
        end: Date,
    },

    /// Cap below floor.
    #[error("Cap {cap} is below floor {floor}")]
    CapBelowFloor {
        /// The cap rate.
        cap: f64,
        /// The floor rate.
        floor: f64,
    },

    /// Date arithmetic failure.
    #[error("Date arithmetic failed: {0}")]
    Date(#[from] DateError),
}

impl From<CouponError> for PricingError {
    fn from(err: CouponError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = CouponError::MissingField { field: "index" };
        assert_eq!(format!("{}", err), "Missing required field: index");
    }

    #[test]
    fn test_cap_below_floor_display() {
        let err = CouponError::CapBelowFloor {
            cap: 0.01,
            floor: 0.02,
        };
        assert_eq!(format!("{}", err), "Cap 0.01 is below floor 0.02");
    }

    #[test]
    fn test_into_pricing_error() {
        let start = Date::from_ymd(2024, 7, 1).unwrap();
        let err: PricingError = CouponError::InvalidAccrualPeriod { start, end: start }.into();
        match err {
            PricingError::InvalidInput(msg) => assert!(msg.contains("2024-07-01")),
            _ => panic!("Expected InvalidInput variant"),
        }
    }
}
