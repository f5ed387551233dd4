//! Time types and Day Count Conventions for coupon calculations.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate
//! - `DayCountConvention`: Industry-standard day count conventions
//! - Signed year fraction calculations between dates
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::time::{Date, DayCountConvention};
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 7, 1).unwrap();
//!
//! // Calculate year fraction using ACT/365
//! let yf = DayCountConvention::ActualActual365.year_fraction(start, end);
//! assert!((yf - 0.4986).abs() < 0.001);
//! ```

use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Provides ISO 8601 serialisation, ordering and the small amount of date
/// arithmetic the coupon pricers need (day and month offsets).
///
/// # Examples
///
/// ```
/// use pricer_core::types::time::Date;
///
/// let date = Date::from_ymd(2024, 6, 15).unwrap();
/// assert_eq!(date.year(), 2024);
///
/// // Parse from ISO 8601 string
/// let parsed: Date = "2024-06-15".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// // Days between dates
/// let later = date.add_days(10).unwrap();
/// assert_eq!(later - date, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// # Returns
    /// `Ok(Date)` if the date is valid, `Err(DateError::InvalidDate)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// assert!(Date::from_ymd(2024, 2, 29).is_ok());
    /// assert!(Date::from_ymd(2023, 2, 29).is_err());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses a date from ISO 8601 format string (YYYY-MM-DD).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(e.to_string()))
    }

    /// Returns the underlying NaiveDate.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the date shifted by a signed number of calendar days.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// let d = Date::from_ymd(2024, 3, 1).unwrap();
    /// assert_eq!(d.add_days(-1).unwrap(), Date::from_ymd(2024, 2, 29).unwrap());
    /// ```
    pub fn add_days(self, days: i64) -> Result<Self, DateError> {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| DateError::OutOfRange(format!("{} {:+} days", self, days)))
    }

    /// Returns the date shifted by a signed number of months.
    ///
    /// The day of month is clamped to the last day of the target month
    /// (e.g. 31 January + 1 month = 29 February in a leap year).
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::Date;
    ///
    /// let d = Date::from_ymd(2024, 1, 31).unwrap();
    /// assert_eq!(d.add_months(1).unwrap(), Date::from_ymd(2024, 2, 29).unwrap());
    /// ```
    pub fn add_months(self, months: i32) -> Result<Self, DateError> {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| DateError::OutOfRange(format!("{} {:+} months", self, months)))
    }
}

impl Sub for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    ///
    /// The result is positive if `self` is after `other`, negative otherwise.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    /// Formats the date as ISO 8601 (YYYY-MM-DD).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Day Count Convention (year fraction convention).
///
/// # Variants
/// - `ActualActual365`: Actual days / 365
/// - `ActualActual360`: Actual days / 360 (money-market indices)
/// - `Thirty360`: Each month treated as 30 days, year as 360 days
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCountConvention {
    /// Actual/365 Fixed: actual_days / 365.0
    ActualActual365,

    /// Actual/360: actual_days / 360.0
    ActualActual360,

    /// 30/360 US Bond Basis
    Thirty360,
}

impl DayCountConvention {
    /// Returns the standard convention name.
    ///
    /// ```
    /// use pricer_core::types::time::DayCountConvention;
    ///
    /// assert_eq!(DayCountConvention::ActualActual360.name(), "ACT/360");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::ActualActual365 => "ACT/365",
            DayCountConvention::ActualActual360 => "ACT/360",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Calculates the year fraction between two dates.
    ///
    /// The result is negative when `start > end`; timing adjustments rely
    /// on the sign to detect payment dates that precede the rate period.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_core::types::time::{Date, DayCountConvention};
    ///
    /// let start = Date::from_ymd(2024, 1, 1).unwrap();
    /// let end = Date::from_ymd(2024, 7, 1).unwrap();
    ///
    /// let yf = DayCountConvention::ActualActual360.year_fraction(start, end);
    /// assert!((yf - 0.5056).abs() < 0.001);
    ///
    /// let yf_neg = DayCountConvention::ActualActual360.year_fraction(end, start);
    /// assert!((yf_neg + 0.5056).abs() < 0.001);
    /// ```
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        match self {
            DayCountConvention::ActualActual365 => (end - start) as f64 / 365.0,
            DayCountConvention::ActualActual360 => (end - start) as f64 / 360.0,
            DayCountConvention::Thirty360 => {
                let (from, to, sign) = if start <= end {
                    (start, end, 1.0)
                } else {
                    (end, start, -1.0)
                };

                let d1 = if from.day() == 31 { 30 } else { from.day() };
                let d2 = if to.day() == 31 && d1 == 30 { 30 } else { to.day() };

                let days = 360 * (to.year() - from.year())
                    + 30 * (to.month() as i32 - from.month() as i32)
                    + (d2 as i32 - d1 as i32);
                sign * days as f64 / 360.0
            }
        }
    }
}

impl FromStr for DayCountConvention {
    type Err = String;

    /// Parses day count convention from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['/', ' '], "").as_str() {
            "ACT365" | "ACTUAL365" | "A365" => Ok(DayCountConvention::ActualActual365),
            "ACT360" | "ACTUAL360" | "A360" => Ok(DayCountConvention::ActualActual360),
            "30360" | "THIRTY360" => Ok(DayCountConvention::Thirty360),
            _ => Err(format!("Unknown day count convention: {}", s)),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
