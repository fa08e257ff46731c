//! Day count conventions.
//!
//! Day count conventions determine how time between two dates is converted
//! into a year fraction. Term structures measure their time axis with one,
//! and every accrual period in a coupon uses one.
//!
//! # Supported Conventions
//!
//! - [`Act360`]: Actual/360, money market convention
//! - [`Act365Fixed`]: Actual/365 Fixed
//! - [`ActActIsda`]: Actual/Actual ISDA, year-based split
//! - [`Thirty360US`]: 30/360 US with February end-of-month rules
//! - [`Thirty360E`]: 30E/360, Eurobond basis
//! - [`Business252`]: business days over 252, on a calendar
//!
//! # Usage
//!
//! ```rust
//! use yieldline_core::daycounts::{DayCount, DayCountConvention};
//! use yieldline_core::types::Date;
//!
//! let dc = DayCountConvention::Thirty360E.to_day_counter();
//! let start = Date::from_ymd(2025, 1, 15).unwrap();
//! let end = Date::from_ymd(2025, 7, 15).unwrap();
//!
//! assert_eq!(dc.day_count(start, end), 180);
//! assert!((dc.year_fraction(start, end) - 0.5).abs() < 1e-15);
//! ```

mod act360;
mod act365;
mod actact;
mod business252;
mod thirty360;

pub use act360::Act360;
pub use act365::Act365Fixed;
pub use actact::ActActIsda;
pub use business252::Business252;
pub use thirty360::{Thirty360E, Thirty360US};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

/// Trait for day count conventions.
///
/// Implementations must be thread-safe (`Send + Sync`); curves share them
/// across threads through [`DayCounter`].
pub trait DayCount: Send + Sync + fmt::Debug {
    /// Returns the name of the day count convention.
    fn name(&self) -> &'static str;

    /// Calculates the year fraction between two dates.
    ///
    /// Negative if `end < start`.
    fn year_fraction(&self, start: Date, end: Date) -> f64;

    /// Calculates the day count between two dates.
    ///
    /// For ACT conventions, this is actual calendar days.
    /// For 30/360 conventions, this uses the 30-day month assumption.
    fn day_count(&self, start: Date, end: Date) -> i64;

    /// Year fraction with an optional reference period.
    ///
    /// None of the conventions here depend on the reference period; the
    /// default ignores it.
    fn year_fraction_with_reference(
        &self,
        start: Date,
        end: Date,
        _ref_start: Option<Date>,
        _ref_end: Option<Date>,
    ) -> f64 {
        self.year_fraction(start, end)
    }
}

/// Shared, thread-safe day counter.
pub type DayCounter = Arc<dyn DayCount>;

/// Serializable selector for the calendar-free day count conventions.
///
/// # Example
///
/// ```rust
/// use yieldline_core::daycounts::DayCountConvention;
///
/// let convention: DayCountConvention = "ACT/360".parse().unwrap();
/// assert_eq!(convention.to_day_counter().name(), "Actual/360");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// Actual/360
    Act360,
    /// Actual/365 Fixed
    Act365Fixed,
    /// Actual/Actual ISDA
    ActActIsda,
    /// 30/360 US (Bond Basis)
    Thirty360US,
    /// 30E/360 (Eurobond Basis)
    Thirty360E,
}

impl DayCountConvention {
    /// Creates a shared day counter for the convention.
    #[must_use]
    pub fn to_day_counter(&self) -> DayCounter {
        match self {
            DayCountConvention::Act360 => Arc::new(Act360),
            DayCountConvention::Act365Fixed => Arc::new(Act365Fixed),
            DayCountConvention::ActActIsda => Arc::new(ActActIsda),
            DayCountConvention::Thirty360US => Arc::new(Thirty360US),
            DayCountConvention::Thirty360E => Arc::new(Thirty360E),
        }
    }

    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act360 => "ACT/360",
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::ActActIsda => "ACT/ACT ISDA",
            DayCountConvention::Thirty360US => "30/360 US",
            DayCountConvention::Thirty360E => "30E/360",
        }
    }

    /// Returns all available day count conventions.
    #[must_use]
    pub fn all() -> &'static [DayCountConvention] {
        &[
            DayCountConvention::Act360,
            DayCountConvention::Act365Fixed,
            DayCountConvention::ActActIsda,
            DayCountConvention::Thirty360US,
            DayCountConvention::Thirty360E,
        ]
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DayCountConvention {
    type Err = CoreError;

    /// Parses market-style names ("ACT/360") and enum-style names ("Act360").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "ACT/360" | "ACTUAL/360" | "ACT360" => Ok(DayCountConvention::Act360),
            "ACT/365" | "ACT/365F" | "ACT/365 FIXED" | "ACTUAL/365" | "ACT365FIXED" => {
                Ok(DayCountConvention::Act365Fixed)
            }
            "ACT/ACT" | "ACT/ACT ISDA" | "ACTUAL/ACTUAL" | "ACTACTISDA" => {
                Ok(DayCountConvention::ActActIsda)
            }
            "30/360" | "30/360 US" | "BOND" | "THIRTY360US" => Ok(DayCountConvention::Thirty360US),
            "30E/360" | "EUROBOND" | "THIRTY360E" => Ok(DayCountConvention::Thirty360E),
            _ => Err(CoreError::invalid_argument(format!(
                "unknown day count convention: '{s}'"
            ))),
        }
    }
}
