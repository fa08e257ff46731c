//! TARGET calendar for Eurozone payments and settlement.
//!
//! TARGET (Trans-European Automated Real-time Gross Settlement Express
//! Transfer) is the Eurosystem settlement calendar used for Euribor
//! fixings and EUR swap schedules.

use std::sync::OnceLock;

use super::bitmap::{HolidayBitmap, HolidayCalendarBuilder, MAX_YEAR, MIN_YEAR};
use super::Calendar;
use crate::types::Date;

static TARGET_HOLIDAYS: OnceLock<HolidayBitmap> = OnceLock::new();

/// TARGET holiday calendar.
///
/// ## Holidays
///
/// - New Year's Day (January 1)
/// - Good Friday, from 2000
/// - Easter Monday, from 2000
/// - Labour Day (May 1), from 2000
/// - Christmas Day (December 25)
/// - Day of Goodwill (December 26), from 2000
/// - December 31 in 1998, 1999 and 2001
///
/// Holidays falling on a weekend are not moved.
///
/// The holiday bitmap is built once per process and shared by every
/// instance, so `Target` is a zero-sized handle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target;

impl Target {
    /// Creates the calendar.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn holidays() -> &'static HolidayBitmap {
        TARGET_HOLIDAYS.get_or_init(build_target_holidays)
    }
}

impl Calendar for Target {
    fn name(&self) -> &'static str {
        "TARGET"
    }

    fn is_business_day(&self, date: Date) -> bool {
        Self::holidays().is_business_day(date.as_naive_date())
    }
}

fn build_target_holidays() -> HolidayBitmap {
    HolidayCalendarBuilder::new("TARGET")
        .add_fixed_holiday(1, 1, MIN_YEAR, MAX_YEAR)
        // Good Friday and Easter Monday
        .add_easter_holiday(-2, 2000, MAX_YEAR)
        .add_easter_holiday(1, 2000, MAX_YEAR)
        .add_fixed_holiday(5, 1, 2000, MAX_YEAR)
        .add_fixed_holiday(12, 25, MIN_YEAR, MAX_YEAR)
        .add_fixed_holiday(12, 26, 2000, MAX_YEAR)
        .add_fixed_holiday(12, 31, 1998, 1999)
        .add_fixed_holiday(12, 31, 2001, 2001)
        .build()
}
