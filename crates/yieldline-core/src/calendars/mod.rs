//! Business day calendars and conventions.
//!
//! This module provides:
//! - Business day calendars ([`Target`], [`WeekendCalendar`], [`NullCalendar`], [`JointCalendar`])
//! - Business day adjustment conventions
//! - Period arithmetic on business days, with the end-of-month rule

use std::fmt;
use std::sync::Arc;

mod bitmap;
mod conventions;
mod target;

pub use bitmap::{easter_sunday, HolidayBitmap, HolidayCalendarBuilder};
pub use conventions::BusinessDayConvention;
pub use target::Target;

use crate::error::CoreResult;
use crate::types::{Date, Period, TimeUnit};

/// Trait for business day calendars.
///
/// Calendars determine which days are business days vs holidays
/// for a specific market or jurisdiction.
pub trait Calendar: Send + Sync + fmt::Debug {
    /// Returns the name of the calendar.
    fn name(&self) -> &'static str;

    /// Returns true if the date is a business day.
    fn is_business_day(&self, date: Date) -> bool;

    /// Returns true if the date is a holiday or weekend.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Adjusts a date according to the given business day convention.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        conventions::adjust(date, convention, self)
    }

    /// Moves a date by `n` business days.
    ///
    /// `n == 0` rolls a holiday forward to the next business day.
    fn advance_days(&self, date: Date, n: i32) -> Date {
        if n == 0 {
            return self.adjust(date, BusinessDayConvention::Following);
        }

        let step: i64 = if n > 0 { 1 } else { -1 };
        let mut result = date;
        for _ in 0..n.unsigned_abs() {
            result = result.add_days(step);
            while self.is_holiday(result) {
                result = result.add_days(step);
            }
        }
        result
    }

    /// Moves a date by a period.
    ///
    /// Day periods count business days. Week periods move by calendar weeks
    /// and then adjust. Month and year periods clamp to the month end, keep
    /// the business end of month when `end_of_month` is set and the start is
    /// one, and then adjust.
    fn advance(
        &self,
        date: Date,
        period: Period,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> CoreResult<Date> {
        let n = period.length();
        if n == 0 {
            return Ok(self.adjust(date, convention));
        }

        match period.unit() {
            TimeUnit::Days => Ok(self.advance_days(date, n)),
            TimeUnit::Weeks => Ok(self.adjust(date.advance(period)?, convention)),
            TimeUnit::Months | TimeUnit::Years => {
                let moved = date.advance(period)?;
                if end_of_month && self.is_end_of_month(date) {
                    Ok(self.end_of_month(moved))
                } else {
                    Ok(self.adjust(moved, convention))
                }
            }
        }
    }

    /// Returns true if `date` is the last business day of its month.
    fn is_end_of_month(&self, date: Date) -> bool {
        date.month() != self.adjust(date.add_days(1), BusinessDayConvention::Following).month()
    }

    /// Returns the last business day of the date's month.
    fn end_of_month(&self, date: Date) -> Date {
        self.adjust(date.end_of_month(), BusinessDayConvention::Preceding)
    }

    /// Counts business days in `[from, to)`.
    ///
    /// Negative when `to < from`.
    fn business_days_between(&self, from: Date, to: Date) -> i64 {
        let (start, end, sign) = if from <= to {
            (from, to, 1)
        } else {
            (to, from, -1)
        };

        let mut count = 0;
        let mut current = start;
        while current < end {
            if self.is_business_day(current) {
                count += 1;
            }
            current = current.add_days(1);
        }
        sign * count
    }
}

/// A weekend-only calendar (no holidays).
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalendar;

impl Calendar for WeekendCalendar {
    fn name(&self) -> &'static str {
        "Weekend Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend()
    }
}

/// A calendar where every day is a business day.
///
/// Used for unadjusted date generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCalendar;

impl Calendar for NullCalendar {
    fn name(&self) -> &'static str {
        "Null"
    }

    fn is_business_day(&self, _date: Date) -> bool {
        true
    }
}

/// Calendar joining the holidays of several calendars.
///
/// A day is a business day only if every member calendar considers it one.
#[derive(Debug, Clone)]
pub struct JointCalendar {
    calendars: Vec<Arc<dyn Calendar>>,
}

impl JointCalendar {
    /// Creates a joint calendar.
    #[must_use]
    pub fn new(calendars: Vec<Arc<dyn Calendar>>) -> Self {
        Self { calendars }
    }

    /// Returns the member names joined with `+`.
    #[must_use]
    pub fn joint_name(&self) -> String {
        self.calendars
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl Calendar for JointCalendar {
    fn name(&self) -> &'static str {
        "Joint"
    }

    fn is_business_day(&self, date: Date) -> bool {
        self.calendars.iter().all(|cal| cal.is_business_day(date))
    }
}
