//! Actual/Actual (ISDA) day count convention.

use super::DayCount;
use crate::types::Date;

/// Actual/Actual ISDA day count convention.
///
/// The year fraction is calculated by splitting the period into
/// portions that fall in leap years vs non-leap years.
///
/// # Formula
///
/// $$\text{Year Fraction} = \frac{\text{Days in non-leap year}}{365} + \frac{\text{Days in leap year}}{366}$$
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActActIsda;

impl DayCount for ActActIsda {
    fn name(&self) -> &'static str {
        "Actual/Actual (ISDA)"
    }

    fn year_fraction(&self, start: Date, end: Date) -> f64 {
        if start == end {
            return 0.0;
        }
        if start > end {
            return -self.year_fraction(end, start);
        }

        let y1 = start.year();
        let y2 = end.year();
        let basis1 = f64::from(start.days_in_year());
        let basis2 = f64::from(end.days_in_year());

        if y1 == y2 {
            return start.days_between(&end) as f64 / basis1;
        }

        // first day of the year after start, and of the end year
        let next_year = start.add_days(i64::from(start.days_in_year() - start.day_of_year() + 1));
        let end_year = end.add_days(-i64::from(end.day_of_year() - 1));

        let head = start.days_between(&next_year) as f64 / basis1;
        let tail = end_year.days_between(&end) as f64 / basis2;
        head + f64::from(y2 - y1 - 1) + tail
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }
}
