//! Business/252 day count convention.

use std::sync::Arc;

use super::DayCount;
use crate::calendars::Calendar;
use crate::types::Date;

/// Business/252: business days under a calendar over a 252-day year.
///
/// Used for BRL instruments. The day count is the number of business days
/// in `[start, end)`, negative when `end < start`.
#[derive(Debug, Clone)]
pub struct Business252 {
    calendar: Arc<dyn Calendar>,
}

impl Business252 {
    /// Creates the convention on the given calendar.
    #[must_use]
    pub fn new(calendar: Arc<dyn Calendar>) -> Self {
        Self { calendar }
    }

    /// Returns the calendar used for counting.
    #[must_use]
    pub fn calendar(&self) -> &Arc<dyn Calendar> {
        &self.calendar
    }
}

impl DayCount for Business252 {
    fn name(&self) -> &'static str {
        "Business/252"
    }

    fn year_fraction(&self, start: Date, end: Date) -> f64 {
        self.day_count(start, end) as f64 / 252.0
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        self.calendar.business_days_between(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendars::WeekendCalendar;
    use approx::assert_relative_eq;

    #[test]
    fn test_business252_counts_weekdays() {
        let dc = Business252::new(Arc::new(WeekendCalendar));
        // Monday to Monday two weeks later
        let start = Date::from_ymd(2025, 3, 3).unwrap();
        let end = Date::from_ymd(2025, 3, 17).unwrap();

        assert_eq!(dc.day_count(start, end), 10);
        assert_relative_eq!(dc.year_fraction(start, end), 10.0 / 252.0);
        assert_eq!(dc.day_count(end, start), -10);
    }
}
