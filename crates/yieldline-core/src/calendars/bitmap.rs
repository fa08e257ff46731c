//! Bitmap-based holiday storage for O(1) lookups.

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// Minimum year supported by the bitmap.
pub const MIN_YEAR: i32 = 1970;
/// Maximum year supported by the bitmap.
pub const MAX_YEAR: i32 = 2100;

const YEAR_COUNT: usize = (MAX_YEAR - MIN_YEAR + 1) as usize;
const MAX_DAYS_PER_YEAR: usize = 366;
const TOTAL_BITS: usize = YEAR_COUNT * MAX_DAYS_PER_YEAR;
const WORD_COUNT: usize = TOTAL_BITS.div_ceil(64);

/// Holiday bitmap over Saturday/Sunday weekends.
///
/// One bit per day of year for every year in `MIN_YEAR..=MAX_YEAR`.
/// Dates outside the range are never holidays.
#[derive(Clone)]
pub struct HolidayBitmap {
    name: &'static str,
    bits: Box<[u64; WORD_COUNT]>,
}

impl std::fmt::Debug for HolidayBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolidayBitmap")
            .field("name", &self.name)
            .field("holiday_count", &self.count_holidays())
            .finish()
    }
}

impl HolidayBitmap {
    /// Creates an empty bitmap.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bits: Box::new([0u64; WORD_COUNT]),
        }
    }

    /// Returns the calendar name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Marks a date as a holiday.
    pub fn add_holiday(&mut self, date: NaiveDate) {
        if let Some((word_idx, bit_idx)) = Self::date_to_indices(date) {
            self.bits[word_idx] |= 1u64 << bit_idx;
        }
    }

    /// Checks if a date is a holiday (weekends excluded).
    #[inline]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        Self::date_to_indices(date)
            .is_some_and(|(word_idx, bit_idx)| (self.bits[word_idx] & (1u64 << bit_idx)) != 0)
    }

    /// Checks if a date is neither a weekend nor a holiday.
    #[inline]
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        if matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            return false;
        }
        !self.is_holiday(date)
    }

    /// Counts the holidays stored.
    pub fn count_holidays(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    fn date_to_indices(date: NaiveDate) -> Option<(usize, usize)> {
        let year = date.year();
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }

        let year_offset = (year - MIN_YEAR) as usize;
        let bit_position = year_offset * MAX_DAYS_PER_YEAR + date.ordinal0() as usize;
        Some((bit_position / 64, bit_position % 64))
    }
}

/// Builder for holiday bitmaps from yearly rules.
pub struct HolidayCalendarBuilder {
    name: &'static str,
    holidays: HashSet<NaiveDate>,
}

impl HolidayCalendarBuilder {
    /// Creates a builder.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            holidays: HashSet::new(),
        }
    }

    /// Adds a single holiday.
    pub fn add_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }

    /// Adds a fixed-date holiday for every year in `from_year..=to_year`.
    ///
    /// Holidays falling on a weekend are not moved.
    pub fn add_fixed_holiday(mut self, month: u32, day: u32, from_year: i32, to_year: i32) -> Self {
        for year in from_year.max(MIN_YEAR)..=to_year.min(MAX_YEAR) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date);
            }
        }
        self
    }

    /// Adds a holiday at an offset from Easter Sunday for `from_year..=to_year`.
    pub fn add_easter_holiday(mut self, offset_days: i64, from_year: i32, to_year: i32) -> Self {
        for year in from_year.max(MIN_YEAR)..=to_year.min(MAX_YEAR) {
            if let Some(date) = easter_sunday(year)
                .and_then(|easter| easter.checked_add_signed(chrono::Duration::days(offset_days)))
            {
                self.holidays.insert(date);
            }
        }
        self
    }

    /// Builds the bitmap.
    pub fn build(self) -> HolidayBitmap {
        let mut bitmap = HolidayBitmap::new(self.name);
        for date in self.holidays {
            bitmap.add_holiday(date);
        }
        bitmap
    }
}

/// Calculates Easter Sunday using the Anonymous Gregorian algorithm.
#[allow(clippy::many_single_char_names)]
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_basic() {
        let mut bitmap = HolidayBitmap::new("Test");
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(!bitmap.is_holiday(date));

        bitmap.add_holiday(date);
        assert!(bitmap.is_holiday(date));
        assert!(!bitmap.is_business_day(date));
        assert_eq!(bitmap.count_holidays(), 1);
    }

    #[test]
    fn test_out_of_range_is_not_holiday() {
        let mut bitmap = HolidayBitmap::new("Test");
        let date = NaiveDate::from_ymd_opt(1960, 1, 1).unwrap();
        bitmap.add_holiday(date);
        assert!(!bitmap.is_holiday(date));
    }

    #[test]
    fn test_easter() {
        assert_eq!(easter_sunday(2025), NaiveDate::from_ymd_opt(2025, 4, 20));
        assert_eq!(easter_sunday(2024), NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(easter_sunday(2000), NaiveDate::from_ymd_opt(2000, 4, 23));
    }

    #[test]
    fn test_builder_year_limits() {
        let bitmap = HolidayCalendarBuilder::new("Test")
            .add_fixed_holiday(12, 31, 1998, 1999)
            .build();

        assert!(bitmap.is_holiday(NaiveDate::from_ymd_opt(1998, 12, 31).unwrap()));
        assert!(bitmap.is_holiday(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap()));
        assert!(!bitmap.is_holiday(NaiveDate::from_ymd_opt(2000, 12, 31).unwrap()));
    }
}
