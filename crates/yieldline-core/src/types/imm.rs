//! IMM dates: the third Wednesday of a month.
//!
//! Main-cycle IMM dates fall in March, June, September and December and are
//! the settlement dates of money-market futures. IMM codes are a month
//! letter plus the last digit of the year, e.g. `H5` for March 2025.

use chrono::Weekday;

use crate::error::{CoreError, CoreResult};
use crate::types::Date;

const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

fn is_main_cycle_month(month: u32) -> bool {
    month % 3 == 0
}

/// Third Wednesday of the given month.
pub fn third_wednesday(year: i32, month: u32) -> CoreResult<Date> {
    let first = Date::from_ymd(year, month, 1)?;
    let wednesday = Weekday::Wed.num_days_from_monday();
    let days_to_wednesday = (7 + wednesday - first.weekday().num_days_from_monday()) % 7;
    Ok(first.add_days(i64::from(days_to_wednesday + 14)))
}

/// Checks whether `date` is an IMM date.
///
/// With `main_cycle` only March, June, September and December qualify.
#[must_use]
pub fn is_imm_date(date: Date, main_cycle: bool) -> bool {
    if date.weekday() != Weekday::Wed || !(15..=21).contains(&date.day()) {
        return false;
    }
    !main_cycle || is_main_cycle_month(date.month())
}

/// Returns the first IMM date strictly after `date`.
pub fn next_imm_date(date: Date, main_cycle: bool) -> CoreResult<Date> {
    let mut month_start = Date::from_ymd(date.year(), date.month(), 1)?;
    // at most four months away
    for _ in 0..5 {
        if !main_cycle || is_main_cycle_month(month_start.month()) {
            let imm = third_wednesday(month_start.year(), month_start.month())?;
            if imm > date {
                return Ok(imm);
            }
        }
        month_start = month_start.add_months(1)?;
    }
    Err(CoreError::invalid_date(format!("no IMM date found after {date}")))
}

/// Returns the IMM code of an IMM date, e.g. `Z5` for 2025-12-17.
pub fn imm_code(date: Date) -> CoreResult<String> {
    if !is_imm_date(date, false) {
        return Err(CoreError::invalid_argument(format!("{date} is not an IMM date")));
    }
    let letter = MONTH_CODES[(date.month() - 1) as usize];
    Ok(format!("{letter}{}", date.year().rem_euclid(10)))
}

/// Resolves an IMM code to the first matching IMM date on or after `reference`.
pub fn imm_date_from_code(code: &str, reference: Date) -> CoreResult<Date> {
    let invalid = || CoreError::invalid_argument(format!("invalid IMM code '{code}'"));

    let mut chars = code.trim().chars();
    let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(invalid());
    };

    let month = MONTH_CODES
        .iter()
        .position(|&c| c == letter.to_ascii_uppercase())
        .ok_or_else(invalid)? as u32
        + 1;
    let digit = digit.to_digit(10).ok_or_else(invalid)? as i32;

    let decade = reference.year() - reference.year().rem_euclid(10);
    let mut imm = third_wednesday(decade + digit, month)?;
    if imm < reference {
        imm = third_wednesday(decade + digit + 10, month)?;
    }
    Ok(imm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_third_wednesday() {
        assert_eq!(third_wednesday(2025, 3).unwrap(), d(2025, 3, 19));
        assert_eq!(third_wednesday(2025, 6).unwrap(), d(2025, 6, 18));
        assert_eq!(third_wednesday(2024, 12).unwrap(), d(2024, 12, 18));
        // Month starting on a Wednesday
        assert_eq!(third_wednesday(2025, 1).unwrap(), d(2025, 1, 15));
    }

    #[test]
    fn test_is_imm_date() {
        assert!(is_imm_date(d(2025, 3, 19), true));
        assert!(is_imm_date(d(2025, 1, 15), false));
        assert!(!is_imm_date(d(2025, 1, 15), true));
        assert!(!is_imm_date(d(2025, 3, 12), false));
        assert!(!is_imm_date(d(2025, 3, 20), false));
    }

    #[test]
    fn test_next_imm_date() {
        assert_eq!(next_imm_date(d(2025, 3, 17), true).unwrap(), d(2025, 3, 19));
        // Strictly after an IMM date
        assert_eq!(next_imm_date(d(2025, 3, 19), true).unwrap(), d(2025, 6, 18));
        assert_eq!(next_imm_date(d(2025, 3, 19), false).unwrap(), d(2025, 4, 16));
        assert_eq!(next_imm_date(d(2025, 12, 20), true).unwrap(), d(2026, 3, 18));
    }

    #[test]
    fn test_imm_codes() {
        assert_eq!(imm_code(d(2025, 3, 19)).unwrap(), "H5");
        assert_eq!(imm_code(d(2025, 12, 17)).unwrap(), "Z5");
        assert!(imm_code(d(2025, 3, 18)).is_err());

        let reference = d(2025, 3, 17);
        assert_eq!(imm_date_from_code("H5", reference).unwrap(), d(2025, 3, 19));
        assert_eq!(imm_date_from_code("m6", reference).unwrap(), d(2026, 6, 17));
        // A code earlier than the reference rolls to the next decade
        assert_eq!(imm_date_from_code("Z4", reference).unwrap(), d(2034, 12, 20));
        assert!(imm_date_from_code("A5", reference).is_err());
        assert!(imm_date_from_code("H", reference).is_err());
    }
}
