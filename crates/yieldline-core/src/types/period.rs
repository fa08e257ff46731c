//! Periods of time (tenors) such as `3M` or `10Y`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::Frequency;

/// Unit in which a [`Period`] is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Calendar days.
    Days,
    /// Weeks of seven days.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl TimeUnit {
    fn suffix(self) -> char {
        match self {
            TimeUnit::Days => 'D',
            TimeUnit::Weeks => 'W',
            TimeUnit::Months => 'M',
            TimeUnit::Years => 'Y',
        }
    }
}

/// A signed length of time in a single unit.
///
/// # Example
///
/// ```rust
/// use yieldline_core::types::{Period, TimeUnit};
///
/// let tenor: Period = "6M".parse().unwrap();
/// assert_eq!(tenor, Period::new(6, TimeUnit::Months));
/// assert_eq!(tenor.to_string(), "6M");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    length: i32,
    unit: TimeUnit,
}

impl Period {
    /// Creates a period.
    #[must_use]
    pub const fn new(length: i32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    /// `n` days.
    #[must_use]
    pub const fn days(n: i32) -> Self {
        Self::new(n, TimeUnit::Days)
    }

    /// `n` weeks.
    #[must_use]
    pub const fn weeks(n: i32) -> Self {
        Self::new(n, TimeUnit::Weeks)
    }

    /// `n` months.
    #[must_use]
    pub const fn months(n: i32) -> Self {
        Self::new(n, TimeUnit::Months)
    }

    /// `n` years.
    #[must_use]
    pub const fn years(n: i32) -> Self {
        Self::new(n, TimeUnit::Years)
    }

    /// Returns the signed length.
    #[must_use]
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Returns the unit.
    #[must_use]
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Multiplies the length, keeping the unit.
    #[must_use]
    pub fn times(&self, n: i32) -> Self {
        Self::new(self.length * n, self.unit)
    }

    /// Returns the period negated.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self::new(-self.length, self.unit)
    }

    /// Length in months for month and year periods.
    #[must_use]
    pub fn total_months(&self) -> Option<i32> {
        match self.unit {
            TimeUnit::Months => Some(self.length),
            TimeUnit::Years => Some(self.length * 12),
            TimeUnit::Days | TimeUnit::Weeks => None,
        }
    }

    /// Converts a frequency into the period between two payments.
    pub fn from_frequency(frequency: Frequency) -> CoreResult<Self> {
        match frequency {
            Frequency::NoFrequency | Frequency::Once => Err(CoreError::invalid_argument(format!(
                "frequency {frequency} has no period"
            ))),
            Frequency::Annual => Ok(Self::years(1)),
            Frequency::SemiAnnual => Ok(Self::months(6)),
            Frequency::EveryFourthMonth => Ok(Self::months(4)),
            Frequency::Quarterly => Ok(Self::months(3)),
            Frequency::Bimonthly => Ok(Self::months(2)),
            Frequency::Monthly => Ok(Self::months(1)),
            Frequency::EveryFourthWeek => Ok(Self::weeks(4)),
            Frequency::Biweekly => Ok(Self::weeks(2)),
            Frequency::Weekly => Ok(Self::weeks(1)),
            Frequency::Daily => Ok(Self::days(1)),
        }
    }

    /// Converts the period into a payment frequency, if it divides a year evenly.
    pub fn frequency(&self) -> CoreResult<Frequency> {
        let length = self.length.unsigned_abs();
        if length == 0 {
            return Ok(Frequency::Once);
        }
        let per_year = match self.unit {
            TimeUnit::Years if length == 1 => Some(1),
            TimeUnit::Months if 12 % length == 0 => Some(12 / length),
            TimeUnit::Weeks => match length {
                1 => Some(52),
                2 => Some(26),
                4 => Some(13),
                _ => None,
            },
            TimeUnit::Days if length == 1 => Some(365),
            _ => None,
        };
        per_year
            .and_then(Frequency::from_periods_per_year)
            .ok_or_else(|| CoreError::invalid_argument(format!("period {self} has no frequency")))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.unit.suffix())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(last) = s.chars().last() else {
            return Err(CoreError::invalid_argument("empty period"));
        };
        let unit = match last.to_ascii_uppercase() {
            'D' => TimeUnit::Days,
            'W' => TimeUnit::Weeks,
            'M' => TimeUnit::Months,
            'Y' => TimeUnit::Years,
            _ => {
                return Err(CoreError::invalid_argument(format!(
                    "unknown period unit in '{s}'"
                )))
            }
        };
        let length = s[..s.len() - last.len_utf8()]
            .parse::<i32>()
            .map_err(|_| CoreError::invalid_argument(format!("invalid period length in '{s}'")))?;
        Ok(Self::new(length, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("3M".parse::<Period>().unwrap(), Period::months(3));
        assert_eq!("10y".parse::<Period>().unwrap(), Period::years(10));
        assert_eq!("1W".parse::<Period>().unwrap(), Period::weeks(1));
        assert_eq!("-2D".parse::<Period>().unwrap(), Period::days(-2));
        assert!("".parse::<Period>().is_err());
        assert!("M".parse::<Period>().is_err());
        assert!("3Q".parse::<Period>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Period::years(30).to_string(), "30Y");
        assert_eq!(Period::days(1).to_string(), "1D");
    }

    #[test]
    fn test_frequency_conversion() {
        assert_eq!(Period::months(6).frequency().unwrap(), Frequency::SemiAnnual);
        assert_eq!(Period::months(3).frequency().unwrap(), Frequency::Quarterly);
        assert_eq!(Period::years(1).frequency().unwrap(), Frequency::Annual);
        assert_eq!(Period::weeks(2).frequency().unwrap(), Frequency::Biweekly);
        assert!(Period::months(5).frequency().is_err());
        assert!(Period::years(2).frequency().is_err());

        assert_eq!(Period::from_frequency(Frequency::Quarterly).unwrap(), Period::months(3));
        assert!(Period::from_frequency(Frequency::Once).is_err());
    }

    #[test]
    fn test_total_months() {
        assert_eq!(Period::years(2).total_months(), Some(24));
        assert_eq!(Period::months(9).total_months(), Some(9));
        assert_eq!(Period::weeks(1).total_months(), None);
    }
}
