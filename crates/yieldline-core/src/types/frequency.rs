//! Frequency and compounding types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of periods per year for coupons and compounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// Undefined frequency; invalid for compounded rates.
    NoFrequency,
    /// Single payment at maturity.
    Once,
    /// Once a year.
    #[default]
    Annual,
    /// Twice a year.
    SemiAnnual,
    /// Every fourth month.
    EveryFourthMonth,
    /// Every third month.
    Quarterly,
    /// Every second month.
    Bimonthly,
    /// Once a month.
    Monthly,
    /// Every fourth week.
    EveryFourthWeek,
    /// Every second week.
    Biweekly,
    /// Once a week.
    Weekly,
    /// Once a day.
    Daily,
}

impl Frequency {
    /// Returns the number of periods per year.
    ///
    /// `NoFrequency` has no defined value and `Once` has zero.
    #[must_use]
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Frequency::NoFrequency => None,
            Frequency::Once => Some(0),
            Frequency::Annual => Some(1),
            Frequency::SemiAnnual => Some(2),
            Frequency::EveryFourthMonth => Some(3),
            Frequency::Quarterly => Some(4),
            Frequency::Bimonthly => Some(6),
            Frequency::Monthly => Some(12),
            Frequency::EveryFourthWeek => Some(13),
            Frequency::Biweekly => Some(26),
            Frequency::Weekly => Some(52),
            Frequency::Daily => Some(365),
        }
    }

    /// Returns true if the frequency can drive compounding.
    #[must_use]
    pub fn is_periodic(&self) -> bool {
        !matches!(self, Frequency::NoFrequency | Frequency::Once)
    }

    /// Looks up a frequency from its per-year count.
    #[must_use]
    pub fn from_periods_per_year(n: u32) -> Option<Self> {
        match n {
            0 => Some(Frequency::Once),
            1 => Some(Frequency::Annual),
            2 => Some(Frequency::SemiAnnual),
            3 => Some(Frequency::EveryFourthMonth),
            4 => Some(Frequency::Quarterly),
            6 => Some(Frequency::Bimonthly),
            12 => Some(Frequency::Monthly),
            13 => Some(Frequency::EveryFourthWeek),
            26 => Some(Frequency::Biweekly),
            52 => Some(Frequency::Weekly),
            365 => Some(Frequency::Daily),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::NoFrequency => "no-frequency",
            Frequency::Once => "once",
            Frequency::Annual => "annual",
            Frequency::SemiAnnual => "semi-annual",
            Frequency::EveryFourthMonth => "every-fourth-month",
            Frequency::Quarterly => "quarterly",
            Frequency::Bimonthly => "bimonthly",
            Frequency::Monthly => "monthly",
            Frequency::EveryFourthWeek => "every-fourth-week",
            Frequency::Biweekly => "biweekly",
            Frequency::Weekly => "weekly",
            Frequency::Daily => "daily",
        };
        write!(f, "{name}")
    }
}

/// Interest compounding convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Compounding {
    /// Simple interest: `1 + r t`.
    Simple,
    /// Periodic compounding: `(1 + r/f)^(f t)`.
    Compounded,
    /// Continuous compounding: `exp(r t)`.
    #[default]
    Continuous,
    /// Simple up to one period, compounded beyond.
    SimpleThenCompounded,
}

impl Compounding {
    /// Returns true if the convention needs a periodic frequency.
    #[must_use]
    pub fn requires_frequency(&self) -> bool {
        matches!(self, Compounding::Compounded | Compounding::SimpleThenCompounded)
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compounding::Simple => "simple",
            Compounding::Compounded => "compounded",
            Compounding::Continuous => "continuous",
            Compounding::SimpleThenCompounded => "simple-then-compounded",
        };
        write!(f, "{name}")
    }
}
