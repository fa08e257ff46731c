//! Interest rate with its day-count and compounding conventions.

use std::fmt;

use crate::daycounts::DayCounter;
use crate::error::{CoreError, CoreResult};
use crate::types::{Compounding, Date, Frequency};

/// An interest rate bundled with the conventions needed to use it.
///
/// Encapsulates the compounding algebra: compound and discount factors,
/// implied rates from factors, and conversion between conventions.
/// Times passed as `f64` must be measured with the rate's
/// own day counter.
///
/// # Example
///
/// ```rust
/// use yieldline_core::daycounts::DayCountConvention;
/// use yieldline_core::types::{Compounding, Frequency, InterestRate};
///
/// let dc = DayCountConvention::Act365Fixed.to_day_counter();
/// let simple = InterestRate::new(0.05, dc, Compounding::Simple, Frequency::Annual).unwrap();
///
/// let continuous = simple
///     .equivalent_rate(2.0, Compounding::Continuous, Frequency::Annual)
///     .unwrap();
/// assert!((continuous.compound_factor(2.0).unwrap() - 1.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct InterestRate {
    rate: f64,
    day_counter: DayCounter,
    compounding: Compounding,
    frequency: Frequency,
    // per-year count; only meaningful when compounding needs a frequency
    periods: f64,
}

impl InterestRate {
    /// Creates an interest rate.
    ///
    /// # Errors
    ///
    /// `Compounded` and `SimpleThenCompounded` require a periodic frequency;
    /// `NoFrequency` and `Once` are rejected.
    pub fn new(
        rate: f64,
        day_counter: DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CoreResult<Self> {
        let periods = if compounding.requires_frequency() {
            match frequency.periods_per_year() {
                Some(n) if frequency.is_periodic() => f64::from(n),
                _ => {
                    return Err(CoreError::invalid_argument(format!(
                        "frequency {frequency} not allowed for {compounding} compounding"
                    )))
                }
            }
        } else {
            0.0
        };

        Ok(Self {
            rate,
            day_counter,
            compounding,
            frequency,
            periods,
        })
    }

    /// Returns the rate value.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the day counter.
    #[must_use]
    pub fn day_counter(&self) -> &DayCounter {
        &self.day_counter
    }

    /// Returns the compounding convention.
    #[must_use]
    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    /// Returns the frequency; `NoFrequency` unless compounding uses one.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        if self.compounding.requires_frequency() {
            self.frequency
        } else {
            Frequency::NoFrequency
        }
    }

    /// Compound factor over time `t`.
    pub fn compound_factor(&self, t: f64) -> CoreResult<f64> {
        if t < 0.0 {
            return Err(CoreError::invalid_argument(format!(
                "negative time not allowed: {t}"
            )));
        }

        let r = self.rate;
        let f = self.periods;
        let factor = match self.compounding {
            Compounding::Simple => 1.0 + r * t,
            Compounding::Compounded => (1.0 + r / f).powf(f * t),
            Compounding::Continuous => (r * t).exp(),
            Compounding::SimpleThenCompounded => {
                if t <= 1.0 / f {
                    1.0 + r * t
                } else {
                    (1.0 + r / f).powf(f * t)
                }
            }
        };
        Ok(factor)
    }

    /// Discount factor over time `t`.
    pub fn discount_factor(&self, t: f64) -> CoreResult<f64> {
        Ok(1.0 / self.compound_factor(t)?)
    }

    /// Compound factor between two dates, measured with the rate's day counter.
    pub fn compound_factor_between(&self, d1: Date, d2: Date) -> CoreResult<f64> {
        self.compound_factor(self.day_counter.year_fraction(d1, d2))
    }

    /// Discount factor between two dates, measured with the rate's day counter.
    pub fn discount_factor_between(&self, d1: Date, d2: Date) -> CoreResult<f64> {
        self.discount_factor(self.day_counter.year_fraction(d1, d2))
    }

    /// The rate that produces `compound` over time `t` under the given conventions.
    ///
    /// `t` must be measured with `day_counter`.
    pub fn implied_rate(
        compound: f64,
        t: f64,
        day_counter: DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CoreResult<Self> {
        if compound <= 0.0 {
            return Err(CoreError::invalid_argument(format!(
                "positive compound factor required, got {compound}"
            )));
        }
        if t <= 0.0 {
            return Err(CoreError::invalid_argument(format!(
                "positive time required, got {t}"
            )));
        }

        // Validates the frequency before it is used below.
        let mut result = Self::new(0.0, day_counter, compounding, frequency)?;
        let f = result.periods;
        result.rate = match compounding {
            Compounding::Simple => (compound - 1.0) / t,
            Compounding::Compounded => (compound.powf(1.0 / (f * t)) - 1.0) * f,
            Compounding::Continuous => compound.ln() / t,
            Compounding::SimpleThenCompounded => {
                if t <= 1.0 / f {
                    (compound - 1.0) / t
                } else {
                    (compound.powf(1.0 / (f * t)) - 1.0) * f
                }
            }
        };
        Ok(result)
    }

    /// The rate that produces `compound` between two dates.
    ///
    /// # Errors
    ///
    /// Requires `d1 < d2`.
    pub fn implied_rate_between(
        compound: f64,
        d1: Date,
        d2: Date,
        day_counter: DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CoreResult<Self> {
        if d1 >= d2 {
            return Err(CoreError::invalid_argument(format!(
                "d1 ({d1}) later than or equal to d2 ({d2})"
            )));
        }
        let t = day_counter.year_fraction(d1, d2);
        Self::implied_rate(compound, t, day_counter, compounding, frequency)
    }

    /// Equivalent rate over time `t` under other compounding, same day counter.
    pub fn equivalent_rate(
        &self,
        t: f64,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CoreResult<Self> {
        Self::implied_rate(
            self.compound_factor(t)?,
            t,
            self.day_counter.clone(),
            compounding,
            frequency,
        )
    }

    /// Equivalent rate between two dates under another day counter and compounding.
    ///
    /// The compound factor is measured with this rate's day counter; the
    /// result's time with `day_counter`.
    pub fn equivalent_rate_between(
        &self,
        d1: Date,
        d2: Date,
        day_counter: DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CoreResult<Self> {
        if d1 >= d2 {
            return Err(CoreError::invalid_argument(format!(
                "d1 ({d1}) later than or equal to d2 ({d2})"
            )));
        }
        let t1 = self.day_counter.year_fraction(d1, d2);
        let t2 = day_counter.year_fraction(d1, d2);
        Self::implied_rate(
            self.compound_factor(t1)?,
            t2,
            day_counter,
            compounding,
            frequency,
        )
    }
}

impl fmt::Display for InterestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} % {} ",
            self.rate * 100.0,
            self.day_counter.name()
        )?;
        match self.compounding {
            Compounding::Simple => write!(f, "simple compounding"),
            Compounding::Continuous => write!(f, "continuous compounding"),
            Compounding::Compounded => write!(f, "{} compounding", self.frequency),
            Compounding::SimpleThenCompounded => write!(
                f,
                "simple compounding up to {} months, then {} compounding",
                (12.0 / self.periods).round(),
                self.frequency
            ),
        }
    }
}
