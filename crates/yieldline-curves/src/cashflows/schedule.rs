//! Coupon date schedules.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use yieldline_core::calendars::{BusinessDayConvention, Calendar, NullCalendar};
use yieldline_core::types::{Date, Period, TimeUnit};

use crate::error::{CurveError, CurveResult};

/// Direction of date generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DateGeneration {
    /// From the termination date back; any stub is at the front.
    #[default]
    Backward,
    /// From the effective date forward; any stub is at the back.
    Forward,
}

/// Adjusted period boundaries from an effective to a termination date.
#[derive(Clone)]
pub struct Schedule {
    dates: Vec<Date>,
    tenor: Period,
    calendar: Arc<dyn Calendar>,
    convention: BusinessDayConvention,
    rule: DateGeneration,
}

impl Schedule {
    /// Starts a schedule with unadjusted dates on a null calendar.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use yieldline_core::calendars::{BusinessDayConvention, Target};
    /// use yieldline_core::{Date, Period};
    /// use yieldline_curves::cashflows::Schedule;
    ///
    /// let schedule = Schedule::builder(
    ///     Date::from_ymd(2025, 3, 19).unwrap(),
    ///     Date::from_ymd(2027, 3, 19).unwrap(),
    ///     Period::months(6),
    /// )
    /// .calendar(Arc::new(Target))
    /// .convention(BusinessDayConvention::ModifiedFollowing)
    /// .build()
    /// .unwrap();
    ///
    /// assert_eq!(schedule.len(), 5);
    /// assert_eq!(schedule.dates()[1], Date::from_ymd(2025, 9, 19).unwrap());
    /// ```
    pub fn builder(effective: Date, termination: Date, tenor: Period) -> ScheduleBuilder {
        ScheduleBuilder {
            effective,
            termination,
            tenor,
            calendar: Arc::new(NullCalendar),
            convention: BusinessDayConvention::Unadjusted,
            termination_convention: None,
            rule: DateGeneration::Backward,
            end_of_month: false,
        }
    }

    /// All period boundaries.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of boundaries.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a built schedule.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First boundary.
    pub fn start_date(&self) -> Date {
        self.dates[0]
    }

    /// Last boundary.
    pub fn end_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// Period length.
    pub fn tenor(&self) -> Period {
        self.tenor
    }

    /// Adjustment calendar.
    pub fn calendar(&self) -> &Arc<dyn Calendar> {
        &self.calendar
    }

    /// Roll convention of the inner dates.
    pub fn convention(&self) -> BusinessDayConvention {
        self.convention
    }

    /// Generation direction.
    pub fn rule(&self) -> DateGeneration {
        self.rule
    }

    /// Consecutive `(start, end)` pairs.
    pub fn periods(&self) -> impl Iterator<Item = (Date, Date)> + '_ {
        self.dates.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schedule")
            .field("dates", &self.dates)
            .field("tenor", &self.tenor)
            .field("calendar", &self.calendar.name())
            .field("convention", &self.convention)
            .field("rule", &self.rule)
            .finish()
    }
}

/// Builder for [`Schedule`].
#[derive(Clone)]
pub struct ScheduleBuilder {
    effective: Date,
    termination: Date,
    tenor: Period,
    calendar: Arc<dyn Calendar>,
    convention: BusinessDayConvention,
    termination_convention: Option<BusinessDayConvention>,
    rule: DateGeneration,
    end_of_month: bool,
}

impl ScheduleBuilder {
    /// Sets the adjustment calendar.
    pub fn calendar(mut self, calendar: Arc<dyn Calendar>) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the convention for all but the termination date.
    pub fn convention(mut self, convention: BusinessDayConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Sets the termination date convention. Defaults to the main one.
    pub fn termination_convention(mut self, convention: BusinessDayConvention) -> Self {
        self.termination_convention = Some(convention);
        self
    }

    /// Sets the generation direction.
    pub fn rule(mut self, rule: DateGeneration) -> Self {
        self.rule = rule;
        self
    }

    /// Keeps inner dates on month ends when the seed date is one.
    pub fn end_of_month(mut self, end_of_month: bool) -> Self {
        self.end_of_month = end_of_month;
        self
    }

    /// Generates the dates.
    pub fn build(self) -> CurveResult<Schedule> {
        if self.effective >= self.termination {
            return Err(CurveError::invalid_argument(format!(
                "effective date {} not before termination date {}",
                self.effective, self.termination
            )));
        }
        if self.tenor.length() <= 0 {
            return Err(CurveError::invalid_argument(format!(
                "non-positive schedule tenor {}",
                self.tenor
            )));
        }

        let unadjusted = self.generate()?;

        let seed = match self.rule {
            DateGeneration::Backward => self.termination,
            DateGeneration::Forward => self.effective,
        };
        let month_based = matches!(self.tenor.unit(), TimeUnit::Months | TimeUnit::Years);
        let keep_month_end =
            self.end_of_month && month_based && self.calendar.is_end_of_month(seed);
        let termination_convention = self.termination_convention.unwrap_or(self.convention);

        let last = unadjusted.len() - 1;
        let mut dates: Vec<Date> = unadjusted
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                if i == last {
                    self.calendar.adjust(date, termination_convention)
                } else if i == 0 || !keep_month_end {
                    self.calendar.adjust(date, self.convention)
                } else if self.convention == BusinessDayConvention::Unadjusted {
                    date.end_of_month()
                } else {
                    self.calendar.end_of_month(date)
                }
            })
            .collect();
        dates.dedup();

        if dates.len() < 2 {
            return Err(CurveError::invalid_argument(format!(
                "schedule from {} to {} collapses to a single date",
                self.effective, self.termination
            )));
        }

        Ok(Schedule {
            dates,
            tenor: self.tenor,
            calendar: self.calendar,
            convention: self.convention,
            rule: self.rule,
        })
    }

    fn generate(&self) -> CurveResult<Vec<Date>> {
        let mut dates = Vec::new();
        match self.rule {
            DateGeneration::Backward => {
                dates.push(self.termination);
                for i in 1.. {
                    let date = self.termination.advance(self.tenor.times(-i))?;
                    if date <= self.effective {
                        break;
                    }
                    dates.push(date);
                }
                dates.push(self.effective);
                dates.reverse();
            }
            DateGeneration::Forward => {
                dates.push(self.effective);
                for i in 1.. {
                    let date = self.effective.advance(self.tenor.times(i))?;
                    if date >= self.termination {
                        break;
                    }
                    dates.push(date);
                }
                dates.push(self.termination);
            }
        }
        Ok(dates)
    }
}

impl fmt::Debug for ScheduleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleBuilder")
            .field("effective", &self.effective)
            .field("termination", &self.termination)
            .field("tenor", &self.tenor)
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}
