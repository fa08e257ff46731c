//! Interbank offered rate indexes.

use std::fmt;
use std::sync::Arc;

use yieldline_core::calendars::{BusinessDayConvention, Calendar, Target};
use yieldline_core::daycounts::{DayCountConvention, DayCounter};
use yieldline_core::types::{Date, Period, TimeUnit};

use crate::error::{CurveError, CurveResult};
use crate::reactive::{Handle, NodeId};
use crate::session::Session;
use crate::term_structure::YieldTermStructure;

/// An Ibor index such as Euribor 6M.
///
/// Past fixings live in the session's fixing store under [`name`](Self::name),
/// so every copy of an index sees the same history. Forecasts come from the
/// forwarding curve handle.
///
/// # Example
///
/// ```rust
/// use yieldline_core::Date;
/// use yieldline_curves::indexes::IborIndex;
/// use yieldline_curves::Session;
///
/// let session = Session::new(Date::from_ymd(2025, 3, 17).unwrap());
/// let index = IborIndex::euribor6m(&session);
///
/// assert_eq!(index.name(), "Euribor6M Actual/360");
/// let fixing = Date::from_ymd(2025, 3, 17).unwrap();
/// assert_eq!(index.value_date(fixing).unwrap(), Date::from_ymd(2025, 3, 19).unwrap());
/// assert_eq!(
///     index.maturity_date(Date::from_ymd(2025, 3, 19).unwrap()).unwrap(),
///     Date::from_ymd(2025, 9, 19).unwrap()
/// );
/// ```
#[derive(Clone)]
pub struct IborIndex {
    family_name: String,
    tenor: Period,
    fixing_days: u32,
    calendar: Arc<dyn Calendar>,
    convention: BusinessDayConvention,
    end_of_month: bool,
    day_counter: DayCounter,
    session: Session,
    forwarding: Option<Handle<dyn YieldTermStructure>>,
}

impl IborIndex {
    /// Creates an index without a forwarding curve.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: &Session,
        family_name: impl Into<String>,
        tenor: Period,
        fixing_days: u32,
        calendar: Arc<dyn Calendar>,
        convention: BusinessDayConvention,
        end_of_month: bool,
        day_counter: DayCounter,
    ) -> Self {
        Self {
            family_name: family_name.into(),
            tenor,
            fixing_days,
            calendar,
            convention,
            end_of_month,
            day_counter,
            session: session.clone(),
            forwarding: None,
        }
    }

    /// Euribor on TARGET with two fixing days and Actual/360.
    ///
    /// Day and week tenors roll Following without the end-of-month rule;
    /// longer ones roll Modified Following with it.
    pub fn euribor(session: &Session, tenor: Period) -> Self {
        let short = matches!(tenor.unit(), TimeUnit::Days | TimeUnit::Weeks);
        let (convention, end_of_month) = if short {
            (BusinessDayConvention::Following, false)
        } else {
            (BusinessDayConvention::ModifiedFollowing, true)
        };
        Self::new(
            session,
            "Euribor",
            tenor,
            2,
            Arc::new(Target),
            convention,
            end_of_month,
            DayCountConvention::Act360.to_day_counter(),
        )
    }

    /// Euribor 3M.
    pub fn euribor3m(session: &Session) -> Self {
        Self::euribor(session, Period::months(3))
    }

    /// Euribor 6M.
    pub fn euribor6m(session: &Session) -> Self {
        Self::euribor(session, Period::months(6))
    }

    /// Returns a copy forecasting off `curve`.
    #[must_use]
    pub fn with_forwarding(mut self, curve: Handle<dyn YieldTermStructure>) -> Self {
        self.forwarding = Some(curve);
        self
    }

    /// Returns a copy with another tenor and the same conventions.
    #[must_use]
    pub fn with_tenor(&self, tenor: Period) -> Self {
        let mut index = self.clone();
        index.tenor = tenor;
        index
    }

    /// Family name, e.g. `Euribor`.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Full name, e.g. `Euribor6M Actual/360`.
    pub fn name(&self) -> String {
        format!(
            "{}{} {}",
            self.family_name,
            self.tenor,
            self.day_counter.name()
        )
    }

    /// Tenor.
    pub fn tenor(&self) -> Period {
        self.tenor
    }

    /// Business days between fixing and value date.
    pub fn fixing_days(&self) -> u32 {
        self.fixing_days
    }

    /// Calendar for fixing, value and maturity dates.
    pub fn fixing_calendar(&self) -> &Arc<dyn Calendar> {
        &self.calendar
    }

    /// Roll convention for maturity dates.
    pub fn business_day_convention(&self) -> BusinessDayConvention {
        self.convention
    }

    /// Whether maturities keep month ends.
    pub fn end_of_month(&self) -> bool {
        self.end_of_month
    }

    /// Accrual day counter.
    pub fn day_counter(&self) -> &DayCounter {
        &self.day_counter
    }

    /// Session the index fixes in.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Forwarding curve handle, if any.
    pub fn forwarding_term_structure(&self) -> Option<&Handle<dyn YieldTermStructure>> {
        self.forwarding.as_ref()
    }

    /// Returns true if the index fixes on `date`.
    pub fn is_valid_fixing_date(&self, date: Date) -> bool {
        self.calendar.is_business_day(date)
    }

    /// Fixing date for a deposit starting on `value_date`.
    pub fn fixing_date(&self, value_date: Date) -> Date {
        self.calendar
            .advance_days(value_date, -(self.fixing_days as i32))
    }

    /// Start of the deposit fixed on `fixing_date`.
    pub fn value_date(&self, fixing_date: Date) -> CurveResult<Date> {
        self.check_fixing_date(fixing_date)?;
        Ok(self
            .calendar
            .advance_days(fixing_date, self.fixing_days as i32))
    }

    /// End of the deposit starting on `value_date`.
    pub fn maturity_date(&self, value_date: Date) -> CurveResult<Date> {
        Ok(self.calendar.advance(
            value_date,
            self.tenor,
            self.convention,
            self.end_of_month,
        )?)
    }

    /// Fixing for `fixing_date`.
    ///
    /// Future dates, and today when `forecast_todays_fixing` is set, are
    /// forecast. Past dates need a stored fixing; so does today when the
    /// session enforces historic fixings. Otherwise today's stored fixing
    /// is used if present and forecast if not.
    pub fn fixing(&self, fixing_date: Date, forecast_todays_fixing: bool) -> CurveResult<f64> {
        self.check_fixing_date(fixing_date)?;

        let today = self.session.evaluation_date();
        if fixing_date > today || (fixing_date == today && forecast_todays_fixing) {
            return self.forecast_fixing(fixing_date);
        }
        if fixing_date < today || self.session.enforces_todays_historic_fixings() {
            return self.past_fixing(fixing_date).ok_or_else(|| {
                CurveError::invalid_argument(format!(
                    "missing {} fixing for {fixing_date}",
                    self.name()
                ))
            });
        }
        match self.past_fixing(fixing_date) {
            Some(value) => Ok(value),
            None => self.forecast_fixing(fixing_date),
        }
    }

    /// Forecast off the forwarding curve.
    pub fn forecast_fixing(&self, fixing_date: Date) -> CurveResult<f64> {
        let handle = self.forwarding.as_ref().ok_or_else(|| {
            CurveError::invalid_argument(format!(
                "no forwarding term structure set for {}",
                self.name()
            ))
        })?;
        let curve = handle.current_link()?;
        self.forecast_fixing_on(curve.as_ref(), fixing_date)
    }

    /// Simple forward rate over the deposit fixed on `fixing_date`, read
    /// off `curve`.
    pub fn forecast_fixing_on(
        &self,
        curve: &dyn YieldTermStructure,
        fixing_date: Date,
    ) -> CurveResult<f64> {
        let start = self.value_date(fixing_date)?;
        let end = self.maturity_date(start)?;
        let accrual = self.day_counter.year_fraction(start, end);
        if accrual <= 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "non-positive accrual period {accrual} for {}",
                self.name()
            )));
        }
        Ok((curve.discount(start)? / curve.discount(end)? - 1.0) / accrual)
    }

    /// Stores a past fixing.
    ///
    /// An existing different value is kept unless `force_overwrite` is set.
    pub fn add_fixing(&self, fixing_date: Date, value: f64, force_overwrite: bool) -> CurveResult<()> {
        self.check_fixing_date(fixing_date)?;
        let name = self.name();
        if let Some(existing) = self.session.past_fixing(&name, fixing_date) {
            if existing != value && !force_overwrite {
                return Err(CurveError::invalid_argument(format!(
                    "duplicated {name} fixing for {fixing_date}: {existing} stored, {value} given"
                )));
            }
        }
        self.session.store_fixing(&name, fixing_date, value)?;
        Ok(())
    }

    /// Stored fixing for `fixing_date`, if any.
    pub fn past_fixing(&self, fixing_date: Date) -> Option<f64> {
        self.session.past_fixing(&self.name(), fixing_date)
    }

    /// Removes every stored fixing of this index.
    pub fn clear_fixings(&self) -> CurveResult<()> {
        self.session.clear_fixings(&self.name())
    }

    /// Node notified when this index's fixings change.
    pub fn fixings_node(&self) -> NodeId {
        self.session.fixings_node(&self.name())
    }

    fn check_fixing_date(&self, fixing_date: Date) -> CurveResult<()> {
        if self.is_valid_fixing_date(fixing_date) {
            Ok(())
        } else {
            Err(CurveError::invalid_argument(format!(
                "{fixing_date} is not a valid {} fixing date",
                self.name()
            )))
        }
    }
}

impl fmt::Debug for IborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IborIndex")
            .field("name", &self.name())
            .field("fixing_days", &self.fixing_days)
            .field("calendar", &self.calendar.name())
            .field("convention", &self.convention)
            .field("end_of_month", &self.end_of_month)
            .field("forwarding", &self.forwarding)
            .finish()
    }
}
