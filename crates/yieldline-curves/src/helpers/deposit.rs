//! Deposit rate helper.

use std::sync::{Arc, Weak};

use yieldline_core::calendars::{BusinessDayConvention, Calendar};
use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::{Date, Period};

use crate::error::{CurveError, CurveResult};
use crate::helpers::{constant_quote, HelperCore, HelperDates, HelperKind, RateHelper};
use crate::indexes::IborIndex;
use crate::quotes::Quote;
use crate::reactive::{Handle, NodeId, Observable, Observer};
use crate::session::Session;
use crate::term_structure::YieldTermStructure;

/// A cash deposit quoted as a simple rate.
///
/// The deposit starts `fixing_days` business days after the evaluation
/// date and runs for the index tenor. Its implied quote is the index
/// forecast read off the curve.
#[derive(Debug)]
pub struct DepositRateHelper {
    core: HelperCore,
    index: IborIndex,
}

impl DepositRateHelper {
    /// Creates a helper on an index's conventions.
    pub fn new(
        session: &Session,
        rate: Handle<dyn Quote>,
        index: IborIndex,
    ) -> CurveResult<Arc<Self>> {
        let core = HelperCore::new(session, rate, "deposit helper", true)?;
        let helper = Arc::new(Self { core, index });
        helper.initialize_dates()?;
        helper
            .core
            .attach(Arc::downgrade(&helper) as Weak<dyn Observer>)?;
        Ok(helper)
    }

    /// Creates a helper from explicit conventions.
    #[allow(clippy::too_many_arguments)]
    pub fn from_conventions(
        session: &Session,
        rate: Handle<dyn Quote>,
        tenor: Period,
        fixing_days: u32,
        calendar: Arc<dyn Calendar>,
        convention: BusinessDayConvention,
        end_of_month: bool,
        day_counter: DayCounter,
    ) -> CurveResult<Arc<Self>> {
        let index = IborIndex::new(
            session,
            "no-fix",
            tenor,
            fixing_days,
            calendar,
            convention,
            end_of_month,
            day_counter,
        );
        Self::new(session, rate, index)
    }

    /// Creates a helper on a constant rate.
    pub fn from_rate(session: &Session, rate: f64, index: IborIndex) -> CurveResult<Arc<Self>> {
        Self::new(session, constant_quote(session, rate)?, index)
    }

    /// Index defining the deposit's conventions.
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    fn initialize_dates(&self) -> CurveResult<()> {
        let today = self.core.session().evaluation_date();
        let earliest = self
            .index
            .fixing_calendar()
            .advance_days(today, self.index.fixing_days() as i32);
        let latest = self.index.maturity_date(earliest)?;
        self.core.set_dates(HelperDates {
            earliest,
            latest,
            fixing: Some(self.index.fixing_date(earliest)),
            evaluation_date: today,
        })
    }

    fn fixing_date(&self) -> CurveResult<Date> {
        self.core
            .dates()
            .fixing
            .ok_or_else(|| CurveError::invalid_argument("deposit helper has no fixing date"))
    }
}

impl Observable for DepositRateHelper {
    fn observable_id(&self) -> NodeId {
        self.core.id()
    }
}

impl Observer for DepositRateHelper {
    fn update(&self) -> CurveResult<()> {
        if self.core.dates_are_stale() {
            self.initialize_dates()?;
        }
        Ok(())
    }
}

impl RateHelper for DepositRateHelper {
    fn core(&self) -> &HelperCore {
        &self.core
    }

    fn kind(&self) -> HelperKind {
        HelperKind::Deposit
    }

    fn description(&self) -> String {
        format!("{} deposit", self.index.tenor())
    }

    fn implied_quote_on(&self, term_structure: &dyn YieldTermStructure) -> CurveResult<f64> {
        self.index
            .forecast_fixing_on(term_structure, self.fixing_date()?)
    }
}
