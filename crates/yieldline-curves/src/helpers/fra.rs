//! Forward rate agreement helper.

use std::sync::{Arc, Weak};

use yieldline_core::types::{Date, Period};

use crate::error::{CurveError, CurveResult};
use crate::helpers::{constant_quote, HelperCore, HelperDates, HelperKind, RateHelper};
use crate::indexes::IborIndex;
use crate::quotes::Quote;
use crate::reactive::{Handle, NodeId, Observable, Observer};
use crate::session::Session;
use crate::term_structure::YieldTermStructure;

/// A `start x end` FRA quoted as a simple forward rate.
///
/// The underlying deposit starts `months_to_start` months after spot and
/// runs until `months_to_end`.
#[derive(Debug)]
pub struct FraRateHelper {
    core: HelperCore,
    months_to_start: u32,
    index: IborIndex,
}

impl FraRateHelper {
    /// Creates a helper on the conventions of `conventions`, with the
    /// index tenor set to the FRA period.
    ///
    /// # Errors
    ///
    /// `months_to_end` must exceed `months_to_start`.
    pub fn new(
        session: &Session,
        rate: Handle<dyn Quote>,
        months_to_start: u32,
        months_to_end: u32,
        conventions: &IborIndex,
    ) -> CurveResult<Arc<Self>> {
        if months_to_end <= months_to_start {
            return Err(CurveError::invalid_argument(format!(
                "months to end ({months_to_end}) must be greater than months to start \
                 ({months_to_start})"
            )));
        }
        let tenor = Period::months((months_to_end - months_to_start) as i32);
        Self::with_index(session, rate, months_to_start, conventions.with_tenor(tenor))
    }

    /// Creates a helper whose deposit period is the index tenor.
    pub fn with_index(
        session: &Session,
        rate: Handle<dyn Quote>,
        months_to_start: u32,
        index: IborIndex,
    ) -> CurveResult<Arc<Self>> {
        let core = HelperCore::new(session, rate, "fra helper", true)?;
        let helper = Arc::new(Self {
            core,
            months_to_start,
            index,
        });
        helper.initialize_dates()?;
        helper
            .core
            .attach(Arc::downgrade(&helper) as Weak<dyn Observer>)?;
        Ok(helper)
    }

    /// Creates a helper on a constant rate.
    pub fn from_rate(
        session: &Session,
        rate: f64,
        months_to_start: u32,
        months_to_end: u32,
        conventions: &IborIndex,
    ) -> CurveResult<Arc<Self>> {
        Self::new(
            session,
            constant_quote(session, rate)?,
            months_to_start,
            months_to_end,
            conventions,
        )
    }

    /// Index of the underlying deposit.
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    fn initialize_dates(&self) -> CurveResult<()> {
        let today = self.core.session().evaluation_date();
        let calendar = self.index.fixing_calendar();
        let spot = calendar.advance_days(today, self.index.fixing_days() as i32);
        let earliest = calendar.advance(
            spot,
            Period::months(self.months_to_start as i32),
            self.index.business_day_convention(),
            self.index.end_of_month(),
        )?;
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
            .ok_or_else(|| CurveError::invalid_argument("FRA helper has no fixing date"))
    }
}

impl Observable for FraRateHelper {
    fn observable_id(&self) -> NodeId {
        self.core.id()
    }
}

impl Observer for FraRateHelper {
    fn update(&self) -> CurveResult<()> {
        if self.core.dates_are_stale() {
            self.initialize_dates()?;
        }
        Ok(())
    }
}

impl RateHelper for FraRateHelper {
    fn core(&self) -> &HelperCore {
        &self.core
    }

    fn kind(&self) -> HelperKind {
        HelperKind::Fra
    }

    fn description(&self) -> String {
        let months_to_end = self
            .index
            .tenor()
            .total_months()
            .map_or_else(|| "?".to_string(), |m| (m + self.months_to_start as i32).to_string());
        format!("{}x{months_to_end} FRA", self.months_to_start)
    }

    fn implied_quote_on(&self, term_structure: &dyn YieldTermStructure) -> CurveResult<f64> {
        self.index
            .forecast_fixing_on(term_structure, self.fixing_date()?)
    }
}
