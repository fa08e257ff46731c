//! Par swap rate helper.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use yieldline_core::calendars::{BusinessDayConvention, Calendar, Target};
use yieldline_core::daycounts::{DayCountConvention, DayCounter};
use yieldline_core::types::{Frequency, Period};

use crate::cashflows::{DateGeneration, Schedule, SwapType, VanillaSwap, BASIS_POINT};
use crate::error::{CurveError, CurveResult};
use crate::helpers::{constant_quote, HelperCore, HelperDates, HelperKind, RateHelper};
use crate::indexes::IborIndex;
use crate::quotes::Quote;
use crate::reactive::{Handle, NodeId, Observable, Observer};
use crate::session::Session;
use crate::term_structure::YieldTermStructure;

/// Market conventions of a fixed-for-Ibor swap.
#[derive(Debug, Clone)]
pub struct SwapConventions {
    /// Calendar for the spot lag and both schedules.
    pub calendar: Arc<dyn Calendar>,
    /// Fixed leg payment frequency.
    pub fixed_frequency: Frequency,
    /// Fixed leg date adjustment.
    pub fixed_convention: BusinessDayConvention,
    /// Fixed leg accrual day counter.
    pub fixed_day_counter: DayCounter,
    /// Index of the floating leg.
    pub index: IborIndex,
}

impl SwapConventions {
    /// Creates a set of swap conventions.
    pub fn new(
        calendar: Arc<dyn Calendar>,
        fixed_frequency: Frequency,
        fixed_convention: BusinessDayConvention,
        fixed_day_counter: DayCounter,
        index: IborIndex,
    ) -> Self {
        Self {
            calendar,
            fixed_frequency,
            fixed_convention,
            fixed_day_counter,
            index,
        }
    }

    /// EUR swaps: annual unadjusted 30E/360 fixed leg against `index`.
    pub fn euribor(index: IborIndex) -> Self {
        Self::new(
            Arc::new(Target),
            Frequency::Annual,
            BusinessDayConvention::Unadjusted,
            DayCountConvention::Thirty360E.to_day_counter(),
            index,
        )
    }
}

/// A spot- or forward-starting swap quoted at its par fixed rate.
///
/// The underlying swap is rebuilt whenever the evaluation date moves.
#[derive(Debug)]
pub struct SwapRateHelper {
    core: HelperCore,
    tenor: Period,
    conventions: SwapConventions,
    spread: Option<Handle<dyn Quote>>,
    forward_start: Period,
    swap: RwLock<Option<Arc<VanillaSwap>>>,
}

impl SwapRateHelper {
    /// Creates a spot-starting helper with no floating spread.
    pub fn new(
        session: &Session,
        rate: Handle<dyn Quote>,
        tenor: Period,
        conventions: SwapConventions,
    ) -> CurveResult<Arc<Self>> {
        Self::with_options(session, rate, tenor, conventions, None, Period::days(0))
    }

    /// Creates a helper with a floating spread quote and a forward start.
    pub fn with_options(
        session: &Session,
        rate: Handle<dyn Quote>,
        tenor: Period,
        conventions: SwapConventions,
        spread: Option<Handle<dyn Quote>>,
        forward_start: Period,
    ) -> CurveResult<Arc<Self>> {
        if tenor.length() <= 0 {
            return Err(CurveError::invalid_argument(format!(
                "non-positive swap tenor {tenor}"
            )));
        }
        if forward_start.length() < 0 {
            return Err(CurveError::invalid_argument(format!(
                "negative forward start {forward_start}"
            )));
        }

        let core = HelperCore::new(session, rate, "swap helper", true)?;
        // The first floating coupon may fix today from a stored fixing
        core.observe(conventions.index.fixings_node())?;
        if let Some(spread) = &spread {
            core.observe(spread.observable_id())?;
        }
        let helper = Arc::new(Self {
            core,
            tenor,
            conventions,
            spread,
            forward_start,
            swap: RwLock::new(None),
        });
        helper.initialize_dates()?;
        helper
            .core
            .attach(Arc::downgrade(&helper) as Weak<dyn Observer>)?;
        Ok(helper)
    }

    /// Creates a spot-starting helper on a constant rate.
    pub fn from_rate(
        session: &Session,
        rate: f64,
        tenor: Period,
        conventions: SwapConventions,
    ) -> CurveResult<Arc<Self>> {
        Self::new(session, constant_quote(session, rate)?, tenor, conventions)
    }

    /// Swap length.
    pub fn tenor(&self) -> Period {
        self.tenor
    }

    /// Gap between spot and the swap start.
    pub fn forward_start(&self) -> Period {
        self.forward_start
    }

    /// Swap conventions.
    pub fn conventions(&self) -> &SwapConventions {
        &self.conventions
    }

    /// Current floating spread, zero if none was given.
    pub fn spread(&self) -> CurveResult<f64> {
        self.spread.as_ref().map_or(Ok(0.0), |spread| spread.value())
    }

    /// The underlying unit-notional payer swap, built with a zero fixed rate.
    ///
    /// # Errors
    ///
    /// Fails if the swap could not be built for the current dates.
    pub fn swap(&self) -> CurveResult<Arc<VanillaSwap>> {
        self.swap
            .read()
            .clone()
            .ok_or_else(|| CurveError::invalid_argument("swap helper has no underlying swap"))
    }

    fn initialize_dates(&self) -> CurveResult<()> {
        let today = self.core.session().evaluation_date();
        let conventions = &self.conventions;
        let index = &conventions.index;
        let calendar = &conventions.calendar;

        let spot = calendar.advance_days(today, index.fixing_days() as i32);
        let start = calendar.advance(
            spot,
            self.forward_start,
            index.business_day_convention(),
            index.end_of_month(),
        )?;
        let end = start.advance(self.tenor)?;

        let fixed_schedule =
            Schedule::builder(start, end, Period::from_frequency(conventions.fixed_frequency)?)
                .calendar(Arc::clone(calendar))
                .convention(conventions.fixed_convention)
                .rule(DateGeneration::Backward)
                .build()?;
        let floating_schedule = Schedule::builder(start, end, index.tenor())
            .calendar(Arc::clone(calendar))
            .convention(index.business_day_convention())
            .rule(DateGeneration::Backward)
            .build()?;

        let swap = VanillaSwap::new(
            SwapType::Payer,
            1.0,
            &fixed_schedule,
            0.0,
            &conventions.fixed_day_counter,
            &floating_schedule,
            index,
            0.0,
            index.day_counter(),
        );

        self.core.set_dates(HelperDates {
            earliest: swap.start_date(),
            latest: swap.maturity_date(),
            fixing: None,
            evaluation_date: today,
        })?;
        *self.swap.write() = Some(Arc::new(swap));
        Ok(())
    }
}

impl Observable for SwapRateHelper {
    fn observable_id(&self) -> NodeId {
        self.core.id()
    }
}

impl Observer for SwapRateHelper {
    fn update(&self) -> CurveResult<()> {
        if self.core.dates_are_stale() {
            self.initialize_dates()?;
        }
        Ok(())
    }
}

impl RateHelper for SwapRateHelper {
    fn core(&self) -> &HelperCore {
        &self.core
    }

    fn kind(&self) -> HelperKind {
        HelperKind::Swap
    }

    fn description(&self) -> String {
        if self.forward_start.length() == 0 {
            format!("{} swap", self.tenor)
        } else {
            format!("{}x{} swap", self.forward_start, self.tenor)
        }
    }

    fn implied_quote_on(&self, term_structure: &dyn YieldTermStructure) -> CurveResult<f64> {
        let valuation = self.swap()?.valuation(term_structure)?;
        let spread_npv = valuation.floating_leg_bps / BASIS_POINT * self.spread()?;
        Ok(-(valuation.floating_leg_npv + spread_npv) / (valuation.fixed_leg_bps / BASIS_POINT))
    }
}
