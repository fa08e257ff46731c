//! Money-market futures helper.

use std::sync::Arc;

use yieldline_core::calendars::{BusinessDayConvention, Calendar};
use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::{imm, Date, Period};

use crate::error::{CurveError, CurveResult};
use crate::helpers::{HelperCore, HelperDates, HelperKind, RateHelper};
use crate::indexes::IborIndex;
use crate::quotes::Quote;
use crate::reactive::{Handle, NodeId, Observable};
use crate::session::Session;
use crate::term_structure::YieldTermStructure;

/// A futures contract quoted as a price, `100 * (1 - rate)`.
///
/// Dates are fixed by the contract's IMM date and do not move with the
/// evaluation date. An optional convexity adjustment is subtracted from
/// the futures rate to get the forward rate.
#[derive(Debug)]
pub struct FuturesRateHelper {
    core: HelperCore,
    day_counter: DayCounter,
    convexity_adjustment: Option<Handle<dyn Quote>>,
}

impl FuturesRateHelper {
    /// Creates a helper for a contract starting on `imm_date` and running
    /// `length_months` months.
    ///
    /// # Errors
    ///
    /// `imm_date` must be an IMM date.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: &Session,
        price: Handle<dyn Quote>,
        imm_date: Date,
        length_months: u32,
        calendar: &dyn Calendar,
        convention: BusinessDayConvention,
        end_of_month: bool,
        day_counter: DayCounter,
        convexity_adjustment: Option<Handle<dyn Quote>>,
    ) -> CurveResult<Arc<Self>> {
        check_imm_date(imm_date)?;
        let latest = calendar.advance(
            imm_date,
            Period::months(length_months as i32),
            convention,
            end_of_month,
        )?;
        Self::build(session, price, imm_date, latest, day_counter, convexity_adjustment)
    }

    /// Creates a helper whose deposit period follows an index.
    pub fn from_index(
        session: &Session,
        price: Handle<dyn Quote>,
        imm_date: Date,
        index: &IborIndex,
        convexity_adjustment: Option<Handle<dyn Quote>>,
    ) -> CurveResult<Arc<Self>> {
        check_imm_date(imm_date)?;
        let latest = index.maturity_date(imm_date)?;
        Self::build(
            session,
            price,
            imm_date,
            latest,
            index.day_counter().clone(),
            convexity_adjustment,
        )
    }

    fn build(
        session: &Session,
        price: Handle<dyn Quote>,
        earliest: Date,
        latest: Date,
        day_counter: DayCounter,
        convexity_adjustment: Option<Handle<dyn Quote>>,
    ) -> CurveResult<Arc<Self>> {
        let core = HelperCore::new(session, price, "futures helper", false)?;
        if let Some(adjustment) = &convexity_adjustment {
            core.observe(adjustment.observable_id())?;
        }
        core.set_dates(HelperDates {
            earliest,
            latest,
            fixing: None,
            evaluation_date: session.evaluation_date(),
        })?;
        Ok(Arc::new(Self {
            core,
            day_counter,
            convexity_adjustment,
        }))
    }

    /// Current convexity adjustment, zero if none was given.
    ///
    /// # Errors
    ///
    /// A negative adjustment is rejected.
    pub fn convexity_adjustment(&self) -> CurveResult<f64> {
        let Some(handle) = &self.convexity_adjustment else {
            return Ok(0.0);
        };
        let adjustment = handle.value()?;
        if adjustment < 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "negative ({adjustment}) futures convexity adjustment"
            )));
        }
        Ok(adjustment)
    }
}

fn check_imm_date(date: Date) -> CurveResult<()> {
    if imm::is_imm_date(date, false) {
        Ok(())
    } else {
        Err(CurveError::invalid_argument(format!(
            "{date} is not a valid IMM date"
        )))
    }
}

impl Observable for FuturesRateHelper {
    fn observable_id(&self) -> NodeId {
        self.core.id()
    }
}

impl RateHelper for FuturesRateHelper {
    fn core(&self) -> &HelperCore {
        &self.core
    }

    fn kind(&self) -> HelperKind {
        HelperKind::Futures
    }

    fn description(&self) -> String {
        let start = self.earliest_date();
        let code = imm::imm_code(start).unwrap_or_else(|_| start.to_string());
        format!("{code} futures")
    }

    fn implied_quote_on(&self, term_structure: &dyn YieldTermStructure) -> CurveResult<f64> {
        let dates = self.core.dates();
        let accrual = self.day_counter.year_fraction(dates.earliest, dates.latest);
        let forward = (term_structure.discount(dates.earliest)?
            / term_structure.discount(dates.latest)?
            - 1.0)
            / accrual;
        let futures_rate = forward + self.convexity_adjustment()?;
        Ok(100.0 * (1.0 - futures_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use yieldline_core::calendars::Target;
    use yieldline_core::daycounts::DayCountConvention;
    use yieldline_core::types::{Compounding, Frequency};

    use crate::curves::FlatForward;
    use crate::quotes::SimpleQuote;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn price(session: &Session, value: f64) -> Handle<dyn Quote> {
        Arc::new(SimpleQuote::new(session, Some(value))).handle().unwrap()
    }

    #[test]
    fn test_dates_and_description() {
        let session = Session::new(d(2025, 3, 17));
        let helper = FuturesRateHelper::new(
            &session,
            price(&session, 95.5),
            d(2025, 6, 18),
            3,
            &Target,
            BusinessDayConvention::ModifiedFollowing,
            true,
            DayCountConvention::Act360.to_day_counter(),
            None,
        )
        .unwrap();

        assert_eq!(helper.earliest_date(), d(2025, 6, 18));
        assert_eq!(helper.latest_date(), d(2025, 9, 18));
        assert_eq!(helper.description(), "M5 futures");
        assert_eq!(helper.kind(), HelperKind::Futures);
    }

    #[test]
    fn test_invalid_imm_date() {
        let session = Session::new(d(2025, 3, 17));
        let result = FuturesRateHelper::from_index(
            &session,
            price(&session, 95.5),
            d(2025, 6, 17),
            &IborIndex::euribor3m(&session),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_implied_price_with_convexity() {
        let today = d(2025, 3, 17);
        let session = Session::new(today);
        let convexity = Arc::new(SimpleQuote::new(&session, Some(0.0002)));
        let helper = FuturesRateHelper::from_index(
            &session,
            price(&session, 95.5),
            d(2025, 6, 18),
            &IborIndex::euribor3m(&session),
            Some(convexity.handle().unwrap()),
        )
        .unwrap();

        let dc = DayCountConvention::Act360.to_day_counter();
        let curve = FlatForward::with_rate(
            &session,
            today,
            0.04,
            dc.clone(),
            Compounding::Continuous,
            Frequency::Annual,
        )
        .unwrap();

        let t = dc.year_fraction(helper.earliest_date(), helper.latest_date());
        let forward = ((0.04 * t).exp() - 1.0) / t;
        let implied = helper.implied_quote_on(&curve).unwrap();
        assert_relative_eq!(implied, 100.0 * (1.0 - forward - 0.0002), epsilon = 1e-10);

        convexity.set_value(-0.0001).unwrap();
        assert!(helper.implied_quote_on(&curve).is_err());
    }
}
