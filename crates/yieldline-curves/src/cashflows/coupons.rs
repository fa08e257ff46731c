//! Fixed and Ibor-indexed coupons.

use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::Date;

use crate::cashflows::Schedule;
use crate::error::{CurveError, CurveResult};
use crate::indexes::IborIndex;
use crate::term_structure::YieldTermStructure;

/// A coupon paying a fixed rate over its accrual period.
#[derive(Debug, Clone)]
pub struct FixedRateCoupon {
    payment_date: Date,
    nominal: f64,
    rate: f64,
    day_counter: DayCounter,
    accrual_start: Date,
    accrual_end: Date,
}

impl FixedRateCoupon {
    /// Creates a coupon.
    pub fn new(
        payment_date: Date,
        nominal: f64,
        rate: f64,
        day_counter: DayCounter,
        accrual_start: Date,
        accrual_end: Date,
    ) -> Self {
        Self {
            payment_date,
            nominal,
            rate,
            day_counter,
            accrual_start,
            accrual_end,
        }
    }

    /// Payment date.
    pub fn payment_date(&self) -> Date {
        self.payment_date
    }

    /// Notional.
    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    /// Coupon rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Accrual start.
    pub fn accrual_start(&self) -> Date {
        self.accrual_start
    }

    /// Accrual end.
    pub fn accrual_end(&self) -> Date {
        self.accrual_end
    }

    /// Accrual period as a year fraction.
    pub fn accrual_period(&self) -> f64 {
        self.day_counter
            .year_fraction(self.accrual_start, self.accrual_end)
    }

    /// Amount paid.
    pub fn amount(&self) -> f64 {
        self.nominal * self.rate * self.accrual_period()
    }

    /// Interest accrued up to `date`.
    ///
    /// Zero outside `(accrual_start, payment_date]`.
    pub fn accrued_amount(&self, date: Date) -> f64 {
        if date <= self.accrual_start || date > self.payment_date {
            return 0.0;
        }
        let end = date.min(self.accrual_end);
        self.nominal * self.rate * self.day_counter.year_fraction(self.accrual_start, end)
    }
}

/// A coupon paying `gearing * fixing + spread` on an Ibor index.
///
/// Fixings on or before the evaluation date come from the index's stored
/// history (today's may be forecast, see [`IborIndex::fixing`]). Later
/// fixings are read off the curve passed to the pricing call: the par rate
/// over the accrual period, or the index forecast when fixing in arrears.
#[derive(Debug, Clone)]
pub struct FloatingRateCoupon {
    payment_date: Date,
    nominal: f64,
    accrual_start: Date,
    accrual_end: Date,
    fixing_days: u32,
    index: IborIndex,
    gearing: f64,
    spread: f64,
    day_counter: DayCounter,
    in_arrears: bool,
}

impl FloatingRateCoupon {
    /// Creates a coupon with the index's fixing days and day counter, unit
    /// gearing and no spread.
    pub fn new(
        payment_date: Date,
        nominal: f64,
        accrual_start: Date,
        accrual_end: Date,
        index: IborIndex,
    ) -> Self {
        Self {
            payment_date,
            nominal,
            accrual_start,
            accrual_end,
            fixing_days: index.fixing_days(),
            day_counter: index.day_counter().clone(),
            index,
            gearing: 1.0,
            spread: 0.0,
            in_arrears: false,
        }
    }

    /// Sets the gearing.
    ///
    /// # Errors
    ///
    /// A zero gearing is rejected.
    pub fn with_gearing(mut self, gearing: f64) -> CurveResult<Self> {
        if gearing == 0.0 {
            return Err(CurveError::invalid_argument("null gearing not allowed"));
        }
        self.gearing = gearing;
        Ok(self)
    }

    /// Sets the spread.
    #[must_use]
    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    /// Sets the fixing days.
    #[must_use]
    pub fn with_fixing_days(mut self, fixing_days: u32) -> Self {
        self.fixing_days = fixing_days;
        self
    }

    /// Sets the accrual day counter.
    #[must_use]
    pub fn with_day_counter(mut self, day_counter: DayCounter) -> Self {
        self.day_counter = day_counter;
        self
    }

    /// Fixes at the end of the accrual period instead of the start.
    #[must_use]
    pub fn in_arrears(mut self) -> Self {
        self.in_arrears = true;
        self
    }

    /// Payment date.
    pub fn payment_date(&self) -> Date {
        self.payment_date
    }

    /// Notional.
    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    /// Accrual start.
    pub fn accrual_start(&self) -> Date {
        self.accrual_start
    }

    /// Accrual end.
    pub fn accrual_end(&self) -> Date {
        self.accrual_end
    }

    /// Index the coupon fixes on.
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    /// Gearing.
    pub fn gearing(&self) -> f64 {
        self.gearing
    }

    /// Spread over the fixing.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Returns true if the coupon fixes in arrears.
    pub fn is_in_arrears(&self) -> bool {
        self.in_arrears
    }

    /// Accrual period as a year fraction.
    pub fn accrual_period(&self) -> f64 {
        self.day_counter
            .year_fraction(self.accrual_start, self.accrual_end)
    }

    /// Fixing date.
    pub fn fixing_date(&self) -> Date {
        let reference = if self.in_arrears {
            self.accrual_end
        } else {
            self.accrual_start
        };
        self.index
            .fixing_calendar()
            .advance_days(reference, -(self.fixing_days as i32))
    }

    /// Index fixing, forecast off `curve` when it lies in the future.
    pub fn index_fixing(&self, curve: &dyn YieldTermStructure) -> CurveResult<f64> {
        let fixing_date = self.fixing_date();
        let session = self.index.session();
        let today = session.evaluation_date();

        if fixing_date < today
            || (fixing_date == today && session.enforces_todays_historic_fixings())
        {
            return self.index.fixing(fixing_date, false);
        }
        if fixing_date == today {
            if let Some(fixing) = self.index.past_fixing(fixing_date) {
                return Ok(fixing);
            }
        }

        if self.in_arrears {
            return self.index.forecast_fixing_on(curve, fixing_date);
        }
        let accrual = self
            .index
            .day_counter()
            .year_fraction(self.accrual_start, self.accrual_end);
        if accrual <= 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "non-positive accrual period from {} to {}",
                self.accrual_start, self.accrual_end
            )));
        }
        let growth = curve.discount(self.accrual_start)? / curve.discount(self.accrual_end)?;
        Ok((growth - 1.0) / accrual)
    }

    /// Coupon rate.
    pub fn rate_on(&self, curve: &dyn YieldTermStructure) -> CurveResult<f64> {
        Ok(self.gearing * self.index_fixing(curve)? + self.spread)
    }

    /// Amount paid.
    pub fn amount_on(&self, curve: &dyn YieldTermStructure) -> CurveResult<f64> {
        Ok(self.nominal * self.rate_on(curve)? * self.accrual_period())
    }

    /// Interest accrued up to `date`.
    ///
    /// Zero outside `(accrual_start, payment_date]`.
    pub fn accrued_amount_on(
        &self,
        date: Date,
        curve: &dyn YieldTermStructure,
    ) -> CurveResult<f64> {
        if date <= self.accrual_start || date > self.payment_date {
            return Ok(0.0);
        }
        let end = date.min(self.accrual_end);
        Ok(self.nominal
            * self.rate_on(curve)?
            * self.day_counter.year_fraction(self.accrual_start, end))
    }
}

/// Fixed coupons over a schedule, paid at period ends.
pub fn fixed_leg(
    schedule: &Schedule,
    nominal: f64,
    rate: f64,
    day_counter: &DayCounter,
) -> Vec<FixedRateCoupon> {
    schedule
        .periods()
        .map(|(start, end)| FixedRateCoupon::new(end, nominal, rate, day_counter.clone(), start, end))
        .collect()
}

/// Ibor coupons over a schedule, paid at period ends.
pub fn ibor_leg(
    schedule: &Schedule,
    nominal: f64,
    index: &IborIndex,
    spread: f64,
    day_counter: &DayCounter,
) -> Vec<FloatingRateCoupon> {
    schedule
        .periods()
        .map(|(start, end)| {
            FloatingRateCoupon::new(end, nominal, start, end, index.clone())
                .with_spread(spread)
                .with_day_counter(day_counter.clone())
        })
        .collect()
}
