//! The yield term structure abstraction.
//!
//! Every curve answers discount factors on its own time axis, measured from
//! its reference date with its day counter. Zero and forward rates are
//! derived from discount factors here, so implementations only provide
//! [`YieldTermStructure::discount_impl`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::{Compounding, Date, Frequency, InterestRate};

use crate::error::{CurveError, CurveResult};
use crate::reactive::Observable;

/// Slack allowed past the last curve time before a query counts as
/// extrapolation.
pub const TIME_EPSILON: f64 = 1.0e-10;

/// Span used to turn instantaneous rates into finite-difference ones.
const SHORT_SPAN: f64 = 1.0e-4;

/// Per-curve extrapolation switch.
#[derive(Default)]
pub struct Extrapolator {
    enabled: AtomicBool,
}

impl Extrapolator {
    /// Creates a switch in the given state.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Allows queries past the curve's max date.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    /// Rejects queries past the curve's max date.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// Returns true if extrapolation is allowed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Extrapolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extrapolator({})", self.is_enabled())
    }
}

/// A discount curve over dates.
///
/// # Example
///
/// ```rust
/// use yieldline_core::daycounts::{DayCount, DayCountConvention};
/// use yieldline_core::{Compounding, Date, Frequency};
/// use yieldline_curves::curves::FlatForward;
/// use yieldline_curves::term_structure::YieldTermStructure;
/// use yieldline_curves::Session;
///
/// let today = Date::from_ymd(2025, 3, 17).unwrap();
/// let session = Session::new(today);
/// let dc = DayCountConvention::Act365Fixed.to_day_counter();
/// let curve = FlatForward::with_rate(
///     &session, today, 0.03, dc.clone(), Compounding::Continuous, Frequency::Annual,
/// ).unwrap();
///
/// let in_one_year = Date::from_ymd(2026, 3, 17).unwrap();
/// let df = curve.discount(in_one_year).unwrap();
/// assert!((df - (-0.03_f64).exp()).abs() < 1e-12);
///
/// let zero = curve
///     .zero_rate(in_one_year, &dc, Compounding::Continuous, Frequency::Annual)
///     .unwrap();
/// assert!((zero.rate() - 0.03).abs() < 1e-12);
/// ```
pub trait YieldTermStructure: Observable + Send + Sync + fmt::Debug {
    /// Date at which discount factors are 1.
    fn reference_date(&self) -> Date;

    /// Day counter measuring the curve's time axis.
    fn day_counter(&self) -> &DayCounter;

    /// Latest date for which the curve is defined without extrapolation.
    fn max_date(&self) -> CurveResult<Date>;

    /// The curve's extrapolation switch.
    fn extrapolator(&self) -> &Extrapolator;

    /// Discount factor at curve time `t`.
    ///
    /// Called with `t > 0` after the range check.
    fn discount_impl(&self, t: f64) -> CurveResult<f64>;

    /// Curve time of `date`.
    fn time_from_reference(&self, date: Date) -> f64 {
        self.day_counter().year_fraction(self.reference_date(), date)
    }

    /// Curve time of [`max_date`](Self::max_date).
    fn max_time(&self) -> CurveResult<f64> {
        Ok(self.time_from_reference(self.max_date()?))
    }

    /// Returns true if queries past the max date are allowed.
    fn allows_extrapolation(&self) -> bool {
        self.extrapolator().is_enabled()
    }

    /// Allows queries past the max date.
    fn enable_extrapolation(&self) {
        self.extrapolator().enable();
    }

    /// Rejects queries past the max date.
    fn disable_extrapolation(&self) {
        self.extrapolator().disable();
    }

    /// Validates a curve time.
    fn check_range(&self, t: f64) -> CurveResult<()> {
        if t < 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "negative time ({t}) given"
            )));
        }
        if !self.allows_extrapolation() {
            let max_time = self.max_time()?;
            if t > max_time + TIME_EPSILON {
                return Err(CurveError::extrapolation_not_allowed(t, max_time));
            }
        }
        Ok(())
    }

    /// Discount factor at `date`.
    fn discount(&self, date: Date) -> CurveResult<f64> {
        self.discount_t(self.time_from_reference(date))
    }

    /// Discount factor at curve time `t`.
    fn discount_t(&self, t: f64) -> CurveResult<f64> {
        self.check_range(t)?;
        if t == 0.0 {
            return Ok(1.0);
        }
        self.discount_impl(t)
    }

    /// Zero rate from the reference date to `date`.
    ///
    /// At the reference date itself the instantaneous rate over a short span
    /// is returned.
    fn zero_rate(
        &self,
        date: Date,
        day_counter: &DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CurveResult<InterestRate> {
        let reference = self.reference_date();
        if date == reference {
            let compound = 1.0 / self.discount_t(SHORT_SPAN)?;
            return Ok(InterestRate::implied_rate(
                compound,
                SHORT_SPAN,
                day_counter.clone(),
                compounding,
                frequency,
            )?);
        }
        let compound = 1.0 / self.discount(date)?;
        Ok(InterestRate::implied_rate_between(
            compound,
            reference,
            date,
            day_counter.clone(),
            compounding,
            frequency,
        )?)
    }

    /// Zero rate to curve time `t`, on the curve's day counter.
    fn zero_rate_t(
        &self,
        t: f64,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CurveResult<InterestRate> {
        let span = if t == 0.0 { SHORT_SPAN } else { t };
        let compound = 1.0 / self.discount_t(span)?;
        Ok(InterestRate::implied_rate(
            compound,
            span,
            self.day_counter().clone(),
            compounding,
            frequency,
        )?)
    }

    /// Forward rate between two dates.
    ///
    /// Equal dates give the instantaneous forward around that date.
    fn forward_rate(
        &self,
        d1: Date,
        d2: Date,
        day_counter: &DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CurveResult<InterestRate> {
        if d1 > d2 {
            return Err(CurveError::invalid_argument(format!(
                "forward start {d1} later than end {d2}"
            )));
        }
        if d1 == d2 {
            let t1 = (self.time_from_reference(d1) - SHORT_SPAN / 2.0).max(0.0);
            let t2 = t1 + SHORT_SPAN;
            let compound = self.discount_t(t1)? / self.discount_t(t2)?;
            return Ok(InterestRate::implied_rate(
                compound,
                SHORT_SPAN,
                day_counter.clone(),
                compounding,
                frequency,
            )?);
        }
        let compound = self.discount(d1)? / self.discount(d2)?;
        Ok(InterestRate::implied_rate_between(
            compound,
            d1,
            d2,
            day_counter.clone(),
            compounding,
            frequency,
        )?)
    }

    /// Forward rate between two curve times, on the curve's day counter.
    fn forward_rate_t(
        &self,
        t1: f64,
        t2: f64,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CurveResult<InterestRate> {
        if t1 > t2 {
            return Err(CurveError::invalid_argument(format!(
                "forward start time {t1} later than end time {t2}"
            )));
        }
        let (t1, t2) = if t2 - t1 < SHORT_SPAN {
            let start = (t1 - SHORT_SPAN / 2.0).max(0.0);
            (start, start + SHORT_SPAN)
        } else {
            (t1, t2)
        };
        let compound = self.discount_t(t1)? / self.discount_t(t2)?;
        Ok(InterestRate::implied_rate(
            compound,
            t2 - t1,
            self.day_counter().clone(),
            compounding,
            frequency,
        )?)
    }
}
