//! Fixed-for-floating interest rate swaps.

use std::fmt;

use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::Date;

use crate::cashflows::coupons::{fixed_leg, ibor_leg, FixedRateCoupon, FloatingRateCoupon};
use crate::cashflows::Schedule;
use crate::error::{CurveError, CurveResult};
use crate::indexes::IborIndex;
use crate::term_structure::YieldTermStructure;

/// One basis point.
pub const BASIS_POINT: f64 = 1.0e-4;

/// Which side of the fixed leg the holder is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapType {
    /// Pays fixed, receives floating.
    Payer,
    /// Receives fixed, pays floating.
    Receiver,
}

impl fmt::Display for SwapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payer => write!(f, "payer"),
            Self::Receiver => write!(f, "receiver"),
        }
    }
}

/// Leg values of a swap on a given curve.
///
/// NPVs and BPS carry the holder's sign. BPS is the value of one basis
/// point on the leg's rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapValuation {
    /// Net present value.
    pub npv: f64,
    /// Fixed leg value.
    pub fixed_leg_npv: f64,
    /// Fixed leg basis point sensitivity.
    pub fixed_leg_bps: f64,
    /// Floating leg value.
    pub floating_leg_npv: f64,
    /// Floating leg basis point sensitivity.
    pub floating_leg_bps: f64,
    /// Fixed rate giving zero NPV.
    pub fair_rate: f64,
    /// Floating spread giving zero NPV.
    pub fair_spread: f64,
}

/// A vanilla fixed-for-Ibor swap.
#[derive(Debug, Clone)]
pub struct VanillaSwap {
    swap_type: SwapType,
    nominal: f64,
    fixed_rate: f64,
    spread: f64,
    start_date: Date,
    maturity_date: Date,
    fixed_leg: Vec<FixedRateCoupon>,
    floating_leg: Vec<FloatingRateCoupon>,
}

impl VanillaSwap {
    /// Builds both legs, paying at period ends.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        swap_type: SwapType,
        nominal: f64,
        fixed_schedule: &Schedule,
        fixed_rate: f64,
        fixed_day_counter: &DayCounter,
        floating_schedule: &Schedule,
        index: &IborIndex,
        spread: f64,
        floating_day_counter: &DayCounter,
    ) -> Self {
        Self {
            swap_type,
            nominal,
            fixed_rate,
            spread,
            start_date: fixed_schedule.start_date().min(floating_schedule.start_date()),
            maturity_date: fixed_schedule.end_date().max(floating_schedule.end_date()),
            fixed_leg: fixed_leg(fixed_schedule, nominal, fixed_rate, fixed_day_counter),
            floating_leg: ibor_leg(floating_schedule, nominal, index, spread, floating_day_counter),
        }
    }

    /// Payer or receiver.
    pub fn swap_type(&self) -> SwapType {
        self.swap_type
    }

    /// Notional.
    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    /// Fixed rate.
    pub fn fixed_rate(&self) -> f64 {
        self.fixed_rate
    }

    /// Floating spread.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Fixed coupons.
    pub fn fixed_leg(&self) -> &[FixedRateCoupon] {
        &self.fixed_leg
    }

    /// Floating coupons.
    pub fn floating_leg(&self) -> &[FloatingRateCoupon] {
        &self.floating_leg
    }

    /// Earliest accrual start over both legs.
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Latest payment over both legs.
    pub fn maturity_date(&self) -> Date {
        self.maturity_date
    }

    /// Values both legs on `curve`.
    ///
    /// Coupons paying before the curve's reference date are ignored.
    ///
    /// # Errors
    ///
    /// Fails if a leg has no remaining coupons, or on any curve or fixing
    /// error.
    pub fn valuation(&self, curve: &dyn YieldTermStructure) -> CurveResult<SwapValuation> {
        let reference = curve.reference_date();
        let fixed_sign = match self.swap_type {
            SwapType::Payer => -1.0,
            SwapType::Receiver => 1.0,
        };

        let mut fixed_npv = 0.0;
        let mut fixed_bps = 0.0;
        for coupon in self.fixed_leg.iter().filter(|c| c.payment_date() >= reference) {
            let df = curve.discount(coupon.payment_date())?;
            fixed_npv += coupon.amount() * df;
            fixed_bps += coupon.nominal() * coupon.accrual_period() * df;
        }

        let mut floating_npv = 0.0;
        let mut floating_bps = 0.0;
        for coupon in self.floating_leg.iter().filter(|c| c.payment_date() >= reference) {
            let df = curve.discount(coupon.payment_date())?;
            floating_npv += coupon.amount_on(curve)? * df;
            floating_bps += coupon.nominal() * coupon.accrual_period() * df;
        }

        if fixed_bps == 0.0 || floating_bps == 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "swap maturing on {} has no remaining coupons on {reference}",
                self.maturity_date()
            )));
        }

        let fixed_leg_npv = fixed_sign * fixed_npv;
        let fixed_leg_bps = fixed_sign * fixed_bps * BASIS_POINT;
        let floating_leg_npv = -fixed_sign * floating_npv;
        let floating_leg_bps = -fixed_sign * floating_bps * BASIS_POINT;
        let npv = fixed_leg_npv + floating_leg_npv;

        Ok(SwapValuation {
            npv,
            fixed_leg_npv,
            fixed_leg_bps,
            floating_leg_npv,
            floating_leg_bps,
            fair_rate: self.fixed_rate - npv / (fixed_leg_bps / BASIS_POINT),
            fair_spread: self.spread - npv / (floating_leg_bps / BASIS_POINT),
        })
    }
}
