//! Schedules, coupons and swaps used by the rate helpers.
//!
//! Only the pieces bootstrapping needs are here: fixed and Ibor coupons
//! paid at period ends, and a vanilla swap valued on a given curve.

mod coupons;
mod schedule;
mod swap;

pub use coupons::{fixed_leg, ibor_leg, FixedRateCoupon, FloatingRateCoupon};
pub use schedule::{DateGeneration, Schedule, ScheduleBuilder};
pub use swap::{SwapType, SwapValuation, VanillaSwap, BASIS_POINT};
