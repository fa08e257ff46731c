//! Curve implementations.
//!
//! - [`FlatForward`]: a single quoted rate for every maturity
//! - [`InterpolatedDiscountCurve`]: interpolation over given discount factors
//! - [`PiecewiseYieldCurve`]: nodes bootstrapped from rate helpers on demand
//! - [`CurveNodes`]: the dated nodes and interpolator the last two share

mod flat_forward;
mod interpolated;
mod nodes;
mod piecewise;

pub use flat_forward::FlatForward;
pub use interpolated::InterpolatedDiscountCurve;
pub use nodes::{CurveNodes, CurveQuantity};
pub use piecewise::{CurveReference, PiecewiseYieldCurve};
