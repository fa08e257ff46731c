//! One-dimensional interpolation for curve nodes.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: Piecewise linear
//! - [`LogLinearInterpolator`]: Linear on the logarithm of values; on
//!   discount factors this gives piecewise flat forwards
//! - [`CubicSpline`]: Natural cubic spline, C2 smooth
//!
//! | Method | Smoothness | Positive values | Minimum points |
//! |--------|------------|-----------------|----------------|
//! | Linear | C0 | No | 2 |
//! | Log-Linear | C0 | Yes | 2 |
//! | Cubic Spline | C2 | No | 3 |
//!
//! Interpolators are rebuilt from scratch whenever their nodes change; a
//! bootstrap rebuilds after every trial node value.

mod cubic_spline;
mod linear;
mod log_linear;

pub use cubic_spline::CubicSpline;
pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;

use crate::error::{MathError, MathResult};

/// Trait for interpolation methods.
pub trait Interpolator: Send + Sync + std::fmt::Debug {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns true if extrapolation is allowed.
    fn allows_extrapolation(&self) -> bool {
        false
    }

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Checks lengths, minimum size and strictly increasing abscissae.
pub(crate) fn validate_nodes(xs: &[f64], ys: &[f64], required: usize) -> MathResult<()> {
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input("x values must be strictly increasing"));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("node values must be finite"));
    }
    Ok(())
}

/// Index `i` of the segment `[xs[i], xs[i+1]]` used for `x`.
///
/// Points outside the range map to the first or last segment.
pub(crate) fn locate(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&probe| probe <= x);
    upper.saturating_sub(1).min(xs.len() - 2)
}

/// Rejects `x` outside `[xs[0], xs[n-1]]` unless extrapolation is allowed.
pub(crate) fn check_range(xs: &[f64], x: f64, allow_extrapolation: bool) -> MathResult<()> {
    let (min, max) = (xs[0], xs[xs.len() - 1]);
    if !allow_extrapolation && (x < min || x > max) {
        return Err(MathError::ExtrapolationNotAllowed { x, min, max });
    }
    Ok(())
}
