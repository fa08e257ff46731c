//! Interpolation methods for curve nodes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use yieldline_math::interpolation::{
    CubicSpline, Interpolator, LinearInterpolator, LogLinearInterpolator,
};
use yieldline_math::MathResult;

/// Interpolation between curve nodes.
///
/// Applies to whichever quantity the curve stores: discount factors or
/// zero rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// Piecewise linear.
    #[default]
    Linear,

    /// Linear on the logarithm. On discount factors this gives piecewise
    /// flat forward rates.
    LogLinear,

    /// Natural cubic spline.
    CubicSpline,
}

impl InterpolationMethod {
    /// Minimum number of nodes the method needs.
    #[must_use]
    pub fn min_points(&self) -> usize {
        match self {
            Self::Linear | Self::LogLinear => 2,
            Self::CubicSpline => 3,
        }
    }

    /// Returns true if moving one node changes the curve between other
    /// nodes.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::CubicSpline)
    }

    /// Returns true if values must be strictly positive.
    #[must_use]
    pub fn requires_positive_values(&self) -> bool {
        matches!(self, Self::LogLinear)
    }

    /// The method actually used for `points` nodes.
    ///
    /// A spline over fewer than three nodes degrades to linear.
    #[must_use]
    pub fn effective(&self, points: usize) -> Self {
        if points < self.min_points() {
            Self::Linear
        } else {
            *self
        }
    }

    /// Builds an interpolator through the given nodes.
    pub fn build(&self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Arc<dyn Interpolator>> {
        Ok(match self.effective(xs.len()) {
            Self::Linear => Arc::new(LinearInterpolator::new(xs, ys)?),
            Self::LogLinear => Arc::new(LogLinearInterpolator::new(xs, ys)?),
            Self::CubicSpline => Arc::new(CubicSpline::new(xs, ys)?),
        })
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Linear => "Linear",
            Self::LogLinear => "Log-Linear",
            Self::CubicSpline => "Cubic Spline",
        };
        write!(f, "{name}")
    }
}
