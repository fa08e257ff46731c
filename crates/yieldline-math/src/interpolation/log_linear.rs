//! Log-linear interpolation.

use crate::error::{MathError, MathResult};
use crate::interpolation::{check_range, locate, validate_nodes, Interpolator};

/// Log-linear interpolation between data points.
///
/// Interpolates `ln(y)` linearly and exponentiates. On discount factors
/// this produces piecewise constant forward rates and keeps values positive.
///
/// ```text
/// y(x) = exp(linear_interpolate(x, ln(y)))
/// ```
///
/// # Example
///
/// ```rust
/// use yieldline_math::interpolation::{LogLinearInterpolator, Interpolator};
///
/// let times = vec![0.0, 1.0, 2.0, 3.0];
/// let discount_factors = vec![1.0, 0.97, 0.94, 0.91];
///
/// let interp = LogLinearInterpolator::new(times, discount_factors).unwrap();
/// let df = interp.interpolate(1.5).unwrap();
/// assert!(df > 0.94 && df < 0.97);
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    log_ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Errors
    ///
    /// Fewer than 2 points, mismatched lengths, unsorted `xs`, or a
    /// non-positive `y`.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;

        if let Some((i, y)) = ys.iter().enumerate().find(|(_, &y)| y <= 0.0) {
            return Err(MathError::invalid_input(format!(
                "y[{i}] = {y} is not positive; log-linear requires positive values"
            )));
        }
        let log_ys = ys.iter().map(|y| y.ln()).collect();

        Ok(Self {
            xs,
            log_ys,
            allow_extrapolation: false,
        })
    }

    /// Enables extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    fn log_value(&self, i: usize, x: f64) -> (f64, f64) {
        let slope =
            (self.log_ys[i + 1] - self.log_ys[i]) / (self.xs[i + 1] - self.xs[i]);
        (self.log_ys[i] + (x - self.xs[i]) * slope, slope)
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        let (log_y, _) = self.log_value(locate(&self.xs, x), x);
        Ok(log_y.exp())
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x, self.allow_extrapolation)?;
        // d/dx exp(g(x)) = exp(g(x)) g'(x)
        let (log_y, slope) = self.log_value(locate(&self.xs, x), x);
        Ok(log_y.exp() * slope)
    }

    fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_forward_between_nodes() {
        // Constant 4% continuous forward between nodes
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![1.0, (-0.03_f64).exp(), (-0.07_f64).exp()];
        let interp = LogLinearInterpolator::new(xs, ys).unwrap();

        let df = interp.interpolate(1.5).unwrap();
        assert_relative_eq!(df, (-0.05_f64).exp(), epsilon = 1e-14);

        // Instantaneous forward = -d ln(df)/dt
        let fwd = -interp.derivative(1.5).unwrap() / df;
        assert_relative_eq!(fwd, 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.0]).is_err());
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, -0.5]).is_err());
    }

    #[test]
    fn test_extrapolation() {
        let xs = vec![0.0, 1.0];
        let ys = vec![1.0, (-0.05_f64).exp()];
        let interp = LogLinearInterpolator::new(xs.clone(), ys.clone()).unwrap();
        assert!(interp.interpolate(2.0).is_err());

        let interp = LogLinearInterpolator::new(xs, ys).unwrap().with_extrapolation();
        assert_relative_eq!(interp.interpolate(2.0).unwrap(), (-0.10_f64).exp(), epsilon = 1e-14);
    }
}
