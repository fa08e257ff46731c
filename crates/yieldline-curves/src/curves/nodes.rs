//! Interpolated curve nodes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use yieldline_core::types::Date;
use yieldline_math::interpolation::Interpolator;

use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationMethod;

/// Quantity stored at curve nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurveQuantity {
    /// Discount factors.
    #[default]
    DiscountFactor,
    /// Continuously compounded zero rates.
    ZeroRate,
}

impl fmt::Display for CurveQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiscountFactor => write!(f, "discount factor"),
            Self::ZeroRate => write!(f, "zero rate"),
        }
    }
}

/// Dated curve nodes with an interpolator over their times.
///
/// The first node sits at the reference date (time zero). Past the last
/// node, discount factors continue at the instantaneous forward rate of the
/// last node.
#[derive(Clone)]
pub struct CurveNodes {
    dates: Vec<Date>,
    times: Vec<f64>,
    values: Vec<f64>,
    quantity: CurveQuantity,
    interpolation: InterpolationMethod,
    interpolator: Arc<dyn Interpolator>,
}

impl CurveNodes {
    /// Builds nodes from dates, their curve times and values.
    ///
    /// # Errors
    ///
    /// Fails if the lengths differ, fewer than two nodes are given, the
    /// dates are not strictly increasing, the first time is not zero, or the
    /// interpolator rejects the values.
    pub fn new(
        dates: Vec<Date>,
        times: Vec<f64>,
        values: Vec<f64>,
        quantity: CurveQuantity,
        interpolation: InterpolationMethod,
    ) -> CurveResult<Self> {
        if dates.len() != times.len() || dates.len() != values.len() {
            return Err(CurveError::invalid_argument(format!(
                "node sizes differ: {} dates, {} times, {} values",
                dates.len(),
                times.len(),
                values.len()
            )));
        }
        if dates.len() < 2 {
            return Err(CurveError::invalid_argument(format!(
                "at least 2 nodes required, got {}",
                dates.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(CurveError::invalid_argument(format!(
                "node dates must be strictly increasing: {} then {}",
                pair[0], pair[1]
            )));
        }
        if times[0] != 0.0 {
            return Err(CurveError::invalid_argument(format!(
                "first node must be at time zero, got {}",
                times[0]
            )));
        }

        let interpolation = interpolation.effective(values.len());
        let interpolator = interpolation.build(times.clone(), values.clone())?;
        Ok(Self {
            dates,
            times,
            values,
            quantity,
            interpolation,
            interpolator,
        })
    }

    /// Discount factor at curve time `t >= 0`.
    pub fn discount(&self, t: f64) -> CurveResult<f64> {
        let last = self.times.len() - 1;
        let t_max = self.times[last];
        let v_max = self.values[last];

        match self.quantity {
            CurveQuantity::DiscountFactor => {
                if t <= t_max {
                    return Ok(self.interpolator.interpolate(t)?);
                }
                let forward = -self.interpolator.derivative(t_max)? / v_max;
                Ok(v_max * (-forward * (t - t_max)).exp())
            }
            CurveQuantity::ZeroRate => {
                if t <= t_max {
                    let zero = self.interpolator.interpolate(t)?;
                    return Ok((-zero * t).exp());
                }
                let forward = v_max + t_max * self.interpolator.derivative(t_max)?;
                Ok((-(v_max * t_max + forward * (t - t_max))).exp())
            }
        }
    }

    /// Discount factors at the node times.
    pub fn discounts(&self) -> Vec<f64> {
        match self.quantity {
            CurveQuantity::DiscountFactor => self.values.clone(),
            CurveQuantity::ZeroRate => self
                .times
                .iter()
                .zip(&self.values)
                .map(|(t, z)| (-z * t).exp())
                .collect(),
        }
    }

    /// Node dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Node times.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Node values in the stored quantity.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Stored quantity.
    pub fn quantity(&self) -> CurveQuantity {
        self.quantity
    }

    /// Interpolation in use, after any fallback for few nodes.
    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false: nodes hold at least two points.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Last node date.
    pub fn max_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// Last node time.
    pub fn max_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }
}

impl fmt::Debug for CurveNodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveNodes")
            .field("quantity", &self.quantity)
            .field("interpolation", &self.interpolation)
            .field("dates", &self.dates)
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn dates() -> Vec<Date> {
        vec![d(2025, 1, 1), d(2026, 1, 1), d(2027, 1, 1)]
    }

    #[test]
    fn test_discount_factor_nodes() {
        let nodes = CurveNodes::new(
            dates(),
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.96, 0.92],
            CurveQuantity::DiscountFactor,
            InterpolationMethod::Linear,
        )
        .unwrap();

        assert_relative_eq!(nodes.discount(0.0).unwrap(), 1.0);
        assert_relative_eq!(nodes.discount(0.5).unwrap(), 0.98, epsilon = 1e-14);
        assert_relative_eq!(nodes.discount(2.0).unwrap(), 0.92, epsilon = 1e-14);
        assert_eq!(nodes.max_date(), d(2027, 1, 1));
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_flat_forward_extrapolation_on_discounts() {
        let nodes = CurveNodes::new(
            dates(),
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.96, 0.92],
            CurveQuantity::DiscountFactor,
            InterpolationMethod::Linear,
        )
        .unwrap();

        // Last segment slope is -0.04, so the forward is 0.04 / 0.92
        let forward: f64 = 0.04 / 0.92;
        let expected = 0.92 * (-forward * 1.5).exp();
        assert_relative_eq!(nodes.discount(3.5).unwrap(), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_zero_rate_nodes() {
        let nodes = CurveNodes::new(
            dates(),
            vec![0.0, 1.0, 2.0],
            vec![0.03, 0.03, 0.04],
            CurveQuantity::ZeroRate,
            InterpolationMethod::Linear,
        )
        .unwrap();

        assert_relative_eq!(nodes.discount(1.0).unwrap(), (-0.03_f64).exp(), epsilon = 1e-14);
        assert_relative_eq!(
            nodes.discount(1.5).unwrap(),
            (-0.035_f64 * 1.5).exp(),
            epsilon = 1e-14
        );

        // Instantaneous forward at t = 2 is z + t z' = 0.04 + 2 * 0.01
        let expected = (-(0.04 * 2.0 + 0.06 * 1.0_f64)).exp();
        assert_relative_eq!(nodes.discount(3.0).unwrap(), expected, epsilon = 1e-14);

        let discounts = nodes.discounts();
        assert_relative_eq!(discounts[2], (-0.08_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn test_cubic_falls_back_to_linear() {
        let nodes = CurveNodes::new(
            vec![d(2025, 1, 1), d(2026, 1, 1)],
            vec![0.0, 1.0],
            vec![1.0, 0.96],
            CurveQuantity::DiscountFactor,
            InterpolationMethod::CubicSpline,
        )
        .unwrap();
        assert_eq!(nodes.interpolation(), InterpolationMethod::Linear);
    }

    #[test]
    fn test_invalid_nodes() {
        let err = CurveNodes::new(
            vec![d(2025, 1, 1), d(2025, 1, 1)],
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            CurveQuantity::DiscountFactor,
            InterpolationMethod::Linear,
        );
        assert!(err.is_err());

        let err = CurveNodes::new(
            vec![d(2025, 1, 1), d(2026, 1, 1)],
            vec![0.1, 1.0],
            vec![1.0, 0.96],
            CurveQuantity::DiscountFactor,
            InterpolationMethod::Linear,
        );
        assert!(err.is_err());

        let err = CurveNodes::new(
            vec![d(2025, 1, 1)],
            vec![0.0],
            vec![1.0],
            CurveQuantity::DiscountFactor,
            InterpolationMethod::Linear,
        );
        assert!(err.is_err());
    }
}
