//! Discount curve over caller-supplied nodes.

use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::Date;

use crate::curves::nodes::{CurveNodes, CurveQuantity};
use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationMethod;
use crate::reactive::{GraphNode, NodeId, Observable};
use crate::session::Session;
use crate::term_structure::{Extrapolator, YieldTermStructure};

/// A curve interpolating given discount factors.
///
/// The first date is the reference date and its discount factor must be
/// exactly 1.
///
/// # Example
///
/// ```rust
/// use yieldline_core::daycounts::DayCountConvention;
/// use yieldline_core::Date;
/// use yieldline_curves::curves::InterpolatedDiscountCurve;
/// use yieldline_curves::interpolation::InterpolationMethod;
/// use yieldline_curves::term_structure::YieldTermStructure;
/// use yieldline_curves::Session;
///
/// let today = Date::from_ymd(2025, 1, 2).unwrap();
/// let session = Session::new(today);
/// let curve = InterpolatedDiscountCurve::new(
///     &session,
///     vec![today, Date::from_ymd(2026, 1, 2).unwrap()],
///     vec![1.0, 0.96],
///     DayCountConvention::Act365Fixed.to_day_counter(),
///     InterpolationMethod::LogLinear,
/// )
/// .unwrap();
///
/// assert_eq!(curve.discount(today).unwrap(), 1.0);
/// assert!(curve.discount(Date::from_ymd(2027, 1, 2).unwrap()).is_err());
/// ```
#[derive(Debug)]
pub struct InterpolatedDiscountCurve {
    node: GraphNode,
    day_counter: DayCounter,
    nodes: CurveNodes,
    extrapolator: Extrapolator,
}

impl InterpolatedDiscountCurve {
    /// Creates a curve from dates and discount factors.
    pub fn new(
        session: &Session,
        dates: Vec<Date>,
        discounts: Vec<f64>,
        day_counter: DayCounter,
        interpolation: InterpolationMethod,
    ) -> CurveResult<Self> {
        let Some(&reference_date) = dates.first() else {
            return Err(CurveError::invalid_argument("no dates given"));
        };
        if discounts.first() != Some(&1.0) {
            return Err(CurveError::invalid_argument(
                "the first discount factor must be 1.0 to mark the reference date",
            ));
        }
        if let Some(df) = discounts.iter().find(|df| **df <= 0.0) {
            return Err(CurveError::invalid_argument(format!(
                "discount factors must be positive, got {df}"
            )));
        }

        let times = dates
            .iter()
            .map(|&date| day_counter.year_fraction(reference_date, date))
            .collect();
        let nodes = CurveNodes::new(
            dates,
            times,
            discounts,
            CurveQuantity::DiscountFactor,
            interpolation,
        )?;

        Ok(Self {
            node: GraphNode::new(session.graph(), "interpolated discount curve"),
            day_counter,
            nodes,
            extrapolator: Extrapolator::default(),
        })
    }

    /// The curve's nodes.
    pub fn nodes(&self) -> &CurveNodes {
        &self.nodes
    }
}

impl Observable for InterpolatedDiscountCurve {
    fn observable_id(&self) -> NodeId {
        self.node.id()
    }
}

impl YieldTermStructure for InterpolatedDiscountCurve {
    fn reference_date(&self) -> Date {
        self.nodes.dates()[0]
    }

    fn day_counter(&self) -> &DayCounter {
        &self.day_counter
    }

    fn max_date(&self) -> CurveResult<Date> {
        Ok(self.nodes.max_date())
    }

    fn extrapolator(&self) -> &Extrapolator {
        &self.extrapolator
    }

    fn discount_impl(&self, t: f64) -> CurveResult<f64> {
        self.nodes.discount(t)
    }
}
