//! Flat forward curve.

use std::sync::Arc;

use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::{Compounding, Date, Frequency, InterestRate};

use crate::error::CurveResult;
use crate::quotes::{Quote, SimpleQuote};
use crate::reactive::{GraphNode, Handle, NodeId, Observable};
use crate::session::Session;
use crate::term_structure::{Extrapolator, YieldTermStructure};

/// A curve with a single rate for every maturity.
///
/// The rate comes from a quote handle; the curve observes it, so its
/// dependents hear about rate changes.
#[derive(Debug)]
pub struct FlatForward {
    node: GraphNode,
    reference_date: Date,
    rate: Handle<dyn Quote>,
    day_counter: DayCounter,
    compounding: Compounding,
    frequency: Frequency,
    extrapolator: Extrapolator,
}

impl FlatForward {
    /// Creates a curve on a rate quote.
    ///
    /// # Errors
    ///
    /// Fails if the compounding needs a periodic frequency that is missing.
    pub fn new(
        session: &Session,
        reference_date: Date,
        rate: Handle<dyn Quote>,
        day_counter: DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CurveResult<Self> {
        // Rejects bad conventions up front rather than on first use.
        InterestRate::new(0.0, day_counter.clone(), compounding, frequency)?;

        let node = GraphNode::new(session.graph(), "flat forward");
        node.observe(rate.observable_id())?;
        Ok(Self {
            node,
            reference_date,
            rate,
            day_counter,
            compounding,
            frequency,
            extrapolator: Extrapolator::new(true),
        })
    }

    /// Creates a curve on a fixed rate.
    pub fn with_rate(
        session: &Session,
        reference_date: Date,
        rate: f64,
        day_counter: DayCounter,
        compounding: Compounding,
        frequency: Frequency,
    ) -> CurveResult<Self> {
        let quote = Arc::new(SimpleQuote::new(session, Some(rate)));
        let handle = quote.handle()?;
        Self::new(session, reference_date, handle, day_counter, compounding, frequency)
    }

    /// The rate with its conventions.
    pub fn rate(&self) -> CurveResult<InterestRate> {
        Ok(InterestRate::new(
            self.rate.value()?,
            self.day_counter.clone(),
            self.compounding,
            self.frequency,
        )?)
    }
}

impl Observable for FlatForward {
    fn observable_id(&self) -> NodeId {
        self.node.id()
    }
}

impl YieldTermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &DayCounter {
        &self.day_counter
    }

    fn max_date(&self) -> CurveResult<Date> {
        Ok(Date::from_ymd(2199, 12, 31)?)
    }

    fn extrapolator(&self) -> &Extrapolator {
        &self.extrapolator
    }

    fn discount_impl(&self, t: f64) -> CurveResult<f64> {
        Ok(self.rate()?.discount_factor(t)?)
    }
}
