//! Trial term structure the bootstrap solves on.

use std::sync::Arc;

use parking_lot::RwLock;
use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::Date;

use crate::curves::CurveNodes;
use crate::error::{CurveError, CurveResult};
use crate::reactive::{GraphNode, NodeId, Observable};
use crate::session::Session;
use crate::term_structure::{Extrapolator, YieldTermStructure};

/// A term structure over the nodes solved so far.
///
/// Helpers price off the workspace while the bootstrap moves the node being
/// solved, so reading it never triggers another bootstrap. It always
/// extrapolates: the helper being solved may look past the last node built
/// so far.
#[derive(Debug)]
pub struct BootstrapWorkspace {
    node: GraphNode,
    reference_date: RwLock<Date>,
    day_counter: DayCounter,
    nodes: RwLock<Option<Arc<CurveNodes>>>,
    extrapolator: Extrapolator,
}

impl BootstrapWorkspace {
    /// Creates an empty workspace.
    pub fn new(session: &Session, day_counter: DayCounter) -> Self {
        Self {
            node: GraphNode::new(session.graph(), "bootstrap workspace"),
            reference_date: RwLock::new(session.evaluation_date()),
            day_counter,
            nodes: RwLock::new(None),
            extrapolator: Extrapolator::new(true),
        }
    }

    /// Drops the nodes and moves the reference date.
    pub fn reset(&self, reference_date: Date) {
        *self.reference_date.write() = reference_date;
        *self.nodes.write() = None;
    }

    /// Replaces the trial nodes.
    pub fn set_nodes(&self, nodes: Arc<CurveNodes>) {
        *self.nodes.write() = Some(nodes);
    }

    /// Current trial nodes.
    pub fn nodes(&self) -> Option<Arc<CurveNodes>> {
        self.nodes.read().clone()
    }

    fn current_nodes(&self) -> CurveResult<Arc<CurveNodes>> {
        self.nodes()
            .ok_or_else(|| CurveError::invalid_argument("bootstrap workspace has no nodes"))
    }
}

impl Observable for BootstrapWorkspace {
    fn observable_id(&self) -> NodeId {
        self.node.id()
    }
}

impl YieldTermStructure for BootstrapWorkspace {
    fn reference_date(&self) -> Date {
        *self.reference_date.read()
    }

    fn day_counter(&self) -> &DayCounter {
        &self.day_counter
    }

    fn max_date(&self) -> CurveResult<Date> {
        Ok(self.current_nodes()?.max_date())
    }

    fn extrapolator(&self) -> &Extrapolator {
        &self.extrapolator
    }

    fn discount_impl(&self, t: f64) -> CurveResult<f64> {
        self.current_nodes()?.discount(t)
    }
}
