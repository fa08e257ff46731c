//! Market quotes.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{CurveError, CurveResult};
use crate::reactive::{GraphNode, Handle, NodeId, Observable};
use crate::session::Session;

/// An observable market value.
pub trait Quote: Observable + Send + Sync + fmt::Debug {
    /// Current value.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the quote holds no value.
    fn value(&self) -> CurveResult<f64>;

    /// Returns true if a value is available.
    fn is_valid(&self) -> bool;
}

/// A quote set directly by the caller.
///
/// # Example
///
/// ```rust
/// use yieldline_core::Date;
/// use yieldline_curves::quotes::{Quote, SimpleQuote};
/// use yieldline_curves::Session;
///
/// let session = Session::new(Date::from_ymd(2025, 3, 17).unwrap());
/// let quote = SimpleQuote::new(&session, Some(0.0455));
///
/// assert!((quote.set_value(0.0460).unwrap() - 0.0005).abs() < 1e-15);
/// assert_eq!(quote.value().unwrap(), 0.0460);
/// ```
#[derive(Debug)]
pub struct SimpleQuote {
    node: GraphNode,
    value: RwLock<Option<f64>>,
}

impl SimpleQuote {
    /// Creates a quote, empty when `value` is `None`.
    #[must_use]
    pub fn new(session: &Session, value: Option<f64>) -> Self {
        Self {
            node: GraphNode::new(session.graph(), "quote"),
            value: RwLock::new(value),
        }
    }

    /// Sets the value and returns the change.
    ///
    /// Observers are notified only when the value differs.
    pub fn set_value(&self, value: f64) -> CurveResult<f64> {
        let diff = {
            let mut current = self.value.write();
            match current.replace(value) {
                Some(previous) if previous == value => return Ok(0.0),
                Some(previous) => value - previous,
                None => value,
            }
        };
        self.node.notify()?;
        Ok(diff)
    }

    /// Empties the quote, notifying observers if it held a value.
    pub fn reset(&self) -> CurveResult<()> {
        if self.value.write().take().is_some() {
            self.node.notify()?;
        }
        Ok(())
    }

    /// Wraps the quote in a handle.
    pub fn handle(self: &Arc<Self>) -> CurveResult<Handle<dyn Quote>> {
        let target: Arc<dyn Quote> = Arc::clone(self) as Arc<dyn Quote>;
        Handle::new(self.node.graph(), target)
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> CurveResult<f64> {
        self.value
            .read()
            .ok_or_else(|| CurveError::invalid_argument("quote has no value"))
    }

    fn is_valid(&self) -> bool {
        self.value.read().is_some()
    }
}

impl Observable for SimpleQuote {
    fn observable_id(&self) -> NodeId {
        self.node.id()
    }
}

impl Handle<dyn Quote> {
    /// Value of the linked quote.
    pub fn value(&self) -> CurveResult<f64> {
        self.current_link()?.value()
    }

    /// Returns true if linked to a quote holding a value.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.current_link().is_ok_and(|quote| quote.is_valid())
    }
}
