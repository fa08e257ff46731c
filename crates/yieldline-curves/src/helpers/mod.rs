//! Rate helpers: market instruments a curve is bootstrapped to.
//!
//! Each helper turns a quoted rate or price into a pillar date and an
//! implied quote read off a term structure. The bootstrap moves one curve
//! node per helper until the implied quote matches the market.
//!
//! | Helper | Quote | Dates follow evaluation date |
//! |--------|-------|------------------------------|
//! | [`DepositRateHelper`] | simple rate | yes |
//! | [`FraRateHelper`] | simple forward rate | yes |
//! | [`FuturesRateHelper`] | price, `100 * (1 - rate)` | no |
//! | [`SwapRateHelper`] | par fixed rate | yes |

mod deposit;
mod fra;
mod futures;
mod swap;

pub use deposit::DepositRateHelper;
pub use fra::FraRateHelper;
pub use futures::FuturesRateHelper;
pub use swap::{SwapConventions, SwapRateHelper};

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use yieldline_core::types::Date;

use crate::error::{CurveError, CurveResult};
use crate::quotes::Quote;
use crate::reactive::{GraphNode, Handle, NodeId, Observable, Observer};
use crate::session::Session;
use crate::term_structure::YieldTermStructure;

/// Instrument family of a helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperKind {
    /// Cash deposit.
    Deposit,
    /// Forward rate agreement.
    Fra,
    /// Money-market future.
    Futures,
    /// Par swap.
    Swap,
}

impl fmt::Display for HelperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "Deposit",
            Self::Fra => "FRA",
            Self::Futures => "Futures",
            Self::Swap => "Swap",
        };
        write!(f, "{name}")
    }
}

/// Dates a helper covers on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelperDates {
    /// First date the instrument depends on.
    pub earliest: Date,
    /// Pillar date: the last date the instrument depends on.
    pub latest: Date,
    /// Index fixing date, for index-based helpers.
    pub fixing: Option<Date>,
    /// Evaluation date the dates were derived from.
    pub evaluation_date: Date,
}

/// State shared by every helper.
pub struct HelperCore {
    node: GraphNode,
    session: Session,
    quote: Handle<dyn Quote>,
    dates: RwLock<HelperDates>,
    term_structure: RwLock<Option<Weak<dyn YieldTermStructure>>>,
}

impl HelperCore {
    /// Creates the core and registers it with its quote, and with the
    /// evaluation date when `relative`.
    pub(crate) fn new(
        session: &Session,
        quote: Handle<dyn Quote>,
        label: &str,
        relative: bool,
    ) -> CurveResult<Self> {
        let node = GraphNode::new(session.graph(), label);
        node.observe(quote.observable_id())?;
        if relative {
            node.observe(session.evaluation_node())?;
        }
        let today = session.evaluation_date();
        Ok(Self {
            node,
            session: session.clone(),
            quote,
            dates: RwLock::new(HelperDates {
                earliest: today,
                latest: today,
                fixing: None,
                evaluation_date: today,
            }),
            term_structure: RwLock::new(None),
        })
    }

    /// Graph node of the helper.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Session the helper lives in.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Market quote handle.
    pub fn quote(&self) -> &Handle<dyn Quote> {
        &self.quote
    }

    /// Current dates.
    pub fn dates(&self) -> HelperDates {
        *self.dates.read()
    }

    pub(crate) fn set_dates(&self, dates: HelperDates) -> CurveResult<()> {
        if dates.earliest >= dates.latest {
            return Err(CurveError::invalid_argument(format!(
                "earliest date {} not before latest date {}",
                dates.earliest, dates.latest
            )));
        }
        *self.dates.write() = dates;
        Ok(())
    }

    /// Returns true if the evaluation date moved since the dates were set.
    pub(crate) fn dates_are_stale(&self) -> bool {
        self.dates.read().evaluation_date != self.session.evaluation_date()
    }

    pub(crate) fn observe(&self, observable: NodeId) -> CurveResult<bool> {
        self.node.observe(observable)
    }

    pub(crate) fn attach(&self, observer: Weak<dyn Observer>) -> CurveResult<()> {
        self.node.attach(observer)
    }

    /// Sets the term structure implied quotes are read from.
    pub fn set_term_structure(&self, term_structure: Weak<dyn YieldTermStructure>) {
        *self.term_structure.write() = Some(term_structure);
    }

    /// The attached term structure.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if none was set or it has been dropped.
    pub fn term_structure(&self) -> CurveResult<Arc<dyn YieldTermStructure>> {
        self.term_structure
            .read()
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| CurveError::invalid_argument("term structure not set"))
    }
}

impl fmt::Debug for HelperCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperCore")
            .field("node", &self.node.id())
            .field("quote", &self.quote)
            .field("dates", &self.dates())
            .finish_non_exhaustive()
    }
}

/// A market instrument the bootstrap fits a curve to.
pub trait RateHelper: Observable + Send + Sync + fmt::Debug {
    /// Shared state.
    fn core(&self) -> &HelperCore;

    /// Instrument family.
    fn kind(&self) -> HelperKind;

    /// Short human-readable label, e.g. `6M deposit`.
    fn description(&self) -> String;

    /// Quote implied by `term_structure`.
    fn implied_quote_on(&self, term_structure: &dyn YieldTermStructure) -> CurveResult<f64>;

    /// Market quote handle.
    fn quote(&self) -> &Handle<dyn Quote> {
        self.core().quote()
    }

    /// Market quote value.
    fn quote_value(&self) -> CurveResult<f64> {
        self.core().quote().value()
    }

    /// Returns true if the market quote holds a value.
    fn quote_is_valid(&self) -> bool {
        self.core().quote().is_valid()
    }

    /// First date the instrument depends on.
    fn earliest_date(&self) -> Date {
        self.core().dates().earliest
    }

    /// Pillar date.
    fn latest_date(&self) -> Date {
        self.core().dates().latest
    }

    /// Attaches the term structure implied quotes are read from.
    ///
    /// The reference is weak; the curve owns its helpers, not the reverse.
    fn set_term_structure(&self, term_structure: Weak<dyn YieldTermStructure>) {
        self.core().set_term_structure(term_structure);
    }

    /// Quote implied by the attached term structure.
    fn implied_quote(&self) -> CurveResult<f64> {
        let term_structure = self.core().term_structure()?;
        self.implied_quote_on(term_structure.as_ref())
    }

    /// Market minus implied quote.
    fn quote_error(&self) -> CurveResult<f64> {
        Ok(self.quote_value()? - self.implied_quote()?)
    }
}

/// Builds a quote handle holding a constant value.
pub(crate) fn constant_quote(session: &Session, value: f64) -> CurveResult<Handle<dyn Quote>> {
    Arc::new(crate::quotes::SimpleQuote::new(session, Some(value))).handle()
}
