//! Bootstrapped piecewise yield curve.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;
use yieldline_core::calendars::Calendar;
use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::Date;

use crate::bootstrap::{BootstrapState, BootstrapWorkspace, IterativeBootstrap};
use crate::config::BootstrapConfig;
use crate::curves::CurveNodes;
use crate::error::CurveResult;
use crate::helpers::RateHelper;
use crate::reactive::{GraphNode, LazyCache, NodeId, Observable, Observer};
use crate::repricing::{reprice_helpers, RepricingReport};
use crate::session::Session;
use crate::term_structure::{Extrapolator, YieldTermStructure};

/// How a curve finds its reference date.
#[derive(Debug, Clone)]
pub enum CurveReference {
    /// A fixed date.
    Fixed(Date),
    /// A number of business days after the evaluation date; moves with it.
    Moving {
        /// Business days from the evaluation date.
        settlement_days: u32,
        /// Calendar counting the business days.
        calendar: Arc<dyn Calendar>,
    },
}

/// A curve fitted to rate helpers on demand.
///
/// Nothing is computed at construction. The first query bootstraps the
/// nodes and caches them; a change to any helper, or to the evaluation
/// date for a moving reference, drops the cache and the next query
/// bootstraps again.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use yieldline_core::calendars::Target;
/// use yieldline_core::daycounts::DayCountConvention;
/// use yieldline_core::{Date, Period};
/// use yieldline_curves::config::BootstrapConfig;
/// use yieldline_curves::curves::{CurveReference, PiecewiseYieldCurve};
/// use yieldline_curves::helpers::{DepositRateHelper, RateHelper, SwapConventions, SwapRateHelper};
/// use yieldline_curves::indexes::IborIndex;
/// use yieldline_curves::term_structure::YieldTermStructure;
/// use yieldline_curves::Session;
///
/// let session = Session::new(Date::from_ymd(2025, 3, 17).unwrap());
/// let euribor = IborIndex::euribor6m(&session);
/// let helpers: Vec<Arc<dyn RateHelper>> = vec![
///     DepositRateHelper::from_rate(&session, 0.04496, euribor.clone()).unwrap(),
///     SwapRateHelper::from_rate(&session, 0.0463, Period::years(2), SwapConventions::euribor(euribor)).unwrap(),
/// ];
///
/// let curve = PiecewiseYieldCurve::new(
///     &session,
///     CurveReference::Moving { settlement_days: 2, calendar: Arc::new(Target) },
///     helpers,
///     DayCountConvention::Act360.to_day_counter(),
///     BootstrapConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(curve.reference_date(), Date::from_ymd(2025, 3, 19).unwrap());
/// let report = curve.repricing_report(1e-9).unwrap();
/// assert!(report.is_valid());
/// ```
pub struct PiecewiseYieldCurve {
    node: GraphNode,
    session: Session,
    reference: CurveReference,
    helpers: Vec<Arc<dyn RateHelper>>,
    day_counter: DayCounter,
    bootstrap: IterativeBootstrap,
    workspace: Arc<BootstrapWorkspace>,
    cache: LazyCache<CurveNodes>,
    state: RwLock<BootstrapState>,
    extrapolator: Extrapolator,
    this: Weak<PiecewiseYieldCurve>,
}

impl PiecewiseYieldCurve {
    /// Creates the curve and registers it with its helpers.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration. Helper problems surface on the
    /// first query.
    pub fn new(
        session: &Session,
        reference: CurveReference,
        helpers: Vec<Arc<dyn RateHelper>>,
        day_counter: DayCounter,
        config: BootstrapConfig,
    ) -> CurveResult<Arc<Self>> {
        config.validate()?;
        let allow_extrapolation = config.allow_extrapolation;

        let curve = Arc::new_cyclic(|this| Self {
            node: GraphNode::new(session.graph(), "piecewise yield curve"),
            session: session.clone(),
            reference,
            helpers,
            workspace: Arc::new(BootstrapWorkspace::new(session, day_counter.clone())),
            day_counter,
            bootstrap: IterativeBootstrap::new(config),
            cache: LazyCache::new("piecewise yield curve"),
            state: RwLock::new(BootstrapState::NotStarted),
            extrapolator: Extrapolator::new(allow_extrapolation),
            this: this.clone(),
        });

        for helper in &curve.helpers {
            curve.node.observe(helper.observable_id())?;
        }
        if matches!(curve.reference, CurveReference::Moving { .. }) {
            curve.node.observe(session.evaluation_node())?;
        }
        curve
            .node
            .attach(Arc::downgrade(&curve) as Weak<dyn Observer>)?;
        Ok(curve)
    }

    /// How the reference date is found.
    pub fn reference(&self) -> &CurveReference {
        &self.reference
    }

    /// Helpers in input order.
    pub fn helpers(&self) -> &[Arc<dyn RateHelper>] {
        &self.helpers
    }

    /// Bootstrap settings.
    pub fn config(&self) -> &BootstrapConfig {
        self.bootstrap.config()
    }

    /// Progress of the latest bootstrap.
    pub fn bootstrap_state(&self) -> BootstrapState {
        *self.state.read()
    }

    /// Returns true if bootstrapped nodes are cached.
    pub fn is_calculated(&self) -> bool {
        self.cache.is_calculated()
    }

    /// Bootstrapped nodes, running the bootstrap if needed.
    pub fn nodes(&self) -> CurveResult<Arc<CurveNodes>> {
        self.cache.get_or_calculate(|| self.perform_calculations())
    }

    /// Node dates, starting with the reference date.
    pub fn dates(&self) -> CurveResult<Vec<Date>> {
        Ok(self.nodes()?.dates().to_vec())
    }

    /// Node times, starting at zero.
    pub fn times(&self) -> CurveResult<Vec<f64>> {
        Ok(self.nodes()?.times().to_vec())
    }

    /// Discount factors at the nodes.
    pub fn discounts(&self) -> CurveResult<Vec<f64>> {
        Ok(self.nodes()?.discounts())
    }

    /// Bootstraps again even if the cache is fresh or frozen, then
    /// notifies dependents.
    pub fn recalculate(&self) -> CurveResult<()> {
        self.cache.force_invalidate();
        self.nodes()?;
        self.node.notify()?;
        Ok(())
    }

    /// Keeps the current nodes regardless of helper changes.
    pub fn freeze(&self) {
        self.cache.freeze();
    }

    /// Resumes tracking helper changes and notifies dependents.
    pub fn unfreeze(&self) -> CurveResult<()> {
        self.cache.unfreeze();
        self.node.notify()?;
        Ok(())
    }

    /// Returns true while frozen.
    pub fn is_frozen(&self) -> bool {
        self.cache.is_frozen()
    }

    /// Reprices every helper on this curve.
    pub fn repricing_report(&self, tolerance: f64) -> CurveResult<RepricingReport> {
        self.nodes()?;
        reprice_helpers(&self.helpers, self, tolerance)
    }

    fn perform_calculations(&self) -> CurveResult<CurveNodes> {
        let reference_date = self.reference_date();
        let nodes = self.bootstrap.bootstrap(
            reference_date,
            &self.helpers,
            &self.workspace,
            &|state| *self.state.write() = state,
        )?;

        // Helpers price off the finished curve from now on
        let this: Weak<dyn YieldTermStructure> = self.this.clone();
        for helper in &self.helpers {
            helper.set_term_structure(this.clone());
        }
        Ok(nodes)
    }
}

impl Observable for PiecewiseYieldCurve {
    fn observable_id(&self) -> NodeId {
        self.node.id()
    }
}

impl Observer for PiecewiseYieldCurve {
    fn update(&self) -> CurveResult<()> {
        if self.cache.invalidate() {
            debug!(node = %self.node.id(), "piecewise curve invalidated");
        }
        Ok(())
    }
}

impl YieldTermStructure for PiecewiseYieldCurve {
    fn reference_date(&self) -> Date {
        match &self.reference {
            CurveReference::Fixed(date) => *date,
            CurveReference::Moving {
                settlement_days,
                calendar,
            } => calendar.advance_days(self.session.evaluation_date(), *settlement_days as i32),
        }
    }

    fn day_counter(&self) -> &DayCounter {
        &self.day_counter
    }

    fn max_date(&self) -> CurveResult<Date> {
        Ok(self.nodes()?.max_date())
    }

    fn extrapolator(&self) -> &Extrapolator {
        &self.extrapolator
    }

    fn discount_impl(&self, t: f64) -> CurveResult<f64> {
        self.nodes()?.discount(t)
    }
}

impl fmt::Debug for PiecewiseYieldCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiecewiseYieldCurve")
            .field("node", &self.node.id())
            .field("reference", &self.reference)
            .field("helpers", &self.helpers.len())
            .field("state", &self.bootstrap_state())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yieldline_core::calendars::Target;
    use yieldline_core::daycounts::DayCountConvention;
    use yieldline_core::types::Period;

    use crate::error::CurveError;
    use crate::helpers::DepositRateHelper;
    use crate::indexes::IborIndex;
    use crate::quotes::SimpleQuote;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn curve_on(
        session: &Session,
        quote: &Arc<SimpleQuote>,
        reference: CurveReference,
    ) -> Arc<PiecewiseYieldCurve> {
        let helpers: Vec<Arc<dyn RateHelper>> = vec![
            DepositRateHelper::new(session, quote.handle().unwrap(), IborIndex::euribor3m(session))
                .unwrap(),
            DepositRateHelper::from_rate(session, 0.045, IborIndex::euribor6m(session)).unwrap(),
        ];
        PiecewiseYieldCurve::new(
            session,
            reference,
            helpers,
            DayCountConvention::Act360.to_day_counter(),
            BootstrapConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_lazy_bootstrap() {
        let session = Session::new(d(2025, 3, 17));
        let quote = Arc::new(SimpleQuote::new(&session, Some(0.046)));
        let curve = curve_on(&session, &quote, CurveReference::Fixed(d(2025, 3, 19)));

        assert!(!curve.is_calculated());
        assert_eq!(curve.bootstrap_state(), BootstrapState::NotStarted);

        let dates = curve.dates().unwrap();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], d(2025, 3, 19));
        assert!(curve.is_calculated());
        assert_eq!(curve.bootstrap_state(), BootstrapState::Solved);

        quote.set_value(0.047).unwrap();
        assert!(!curve.is_calculated());
        assert!(curve.helpers()[0].quote_error().unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_freeze_keeps_nodes() {
        let session = Session::new(d(2025, 3, 17));
        let quote = Arc::new(SimpleQuote::new(&session, Some(0.046)));
        let curve = curve_on(&session, &quote, CurveReference::Fixed(d(2025, 3, 19)));
        let before = curve.discounts().unwrap();

        curve.freeze();
        quote.set_value(0.050).unwrap();
        assert!(curve.is_calculated());
        assert_eq!(curve.discounts().unwrap(), before);

        curve.unfreeze().unwrap();
        assert!(!curve.is_calculated());
        assert!(curve.discounts().unwrap()[1] < before[1]);
    }

    #[test]
    fn test_moving_reference_follows_evaluation_date() {
        let session = Session::new(d(2025, 3, 17));
        let quote = Arc::new(SimpleQuote::new(&session, Some(0.046)));
        let curve = curve_on(
            &session,
            &quote,
            CurveReference::Moving {
                settlement_days: 2,
                calendar: Arc::new(Target),
            },
        );
        assert_eq!(curve.dates().unwrap()[0], d(2025, 3, 19));

        session.set_evaluation_date(d(2025, 3, 18)).unwrap();
        assert!(!curve.is_calculated());
        assert_eq!(curve.reference_date(), d(2025, 3, 20));
        assert_eq!(curve.dates().unwrap()[0], d(2025, 3, 20));
    }

    #[test]
    fn test_failure_leaves_curve_stale() {
        let session = Session::new(d(2025, 3, 17));
        let quote = Arc::new(SimpleQuote::new(&session, Some(0.046)));
        let curve = curve_on(&session, &quote, CurveReference::Fixed(d(2025, 3, 19)));

        quote.set_value(-5.0).unwrap();
        let err = curve.discount(d(2025, 6, 1)).unwrap_err();
        assert!(matches!(err, CurveError::BootstrapFailure { index: 0, .. }));
        assert_eq!(curve.bootstrap_state(), BootstrapState::Failed(0));
        assert!(!curve.is_calculated());

        quote.set_value(0.046).unwrap();
        assert!(curve.discount(d(2025, 6, 1)).is_ok());
        assert_eq!(curve.bootstrap_state(), BootstrapState::Solved);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let session = Session::new(d(2025, 3, 17));
        let result = PiecewiseYieldCurve::new(
            &session,
            CurveReference::Fixed(d(2025, 3, 19)),
            vec![
                DepositRateHelper::from_rate(&session, 0.045, IborIndex::euribor(&session, Period::months(1)))
                    .unwrap(),
            ],
            DayCountConvention::Act360.to_day_counter(),
            BootstrapConfig::default().with_max_iterations(0),
        );
        assert!(result.is_err());
    }
}
