//! Integration tests: change notification from quotes through helpers to
//! curves and their dependents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use yieldline_core::daycounts::DayCountConvention;
use yieldline_core::Date;
use yieldline_curves::config::BootstrapConfig;
use yieldline_curves::curves::{CurveReference, PiecewiseYieldCurve};
use yieldline_curves::error::{CurveError, CurveResult};
use yieldline_curves::helpers::{DepositRateHelper, FraRateHelper, RateHelper};
use yieldline_curves::indexes::IborIndex;
use yieldline_curves::quotes::{Quote, SimpleQuote};
use yieldline_curves::reactive::{GraphNode, NodeId, Observable, Observer, RelinkableHandle};
use yieldline_curves::term_structure::YieldTermStructure;
use yieldline_curves::Session;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

/// Counts updates; optionally fails every one of them.
struct Watcher {
    node: GraphNode,
    hits: AtomicUsize,
    fail: bool,
}

impl Watcher {
    fn on(session: &Session, source: NodeId, fail: bool) -> Arc<Self> {
        let watcher = Arc::new(Self {
            node: GraphNode::new(session.graph(), "watcher"),
            hits: AtomicUsize::new(0),
            fail,
        });
        watcher.node.observe(source).unwrap();
        watcher
            .node
            .attach(Arc::downgrade(&watcher) as Weak<dyn Observer>)
            .unwrap();
        watcher
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Observer for Watcher {
    fn update(&self) -> CurveResult<()> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CurveError::invalid_argument("watcher refused update"));
        }
        Ok(())
    }
}

/// A 3M deposit and a 3x6 FRA, both quoted off the same rate.
fn shared_quote_curve(
    session: &Session,
    quote: &Arc<SimpleQuote>,
) -> Arc<PiecewiseYieldCurve> {
    let euribor3m = IborIndex::euribor3m(session);
    let helpers: Vec<Arc<dyn RateHelper>> = vec![
        DepositRateHelper::new(session, quote.handle().unwrap(), euribor3m.clone()).unwrap(),
        FraRateHelper::new(session, quote.handle().unwrap(), 3, 6, &euribor3m).unwrap(),
    ];
    PiecewiseYieldCurve::new(
        session,
        CurveReference::Fixed(d(2025, 3, 19)),
        helpers,
        DayCountConvention::Act360.to_day_counter(),
        BootstrapConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_curve_dependents_hear_each_change_once() {
    let session = Session::new(d(2025, 3, 17));
    let quote = Arc::new(SimpleQuote::new(&session, Some(0.045)));
    let curve = shared_quote_curve(&session, &quote);
    let watcher = Watcher::on(&session, curve.observable_id(), false);

    curve.discounts().unwrap();
    quote.set_value(0.046).unwrap();
    assert_eq!(watcher.hits(), 1);
    assert!(!curve.is_calculated());

    // An unchanged value is not a change
    quote.set_value(0.046).unwrap();
    assert_eq!(watcher.hits(), 1);

    quote.set_value(0.047).unwrap();
    assert_eq!(watcher.hits(), 2);
}

#[test]
fn test_failing_observer_does_not_block_others() {
    let session = Session::new(d(2025, 3, 17));
    let quote = Arc::new(SimpleQuote::new(&session, Some(0.045)));
    let curve = shared_quote_curve(&session, &quote);
    let failing = Watcher::on(&session, quote.observable_id(), true);
    let watcher = Watcher::on(&session, curve.observable_id(), false);

    curve.discounts().unwrap();
    let result = quote.set_value(0.046);

    assert!(matches!(
        result,
        Err(CurveError::ObserverFailures { count: 1, .. })
    ));
    assert_eq!(failing.hits(), 1);
    assert_eq!(watcher.hits(), 1);
    assert!(!curve.is_calculated());
    assert_eq!(quote.value().unwrap(), 0.046);

    // The new value is what the curve rebuilds on
    assert!(curve.repricing_report(1e-9).unwrap().is_valid());
}

#[test]
fn test_cycles_are_rejected() {
    let session = Session::new(d(2025, 3, 17));
    let quote = Arc::new(SimpleQuote::new(&session, Some(0.045)));
    let curve = shared_quote_curve(&session, &quote);

    let result = session
        .graph()
        .register_with(quote.observable_id(), curve.observable_id());
    assert!(matches!(result, Err(CurveError::CyclicDependency { .. })));

    // The graph is unchanged: the quote still drives the curve
    curve.discounts().unwrap();
    quote.set_value(0.046).unwrap();
    assert!(!curve.is_calculated());
}

#[test]
fn test_relinking_moves_the_dependency() {
    let session = Session::new(d(2025, 3, 17));
    let first: Arc<SimpleQuote> = Arc::new(SimpleQuote::new(&session, Some(0.045)));
    let second: Arc<SimpleQuote> = Arc::new(SimpleQuote::new(&session, Some(0.050)));
    let relinkable = RelinkableHandle::new(
        session.graph(),
        Some(Arc::clone(&first) as Arc<dyn Quote>),
    )
    .unwrap();

    let euribor3m = IborIndex::euribor3m(&session);
    let helpers: Vec<Arc<dyn RateHelper>> = vec![
        DepositRateHelper::new(&session, relinkable.handle(), euribor3m.clone()).unwrap(),
        DepositRateHelper::from_rate(&session, 0.046, IborIndex::euribor6m(&session)).unwrap(),
    ];
    let curve = PiecewiseYieldCurve::new(
        &session,
        CurveReference::Fixed(d(2025, 3, 19)),
        helpers,
        DayCountConvention::Act360.to_day_counter(),
        BootstrapConfig::default(),
    )
    .unwrap();

    let pillar = d(2025, 6, 19);
    let before = curve.discount(pillar).unwrap();

    relinkable
        .link_to(Some(Arc::clone(&second) as Arc<dyn Quote>))
        .unwrap();
    assert!(!curve.is_calculated());
    let after = curve.discount(pillar).unwrap();
    assert!(after < before);

    // The old quote no longer reaches the curve
    first.set_value(0.030).unwrap();
    assert!(curve.is_calculated());

    second.set_value(0.055).unwrap();
    assert!(!curve.is_calculated());
}

#[test]
fn test_frozen_curve_still_passes_notifications_on() {
    let session = Session::new(d(2025, 3, 17));
    let quote = Arc::new(SimpleQuote::new(&session, Some(0.045)));
    let curve = shared_quote_curve(&session, &quote);
    let watcher = Watcher::on(&session, curve.observable_id(), false);

    let nodes = curve.discounts().unwrap();
    curve.freeze();
    quote.set_value(0.050).unwrap();

    assert_eq!(watcher.hits(), 1);
    assert!(curve.is_calculated());
    assert_eq!(curve.discounts().unwrap(), nodes);

    curve.unfreeze().unwrap();
    assert_eq!(watcher.hits(), 2);
    assert!(curve.discounts().unwrap()[1] < nodes[1]);
}

#[test]
fn test_dropped_curve_leaves_the_graph() {
    let session = Session::new(d(2025, 3, 17));
    let quote = Arc::new(SimpleQuote::new(&session, Some(0.045)));
    let curve = shared_quote_curve(&session, &quote);
    let id = curve.observable_id();
    let helpers = curve.helpers().to_vec();
    assert!(session.graph().contains(id));

    drop(curve);
    assert!(!session.graph().contains(id));

    // Helpers outlive the curve and still follow their quote
    quote.set_value(0.046).unwrap();
    assert_eq!(helpers[0].quote_value().unwrap(), 0.046);
}
