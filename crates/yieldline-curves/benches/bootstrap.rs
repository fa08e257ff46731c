//! Benchmarks for curve bootstrapping.
//!
//! Run with: cargo bench -p yieldline-curves

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use yieldline_core::calendars::Target;
use yieldline_core::daycounts::DayCountConvention;
use yieldline_core::types::Period;
use yieldline_core::Date;
use yieldline_curves::config::BootstrapConfig;
use yieldline_curves::curves::{CurveQuantity, CurveReference, PiecewiseYieldCurve};
use yieldline_curves::helpers::{DepositRateHelper, RateHelper, SwapConventions, SwapRateHelper};
use yieldline_curves::indexes::IborIndex;
use yieldline_curves::interpolation::InterpolationMethod;
use yieldline_curves::quotes::SimpleQuote;
use yieldline_curves::term_structure::YieldTermStructure;
use yieldline_curves::Session;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

const SWAP_YEARS: [i32; 15] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 15, 20, 25, 30];

fn evaluation_date() -> Date {
    Date::from_ymd(2025, 3, 17).unwrap()
}

/// Deposits to 9M and the first `swaps` par swaps, with the swap quotes.
fn create_helpers(
    session: &Session,
    swaps: usize,
) -> (Vec<Arc<dyn RateHelper>>, Vec<Arc<SimpleQuote>>) {
    let euribor6m = IborIndex::euribor6m(session);
    let mut helpers: Vec<Arc<dyn RateHelper>> = [1, 3, 6, 9]
        .iter()
        .map(|&months| {
            let index = IborIndex::euribor(session, Period::months(months));
            DepositRateHelper::from_rate(session, 0.045, index).unwrap() as Arc<dyn RateHelper>
        })
        .collect();

    let mut quotes = Vec::new();
    for (i, years) in SWAP_YEARS.iter().take(swaps).enumerate() {
        let quote = Arc::new(SimpleQuote::new(session, Some(0.045 + 0.001 * i as f64)));
        helpers.push(
            SwapRateHelper::new(
                session,
                quote.handle().unwrap(),
                Period::years(*years),
                SwapConventions::euribor(euribor6m.clone()),
            )
            .unwrap(),
        );
        quotes.push(quote);
    }
    (helpers, quotes)
}

fn create_curve(
    session: &Session,
    helpers: Vec<Arc<dyn RateHelper>>,
    config: BootstrapConfig,
) -> Arc<PiecewiseYieldCurve> {
    PiecewiseYieldCurve::new(
        session,
        CurveReference::Moving {
            settlement_days: 2,
            calendar: Arc::new(Target),
        },
        helpers,
        DayCountConvention::Act360.to_day_counter(),
        config,
    )
    .unwrap()
}

// =============================================================================
// BOOTSTRAP BENCHMARKS
// =============================================================================

fn bench_bootstrap_by_size(c: &mut Criterion) {
    let session = Session::new(evaluation_date());

    let mut group = c.benchmark_group("bootstrap_by_size");
    for swaps in [5, 10, 15] {
        let (helpers, _quotes) = create_helpers(&session, swaps);
        let curve = create_curve(&session, helpers, BootstrapConfig::default());

        group.throughput(Throughput::Elements((swaps + 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(swaps + 4), &curve, |b, curve| {
            b.iter(|| {
                curve.recalculate().unwrap();
                black_box(curve.discounts().unwrap())
            })
        });
    }
    group.finish();
}

fn bench_bootstrap_by_interpolation(c: &mut Criterion) {
    let session = Session::new(evaluation_date());
    let configs = [
        ("linear_discount", BootstrapConfig::default()),
        (
            "loglinear_discount",
            BootstrapConfig::default().with_interpolation(InterpolationMethod::LogLinear),
        ),
        (
            "linear_zero",
            BootstrapConfig::default().with_quantity(CurveQuantity::ZeroRate),
        ),
        (
            "cubic_discount",
            BootstrapConfig::default().with_interpolation(InterpolationMethod::CubicSpline),
        ),
    ];

    let mut group = c.benchmark_group("bootstrap_by_interpolation");
    group.sample_size(20);
    for (name, config) in configs {
        let (helpers, _quotes) = create_helpers(&session, 10);
        let curve = create_curve(&session, helpers, config);
        group.bench_function(name, |b| {
            b.iter(|| {
                curve.recalculate().unwrap();
                black_box(curve.discounts().unwrap())
            })
        });
    }
    group.finish();
}

// =============================================================================
// LAZY EVALUATION BENCHMARKS
// =============================================================================

fn bench_quote_change_and_query(c: &mut Criterion) {
    let session = Session::new(evaluation_date());
    let (helpers, quotes) = create_helpers(&session, 15);
    let curve = create_curve(&session, helpers, BootstrapConfig::default());
    let date = Date::from_ymd(2035, 3, 19).unwrap();
    let mut bump = false;

    c.bench_function("quote_change_and_query", |b| {
        b.iter(|| {
            bump = !bump;
            let rate = if bump { 0.0501 } else { 0.0499 };
            quotes[4].set_value(rate).unwrap();
            black_box(curve.discount(date).unwrap())
        })
    });
}

fn bench_cached_query(c: &mut Criterion) {
    let session = Session::new(evaluation_date());
    let (helpers, _quotes) = create_helpers(&session, 15);
    let curve = create_curve(&session, helpers, BootstrapConfig::default());
    let date = Date::from_ymd(2035, 3, 19).unwrap();
    curve.discount(date).unwrap();

    c.bench_function("cached_discount", |b| {
        b.iter(|| black_box(curve.discount(black_box(date)).unwrap()))
    });
}

// =============================================================================
// CRITERION GROUPS
// =============================================================================

criterion_group!(
    bootstrap,
    bench_bootstrap_by_size,
    bench_bootstrap_by_interpolation,
);

criterion_group!(lazy, bench_quote_change_and_query, bench_cached_query,);

criterion_main!(bootstrap, lazy);
