//! Euribor 6M Curve Construction Example
//!
//! Builds a Euribor 6M discount curve from deposits and par swaps, checks
//! that it reprices its inputs, then shows the curve reacting to a quote
//! change and an evaluation-date move.
//!
//! Market Data: March 17, 2025
//!
//! | Instrument | Tenors                | Rates              |
//! |------------|-----------------------|--------------------|
//! | Deposits   | 1W, 1M, 2M, 3M, 6M, 9M | 4.490% - 4.581%   |
//! | Swaps      | 1Y - 30Y              | 4.54% - 5.96%      |
//!
//! Run with: cargo run --example euribor_bootstrap
//! Set `RUST_LOG=yieldline_curves=debug` to trace each node.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use yieldline_core::calendars::Target;
use yieldline_core::daycounts::DayCountConvention;
use yieldline_core::types::{Compounding, Frequency, Period};
use yieldline_core::Date;
use yieldline_curves::config::BootstrapConfig;
use yieldline_curves::curves::{CurveReference, PiecewiseYieldCurve};
use yieldline_curves::helpers::{DepositRateHelper, RateHelper, SwapConventions, SwapRateHelper};
use yieldline_curves::indexes::IborIndex;
use yieldline_curves::quotes::SimpleQuote;
use yieldline_curves::repricing::{tolerances, BuildTimer};
use yieldline_curves::term_structure::YieldTermStructure;
use yieldline_curves::{CurveResult, Session};

const DEPOSITS: [(Period, f64); 6] = [
    (Period::weeks(1), 4.559),
    (Period::months(1), 4.581),
    (Period::months(2), 4.573),
    (Period::months(3), 4.557),
    (Period::months(6), 4.496),
    (Period::months(9), 4.490),
];

const SWAPS: [(i32, f64); 15] = [
    (1, 4.54),
    (2, 4.63),
    (3, 4.75),
    (4, 4.86),
    (5, 4.99),
    (6, 5.11),
    (7, 5.23),
    (8, 5.33),
    (9, 5.41),
    (10, 5.47),
    (12, 5.60),
    (15, 5.75),
    (20, 5.89),
    (25, 5.95),
    (30, 5.96),
];

fn main() -> CurveResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Euribor 6M Curve Construction ===\n");

    let session = Session::new(Date::from_ymd(2025, 3, 17)?);
    let euribor6m = IborIndex::euribor6m(&session);

    let mut helpers: Vec<Arc<dyn RateHelper>> = Vec::new();
    for (tenor, rate) in DEPOSITS {
        let index = IborIndex::euribor(&session, tenor);
        helpers.push(DepositRateHelper::from_rate(&session, rate / 100.0, index)?);
    }

    let mut swap_quotes = Vec::new();
    for (years, rate) in SWAPS {
        let quote = Arc::new(SimpleQuote::new(&session, Some(rate / 100.0)));
        helpers.push(SwapRateHelper::new(
            &session,
            quote.handle()?,
            Period::years(years),
            SwapConventions::euribor(euribor6m.clone()),
        )?);
        swap_quotes.push(quote);
    }

    let curve = PiecewiseYieldCurve::new(
        &session,
        CurveReference::Moving {
            settlement_days: 2,
            calendar: Arc::new(Target),
        },
        helpers,
        DayCountConvention::Act360.to_day_counter(),
        BootstrapConfig::default(),
    )?;

    let timer = BuildTimer::start();
    let dates = curve.dates()?;
    let elapsed = timer.elapsed();
    println!(
        "Bootstrapped {} nodes from {} in {:?}\n",
        dates.len(),
        curve.reference_date(),
        elapsed
    );

    let act365 = DayCountConvention::Act365Fixed.to_day_counter();
    println!("{:<12} {:>10} {:>10}", "Date", "Discount", "Zero");
    println!("{}", "-".repeat(34));
    for (date, df) in dates.iter().zip(curve.discounts()?) {
        let zero = curve.zero_rate(*date, &act365, Compounding::Continuous, Frequency::Annual)?;
        println!("{:<12} {:>10.6} {:>9.4}%", date.to_string(), df, zero.rate() * 100.0);
    }

    let report = curve.repricing_report(tolerances::STRICT)?;
    println!("\n{report}");

    println!("\n--- Bumping the 10Y swap by 1bp ---");
    let ten_year = Date::from_ymd(2035, 3, 19)?;
    let before = curve.discount(ten_year)?;
    swap_quotes[9].set_value(0.0548)?;
    println!("Curve calculated after bump: {}", curve.is_calculated());
    let after = curve.discount(ten_year)?;
    println!("10Y discount: {before:.8} -> {after:.8}");

    println!("\n--- Moving the evaluation date ---");
    {
        let _guard = session.save();
        session.set_evaluation_date(Date::from_ymd(2025, 3, 18)?)?;
        println!("Reference date: {}", curve.reference_date());
        println!("First pillar:   {}", curve.dates()?[1]);
    }
    println!("Restored reference date: {}", curve.reference_date());

    Ok(())
}
