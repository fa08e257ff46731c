//! # Yieldline Curves
//!
//! Lazily bootstrapped yield curves over an explicit dependency graph.
//!
//! This crate provides:
//!
//! - **Reactive core**: a dependency graph of observable objects, lazy
//!   caches and relinkable handles
//! - **Session**: the evaluation date and index fixings, passed explicitly
//! - **Term structures**: flat, interpolated and bootstrapped yield curves
//! - **Rate helpers**: deposits, FRAs, futures and par swaps
//! - **Bootstrap**: node-by-node fitting with repricing reports
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use yieldline_curves::prelude::*;
//!
//! let session = Session::new(Date::from_ymd(2025, 3, 17).unwrap());
//! let euribor = IborIndex::euribor6m(&session);
//!
//! let deposit_quote = Arc::new(SimpleQuote::new(&session, Some(0.04496)));
//! let helpers: Vec<Arc<dyn RateHelper>> = vec![
//!     DepositRateHelper::new(&session, deposit_quote.handle().unwrap(), euribor.clone()).unwrap(),
//!     SwapRateHelper::from_rate(&session, 0.0454, Period::years(1), SwapConventions::euribor(euribor.clone())).unwrap(),
//!     SwapRateHelper::from_rate(&session, 0.0463, Period::years(2), SwapConventions::euribor(euribor)).unwrap(),
//! ];
//!
//! let curve = PiecewiseYieldCurve::new(
//!     &session,
//!     CurveReference::Moving { settlement_days: 2, calendar: Arc::new(Target) },
//!     helpers,
//!     DayCountConvention::Act360.to_day_counter(),
//!     BootstrapConfig::default(),
//! )
//! .unwrap();
//!
//! // Nothing has been computed yet; the first query bootstraps
//! let df = curve.discount(Date::from_ymd(2026, 3, 19).unwrap()).unwrap();
//! assert!(df < 1.0);
//!
//! // A quote change invalidates the curve
//! deposit_quote.set_value(0.0455).unwrap();
//! assert!(!curve.is_calculated());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod bootstrap;
pub mod cashflows;
pub mod config;
pub mod curves;
pub mod error;
pub mod helpers;
pub mod indexes;
pub mod interpolation;
pub mod quotes;
pub mod reactive;
pub mod repricing;
pub mod session;
pub mod term_structure;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::{BootstrapState, IterativeBootstrap};
    pub use crate::cashflows::{Schedule, SwapType, VanillaSwap};
    pub use crate::config::{BootstrapConfig, RootFinderKind};
    pub use crate::curves::{
        CurveQuantity, CurveReference, FlatForward, InterpolatedDiscountCurve, PiecewiseYieldCurve,
    };
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::helpers::{
        DepositRateHelper, FraRateHelper, FuturesRateHelper, RateHelper, SwapConventions,
        SwapRateHelper,
    };
    pub use crate::indexes::IborIndex;
    pub use crate::interpolation::InterpolationMethod;
    pub use crate::quotes::{Quote, SimpleQuote};
    pub use crate::reactive::{Handle, RelinkableHandle};
    pub use crate::repricing::{tolerances, RepricingReport};
    pub use crate::session::Session;
    pub use crate::term_structure::YieldTermStructure;
    pub use yieldline_core::prelude::*;
}

pub use error::{CurveError, CurveResult};
pub use session::Session;
