//! # Yieldline Math
//!
//! Numerical building blocks for curve construction.
//!
//! This crate provides:
//!
//! - **Solvers**: Bracketing root finders (Brent, Bisection)
//! - **Interpolation**: Linear, log-linear and natural cubic spline
//!
//! Everything works on `f64`; callers own conventions such as time axes
//! and node quantities.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod interpolation;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        CubicSpline, Interpolator, LinearInterpolator, LogLinearInterpolator,
    };
    pub use crate::solvers::{
        bisection, brent, try_bisection, try_brent, SolverConfig, SolverResult,
    };
}

pub use error::{MathError, MathResult};
