//! Root-finding algorithms.
//!
//! Bracketing solvers for one-dimensional equations:
//!
//! - [`brent`]: Robust method combining bisection, secant, and inverse quadratic
//! - [`bisection`]: Simple and reliable bracketing method
//!
//! Each has a `try_` form taking a fallible objective. An error from the
//! objective stops the search and is returned unchanged, which lets callers
//! solve equations whose evaluation can itself fail (a curve bootstrap
//! prices instruments inside the objective).
//!
//! # Choosing a Solver
//!
//! | Solver | Speed | Reliability | Requires |
//! |--------|-------|-------------|----------|
//! | Brent | Fast (superlinear) | Guaranteed | Bracket |
//! | Bisection | Slow (linear) | Guaranteed | Bracket |
//!
//! # Example
//!
//! ```rust
//! use yieldline_math::solvers::{brent, SolverConfig};
//!
//! // Discount factor that reprices a 1Y simple deposit at 5%
//! let objective = |df: f64| (1.0 / df - 1.0) - 0.05;
//!
//! let result = brent(objective, 0.5, 1.0, &SolverConfig::default()).unwrap();
//! assert!((result.root - 1.0 / 1.05).abs() < 1e-10);
//! ```

mod bisection;
mod brent;

pub use bisection::{bisection, try_bisection};
pub use brent::{brent, try_brent};

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Tolerance for convergence, applied to both the residual and the bracket width.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding algorithm.
#[derive(Debug, Clone, Copy)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Function value at the root.
    pub residual: f64,
}
