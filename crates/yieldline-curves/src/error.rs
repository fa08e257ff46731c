//! Error types for curve operations.
//!
//! Covers the observer graph, lazy evaluation, term-structure queries and
//! curve bootstrapping.

use thiserror::Error;
use yieldline_core::CoreError;
use yieldline_math::MathError;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone)]
pub enum CurveError {
    /// An argument or precondition was violated.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Description of the violation.
        reason: String,
    },

    /// A query fell past the curve's last date with extrapolation disabled.
    #[error("Extrapolation not allowed: time {time:.6} beyond max time {max_time:.6}")]
    ExtrapolationNotAllowed {
        /// The requested time in years.
        time: f64,
        /// The curve's maximum time in years.
        max_time: f64,
    },

    /// The bootstrap could not solve the node for a helper.
    #[error(
        "Bootstrap failed for helper {index} ({helper}) after {iterations} iterations \
         (residual: {residual:.2e}): {reason}"
    )]
    BootstrapFailure {
        /// Input position of the failing helper.
        index: usize,
        /// Description of the failing helper.
        helper: String,
        /// Last quote error seen by the solver.
        residual: f64,
        /// Solver iterations used.
        iterations: u32,
        /// Description of failure.
        reason: String,
    },

    /// A lazy object was read while it was computing on the same thread.
    #[error("Recursive calculation of {object}")]
    RecursiveCalculation {
        /// Label of the lazy object.
        object: String,
    },

    /// Registering the dependency would close a cycle.
    #[error("Cyclic dependency: {observer} cannot observe {observable}")]
    CyclicDependency {
        /// The would-be observer.
        observer: String,
        /// The observable it tried to register with.
        observable: String,
    },

    /// One or more observers failed during a notification.
    #[error("{count} observer(s) failed during notification; first: {first}")]
    ObserverFailures {
        /// Number of failed updates.
        count: usize,
        /// The first failure's message.
        first: String,
    },

    /// Mathematical error.
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl CurveError {
    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Creates an extrapolation error.
    #[must_use]
    pub fn extrapolation_not_allowed(time: f64, max_time: f64) -> Self {
        Self::ExtrapolationNotAllowed { time, max_time }
    }

    /// Creates a recursive calculation error.
    #[must_use]
    pub fn recursive_calculation(object: impl Into<String>) -> Self {
        Self::RecursiveCalculation {
            object: object.into(),
        }
    }

    /// Creates a bootstrap failure for the helper at input position `index`.
    #[must_use]
    pub fn bootstrap_failure(
        index: usize,
        helper: impl Into<String>,
        residual: f64,
        iterations: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self::BootstrapFailure {
            index,
            helper: helper.into(),
            residual,
            iterations,
            reason: reason.into(),
        }
    }
}

impl From<CoreError> for CurveError {
    fn from(err: CoreError) -> Self {
        let reason = match err {
            CoreError::InvalidDate { message } => message,
            CoreError::InvalidArgument { reason } => reason,
        };
        Self::InvalidArgument { reason }
    }
}
