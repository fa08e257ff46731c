//! Bootstrap configuration.
//!
//! Every field has a serde default, so a partial TOML table is enough:
//!
//! ```rust
//! use yieldline_curves::config::{BootstrapConfig, RootFinderKind};
//! use yieldline_curves::curves::CurveQuantity;
//!
//! let config = BootstrapConfig::from_toml_str(
//!     r#"
//!     quantity = "ZeroRate"
//!     solver = "Bisection"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.quantity, CurveQuantity::ZeroRate);
//! assert_eq!(config.solver, RootFinderKind::Bisection);
//! assert_eq!(config.max_iterations, 100);
//! ```

use serde::{Deserialize, Serialize};
use yieldline_math::solvers::SolverConfig;

use crate::curves::CurveQuantity;
use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationMethod;

fn default_accuracy() -> f64 {
    1.0e-12
}

fn default_max_iterations() -> u32 {
    100
}

/// Root finder used for each bootstrap node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RootFinderKind {
    /// Brent's method.
    #[default]
    Brent,
    /// Plain bisection.
    Bisection,
}

/// Settings for an iterative bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Absolute accuracy on the quote error.
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,

    /// Iteration limit per node, and pass limit for global interpolation.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Quantity stored at the nodes.
    #[serde(default)]
    pub quantity: CurveQuantity,

    /// Interpolation between nodes.
    #[serde(default)]
    pub interpolation: InterpolationMethod,

    /// Root finder.
    #[serde(default)]
    pub solver: RootFinderKind,

    /// Whether the bootstrapped curve extrapolates past its last node.
    #[serde(default)]
    pub allow_extrapolation: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            accuracy: default_accuracy(),
            max_iterations: default_max_iterations(),
            quantity: CurveQuantity::default(),
            interpolation: InterpolationMethod::default(),
            solver: RootFinderKind::default(),
            allow_extrapolation: false,
        }
    }
}

impl BootstrapConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> CurveResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| {
            CurveError::invalid_argument(format!("invalid bootstrap config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the settings can drive a bootstrap.
    pub fn validate(&self) -> CurveResult<()> {
        if !(self.accuracy > 0.0 && self.accuracy.is_finite()) {
            return Err(CurveError::invalid_argument(format!(
                "accuracy must be positive, got {}",
                self.accuracy
            )));
        }
        if self.max_iterations == 0 {
            return Err(CurveError::invalid_argument(
                "max_iterations must be at least 1",
            ));
        }
        if self.quantity == CurveQuantity::ZeroRate
            && self.interpolation.requires_positive_values()
        {
            return Err(CurveError::invalid_argument(format!(
                "{} interpolation cannot be used on zero rates",
                self.interpolation
            )));
        }
        Ok(())
    }

    /// Root-finder settings for a single node.
    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.accuracy, self.max_iterations)
    }

    /// Sets the accuracy.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Sets the iteration limit.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the node quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: CurveQuantity) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the interpolation.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationMethod) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the root finder.
    #[must_use]
    pub fn with_solver(mut self, solver: RootFinderKind) -> Self {
        self.solver = solver;
        self
    }

    /// Sets whether the curve extrapolates.
    #[must_use]
    pub fn with_extrapolation(mut self, allow: bool) -> Self {
        self.allow_extrapolation = allow;
        self
    }
}
