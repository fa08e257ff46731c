//! Repricing checks for bootstrapped curves.
//!
//! A bootstrapped curve must give back the market quote of every helper it
//! was built from. A report lists, per helper, the market quote, the quote
//! implied by the curve and whether the gap is within tolerance.
//!
//! ```text
//! Repricing Report
//! ================
//! Status: PASSED
//! Helpers: 21/21 passed
//! Max Error: 3.47e-13
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::CurveResult;
use crate::helpers::{HelperKind, RateHelper};
use crate::term_structure::YieldTermStructure;

/// Repricing tolerances, in quote units.
pub mod tolerances {
    use crate::helpers::HelperKind;

    /// Near machine precision, for rate quotes.
    pub const STRICT: f64 = 1e-9;

    /// Default tolerance.
    pub const DEFAULT: f64 = 1e-6;

    /// Loose tolerance for rough checks.
    pub const RELAXED: f64 = 1e-3;

    /// Futures prices are quoted in percent, so errors scale by 100.
    pub const FUTURES_PRICE: f64 = 1e-7;

    /// Tolerance suited to a helper's quote units.
    #[must_use]
    pub fn for_kind(kind: HelperKind) -> f64 {
        match kind {
            HelperKind::Futures => FUTURES_PRICE,
            HelperKind::Deposit | HelperKind::Fra | HelperKind::Swap => STRICT,
        }
    }
}

/// How well a curve reprices a single helper.
#[derive(Debug, Clone, PartialEq)]
pub struct RepricingCheck {
    /// Helper description, e.g. `6M deposit`.
    pub helper: String,

    /// Instrument family.
    pub kind: HelperKind,

    /// Market quote.
    pub market_quote: f64,

    /// Quote implied by the curve.
    pub implied_quote: f64,

    /// `|market - implied|`
    pub error: f64,

    /// Tolerance the error was checked against.
    pub tolerance: f64,

    /// Whether the error is within tolerance.
    pub passed: bool,
}

impl RepricingCheck {
    /// Creates a check from market and implied quotes.
    #[must_use]
    pub fn new(
        helper: String,
        kind: HelperKind,
        market_quote: f64,
        implied_quote: f64,
        tolerance: f64,
    ) -> Self {
        let error = (market_quote - implied_quote).abs();
        Self {
            helper,
            kind,
            market_quote,
            implied_quote,
            error,
            tolerance,
            passed: error <= tolerance,
        }
    }

    /// Reprices `helper` on `curve`.
    pub fn from_helper(
        helper: &dyn RateHelper,
        curve: &dyn YieldTermStructure,
        tolerance: f64,
    ) -> CurveResult<Self> {
        Ok(Self::new(
            helper.description(),
            helper.kind(),
            helper.quote_value()?,
            helper.implied_quote_on(curve)?,
            tolerance,
        ))
    }
}

impl fmt::Display for RepricingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "✓" } else { "✗" };
        write!(
            f,
            "{} {} | market: {:.8} | implied: {:.8} | error: {:.2e} (tol: {:.2e})",
            status, self.helper, self.market_quote, self.implied_quote, self.error, self.tolerance
        )
    }
}

/// Repricing checks over all helpers of a curve.
#[derive(Debug, Clone)]
pub struct RepricingReport {
    checks: Vec<RepricingCheck>,
    max_error: f64,
    rms_error: f64,
    passed_count: usize,
}

impl RepricingReport {
    /// Summarises individual checks.
    #[must_use]
    pub fn new(checks: Vec<RepricingCheck>) -> Self {
        let max_error = checks.iter().map(|c| c.error).fold(0.0_f64, f64::max);
        let rms_error = if checks.is_empty() {
            0.0
        } else {
            let sum_sq: f64 = checks.iter().map(|c| c.error * c.error).sum();
            (sum_sq / checks.len() as f64).sqrt()
        };
        let passed_count = checks.iter().filter(|c| c.passed).count();

        Self {
            checks,
            max_error,
            rms_error,
            passed_count,
        }
    }

    /// Returns true if every helper passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.passed_count == self.checks.len()
    }

    /// Individual checks, in helper input order.
    #[must_use]
    pub fn checks(&self) -> &[RepricingCheck] {
        &self.checks
    }

    /// Largest absolute error.
    #[must_use]
    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    /// Root mean square error.
    #[must_use]
    pub fn rms_error(&self) -> f64 {
        self.rms_error
    }

    /// Number of passing helpers.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.passed_count
    }

    /// Number of failing helpers.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.checks.len() - self.passed_count
    }

    /// Failing checks.
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&RepricingCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Descriptions of failing helpers.
    #[must_use]
    pub fn failed_helpers(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.helper.as_str())
            .collect()
    }
}

impl fmt::Display for RepricingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Repricing Report")?;
        writeln!(f, "================")?;
        writeln!(f, "Status: {}", if self.is_valid() { "PASSED" } else { "FAILED" })?;
        writeln!(f, "Helpers: {}/{} passed", self.passed_count, self.checks.len())?;
        writeln!(f, "Max Error: {:.2e}", self.max_error)?;
        writeln!(f, "RMS Error: {:.2e}", self.rms_error)?;

        if !self.checks.is_empty() {
            writeln!(f)?;
            writeln!(f, "Details:")?;
            for check in &self.checks {
                writeln!(f, "  {check}")?;
            }
        }

        Ok(())
    }
}

/// Reprices every helper on `curve` against a single tolerance.
pub fn reprice_helpers<H>(
    helpers: &[H],
    curve: &dyn YieldTermStructure,
    tolerance: f64,
) -> CurveResult<RepricingReport>
where
    H: AsRef<dyn RateHelper>,
{
    let checks = helpers
        .iter()
        .map(|helper| RepricingCheck::from_helper(helper.as_ref(), curve, tolerance))
        .collect::<CurveResult<Vec<_>>>()?;
    Ok(RepricingReport::new(checks))
}

/// Times a curve build.
#[derive(Debug, Clone, Copy)]
pub struct BuildTimer {
    start: Instant,
}

impl BuildTimer {
    /// Starts a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since the timer started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
