//! Brent's root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Brent's root-finding algorithm.
///
/// Combines the reliability of bisection with the speed of the secant method
/// and inverse quadratic interpolation. This is generally the best choice
/// when a derivative is not available.
///
/// Requires: `f(a) * f(b) <= 0` (opposite signs at endpoints)
///
/// # Example
///
/// ```rust
/// use yieldline_math::solvers::{brent, SolverConfig};
///
/// // Find root of x^3 - x - 2
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((f(result.root)).abs() < 1e-10);
/// ```
pub fn brent<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    try_brent(|x| Ok::<f64, MathError>(f(x)), a, b, config)
}

/// Brent's algorithm over a fallible objective.
///
/// Objective errors abort the search and are returned as-is; bracket and
/// convergence failures are converted from [`MathError`].
#[allow(clippy::many_single_char_names)]
pub fn try_brent<F, E>(mut f: F, a: f64, b: f64, config: &SolverConfig) -> Result<SolverResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<MathError>,
{
    let mut a = a;
    let mut b = b;
    let mut fa = f(a)?;
    let mut fb = f(b)?;

    if fa * fb > 0.0 {
        return Err(MathError::InvalidBracket { a, b, fa, fb }.into());
    }

    // Keep |f(a)| >= |f(b)|
    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for iteration in 0..config.max_iterations {
        if fb.abs() < config.tolerance || (b - a).abs() < config.tolerance {
            return Ok(SolverResult {
                root: b,
                iterations: iteration,
                residual: fb,
            });
        }

        let m = (a + b) / 2.0;

        let interpolated = if (fa - fc).abs() > 1e-15 && (fb - fc).abs() > 1e-15 {
            // Inverse quadratic interpolation
            let r = fb / fc;
            let p_val = fa / fc;
            let q = fa / fb;

            Some(
                b - (q * (q - r) * (b - a) + (1.0 - r) * (b - c) * p_val)
                    / ((q - 1.0) * (r - 1.0) * (p_val - 1.0)),
            )
        } else if (fb - fa).abs() > 1e-15 {
            // Secant
            Some(b - fb * (b - a) / (fb - fa))
        } else {
            None
        };

        let accepted = interpolated
            .filter(|&s| s > m.min(b) && s < m.max(b) && (s - b).abs() < e.abs() / 2.0);

        let s = if let Some(s) = accepted {
            e = d;
            d = s - b;
            s
        } else {
            e = b - a;
            d = e;
            m
        };

        c = b;
        fc = fb;

        let fs = f(s)?;
        if fa * fs < 0.0 {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }

        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
    }

    Err(MathError::convergence_failed(config.max_iterations, fb.abs()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| x * x - 2.0;
        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_cubic() {
        let f = |x: f64| x * x * x - x - 2.0;
        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
        assert!(f(result.root).abs() < 1e-10);
        assert_relative_eq!(result.root, 1.521_379_706_804_568, epsilon = 1e-10);
    }

    #[test]
    fn test_discount_factor_bracket() {
        // Same bracket a discount-factor bootstrap uses
        let target = 0.61;
        let f = |df: f64| df - target;
        let config = SolverConfig::new(1e-12, 100);
        let result = brent(f, f64::EPSILON, 3.0, &config).unwrap();
        assert_relative_eq!(result.root, target, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_bracket() {
        let f = |x: f64| x * x - 2.0;
        let result = brent(f, 2.0, 3.0, &SolverConfig::default());
        assert!(matches!(result, Err(MathError::InvalidBracket { .. })));
    }

    #[test]
    fn test_iteration_limit() {
        let f = |x: f64| x.powi(3) - 0.3;
        let config = SolverConfig::new(1e-15, 2);
        let result = brent(f, 0.0, 5.0, &config);
        assert!(matches!(result, Err(MathError::ConvergenceFailed { iterations: 2, .. })));
    }

    #[test]
    fn test_faster_than_bisection() {
        let f = |x: f64| x * x - 2.0;
        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
        // Bisection needs ~34 iterations for 1e-10 tolerance
        assert!(result.iterations < 20);
    }

    proptest::proptest! {
        #[test]
        fn prop_cube_root_within_bracket(c in 0.001f64..8.0) {
            let f = |x: f64| x * x * x - c;
            let result = brent(f, 0.0, 3.0, &SolverConfig::default()).unwrap();
            proptest::prop_assert!((0.0..=3.0).contains(&result.root));
            proptest::prop_assert!((result.root - c.cbrt()).abs() < 1e-7);
        }

        #[test]
        fn prop_discount_factor_root(r in -0.02f64..0.15, t in 0.1f64..30.0) {
            let f = |df: f64| df.ln() + r * t;
            let result = brent(&f, f64::EPSILON, 3.0, &SolverConfig::default()).unwrap();
            proptest::prop_assert!(result.root > 0.0 && result.root <= 3.0);
            proptest::prop_assert!(f(result.root).abs() < 1e-7);
        }
    }
}
