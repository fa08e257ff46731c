//! Node-by-node bootstrap.
//!
//! Helpers are sorted by pillar date. Each one moves the node at its pillar
//! until its implied quote matches the market, with every earlier node held
//! fixed. Global interpolations, where moving a node changes the curve
//! before it, repeat the sweep until the nodes stop moving.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use yieldline_core::daycounts::DayCounter;
use yieldline_core::types::Date;
use yieldline_math::solvers::{try_bisection, try_brent, SolverResult};
use yieldline_math::MathError;

use crate::bootstrap::{BootstrapState, BootstrapWorkspace};
use crate::config::{BootstrapConfig, RootFinderKind};
use crate::curves::{CurveNodes, CurveQuantity};
use crate::error::{CurveError, CurveResult};
use crate::helpers::RateHelper;
use crate::repricing::BuildTimer;
use crate::term_structure::YieldTermStructure;

/// Search interval for discount factor nodes.
const DISCOUNT_BRACKET: (f64, f64) = (f64::EPSILON, 3.0);

/// Search interval for zero rate nodes.
const ZERO_RATE_BRACKET: (f64, f64) = (-1.0, 1.0);

/// Iterative bootstrap over a set of rate helpers.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use yieldline_core::daycounts::DayCountConvention;
/// use yieldline_core::{Date, Period};
/// use yieldline_curves::bootstrap::{BootstrapWorkspace, IterativeBootstrap};
/// use yieldline_curves::config::BootstrapConfig;
/// use yieldline_curves::helpers::{DepositRateHelper, RateHelper};
/// use yieldline_curves::indexes::IborIndex;
/// use yieldline_curves::Session;
///
/// let session = Session::new(Date::from_ymd(2025, 3, 17).unwrap());
/// let helpers: Vec<Arc<dyn RateHelper>> = vec![
///     DepositRateHelper::from_rate(&session, 0.0458, IborIndex::euribor(&session, Period::months(1))).unwrap(),
///     DepositRateHelper::from_rate(&session, 0.0450, IborIndex::euribor6m(&session)).unwrap(),
/// ];
///
/// let dc = DayCountConvention::Act360.to_day_counter();
/// let workspace = Arc::new(BootstrapWorkspace::new(&session, dc));
/// let nodes = IterativeBootstrap::new(BootstrapConfig::default())
///     .bootstrap(Date::from_ymd(2025, 3, 19).unwrap(), &helpers, &workspace, &|_| {})
///     .unwrap();
///
/// assert_eq!(nodes.len(), 3);
/// assert_eq!(nodes.values()[0], 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IterativeBootstrap {
    config: BootstrapConfig,
}

impl IterativeBootstrap {
    /// Creates a bootstrap with the given settings.
    #[must_use]
    pub fn new(config: BootstrapConfig) -> Self {
        Self { config }
    }

    /// The settings.
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Checks that `helpers` can be bootstrapped from `reference_date`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if there are no helpers, a quote is empty, a
    /// pillar is not after the reference date, or two helpers share a
    /// pillar.
    ///
    /// Shared pillars are rejected rather than ordered by input position:
    /// curve nodes need strictly increasing times, and two helpers solved
    /// for one node would leave one of them unpriced.
    pub fn validate(&self, reference_date: Date, helpers: &[Arc<dyn RateHelper>]) -> CurveResult<()> {
        self.config.validate()?;
        if helpers.is_empty() {
            return Err(CurveError::invalid_argument(
                "no bootstrap helpers given",
            ));
        }

        let mut pillars: HashMap<Date, usize> = HashMap::with_capacity(helpers.len());
        for (i, helper) in helpers.iter().enumerate() {
            if !helper.quote_is_valid() {
                return Err(CurveError::invalid_argument(format!(
                    "helper {i} ({}) has an invalid quote",
                    helper.description()
                )));
            }
            let latest = helper.latest_date();
            if latest <= reference_date {
                return Err(CurveError::invalid_argument(format!(
                    "helper {i} ({}) has pillar {latest} on or before the reference date \
                     {reference_date}",
                    helper.description()
                )));
            }
            if let Some(other) = pillars.insert(latest, i) {
                return Err(CurveError::invalid_argument(format!(
                    "helpers {other} ({}) and {i} ({}) share the pillar date {latest}",
                    helpers[other].description(),
                    helper.description()
                )));
            }
        }
        Ok(())
    }

    /// Solves one node per helper and returns the nodes.
    ///
    /// The helpers are attached to `workspace` and priced on it. `on_state`
    /// sees the progress; validation errors are reported before any state
    /// change.
    ///
    /// # Errors
    ///
    /// Validation errors as in [`validate`](Self::validate), and
    /// `BootstrapFailure` for the first helper whose node cannot be solved.
    pub fn bootstrap(
        &self,
        reference_date: Date,
        helpers: &[Arc<dyn RateHelper>],
        workspace: &Arc<BootstrapWorkspace>,
        on_state: &dyn Fn(BootstrapState),
    ) -> CurveResult<CurveNodes> {
        self.validate(reference_date, helpers)?;
        let timer = BuildTimer::start();

        let mut order: Vec<usize> = (0..helpers.len()).collect();
        order.sort_by_key(|&i| helpers[i].latest_date());

        workspace.reset(reference_date);
        let trial: Arc<dyn YieldTermStructure> = workspace.clone();
        for helper in helpers {
            helper.set_term_structure(Arc::downgrade(&trial));
        }

        let mut solver = NodeSolver::new(&self.config, reference_date, workspace, helpers, &order)?;

        let global = self.config.interpolation.is_global() && order.len() >= 2;
        let passes = if global { self.config.max_iterations } else { 1 };
        let mut converged = !global;
        let mut last_change = (0.0, 0);

        for pass in 0..passes {
            let previous = solver.values.clone();

            for (position, &input) in order.iter().enumerate() {
                let node = position + 1;
                let used = if pass == 0 { node } else { order.len() };
                on_state(BootstrapState::Solving(input));

                let result = solver.solve(node, used, helpers[input].as_ref()).map_err(|err| {
                    let failure = solver_failure(input, helpers[input].as_ref(), err);
                    warn!(
                        helper = input,
                        pass,
                        error = %failure,
                        "bootstrap failed"
                    );
                    on_state(BootstrapState::Failed(input));
                    failure
                })?;

                debug!(
                    helper = input,
                    description = %helpers[input].description(),
                    pillar = %solver.dates[node],
                    value = result.root,
                    iterations = result.iterations,
                    pass,
                    "solved bootstrap node"
                );
            }

            if pass > 0 {
                last_change = largest_change(&previous, &solver.values);
                if last_change.0 <= self.config.accuracy {
                    converged = true;
                    break;
                }
            }
        }

        if !converged {
            let (change, node) = last_change;
            let input = order[node.saturating_sub(1).min(order.len() - 1)];
            let failure = CurveError::bootstrap_failure(
                input,
                helpers[input].description(),
                change,
                self.config.max_iterations,
                format!(
                    "no convergence after {passes} passes; last node change {change:.2e}, \
                     required accuracy {:.2e}",
                    self.config.accuracy
                ),
            );
            warn!(helper = input, error = %failure, "bootstrap failed");
            on_state(BootstrapState::Failed(input));
            return Err(failure);
        }

        let nodes = solver.build(solver.values.len())?;
        on_state(BootstrapState::Solved);
        info!(
            nodes = nodes.len(),
            quantity = %self.config.quantity,
            interpolation = %nodes.interpolation(),
            elapsed_us = timer.elapsed().as_micros() as u64,
            "bootstrap completed"
        );
        Ok(nodes)
    }
}

/// Mutable node values plus what is needed to rebuild the trial curve.
struct NodeSolver<'a> {
    config: &'a BootstrapConfig,
    workspace: &'a BootstrapWorkspace,
    dates: Vec<Date>,
    times: Vec<f64>,
    values: Vec<f64>,
}

impl<'a> NodeSolver<'a> {
    fn new(
        config: &'a BootstrapConfig,
        reference_date: Date,
        workspace: &'a BootstrapWorkspace,
        helpers: &[Arc<dyn RateHelper>],
        order: &[usize],
    ) -> CurveResult<Self> {
        let day_counter: &DayCounter = workspace.day_counter();
        let mut dates = Vec::with_capacity(order.len() + 1);
        let mut times = Vec::with_capacity(order.len() + 1);
        dates.push(reference_date);
        times.push(0.0);
        for &input in order {
            let pillar = helpers[input].latest_date();
            let t = day_counter.year_fraction(reference_date, pillar);
            if let Some(&last) = times.last() {
                if t <= last {
                    return Err(CurveError::invalid_argument(format!(
                        "pillar {pillar} of helper {input} ({}) does not increase curve time",
                        helpers[input].description()
                    )));
                }
            }
            dates.push(pillar);
            times.push(t);
        }

        let initial = match config.quantity {
            CurveQuantity::DiscountFactor => 1.0,
            CurveQuantity::ZeroRate => 0.02,
        };
        let values = vec![initial; dates.len()];

        Ok(Self {
            config,
            workspace,
            dates,
            times,
            values,
        })
    }

    /// Nodes `0..=last` as a curve.
    fn build(&self, count: usize) -> CurveResult<CurveNodes> {
        CurveNodes::new(
            self.dates[..count].to_vec(),
            self.times[..count].to_vec(),
            self.values[..count].to_vec(),
            self.config.quantity,
            self.config.interpolation,
        )
    }

    fn set_value(&mut self, node: usize, value: f64) {
        self.values[node] = value;
        // Zero rates at time zero are undefined; node 0 follows node 1
        if node == 1 && self.config.quantity == CurveQuantity::ZeroRate {
            self.values[0] = value;
        }
    }

    /// Solves `node` with the curve built on the first `used + 1` nodes.
    fn solve(&mut self, node: usize, used: usize, helper: &dyn RateHelper) -> CurveResult<SolverResult> {
        let (lower, upper) = match self.config.quantity {
            CurveQuantity::DiscountFactor => DISCOUNT_BRACKET,
            CurveQuantity::ZeroRate => ZERO_RATE_BRACKET,
        };
        let solver_config = self.config.solver_config();
        let kind = self.config.solver;

        let mut objective = |x: f64| -> CurveResult<f64> {
            self.set_value(node, x);
            let nodes = self.build(used + 1)?;
            self.workspace.set_nodes(Arc::new(nodes));
            helper.quote_error()
        };
        let result = match kind {
            RootFinderKind::Brent => try_brent(&mut objective, lower, upper, &solver_config)?,
            RootFinderKind::Bisection => {
                try_bisection(&mut objective, lower, upper, &solver_config)?
            }
        };

        self.set_value(node, result.root);
        self.workspace.set_nodes(Arc::new(self.build(used + 1)?));
        Ok(result)
    }
}

/// Wraps any error raised while solving a helper's node.
fn solver_failure(index: usize, helper: &dyn RateHelper, err: CurveError) -> CurveError {
    let description = helper.description();
    match err {
        CurveError::Math(MathError::ConvergenceFailed {
            iterations,
            residual,
        }) => CurveError::bootstrap_failure(
            index,
            description,
            residual,
            iterations,
            "root finder did not converge",
        ),
        CurveError::Math(MathError::InvalidBracket { a, b, fa, fb }) => {
            CurveError::bootstrap_failure(
                index,
                description,
                fa.abs().min(fb.abs()),
                0,
                format!("quote error does not change sign on [{a}, {b}] ({fa:.3e}, {fb:.3e})"),
            )
        }
        failure @ CurveError::BootstrapFailure { .. } => failure,
        other => CurveError::bootstrap_failure(index, description, f64::NAN, 0, other.to_string()),
    }
}

/// Largest absolute move between two sweeps and the node it happened at.
fn largest_change(previous: &[f64], current: &[f64]) -> (f64, usize) {
    previous
        .iter()
        .zip(current)
        .enumerate()
        .map(|(node, (p, c))| ((c - p).abs(), node))
        .fold((0.0, 0), |best, candidate| if candidate.0 > best.0 { candidate } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use approx::assert_relative_eq;
    use yieldline_core::daycounts::DayCountConvention;
    use yieldline_core::types::Period;

    use crate::helpers::{DepositRateHelper, SwapConventions, SwapRateHelper};
    use crate::indexes::IborIndex;
    use crate::interpolation::InterpolationMethod;
    use crate::quotes::SimpleQuote;
    use crate::session::Session;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn deposits(session: &Session) -> Vec<Arc<dyn RateHelper>> {
        vec![
            DepositRateHelper::from_rate(session, 0.0450, IborIndex::euribor6m(session)).unwrap(),
            DepositRateHelper::from_rate(session, 0.0458, IborIndex::euribor(session, Period::months(1)))
                .unwrap(),
            DepositRateHelper::from_rate(session, 0.0456, IborIndex::euribor3m(session)).unwrap(),
        ]
    }

    fn workspace(session: &Session) -> Arc<BootstrapWorkspace> {
        Arc::new(BootstrapWorkspace::new(
            session,
            DayCountConvention::Act360.to_day_counter(),
        ))
    }

    #[test]
    fn test_nodes_sorted_and_repriced() {
        let session = Session::new(d(2025, 3, 17));
        let helpers = deposits(&session);
        let workspace = workspace(&session);
        let nodes = IterativeBootstrap::default()
            .bootstrap(d(2025, 3, 19), &helpers, &workspace, &|_| {})
            .unwrap();

        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes.dates()[0], d(2025, 3, 19));
        assert_eq!(nodes.dates()[1], helpers[1].latest_date());
        assert_eq!(nodes.dates()[3], helpers[0].latest_date());
        assert_eq!(nodes.values()[0], 1.0);

        for helper in &helpers {
            assert!(helper.quote_error().unwrap().abs() < 1e-10);
        }
        // Simple deposit from the reference date: df = 1 / (1 + r t)
        let t = nodes.times()[1];
        assert_relative_eq!(nodes.values()[1], 1.0 / (1.0 + 0.0458 * t), epsilon = 1e-11);
    }

    #[test]
    fn test_state_transitions_use_input_positions() {
        let session = Session::new(d(2025, 3, 17));
        let helpers = deposits(&session);
        let workspace = workspace(&session);
        let states = Mutex::new(Vec::new());
        IterativeBootstrap::default()
            .bootstrap(d(2025, 3, 19), &helpers, &workspace, &|s| {
                states.lock().unwrap().push(s);
            })
            .unwrap();

        assert_eq!(
            states.into_inner().unwrap(),
            vec![
                BootstrapState::Solving(1),
                BootstrapState::Solving(2),
                BootstrapState::Solving(0),
                BootstrapState::Solved,
            ]
        );
    }

    #[test]
    fn test_validation_errors() {
        let session = Session::new(d(2025, 3, 17));
        let workspace = workspace(&session);
        let bootstrap = IterativeBootstrap::default();

        let none: Vec<Arc<dyn RateHelper>> = Vec::new();
        assert!(bootstrap.bootstrap(d(2025, 3, 19), &none, &workspace, &|_| {}).is_err());

        let twins: Vec<Arc<dyn RateHelper>> = vec![
            DepositRateHelper::from_rate(&session, 0.045, IborIndex::euribor3m(&session)).unwrap(),
            DepositRateHelper::from_rate(&session, 0.046, IborIndex::euribor3m(&session)).unwrap(),
        ];
        let err = bootstrap.validate(d(2025, 3, 19), &twins).unwrap_err();
        assert!(err.to_string().contains("share the pillar"));

        let empty_quote = Arc::new(SimpleQuote::new(&session, None));
        let invalid: Vec<Arc<dyn RateHelper>> = vec![DepositRateHelper::new(
            &session,
            empty_quote.handle().unwrap(),
            IborIndex::euribor3m(&session),
        )
        .unwrap()];
        assert!(bootstrap.validate(d(2025, 3, 19), &invalid).is_err());

        let expired = deposits(&session);
        assert!(bootstrap.validate(d(2026, 1, 2), &expired).is_err());
    }

    #[test]
    fn test_unreachable_quote_reports_failure() {
        let session = Session::new(d(2025, 3, 17));
        let helpers: Vec<Arc<dyn RateHelper>> = vec![
            DepositRateHelper::from_rate(&session, 0.045, IborIndex::euribor3m(&session)).unwrap(),
            // A discount factor above 3 would be needed
            DepositRateHelper::from_rate(&session, -5.0, IborIndex::euribor6m(&session)).unwrap(),
        ];
        let workspace = workspace(&session);
        let last = Mutex::new(BootstrapState::NotStarted);
        let err = IterativeBootstrap::default()
            .bootstrap(d(2025, 3, 19), &helpers, &workspace, &|s| {
                *last.lock().unwrap() = s;
            })
            .unwrap_err();

        match err {
            CurveError::BootstrapFailure { index, helper, .. } => {
                assert_eq!(index, 1);
                assert_eq!(helper, "6M deposit");
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(*last.lock().unwrap(), BootstrapState::Failed(1));
    }

    #[test]
    fn test_zero_rate_nodes() {
        let session = Session::new(d(2025, 3, 17));
        let helpers = deposits(&session);
        let workspace = workspace(&session);
        let config = BootstrapConfig::default().with_quantity(CurveQuantity::ZeroRate);
        let nodes = IterativeBootstrap::new(config)
            .bootstrap(d(2025, 3, 19), &helpers, &workspace, &|_| {})
            .unwrap();

        assert_eq!(nodes.quantity(), CurveQuantity::ZeroRate);
        assert_eq!(nodes.values()[0], nodes.values()[1]);
        for helper in &helpers {
            assert!(helper.quote_error().unwrap().abs() < 1e-10);
        }
    }

    #[test]
    fn test_cubic_sweeps_converge() {
        let session = Session::new(d(2025, 3, 17));
        let conventions = SwapConventions::euribor(IborIndex::euribor6m(&session));
        let mut helpers = deposits(&session);
        for (years, rate) in [(2, 0.0463), (3, 0.0475), (5, 0.0499), (10, 0.0547)] {
            helpers.push(
                SwapRateHelper::from_rate(&session, rate, Period::years(years), conventions.clone())
                    .unwrap(),
            );
        }
        let workspace = workspace(&session);
        let config = BootstrapConfig::default().with_interpolation(InterpolationMethod::CubicSpline);
        let nodes = IterativeBootstrap::new(config)
            .bootstrap(d(2025, 3, 19), &helpers, &workspace, &|_| {})
            .unwrap();

        assert_eq!(nodes.interpolation(), InterpolationMethod::CubicSpline);
        for helper in &helpers {
            let error = helper.quote_error().unwrap();
            assert!(error.abs() < 1e-9, "{}: {error:e}", helper.description());
        }
    }

    #[test]
    fn test_bisection_solver() {
        let session = Session::new(d(2025, 3, 17));
        let helpers = deposits(&session);
        let workspace = workspace(&session);
        let config = BootstrapConfig::default()
            .with_solver(RootFinderKind::Bisection)
            .with_max_iterations(200);
        IterativeBootstrap::new(config)
            .bootstrap(d(2025, 3, 19), &helpers, &workspace, &|_| {})
            .unwrap();
        for helper in &helpers {
            assert!(helper.quote_error().unwrap().abs() < 1e-9);
        }
    }

    #[test]
    fn test_largest_change() {
        assert_eq!(largest_change(&[1.0, 0.9, 0.8], &[1.0, 0.91, 0.8]).1, 1);
        assert_eq!(largest_change(&[1.0], &[1.0]), (0.0, 0));
    }

    proptest::proptest! {
        #[test]
        fn prop_deposit_ladder_reprices(
            r1 in -0.01f64..0.12,
            r3 in -0.01f64..0.12,
            r6 in -0.01f64..0.12,
        ) {
            let session = Session::new(d(2025, 3, 17));
            let helpers: Vec<Arc<dyn RateHelper>> = vec![
                DepositRateHelper::from_rate(&session, r1, IborIndex::euribor(&session, Period::months(1)))
                    .unwrap(),
                DepositRateHelper::from_rate(&session, r3, IborIndex::euribor3m(&session)).unwrap(),
                DepositRateHelper::from_rate(&session, r6, IborIndex::euribor6m(&session)).unwrap(),
            ];
            let workspace = workspace(&session);
            let nodes = IterativeBootstrap::default()
                .bootstrap(d(2025, 3, 19), &helpers, &workspace, &|_| {})
                .unwrap();

            proptest::prop_assert_eq!(nodes.len(), 4);
            for helper in &helpers {
                proptest::prop_assert!(helper.quote_error().unwrap().abs() < 1e-10);
            }
        }
    }
}
