//! Evaluation-date session.
//!
//! A [`Session`] is the context every market object is created in: it owns
//! the dependency graph, the evaluation date ("today") and the store of
//! past index fixings. Both the date and each index's fixings have a graph
//! node that dependents observe. Sessions are independent of each other; cloning one
//! shares it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use yieldline_core::types::Date;

use crate::error::CurveResult;
use crate::reactive::{DependencyGraph, GraphNode, NodeId, Observable};

struct SessionInner {
    graph: DependencyGraph,
    node: GraphNode,
    evaluation_date: RwLock<Date>,
    enforces_todays_historic_fixings: AtomicBool,
    fixings: DashMap<String, BTreeMap<Date, f64>>,
    fixing_nodes: DashMap<String, GraphNode>,
}

/// Shared evaluation context.
///
/// Objects whose dates are derived from the evaluation date register with
/// the session's node and are notified when it moves.
///
/// # Example
///
/// ```rust
/// use yieldline_core::Date;
/// use yieldline_curves::Session;
///
/// let session = Session::new(Date::from_ymd(2025, 3, 17).unwrap());
/// {
///     let _guard = session.save();
///     session.set_evaluation_date(Date::from_ymd(2025, 6, 2).unwrap()).unwrap();
///     assert_eq!(session.evaluation_date(), Date::from_ymd(2025, 6, 2).unwrap());
/// }
/// assert_eq!(session.evaluation_date(), Date::from_ymd(2025, 3, 17).unwrap());
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Creates a session evaluated at `evaluation_date`.
    #[must_use]
    pub fn new(evaluation_date: Date) -> Self {
        let graph = DependencyGraph::new();
        let node = GraphNode::new(&graph, "evaluation date");
        Self {
            inner: Arc::new(SessionInner {
                graph,
                node,
                evaluation_date: RwLock::new(evaluation_date),
                enforces_todays_historic_fixings: AtomicBool::new(false),
                fixings: DashMap::new(),
                fixing_nodes: DashMap::new(),
            }),
        }
    }

    /// The dependency graph owned by this session.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.inner.graph
    }

    /// Node notified when the evaluation date changes.
    #[must_use]
    pub fn evaluation_node(&self) -> NodeId {
        self.inner.node.id()
    }

    /// Current evaluation date.
    #[must_use]
    pub fn evaluation_date(&self) -> Date {
        *self.inner.evaluation_date.read()
    }

    /// Moves the evaluation date.
    ///
    /// Dependents are notified only if the date actually changes.
    pub fn set_evaluation_date(&self, date: Date) -> CurveResult<()> {
        {
            let mut current = self.inner.evaluation_date.write();
            if *current == date {
                return Ok(());
            }
            *current = date;
        }
        tracing::debug!(date = %date, "Evaluation date changed");
        self.inner.node.notify()?;
        Ok(())
    }

    /// Whether a fixing dated today must come from stored fixings.
    #[must_use]
    pub fn enforces_todays_historic_fixings(&self) -> bool {
        self.inner.enforces_todays_historic_fixings.load(Ordering::SeqCst)
    }

    /// Sets whether a fixing dated today must come from stored fixings.
    ///
    /// Every index's fixings node is notified if the flag flips.
    pub fn set_enforces_todays_historic_fixings(&self, enforce: bool) -> CurveResult<()> {
        let previous = self
            .inner
            .enforces_todays_historic_fixings
            .swap(enforce, Ordering::SeqCst);
        if previous == enforce {
            return Ok(());
        }
        tracing::debug!(enforce, "Historic fixing flag changed");

        let nodes: Vec<NodeId> = self
            .inner
            .fixing_nodes
            .iter()
            .map(|node| node.id())
            .collect();
        let mut result = Ok(());
        for id in nodes {
            if let Err(err) = self.inner.graph.notify_observers(id) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Captures the evaluation date and fixing flag; both are restored when
    /// the guard drops.
    pub fn save(&self) -> EvaluationDateGuard {
        EvaluationDateGuard {
            session: self.clone(),
            evaluation_date: self.evaluation_date(),
            enforces_todays_historic_fixings: self.enforces_todays_historic_fixings(),
        }
    }

    /// Runs `f` with the evaluation date temporarily set to `date`.
    pub fn with_evaluation_date<R>(&self, date: Date, f: impl FnOnce() -> R) -> CurveResult<R> {
        let _guard = self.save();
        self.set_evaluation_date(date)?;
        Ok(f())
    }

    /// Stored fixing of `index` on `date`.
    #[must_use]
    pub fn past_fixing(&self, index: &str, date: Date) -> Option<f64> {
        self.inner
            .fixings
            .get(index)
            .and_then(|series| series.get(&date).copied())
    }

    /// Node notified when the stored fixings of `index` change or the
    /// historic fixing flag flips.
    pub fn fixings_node(&self, index: &str) -> NodeId {
        if let Some(node) = self.inner.fixing_nodes.get(index) {
            return node.id();
        }
        self.inner
            .fixing_nodes
            .entry(index.to_string())
            .or_insert_with(|| GraphNode::new(&self.inner.graph, format!("{index} fixings")))
            .id()
    }

    fn notify_fixings(&self, index: &str) -> CurveResult<()> {
        let id = self.inner.fixing_nodes.get(index).map(|node| node.id());
        if let Some(id) = id {
            self.inner.graph.notify_observers(id)?;
        }
        Ok(())
    }

    /// Stores a fixing. Returns the value previously stored, if any.
    ///
    /// Dependents of the index's fixings node are notified unless the
    /// same value was already stored.
    pub(crate) fn store_fixing(&self, index: &str, date: Date, value: f64) -> CurveResult<Option<f64>> {
        let previous = self
            .inner
            .fixings
            .entry(index.to_string())
            .or_default()
            .insert(date, value);
        if previous != Some(value) {
            self.notify_fixings(index)?;
        }
        Ok(previous)
    }

    /// Number of stored fixings for `index`.
    #[must_use]
    pub fn fixing_count(&self, index: &str) -> usize {
        self.inner.fixings.get(index).map_or(0, |series| series.len())
    }

    /// Removes all stored fixings of `index`.
    pub fn clear_fixings(&self, index: &str) -> CurveResult<()> {
        if self.inner.fixings.remove(index).is_some() {
            self.notify_fixings(index)?;
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Date::today())
    }
}

impl Observable for Session {
    fn observable_id(&self) -> NodeId {
        self.evaluation_node()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("evaluation_date", &self.evaluation_date())
            .field(
                "enforces_todays_historic_fixings",
                &self.enforces_todays_historic_fixings(),
            )
            .field("graph", &self.inner.graph)
            .finish()
    }
}

/// Restores a session's evaluation date and fixing flag on drop.
#[must_use = "the evaluation date is restored when the guard is dropped"]
pub struct EvaluationDateGuard {
    session: Session,
    evaluation_date: Date,
    enforces_todays_historic_fixings: bool,
}

impl EvaluationDateGuard {
    /// The date that will be restored.
    #[must_use]
    pub fn saved_date(&self) -> Date {
        self.evaluation_date
    }
}

impl Drop for EvaluationDateGuard {
    fn drop(&mut self) {
        if let Err(err) = self
            .session
            .set_enforces_todays_historic_fixings(self.enforces_todays_historic_fixings)
        {
            tracing::warn!(error = %err, "Observers failed while restoring fixing flag");
        }
        if let Err(err) = self.session.set_evaluation_date(self.evaluation_date) {
            tracing::warn!(
                date = %self.evaluation_date,
                error = %err,
                "Observers failed while restoring evaluation date"
            );
        }
    }
}

impl fmt::Debug for EvaluationDateGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationDateGuard")
            .field("evaluation_date", &self.evaluation_date)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CurveError;
    use crate::reactive::Observer;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Weak;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Observer for Counter {
        fn update(&self) -> CurveResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn watch(session: &Session) -> (GraphNode, Arc<Counter>) {
        let node = GraphNode::new(session.graph(), "watcher");
        node.observe(session.evaluation_node()).unwrap();
        let counter = Arc::new(Counter::default());
        node.attach(Arc::downgrade(&counter) as Weak<dyn Observer>).unwrap();
        (node, counter)
    }

    #[test]
    fn test_notifies_only_on_change() {
        let session = Session::new(d(2025, 3, 17));
        let (_node, counter) = watch(&session);

        session.set_evaluation_date(d(2025, 3, 17)).unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);

        session.set_evaluation_date(d(2025, 3, 18)).unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_restores_date_and_flag() {
        let session = Session::new(d(2025, 3, 17));
        let (_node, counter) = watch(&session);
        {
            let guard = session.save();
            assert_eq!(guard.saved_date(), d(2025, 3, 17));
            session.set_evaluation_date(d(2026, 1, 5)).unwrap();
            session.set_enforces_todays_historic_fixings(true).unwrap();
        }
        assert_eq!(session.evaluation_date(), d(2025, 3, 17));
        assert!(!session.enforces_todays_historic_fixings());
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_guard_restores_on_error_path() {
        let session = Session::new(d(2025, 3, 17));
        let result: Result<(), CurveError> = (|| {
            let _guard = session.save();
            session.set_evaluation_date(d(2030, 1, 1))?;
            Err(CurveError::invalid_argument("pricing failed"))
        })();
        assert!(result.is_err());
        assert_eq!(session.evaluation_date(), d(2025, 3, 17));
    }

    #[test]
    fn test_with_evaluation_date() {
        let session = Session::new(d(2025, 3, 17));
        let seen = session
            .with_evaluation_date(d(2025, 12, 31), || session.evaluation_date())
            .unwrap();
        assert_eq!(seen, d(2025, 12, 31));
        assert_eq!(session.evaluation_date(), d(2025, 3, 17));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let a = Session::new(d(2025, 3, 17));
        let b = Session::new(d(2025, 3, 17));
        a.set_evaluation_date(d(2025, 4, 1)).unwrap();
        assert_eq!(b.evaluation_date(), d(2025, 3, 17));

        a.store_fixing("Euribor6M Actual/360", d(2025, 3, 14), 0.025).unwrap();
        assert_eq!(a.past_fixing("Euribor6M Actual/360", d(2025, 3, 14)), Some(0.025));
        assert_eq!(b.past_fixing("Euribor6M Actual/360", d(2025, 3, 14)), None);
        assert_eq!(a.fixing_count("Euribor6M Actual/360"), 1);

        a.clear_fixings("Euribor6M Actual/360").unwrap();
        assert_eq!(a.fixing_count("Euribor6M Actual/360"), 0);
    }

    fn watch_fixings(session: &Session, index: &str) -> (GraphNode, Arc<Counter>) {
        let node = GraphNode::new(session.graph(), "fixings watcher");
        node.observe(session.fixings_node(index)).unwrap();
        let counter = Arc::new(Counter::default());
        node.attach(Arc::downgrade(&counter) as Weak<dyn Observer>).unwrap();
        (node, counter)
    }

    #[test]
    fn test_fixing_changes_notify_their_index() {
        let session = Session::new(d(2025, 3, 17));
        let (_six, six_month) = watch_fixings(&session, "Euribor6M Actual/360");
        let (_three, three_month) = watch_fixings(&session, "Euribor3M Actual/360");

        session
            .store_fixing("Euribor6M Actual/360", d(2025, 3, 14), 0.025)
            .unwrap();
        assert_eq!(six_month.0.load(Ordering::SeqCst), 1);
        assert_eq!(three_month.0.load(Ordering::SeqCst), 0);

        // Storing the same value again is not a change
        let previous = session
            .store_fixing("Euribor6M Actual/360", d(2025, 3, 14), 0.025)
            .unwrap();
        assert_eq!(previous, Some(0.025));
        assert_eq!(six_month.0.load(Ordering::SeqCst), 1);

        session.clear_fixings("Euribor6M Actual/360").unwrap();
        assert_eq!(six_month.0.load(Ordering::SeqCst), 2);
        session.clear_fixings("Euribor6M Actual/360").unwrap();
        assert_eq!(six_month.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_historic_flag_notifies_every_index() {
        let session = Session::new(d(2025, 3, 17));
        let (_six, six_month) = watch_fixings(&session, "Euribor6M Actual/360");
        let (_three, three_month) = watch_fixings(&session, "Euribor3M Actual/360");
        let (_date, date) = watch(&session);

        session.set_enforces_todays_historic_fixings(true).unwrap();
        session.set_enforces_todays_historic_fixings(true).unwrap();
        assert_eq!(six_month.0.load(Ordering::SeqCst), 1);
        assert_eq!(three_month.0.load(Ordering::SeqCst), 1);
        assert_eq!(date.0.load(Ordering::SeqCst), 0);

        {
            let _guard = session.save();
            session.set_enforces_todays_historic_fixings(false).unwrap();
        }
        assert!(session.enforces_todays_historic_fixings());
        assert_eq!(six_month.0.load(Ordering::SeqCst), 3);
    }
}
