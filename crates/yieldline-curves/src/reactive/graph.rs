//! Dependency graph for change notification.
//!
//! Every observable object (quote, handle link, helper, curve, evaluation
//! date) owns one node in a [`DependencyGraph`]. An edge `a -> b` means `b`
//! observes `a`. Notifying `a` bumps the graph revision and calls
//! [`Observer::update`] once on every transitive dependent, breadth first.
//!
//! Callbacks are held as [`Weak`] references, so the graph never keeps an
//! observer alive and objects can be dropped in any order.
//!
//! # Example
//!
//! ```rust
//! use yieldline_curves::reactive::DependencyGraph;
//!
//! let graph = DependencyGraph::new();
//! let quote = graph.add_node("quote");
//! let curve = graph.add_node("curve");
//!
//! assert!(graph.register_with(curve, quote).unwrap());
//! assert!(!graph.register_with(curve, quote).unwrap()); // already present
//! assert!(graph.register_with(quote, curve).is_err()); // would close a cycle
//! assert_eq!(graph.dependents_of(quote), vec![curve]);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::RwLock;
use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction;

use crate::error::{CurveError, CurveResult};

/// Opaque identifier of a graph node. Never reused within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Returns the raw id.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Revision number, bumped once per notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(pub u64);

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rev:{}", self.0)
    }
}

/// Something that reacts when an observable it depends on changes.
pub trait Observer: Send + Sync {
    /// Called once per notification that reaches this observer.
    ///
    /// Must not block on work that itself waits for a notification.
    fn update(&self) -> CurveResult<()>;
}

/// Something that owns a node in a dependency graph.
pub trait Observable {
    /// Returns the graph node representing this object.
    fn observable_id(&self) -> NodeId;
}

#[derive(Default)]
struct GraphInner {
    graph: RwLock<StableDiGraph<NodeId, ()>>,
    indices: DashMap<NodeId, NodeIndex>,
    labels: DashMap<NodeId, String>,
    observers: DashMap<NodeId, Weak<dyn Observer>>,
    next_id: AtomicU64,
    revision: AtomicU64,
}

/// Shared arena of observable nodes and their dependency edges.
///
/// Cloning is cheap and yields a handle to the same graph. The graph lock
/// is never held while observer callbacks run.
#[derive(Clone, Default)]
pub struct DependencyGraph {
    inner: Arc<GraphInner>,
}

impl DependencyGraph {
    /// Creates a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its id.
    pub fn add_node(&self, label: impl Into<String>) -> NodeId {
        let id = NodeId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut graph = self.inner.graph.write();
        let index = graph.add_node(id);
        self.inner.indices.insert(id, index);
        self.inner.labels.insert(id, label.into());
        id
    }

    /// Removes a node with all its edges. Returns false if it was unknown.
    pub fn remove_node(&self, id: NodeId) -> bool {
        let mut graph = self.inner.graph.write();
        let Some((_, index)) = self.inner.indices.remove(&id) else {
            return false;
        };
        graph.remove_node(index);
        drop(graph);

        self.inner.observers.remove(&id);
        self.inner.labels.remove(&id);
        true
    }

    /// Binds the callback invoked when notifications reach `id`.
    ///
    /// Nodes without a callback pass notifications through to their own
    /// dependents.
    pub fn attach_observer(&self, id: NodeId, observer: Weak<dyn Observer>) -> CurveResult<()> {
        self.index_of(id)?;
        self.inner.observers.insert(id, observer);
        Ok(())
    }

    /// Makes `observer` depend on `observable`.
    ///
    /// Returns `false` if the dependency already existed.
    ///
    /// # Errors
    ///
    /// `CyclicDependency` if `observable` already depends on `observer`;
    /// `InvalidArgument` for unknown ids.
    pub fn register_with(&self, observer: NodeId, observable: NodeId) -> CurveResult<bool> {
        let mut graph = self.inner.graph.write();
        let from = self.index_of(observable)?;
        let to = self.index_of(observer)?;

        if graph.find_edge(from, to).is_some() {
            return Ok(false);
        }
        if from == to || has_path_connecting(&*graph, to, from, None) {
            return Err(CurveError::CyclicDependency {
                observer: self.describe(observer),
                observable: self.describe(observable),
            });
        }

        graph.add_edge(from, to, ());
        Ok(true)
    }

    /// Removes the dependency of `observer` on `observable`.
    pub fn unregister_with(&self, observer: NodeId, observable: NodeId) -> bool {
        let mut graph = self.inner.graph.write();
        let (Ok(from), Ok(to)) = (self.index_of(observable), self.index_of(observer)) else {
            return false;
        };
        match graph.find_edge(from, to) {
            Some(edge) => graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// Removes every dependency of `observer`. Returns how many were removed.
    pub fn unregister_all(&self, observer: NodeId) -> usize {
        let mut graph = self.inner.graph.write();
        let Ok(to) = self.index_of(observer) else {
            return 0;
        };
        let edges: Vec<_> = graph
            .edges_directed(to, Direction::Incoming)
            .map(|edge| edge.id())
            .collect();
        for edge in &edges {
            graph.remove_edge(*edge);
        }
        edges.len()
    }

    /// Notifies every transitive dependent of `source`.
    ///
    /// Each dependent's callback runs exactly once, in breadth-first order.
    /// A failing callback does not stop delivery to the others.
    ///
    /// # Errors
    ///
    /// `ObserverFailures` if any callback failed; `InvalidArgument` for an
    /// unknown source.
    pub fn notify_observers(&self, source: NodeId) -> CurveResult<Revision> {
        let revision = Revision(self.inner.revision.fetch_add(1, Ordering::SeqCst) + 1);

        let dependents: Vec<NodeId> = {
            let graph = self.inner.graph.read();
            let start = self.index_of(source)?;
            let mut bfs = Bfs::new(&*graph, start);
            let mut found = Vec::new();
            while let Some(index) = bfs.next(&*graph) {
                if index != start {
                    if let Some(id) = graph.node_weight(index) {
                        found.push(*id);
                    }
                }
            }
            found
        };

        tracing::debug!(
            source = %source,
            dependents = dependents.len(),
            revision = revision.0,
            "Notifying observers"
        );

        let mut failures = Vec::new();
        for id in dependents {
            let observer = self.inner.observers.get(&id).and_then(|weak| weak.upgrade());
            let Some(observer) = observer else {
                continue;
            };
            if let Err(err) = observer.update() {
                tracing::warn!(
                    node = %id,
                    label = %self.describe(id),
                    error = %err,
                    "Observer update failed"
                );
                failures.push(err);
            }
        }

        match failures.first() {
            None => Ok(revision),
            Some(first) => Err(CurveError::ObserverFailures {
                count: failures.len(),
                first: first.to_string(),
            }),
        }
    }

    /// Direct dependents (observers) of `id`.
    #[must_use]
    pub fn dependents_of(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Direct dependencies (observables) of `id`.
    #[must_use]
    pub fn observables_of(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Returns the label given when the node was added.
    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<String> {
        self.inner.labels.get(&id).map(|label| label.value().clone())
    }

    /// Returns true if the node exists.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.indices.contains_key(&id)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.graph.read().node_count()
    }

    /// Number of dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.graph.read().edge_count()
    }

    /// Current revision.
    #[must_use]
    pub fn revision(&self) -> Revision {
        Revision(self.inner.revision.load(Ordering::SeqCst))
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        let graph = self.inner.graph.read();
        let Ok(index) = self.index_of(id) else {
            return Vec::new();
        };
        let mut ids: Vec<NodeId> = graph
            .neighbors_directed(index, direction)
            .filter_map(|n| graph.node_weight(n).copied())
            .collect();
        ids.sort_unstable();
        ids
    }

    fn index_of(&self, id: NodeId) -> CurveResult<NodeIndex> {
        self.inner
            .indices
            .get(&id)
            .map(|index| *index)
            .ok_or_else(|| CurveError::invalid_argument(format!("unknown graph node {id}")))
    }

    fn describe(&self, id: NodeId) -> String {
        match self.label(id) {
            Some(label) => format!("{label} ({id})"),
            None => id.to_string(),
        }
    }
}

impl fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .field("revision", &self.revision())
            .finish()
    }
}

/// A node owned by one object; removed from the graph on drop.
pub struct GraphNode {
    graph: DependencyGraph,
    id: NodeId,
}

impl GraphNode {
    /// Adds a node to `graph`.
    #[must_use]
    pub fn new(graph: &DependencyGraph, label: impl Into<String>) -> Self {
        let id = graph.add_node(label);
        Self {
            graph: graph.clone(),
            id,
        }
    }

    /// Returns the node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the graph the node lives in.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Registers this node as an observer of `observable`.
    pub fn observe(&self, observable: NodeId) -> CurveResult<bool> {
        self.graph.register_with(self.id, observable)
    }

    /// Binds the callback for this node.
    pub fn attach(&self, observer: Weak<dyn Observer>) -> CurveResult<()> {
        self.graph.attach_observer(self.id, observer)
    }

    /// Notifies every dependent of this node.
    pub fn notify(&self) -> CurveResult<Revision> {
        self.graph.notify_observers(self.id)
    }
}

impl Drop for GraphNode {
    fn drop(&mut self) {
        self.graph.remove_node(self.id);
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphNode({})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
        fail: bool,
    }

    impl Observer for Counter {
        fn update(&self) -> CurveResult<()> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CurveError::invalid_argument("boom"))
            } else {
                Ok(())
            }
        }
    }

    fn attach(graph: &DependencyGraph, id: NodeId, counter: &Arc<Counter>) {
        let weak: Weak<dyn Observer> = Arc::downgrade(counter) as Weak<dyn Observer>;
        graph.attach_observer(id, weak).unwrap();
    }

    #[test]
    fn test_diamond_updates_once() {
        let graph = DependencyGraph::new();
        let root = graph.add_node("root");
        let left = graph.add_node("left");
        let right = graph.add_node("right");
        let sink = graph.add_node("sink");

        graph.register_with(left, root).unwrap();
        graph.register_with(right, root).unwrap();
        graph.register_with(sink, left).unwrap();
        graph.register_with(sink, right).unwrap();

        let counter = Arc::new(Counter::default());
        attach(&graph, sink, &counter);

        let rev = graph.notify_observers(root).unwrap();
        assert_eq!(rev, Revision(1));
        assert_eq!(counter.hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_does_not_stop_delivery() {
        let graph = DependencyGraph::new();
        let root = graph.add_node("root");
        let bad = graph.add_node("bad");
        let good = graph.add_node("good");
        graph.register_with(bad, root).unwrap();
        graph.register_with(good, root).unwrap();

        let failing = Arc::new(Counter {
            fail: true,
            ..Counter::default()
        });
        let ok = Arc::new(Counter::default());
        attach(&graph, bad, &failing);
        attach(&graph, good, &ok);

        let err = graph.notify_observers(root).unwrap_err();
        assert!(matches!(err, CurveError::ObserverFailures { count: 1, .. }));
        assert_eq!(ok.hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cycle_rejected() {
        let graph = DependencyGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        graph.register_with(b, a).unwrap();
        graph.register_with(c, b).unwrap();

        assert!(matches!(
            graph.register_with(a, c),
            Err(CurveError::CyclicDependency { .. })
        ));
        assert!(graph.register_with(a, a).is_err());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_dead_observer_skipped() {
        let graph = DependencyGraph::new();
        let root = graph.add_node("root");
        let leaf = graph.add_node("leaf");
        graph.register_with(leaf, root).unwrap();

        let counter = Arc::new(Counter::default());
        attach(&graph, leaf, &counter);
        drop(counter);

        assert!(graph.notify_observers(root).is_ok());
    }

    #[test]
    fn test_unregister() {
        let graph = DependencyGraph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        graph.register_with(c, a).unwrap();
        graph.register_with(c, b).unwrap();

        assert_eq!(graph.observables_of(c), vec![a, b]);
        assert!(graph.unregister_with(c, a));
        assert!(!graph.unregister_with(c, a));
        assert_eq!(graph.unregister_all(c), 1);
        assert!(graph.observables_of(c).is_empty());
    }

    #[test]
    fn test_graph_node_removed_on_drop() {
        let graph = DependencyGraph::new();
        let id = {
            let node = GraphNode::new(&graph, "temp");
            assert!(graph.contains(node.id()));
            assert_eq!(graph.label(node.id()).as_deref(), Some("temp"));
            node.id()
        };
        assert!(!graph.contains(id));
        assert_eq!(graph.node_count(), 0);
        assert!(graph.notify_observers(id).is_err());
    }
}
