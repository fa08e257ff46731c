//! Shared, relinkable references to observables.
//!
//! A [`Handle`] points at a link node. The link observes whatever it
//! currently targets, and everything holding the handle observes the link,
//! so swapping the target through a [`RelinkableHandle`] reaches all
//! holders without them re-registering.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{CurveError, CurveResult};
use crate::reactive::{DependencyGraph, GraphNode, NodeId, Observable};

struct Link<T: ?Sized> {
    node: GraphNode,
    target: RwLock<Option<Arc<T>>>,
}

/// Read-only reference to a shared observable, possibly empty.
///
/// Clones share the same link.
pub struct Handle<T: ?Sized> {
    link: Arc<Link<T>>,
}

impl<T> Handle<T>
where
    T: ?Sized + Observable + Send + Sync,
{
    /// Creates a handle linked to `target`.
    pub fn new(graph: &DependencyGraph, target: Arc<T>) -> CurveResult<Self> {
        let handle = Self::empty(graph);
        handle.link.node.observe(target.observable_id())?;
        *handle.link.target.write() = Some(target);
        Ok(handle)
    }

    /// Creates an empty handle.
    #[must_use]
    pub fn empty(graph: &DependencyGraph) -> Self {
        Self {
            link: Arc::new(Link {
                node: GraphNode::new(graph, "handle"),
                target: RwLock::new(None),
            }),
        }
    }

    /// Returns the current target.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the handle is empty.
    pub fn current_link(&self) -> CurveResult<Arc<T>> {
        self.link
            .target
            .read()
            .clone()
            .ok_or_else(|| CurveError::invalid_argument("empty handle cannot be dereferenced"))
    }

    /// Returns true if no target is linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.link.target.read().is_none()
    }

    fn relink(&self, target: Option<Arc<T>>) -> CurveResult<bool> {
        let link_id = self.link.node.id();
        let graph = self.link.node.graph();

        let mut slot = self.link.target.write();
        let changed = match (&*slot, &target) {
            (Some(old), Some(new)) => !Arc::ptr_eq(old, new),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return Ok(false);
        }

        // Register first so a cyclic target leaves the old link intact.
        if let Some(new) = &target {
            graph.register_with(link_id, new.observable_id())?;
        }
        if let Some(old) = &*slot {
            graph.unregister_with(link_id, old.observable_id());
        }
        *slot = target;
        Ok(true)
    }
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
        }
    }
}

impl<T: ?Sized> Observable for Handle<T> {
    fn observable_id(&self) -> NodeId {
        self.link.node.id()
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("link", &self.link.node.id())
            .field("empty", &self.link.target.read().is_none())
            .finish()
    }
}

/// A handle whose target can be swapped.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use yieldline_curves::quotes::{Quote, SimpleQuote};
/// use yieldline_curves::reactive::RelinkableHandle;
/// use yieldline_curves::Session;
/// use yieldline_core::Date;
///
/// let session = Session::new(Date::from_ymd(2025, 3, 17).unwrap());
/// let first: Arc<dyn Quote> = Arc::new(SimpleQuote::new(&session, Some(0.01)));
/// let second: Arc<dyn Quote> = Arc::new(SimpleQuote::new(&session, Some(0.02)));
///
/// let relinkable = RelinkableHandle::new(session.graph(), Some(first)).unwrap();
/// let handle = relinkable.handle();
/// assert_eq!(handle.current_link().unwrap().value().unwrap(), 0.01);
///
/// relinkable.link_to(Some(second)).unwrap();
/// assert_eq!(handle.current_link().unwrap().value().unwrap(), 0.02);
/// ```
pub struct RelinkableHandle<T: ?Sized> {
    handle: Handle<T>,
}

impl<T> RelinkableHandle<T>
where
    T: ?Sized + Observable + Send + Sync,
{
    /// Creates a relinkable handle, optionally linked.
    pub fn new(graph: &DependencyGraph, target: Option<Arc<T>>) -> CurveResult<Self> {
        let handle = match target {
            Some(target) => Handle::new(graph, target)?,
            None => Handle::empty(graph),
        };
        Ok(Self { handle })
    }

    /// Swaps the target and notifies observers if it changed.
    pub fn link_to(&self, target: Option<Arc<T>>) -> CurveResult<()> {
        if self.handle.relink(target)? {
            self.handle.link.node.notify()?;
        }
        Ok(())
    }

    /// Returns a read-only handle sharing this link.
    #[must_use]
    pub fn handle(&self) -> Handle<T> {
        self.handle.clone()
    }

    /// Returns the current target.
    pub fn current_link(&self) -> CurveResult<Arc<T>> {
        self.handle.current_link()
    }

    /// Returns true if no target is linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }
}

impl<T: ?Sized> Clone for RelinkableHandle<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<T: ?Sized> Observable for RelinkableHandle<T> {
    fn observable_id(&self) -> NodeId {
        self.handle.observable_id()
    }
}

impl<T: ?Sized> fmt::Debug for RelinkableHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RelinkableHandle").field(&self.handle).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Observer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Weak;

    struct Target {
        node: GraphNode,
    }

    impl Observable for Target {
        fn observable_id(&self) -> NodeId {
            self.node.id()
        }
    }

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Observer for Counter {
        fn update(&self) -> CurveResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn target(graph: &DependencyGraph) -> Arc<Target> {
        Arc::new(Target {
            node: GraphNode::new(graph, "target"),
        })
    }

    #[test]
    fn test_empty_handle() {
        let graph = DependencyGraph::new();
        let handle: Handle<Target> = Handle::empty(&graph);
        assert!(handle.is_empty());
        assert!(matches!(
            handle.current_link(),
            Err(CurveError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_relink_moves_edge_and_notifies() {
        let graph = DependencyGraph::new();
        let a = target(&graph);
        let b = target(&graph);
        let relinkable = RelinkableHandle::new(&graph, Some(Arc::clone(&a))).unwrap();

        let holder = GraphNode::new(&graph, "holder");
        holder.observe(relinkable.observable_id()).unwrap();
        let counter = Arc::new(Counter::default());
        holder
            .attach(Arc::downgrade(&counter) as Weak<dyn Observer>)
            .unwrap();

        // Target changes reach the holder through the link
        a.node.notify().unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        relinkable.link_to(Some(Arc::clone(&b))).unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
        assert_eq!(graph.observables_of(relinkable.observable_id()), vec![b.node.id()]);

        // The old target no longer reaches the holder
        a.node.notify().unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);

        // Relinking to the same target is silent
        relinkable.link_to(Some(Arc::clone(&b))).unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);

        relinkable.link_to(None).unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
        assert!(relinkable.handle().is_empty());
    }

    #[test]
    fn test_clones_share_link() {
        let graph = DependencyGraph::new();
        let relinkable: RelinkableHandle<Target> = RelinkableHandle::new(&graph, None).unwrap();
        let read_only = relinkable.handle();
        assert!(read_only.is_empty());

        let t = target(&graph);
        relinkable.link_to(Some(Arc::clone(&t))).unwrap();
        assert!(Arc::ptr_eq(&read_only.current_link().unwrap(), &t));
        assert_eq!(read_only.observable_id(), relinkable.observable_id());
    }
}
