//! Change propagation and lazy evaluation.
//!
//! - [`DependencyGraph`]: observable nodes and the edges between them
//! - [`LazyCache`]: calculate-on-read state behind lazy objects
//! - [`Handle`] / [`RelinkableHandle`]: shared references with swappable targets

mod graph;
mod handle;
mod lazy;

pub use graph::{DependencyGraph, GraphNode, NodeId, Observable, Observer, Revision};
pub use handle::{Handle, RelinkableHandle};
pub use lazy::LazyCache;
