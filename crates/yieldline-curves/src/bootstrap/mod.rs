//! Curve bootstrapping.
//!
//! [`IterativeBootstrap`] fits one curve node per rate helper, in pillar
//! order, on a [`BootstrapWorkspace`]. The piecewise curve runs it lazily
//! and caches the nodes until a helper changes.

mod iterative;
mod workspace;

pub use iterative::IterativeBootstrap;
pub use workspace::BootstrapWorkspace;

use std::fmt;

/// Progress of a bootstrap.
///
/// Helper positions are positions in the caller's helper list, not in
/// pillar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BootstrapState {
    /// No bootstrap has run.
    #[default]
    NotStarted,
    /// Solving the node of the helper at this position.
    Solving(usize),
    /// All nodes solved.
    Solved,
    /// The helper at this position could not be fitted.
    Failed(usize),
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Solving(i) => write!(f, "solving helper {i}"),
            Self::Solved => write!(f, "solved"),
            Self::Failed(i) => write!(f, "failed at helper {i}"),
        }
    }
}
