//! Branch-and-bound over binary constraints.
//!
//! Each node of the search is a least-distance subproblem that differs
//! from its parent by one [`BoundFixing`].  Nodes are stored in a
//! [`NodeArena`] and refer to their parent by [`NodeId`] only.

mod branching;
mod node;
mod queue;
mod search;

pub use branching::BranchingRule;
pub use node::*;
pub use queue::NodeSelection;
pub(crate) use search::BranchAndBound;

/// Summary of one processed node, passed to the progress printer
#[derive(Debug, Clone)]
pub struct NodeReport<T> {
    pub id: NodeId,
    pub depth: usize,
    pub status: NodeStatus,
    /// Relaxed objective, if the relaxation was solved.
    pub objective: Option<T>,
    /// Best integer feasible objective so far.
    pub incumbent: Option<T>,
}
