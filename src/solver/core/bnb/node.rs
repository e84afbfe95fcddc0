//! Search tree nodes, held in an arena and addressed by id.

use crate::solver::core::workspace::{BoundSide, WarmStartEntry};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a node in the search arena
pub type NodeId = usize;

/// A binary constraint held at one of its bounds within a subtree
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundFixing {
    /// constraint id fixed at its lower bound
    Lower(usize),
    /// constraint id fixed at its upper bound
    Upper(usize),
}

impl BoundFixing {
    pub fn new(id: usize, side: BoundSide) -> Self {
        match side {
            BoundSide::Lower => BoundFixing::Lower(id),
            BoundSide::Upper => BoundFixing::Upper(id),
        }
    }

    pub fn id(&self) -> usize {
        match *self {
            BoundFixing::Lower(id) | BoundFixing::Upper(id) => id,
        }
    }

    pub fn side(&self) -> BoundSide {
        match self {
            BoundFixing::Lower(_) => BoundSide::Lower,
            BoundFixing::Upper(_) => BoundSide::Upper,
        }
    }
}

/// Status of a search node
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeStatus {
    /// Waiting in the queue.
    Unexplored,
    /// Being processed.
    Active,
    /// Cannot improve on the incumbent.
    Pruned,
    /// Relaxation is infeasible.
    Infeasible,
    /// Relaxed solution satisfies every binary constraint.
    IntegerFeasible,
    /// Branched (children created).
    Fathomed,
}

impl NodeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NodeStatus::Unexplored | NodeStatus::Active)
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A node of the branch-and-bound tree.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node<T> {
    pub id: NodeId,
    /// Parent lookup key (None for the root).
    pub parent: Option<NodeId>,
    pub depth: usize,
    /// The binary constraint whose fixing created this node.
    pub branch_id: Option<usize>,
    /// All fixings along the path from the root.
    pub fixings: Vec<BoundFixing>,
    /// Lower bound on the objective of this subtree (least-distance scale).
    pub bound: T,
    /// Relaxed objective once processed (least-distance scale).
    pub fval: Option<T>,
    /// Working set to start from.  Released once the node is processed.
    pub warm_start: Vec<WarmStartEntry<T>>,
    pub status: NodeStatus,
}

impl<T> Node<T>
where
    T: Copy,
{
    fn child(&self, id: NodeId, fixing: BoundFixing, bound: T, warm_start: Vec<WarmStartEntry<T>>) -> Self {
        let mut fixings = self.fixings.clone();
        fixings.push(fixing);
        Self {
            id,
            parent: Some(self.id),
            depth: self.depth + 1,
            branch_id: Some(fixing.id()),
            fixings,
            bound,
            fval: None,
            warm_start,
            status: NodeStatus::Unexplored,
        }
    }

    pub fn is_fixed(&self, id: usize) -> bool {
        self.fixings.iter().any(|f| f.id() == id)
    }
}

/// Owner of every node in one search
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeArena<T> {
    nodes: Vec<Node<T>>,
}

impl<T> NodeArena<T>
where
    T: Copy,
{
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn push_root(&mut self, bound: T, warm_start: Vec<WarmStartEntry<T>>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            parent: None,
            depth: 0,
            branch_id: None,
            fixings: Vec::new(),
            bound,
            fval: None,
            warm_start,
            status: NodeStatus::Unexplored,
        });
        id
    }

    pub fn push_child(
        &mut self,
        parent: NodeId,
        fixing: BoundFixing,
        bound: T,
        warm_start: Vec<WarmStartEntry<T>>,
    ) -> NodeId {
        let id = self.nodes.len();
        let child = self.nodes[parent].child(id, fixing, bound, warm_start);
        self.nodes.push(child);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<T>> {
        self.nodes.iter()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl<T> std::ops::Index<NodeId> for NodeArena<T> {
    type Output = Node<T>;
    fn index(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id]
    }
}

impl<T> std::ops::IndexMut<NodeId> for NodeArena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id]
    }
}
