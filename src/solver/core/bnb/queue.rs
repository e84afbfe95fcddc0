//! Pending node collections for the two exploration orders.

use super::node::NodeId;
use crate::algebra::*;
use enum_dispatch::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Order in which pending nodes are explored
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeSelection {
    /// Most recently created node first.
    #[default]
    DepthFirst,
    /// Lowest bound first, ties to the lowest node id.
    BestBound,
}

impl std::fmt::Display for NodeSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NodeSelection::DepthFirst => write!(f, "depth first"),
            NodeSelection::BestBound => write!(f, "best bound"),
        }
    }
}

#[enum_dispatch(NodeQueueT<T>)]
pub(crate) enum NodeQueue<T>
where
    T: FloatT,
{
    DepthFirstQueue,
    BestBoundQueue(BestBoundQueue<T>),
}

impl<T> NodeQueue<T>
where
    T: FloatT,
{
    pub fn new(selection: NodeSelection) -> Self {
        match selection {
            NodeSelection::DepthFirst => DepthFirstQueue::default().into(),
            NodeSelection::BestBound => BestBoundQueue::<T>::default().into(),
        }
    }
}

#[enum_dispatch]
pub(crate) trait NodeQueueT<T>
where
    T: FloatT,
{
    fn push(&mut self, id: NodeId, bound: T);
    fn pop(&mut self) -> Option<NodeId>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------
// depth first
// ---------------------------------

#[derive(Debug, Default)]
pub(crate) struct DepthFirstQueue {
    stack: Vec<NodeId>,
}

impl<T> NodeQueueT<T> for DepthFirstQueue
where
    T: FloatT,
{
    fn push(&mut self, id: NodeId, _bound: T) {
        self.stack.push(id);
    }
    fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }
    fn len(&self) -> usize {
        self.stack.len()
    }
}

// ---------------------------------
// best bound
// ---------------------------------

struct QueuedNode<T> {
    id: NodeId,
    bound: T,
}

impl<T: FloatT> PartialEq for QueuedNode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: FloatT> Eq for QueuedNode<T> {}

impl<T: FloatT> PartialOrd for QueuedNode<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: FloatT> Ord for QueuedNode<T> {
    // BinaryHeap is a max-heap: the lowest bound, then the
    // lowest id, must compare greatest
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .partial_cmp(&self.bound)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.id.cmp(&self.id))
    }
}

pub(crate) struct BestBoundQueue<T> {
    heap: BinaryHeap<QueuedNode<T>>,
}

impl<T: FloatT> Default for BestBoundQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }
}

impl<T> NodeQueueT<T> for BestBoundQueue<T>
where
    T: FloatT,
{
    fn push(&mut self, id: NodeId, bound: T) {
        self.heap.push(QueuedNode { id, bound });
    }
    fn pop(&mut self) -> Option<NodeId> {
        self.heap.pop().map(|q| q.id)
    }
    fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_first() {
        let mut q = NodeQueue::<f64>::new(NodeSelection::DepthFirst);
        q.push(1, 5.0);
        q.push(2, 1.0);
        q.push(3, 3.0);
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(3));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_best_bound_ties() {
        let mut q = NodeQueue::<f64>::new(NodeSelection::BestBound);
        q.push(4, 2.0);
        q.push(2, 1.0);
        q.push(3, 2.0);
        q.push(1, 1.0);
        q.push(0, 7.0);
        let order: Vec<_> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 0]);
    }
}
