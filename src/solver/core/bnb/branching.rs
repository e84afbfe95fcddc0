//! Branching variable selection.

use super::node::Node;
use crate::algebra::*;
use crate::solver::core::workspace::Workspace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rule for choosing the binary constraint to branch on
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BranchingRule {
    /// First fractional constraint in the order the binaries were given.
    #[default]
    FirstFractional,
    /// Constraint whose value is furthest from both of its bounds.
    MostFractional,
}

impl std::fmt::Display for BranchingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BranchingRule::FirstFractional => write!(f, "first fractional"),
            BranchingRule::MostFractional => write!(f, "most fractional"),
        }
    }
}

/// Distance of a binary constraint to each of its bounds at the
/// current iterate.
pub(crate) struct BinaryValue<T> {
    pub to_lower: T,
    pub to_upper: T,
}

impl<T> BinaryValue<T>
where
    T: FloatT,
{
    pub fn is_integral(&self, int_tol: T) -> bool {
        self.to_lower <= int_tol || self.to_upper <= int_tol
    }

    // relative distance to the nearer bound, in [0, ½]
    pub fn fractionality(&self) -> T {
        let width = self.to_lower + self.to_upper;
        if width <= T::zero() {
            return T::zero();
        }
        T::min(self.to_lower, self.to_upper) / width
    }
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    pub(crate) fn binary_value(&self, id: usize) -> BinaryValue<T> {
        let value = self.M.row(id).dot(&self.u);
        BinaryValue {
            to_lower: value - self.dlower[id],
            to_upper: self.dupper[id] - value,
        }
    }
}

/// Select the binary constraint to branch on, or None if the current
/// iterate is integer feasible.
pub(crate) fn get_branch_id<T: FloatT>(
    work: &Workspace<T>,
    node: &Node<T>,
    bin_ids: &[usize],
    rule: BranchingRule,
    int_tol: T,
) -> Option<usize> {
    let candidates = bin_ids
        .iter()
        .copied()
        .filter(|&id| id < work.m_limit && !node.is_fixed(id))
        .map(|id| (id, work.binary_value(id)))
        .filter(|(_, v)| !v.is_integral(int_tol));

    match rule {
        BranchingRule::FirstFractional => candidates.map(|(id, _)| id).next(),
        BranchingRule::MostFractional => {
            let mut best: Option<(usize, T)> = None;
            for (id, v) in candidates {
                let frac = v.fractionality();
                // strict comparison keeps the earliest on ties
                if best.map_or(true, |(_, bf)| frac > bf) {
                    best = Some((id, frac));
                }
            }
            best.map(|(id, _)| id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::node::NodeArena;
    use super::*;
    use crate::solver::core::workspace::ConstraintStore;

    fn work_at(u: &[f64]) -> Workspace<f64> {
        let n = u.len();
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1. } else { 0. }).collect())
            .collect();
        let store = ConstraintStore::from_rows(n, &rows);
        let mut work = Workspace::new(store, vec![0.; n], vec![1.; n], n);
        work.u.copy_from_slice(u);
        work
    }

    #[test]
    fn test_first_and_most_fractional() {
        let work = work_at(&[1.0, 0.2, 0.45, 1e-8]);
        let mut arena = NodeArena::new();
        let root = arena.push_root(0., vec![]);
        let bins = [0, 1, 2, 3];

        let first = get_branch_id(&work, &arena[root], &bins, BranchingRule::FirstFractional, 1e-6);
        assert_eq!(first, Some(1));

        let most = get_branch_id(&work, &arena[root], &bins, BranchingRule::MostFractional, 1e-6);
        assert_eq!(most, Some(2));
    }

    #[test]
    fn test_integral_and_fixed() {
        let work = work_at(&[1.0, 0.5, 0.0]);
        let mut arena = NodeArena::new();
        let root = arena.push_root(0., vec![]);
        let child = arena.push_child(root, super::super::node::BoundFixing::Lower(1), 0., vec![]);
        let bins = [0, 1, 2];

        // the only fractional binary is fixed in the child
        let id = get_branch_id(&work, &arena[child], &bins, BranchingRule::FirstFractional, 1e-6);
        assert_eq!(id, None);
        let id = get_branch_id(&work, &arena[root], &bins, BranchingRule::MostFractional, 1e-6);
        assert_eq!(id, Some(1));
    }
}
