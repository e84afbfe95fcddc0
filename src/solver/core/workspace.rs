#![allow(non_snake_case)]

use super::factorization::{LDLError, LDLFactors};
use super::prox::ProxState;
use crate::algebra::*;
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------
// constraint normal store
// ---------------------------------

/// Row-major store of constraint normals.  The row index is the constraint id.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintStore<T> {
    n: usize,
    data: Vec<T>,
}

impl<T> ConstraintStore<T>
where
    T: FloatT,
{
    pub fn zeros(n: usize, m: usize) -> Self {
        Self {
            n,
            data: vec![T::zero(); n * m],
        }
    }

    #[cfg(test)]
    pub fn from_rows(n: usize, rows: &[Vec<T>]) -> Self {
        let mut store = Self::zeros(n, rows.len());
        for (i, row) in rows.iter().enumerate() {
            store.row_mut(i).copy_from_slice(row);
        }
        store
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[i * self.n..(i + 1) * self.n]
    }
}

// ---------------------------------
// working set entries
// ---------------------------------

/// Side of a two-sided constraint that is held active
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundSide {
    /// Active at its lower bound (multiplier ≤ 0)
    Lower,
    /// Active at its upper bound (multiplier ≥ 0)
    Upper,
}

/// Final state of a least-distance solve
#[derive(Debug, Clone)]
pub(crate) struct LDPSolution<T> {
    pub u: Vec<T>,
    pub fval: T,
    pub active: Vec<WarmStartEntry<T>>,
    // shift in effect when u was found, if it differs from the setup one
    pub v: Option<Vec<T>>,
}

/// A working set member recorded for warm starting a later solve
#[derive(PartialEq, Clone, Debug, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WarmStartEntry<T> {
    pub id: usize,
    pub side: BoundSide,
    pub lam: T,
}

// ---------------------------------
// workspace
// ---------------------------------

/// Solve-scoped state of the dual active-set method for the problem
///
///   min ½‖u‖² + ½ρ⁻¹‖s‖²  s.t.  dlower - s ≤ M u ≤ dupper + s
///
/// where the slack `s` is zero on every constraint that is not soft.
/// Absent bounds are stored as ±∞.
#[derive(Debug, Clone)]
pub(crate) struct Workspace<T> {
    pub n: usize,
    pub m: usize,
    pub M: ConstraintStore<T>,
    pub dlower: Vec<T>,
    pub dupper: Vec<T>,

    // soft constraint flags and the slack weight ρ
    pub is_soft: Vec<bool>,
    pub rho_soft: T,

    // constraints with ids at or above this are ignored
    pub m_limit: usize,

    // working set, with per-position side, mutability and multiplier
    pub WS: Vec<usize>,
    pub sides: Vec<BoundSide>,
    pub immutable: Vec<bool>,
    pub lam: Vec<T>,

    // per constraint id membership of the working set
    pub is_active: Vec<bool>,

    // immutable constraints waiting to enter the working set
    pub pending: VecDeque<(usize, BoundSide)>,

    pub factors: LDLFactors<T>,

    // unconstrained-step multipliers, null directions and the iterate
    pub lam_star: Vec<T>,
    pub p: Vec<T>,
    pub u: Vec<T>,
    pub fval: T,

    // shared by every call in one solve
    pub iterations: u32,

    // outer iterations for a semidefinite cost
    pub prox: Option<ProxState<T>>,
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    pub fn new(M: ConstraintStore<T>, dlower: Vec<T>, dupper: Vec<T>, n: usize) -> Self {
        let m = dlower.len();
        Self {
            n,
            m,
            M,
            dlower,
            dupper,
            is_soft: vec![false; m],
            rho_soft: T::zero(),
            m_limit: m,
            WS: Vec::with_capacity(n + 1),
            sides: Vec::with_capacity(n + 1),
            immutable: Vec::with_capacity(n + 1),
            lam: Vec::with_capacity(n + 1),
            is_active: vec![false; m],
            pending: VecDeque::new(),
            factors: LDLFactors::new(n, 0),
            lam_star: vec![T::zero(); n + 1],
            p: vec![T::zero(); n + 1],
            u: vec![T::zero(); n],
            fval: T::zero(),
            iterations: 0,
            prox: None,
        }
    }

    /// Mark the constraints in `ids` as soft and resize the factorization.
    /// Any working set is discarded.
    pub fn set_soft(&mut self, ids: &[usize]) {
        self.clear_working_set();
        self.is_soft.fill(false);
        for &id in ids {
            self.is_soft[id] = true;
        }
        let n_soft = self.is_soft.iter().filter(|&&s| s).count();
        let cap = self.n + n_soft + 1;
        self.factors = LDLFactors::new(self.n, n_soft);
        self.lam_star = vec![T::zero(); cap];
        self.p = vec![T::zero(); cap];
    }

    pub fn n_active(&self) -> usize {
        self.WS.len()
    }

    /// Empty the working set and the factorization.  The iteration count is kept.
    pub fn clear_working_set(&mut self) {
        for &id in self.WS.iter() {
            self.is_active[id] = false;
        }
        self.WS.clear();
        self.sides.clear();
        self.immutable.clear();
        self.lam.clear();
        self.pending.clear();
        self.factors.reset();
        self.u.set(T::zero());
        self.fval = T::zero();
    }

    pub fn is_equality(&self, id: usize) -> bool {
        self.dlower[id] == self.dupper[id]
    }

    /// Hold constraint `id` at one of its bounds by collapsing the other
    pub fn fix(&mut self, id: usize, side: BoundSide) {
        let b = self.bound(id, side);
        self.dlower[id] = b;
        self.dupper[id] = b;
    }

    // diagonal shift of constraint id in the dual Gram matrix
    #[inline]
    fn shift(&self, id: usize) -> T {
        if self.is_soft[id] {
            self.rho_soft
        } else {
            T::zero()
        }
    }

    #[inline]
    pub fn bound(&self, id: usize, side: BoundSide) -> T {
        match side {
            BoundSide::Lower => self.dlower[id],
            BoundSide::Upper => self.dupper[id],
        }
    }

    pub fn position_of(&self, id: usize) -> Option<usize> {
        if !self.is_active[id] {
            return None;
        }
        self.WS.iter().position(|&w| w == id)
    }

    /// Queue every equality constraint under the current limit
    pub fn queue_equalities(&mut self) {
        for id in 0..self.m_limit {
            if self.is_equality(id) && !self.is_active[id] {
                self.pending.push_back((id, BoundSide::Upper));
            }
        }
    }

    /// Append constraint `id` to the working set and extend the factorization.
    pub fn activate(
        &mut self,
        id: usize,
        side: BoundSide,
        immutable: bool,
        lam: T,
        zero_tol: T,
    ) -> Result<(), LDLError> {
        debug_assert!(!self.is_active[id]);
        let shift = self.shift(id);
        self.factors.add(&self.M, &self.WS, id, shift, zero_tol)?;
        self.WS.push(id);
        self.sides.push(side);
        self.immutable.push(immutable);
        self.lam.push(lam);
        self.is_active[id] = true;
        Ok(())
    }

    /// Remove working set position `pos` and downdate the factorization.
    pub fn deactivate(&mut self, pos: usize, zero_tol: T) -> Result<(), LDLError> {
        // a singular row ahead of the removed one keeps its position
        match self.factors.sing_ind {
            Some(s) if s < pos => {}
            _ => self.factors.sing_ind = None,
        }
        self.factors.remove(self.WS.len(), pos, zero_tol)?;
        let id = self.WS.remove(pos);
        self.sides.remove(pos);
        self.immutable.remove(pos);
        self.lam.remove(pos);
        self.is_active[id] = false;
        Ok(())
    }

    /// Rebuild the working set from `entries`, then queue the equalities.
    ///
    /// Entries above the limit, equalities and entries found to be
    /// linearly dependent are left out.
    pub fn load_warm_start(
        &mut self,
        entries: &[WarmStartEntry<T>],
        zero_tol: T,
    ) -> Result<(), LDLError> {
        self.clear_working_set();
        for &WarmStartEntry { id, side, lam } in entries.iter() {
            if id >= self.m_limit || self.is_equality(id) {
                continue;
            }
            self.activate(id, side, false, lam, zero_tol)?;
            if self.factors.sing_ind.is_some() {
                let last = self.n_active() - 1;
                self.deactivate(last, zero_tol)?;
            }
        }
        self.queue_equalities();
        Ok(())
    }

    /// Set `u = -M_Wᵀλ` and `fval = ½‖u‖² + ½ρ‖λ_soft‖²`
    pub fn update_primal(&mut self) {
        self.u.set(T::zero());
        let mut penalty = T::zero();
        for (&id, &lam) in self.WS.iter().zip(self.lam.iter()) {
            self.u.axpby(-lam, self.M.row(id), T::one());
            penalty += self.shift(id) * lam * lam;
        }
        self.fval = (self.u.sumsq() + penalty) * (0.5).as_T();
    }

    pub fn snapshot(&self) -> LDPSolution<T> {
        LDPSolution {
            u: self.u.clone(),
            fval: self.fval,
            active: self.warm_start(),
            v: self.prox.as_ref().map(|prox| prox.v.clone()),
        }
    }

    /// Snapshot of the working set usable as a warm start
    pub fn warm_start(&self) -> Vec<WarmStartEntry<T>> {
        itertools::izip!(&self.WS, &self.sides, &self.lam)
            .map(|(&id, &side, &lam)| WarmStartEntry { id, side, lam })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_workspace() -> Workspace<f64> {
        let store = ConstraintStore::from_rows(2, &[vec![1., 0.], vec![0., 1.], vec![1., 1.]]);
        Workspace::new(store, vec![-1., -1., 0.5], vec![1., 1., 0.5], 2)
    }

    #[test]
    fn test_activate_deactivate() {
        let mut work = box_workspace();
        work.activate(1, BoundSide::Upper, false, 0.5, 1e-11).unwrap();
        work.activate(0, BoundSide::Lower, false, -0.25, 1e-11).unwrap();
        assert_eq!(work.WS, vec![1, 0]);
        assert_eq!(work.position_of(0), Some(1));

        work.update_primal();
        assert_eq!(work.u, vec![0.25, -0.5]);
        assert!((work.fval - 0.5 * 0.3125).abs() < 1e-15);

        work.deactivate(0, 1e-11).unwrap();
        assert_eq!(work.WS, vec![0]);
        assert_eq!(work.sides, vec![BoundSide::Lower]);
        assert_eq!(work.lam, vec![-0.25]);
        assert!(!work.is_active[1]);
    }

    #[test]
    fn test_equalities_and_warm_start() {
        let mut work = box_workspace();
        assert!(work.is_equality(2));
        work.queue_equalities();
        assert_eq!(work.pending, VecDeque::from(vec![(2, BoundSide::Upper)]));

        work.activate(2, BoundSide::Upper, true, 0., 1e-11).unwrap();
        let ws = work.warm_start();
        assert_eq!(
            ws,
            vec![WarmStartEntry {
                id: 2,
                side: BoundSide::Upper,
                lam: 0.
            }]
        );

        work.clear_working_set();
        assert_eq!(work.n_active(), 0);
        assert!(work.pending.is_empty());
        assert!(!work.is_active[2]);
    }

    #[test]
    fn test_load_warm_start() {
        let mut work = box_workspace();
        let entries = vec![
            WarmStartEntry { id: 0, side: BoundSide::Upper, lam: 1.0 },
            WarmStartEntry { id: 2, side: BoundSide::Upper, lam: 0.5 },
            WarmStartEntry { id: 1, side: BoundSide::Lower, lam: -2.0 },
        ];
        // a fixed constraint behaves like an equality
        work.fix(1, BoundSide::Lower);
        assert!(work.is_equality(1));
        assert_eq!(work.dupper[1], -1.);
        work.load_warm_start(&entries, 1e-11).unwrap();

        // equalities are queued rather than loaded
        assert_eq!(work.WS, vec![0]);
        assert_eq!(work.lam, vec![1.0]);
        assert_eq!(
            work.pending,
            VecDeque::from(vec![(1, BoundSide::Upper), (2, BoundSide::Upper)])
        );
    }

    #[test]
    fn test_load_warm_start_drops_dependent() {
        let store = ConstraintStore::from_rows(1, &[vec![1.], vec![-1.]]);
        let mut work = Workspace::new(store, vec![-1., -1.], vec![1., 1.], 1);
        let entries = vec![
            WarmStartEntry { id: 0, side: BoundSide::Upper, lam: 1.0 },
            WarmStartEntry { id: 1, side: BoundSide::Upper, lam: 1.0 },
        ];
        work.load_warm_start(&entries, 1e-11).unwrap();
        assert_eq!(work.WS, vec![0]);
        assert_eq!(work.factors.sing_ind, None);
    }

    #[test]
    fn test_soft_penalty_in_fval() {
        let store = ConstraintStore::from_rows(1, &[vec![1.], vec![1.]]);
        let mut work = Workspace::new(store, vec![-1., 2.], vec![1., 3.], 1);
        work.set_soft(&[1]);
        work.rho_soft = 0.5;
        assert_eq!(work.factors.capacity(), 3);

        // both copies active, which a hard pair could not be
        work.activate(0, BoundSide::Upper, false, 2., 1e-11).unwrap();
        work.activate(1, BoundSide::Lower, false, -4., 1e-11).unwrap();
        assert_eq!(work.factors.sing_ind, None);

        work.update_primal();
        assert_eq!(work.u, vec![2.]);
        // ½(4) + ½·0.5·16
        assert!((work.fval - 6_f64).abs() < 1e-15);
    }
}
