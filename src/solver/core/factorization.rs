#![allow(non_snake_case)]
//! Incremental LDLᵀ factorization of the Gram matrix of the active constraint normals.
//!
//! The factor is held in packed form.  `L` is unit lower triangular and stored
//! row by row, with row `r` occupying the `r + 1` slots starting at
//! `triangular_number(r)` (the final slot of each row is the unit diagonal).
//! `D` holds one pivot per working set position.  Rows are ordered by position
//! in the working set, not by constraint id.
//!
//! A soft constraint enters with its diagonal shifted by the slack weight, so
//! its pivot stays positive and it never counts towards full rank.

use super::workspace::ConstraintStore;
use crate::algebra::*;
use thiserror::Error;

/// Error codes returnable from [`LDLFactors`] update operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LDLError {
    #[error("cannot activate another constraint: {n_active} active in dimension {n}")]
    DimensionExceeded { n_active: usize, n: usize },
    #[error("working set position {position} out of range ({n_active} active)")]
    BadPosition { position: usize, n_active: usize },
}

#[derive(Debug, Clone)]
pub(crate) struct LDLFactors<T> {
    // problem dimension.  At most n hard rows plus the soft rows can be
    // independent, and one further row is necessarily singular
    n: usize,
    n_soft: usize,
    pub L: Vec<T>,
    pub D: Vec<T>,
    // per position: the row carries a diagonal shift
    soft: Vec<bool>,
    // position of a numerically singular row, if any
    pub sing_ind: Option<usize>,
    // staging buffer for the removed column during a downdate
    scratch: Vec<T>,
}

impl<T> LDLFactors<T>
where
    T: FloatT,
{
    pub fn new(n: usize, n_soft: usize) -> Self {
        let cap = n + n_soft + 1;
        Self {
            n,
            n_soft,
            L: vec![T::zero(); triangular_number(cap)],
            D: vec![T::zero(); cap],
            soft: Vec::with_capacity(cap),
            sing_ind: None,
            scratch: vec![T::zero(); cap],
        }
    }

    /// Rows the factor can hold: the independent ones plus one singular row
    pub fn capacity(&self) -> usize {
        self.n + self.n_soft + 1
    }

    pub fn reset(&mut self) {
        self.sing_ind = None;
        self.soft.clear();
    }

    fn n_hard(&self) -> usize {
        self.soft.iter().filter(|&&s| !s).count()
    }

    #[inline]
    pub fn l(&self, row: usize, col: usize) -> T {
        self.L[triangular_index(row, col)]
    }

    /// Extend the factorization by the normal of constraint `add_ind`.
    ///
    /// `ws` lists the constraints currently active, in factor order.  The
    /// caller appends `add_ind` to its working set after this call.  A
    /// positive `shift` is added to the new diagonal entry of the Gram matrix.
    pub fn add(
        &mut self,
        store: &ConstraintStore<T>,
        ws: &[usize],
        add_ind: usize,
        shift: T,
        zero_tol: T,
    ) -> Result<(), LDLError> {
        let n_active = ws.len();
        if n_active >= self.capacity() {
            return Err(LDLError::DimensionExceeded {
                n_active,
                n: self.n,
            });
        }
        self.sing_ind = None;
        let full_rank = shift == T::zero() && self.n_hard() == self.n;
        self.soft.push(shift > T::zero());

        let m_new = store.row(add_ind);

        // d <-- m'm + shift
        let c = m_new.sumsq() + shift;
        self.D[n_active] = c;
        let start = triangular_number(n_active);
        self.L[start + n_active] = T::one();

        if n_active == 0 {
            return Ok(());
        }

        // l <-- M_W m
        for (i, &id) in ws.iter().enumerate() {
            self.L[start + i] = store.row(id).dot(m_new);
        }

        // forward substitution: l <-- L \ l
        for i in 0..n_active {
            let mut s = self.L[start + i];
            for j in 0..i {
                s -= self.l(i, j) * self.L[start + j];
            }
            self.L[start + i] = s;
        }

        // scale l_i <-- l_i/d_i and accumulate d_new = c - l'Dl
        let mut d_new = c;
        for i in 0..n_active {
            let li = self.L[start + i] / self.D[i];
            self.L[start + i] = li;
            d_new -= li * self.D[i] * li;
        }

        if d_new < zero_tol || full_rank {
            self.sing_ind = Some(n_active);
            d_new = T::zero();
        }
        self.D[n_active] = d_new;

        Ok(())
    }

    /// Excise working set position `rm_ind` from a factorization of `n_active` rows.
    ///
    /// The caller removes the entry from its working set after this call.  A
    /// pivot falling below `zero_tol` during the downdate is flagged in
    /// `sing_ind` but not repaired.
    pub fn remove(&mut self, n_active: usize, rm_ind: usize, zero_tol: T) -> Result<(), LDLError> {
        if rm_ind >= n_active {
            return Err(LDLError::BadPosition {
                position: rm_ind,
                n_active,
            });
        }
        self.soft.remove(rm_ind);
        if rm_ind + 1 == n_active {
            return Ok(());
        }
        let n_update = n_active - rm_ind - 1;

        // Compaction: move row i into row i-1, dropping column rm_ind
        // into the scratch vector.  Rows are visited in increasing order,
        // so every write lands on a slot that has already been read.
        for i in (rm_ind + 1)..n_active {
            self.scratch[i - rm_ind - 1] = self.l(i, rm_ind);
            for j in 0..i {
                if j == rm_ind {
                    continue;
                }
                let newj = if j < rm_ind { j } else { j - 1 };
                self.L[triangular_index(i - 1, newj)] = self.l(i, j);
            }
            self.L[triangular_index(i - 1, i - 1)] = T::one();
        }

        // Rank-1 correction of the trailing block (Gill et al. 1974, algorithm C1)
        let w = &mut self.scratch;
        let mut alpha = self.D[rm_ind];
        for j in 0..n_update {
            let i = rm_ind + j;
            let p = w[j];
            let d_next = self.D[i + 1];
            let d_bar = d_next + alpha * p * p;

            let beta;
            if d_bar == T::zero() {
                beta = T::zero();
            } else {
                beta = p * alpha / d_bar;
                alpha = d_next * alpha / d_bar;
            }
            self.D[i] = d_bar;

            // singularity was under-detected at add time
            if d_bar < zero_tol {
                self.sing_ind = Some(i);
            }

            for r in (j + 1)..n_update {
                let idx = triangular_index(rm_ind + r, i);
                w[r] -= p * self.L[idx];
                self.L[idx] += beta * w[r];
            }
        }
        Ok(())
    }

    /// Solve `L x = b` in place over the first `n_active` rows.
    pub fn solve_forward(&self, x: &mut [T]) {
        for i in 0..x.len() {
            let mut s = x[i];
            for j in 0..i {
                s -= self.l(i, j) * x[j];
            }
            x[i] = s;
        }
    }

    /// Solve `Lᵀ x = b` in place over the first `n_active` rows.
    pub fn solve_backward(&self, x: &mut [T]) {
        let k = x.len();
        for i in (0..k).rev() {
            let mut s = x[i];
            for r in (i + 1)..k {
                s -= self.l(r, i) * x[r];
            }
            x[i] = s;
        }
    }

    /// Solve `L D Lᵀ x = b` in place, with `n_active = x.len()`
    pub fn solve(&self, x: &mut [T]) {
        self.solve_forward(x);
        for (xi, &di) in x.iter_mut().zip(self.D.iter()) {
            *xi /= di;
        }
        self.solve_backward(x);
    }

    /// Null direction of a factorization that is singular at position `s`.
    ///
    /// Writes `p` with `Lᵀ p = e_s` into `p[..n_active]`, so that `p_s = 1`,
    /// `p_r = 0` for `r > s` and `M_Wᵀ p ≈ 0`.
    pub fn singular_direction(&self, s: usize, p: &mut [T]) {
        p.set(T::zero());
        p[s] = T::one();
        self.solve_backward(&mut p[..=s]);
    }
}

// ---------------------------------------------
// testing

#[cfg(test)]
mod tests {
    use super::*;

    // deterministic pseudo-random generator for test data
    struct Lcg(u64);
    impl Lcg {
        fn next(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((self.0 >> 11) as f64) / ((1u64 << 53) as f64) * 2.0 - 1.0
        }
        fn below(&mut self, k: usize) -> usize {
            (((self.next() + 1.0) / 2.0) * k as f64) as usize % k
        }
    }

    fn gram_from_factors(f: &LDLFactors<f64>, k: usize) -> Vec<f64> {
        let mut G = vec![0.; k * k];
        for i in 0..k {
            for j in 0..k {
                let mut v = 0.;
                for c in 0..=usize::min(i, j) {
                    let lic = if c == i { 1. } else { f.l(i, c) };
                    let ljc = if c == j { 1. } else { f.l(j, c) };
                    v += lic * f.D[c] * ljc;
                }
                G[i * k + j] = v;
            }
        }
        G
    }

    fn gram_from_rows(store: &ConstraintStore<f64>, ws: &[usize]) -> Vec<f64> {
        let k = ws.len();
        let mut G = vec![0.; k * k];
        for i in 0..k {
            for j in 0..k {
                G[i * k + j] = store.row(ws[i]).dot(store.row(ws[j]));
            }
        }
        G
    }

    fn add(f: &mut LDLFactors<f64>, store: &ConstraintStore<f64>, ws: &mut Vec<usize>, id: usize) {
        f.add(store, ws, id, 0., 1e-11).unwrap();
        ws.push(id);
    }

    fn remove(f: &mut LDLFactors<f64>, ws: &mut Vec<usize>, pos: usize) {
        f.remove(ws.len(), pos, 1e-11).unwrap();
        ws.remove(pos);
    }

    #[test]
    fn test_orthogonal_add_remove() {
        let store = ConstraintStore::from_rows(2, &[vec![1., 0.], vec![0., 1.]]);
        let mut f = LDLFactors::<f64>::new(2, 0);
        let mut ws = vec![];

        add(&mut f, &store, &mut ws, 0);
        assert_eq!(f.D[0], 1.);
        assert_eq!(f.sing_ind, None);

        add(&mut f, &store, &mut ws, 1);
        assert_eq!(&f.D[0..2], &[1., 1.]);
        assert_eq!(f.l(1, 0), 0.);

        remove(&mut f, &mut ws, 0);
        assert_eq!(ws, vec![1]);
        assert_eq!(f.D[0], 1.);
    }

    #[test]
    fn test_add_then_remove_last_restores() {
        let store = ConstraintStore::from_rows(
            3,
            &[vec![1., 2., 0.], vec![0., 1., 1.], vec![1., 0., 3.]],
        );
        let mut f = LDLFactors::<f64>::new(3, 0);
        let mut ws = vec![];
        add(&mut f, &store, &mut ws, 0);
        add(&mut f, &store, &mut ws, 1);

        let L0 = f.L[..triangular_number(2)].to_vec();
        let D0 = f.D[..2].to_vec();

        add(&mut f, &store, &mut ws, 2);
        assert_eq!(f.sing_ind, None);
        remove(&mut f, &mut ws, 2);

        assert_eq!(ws.len(), 2);
        assert_eq!(&f.L[..triangular_number(2)], &L0[..]);
        assert_eq!(&f.D[..2], &D0[..]);
    }

    #[test]
    fn test_duplicate_row_is_singular() {
        let store = ConstraintStore::from_rows(
            3,
            &[vec![1., 2., 0.], vec![0., 1., 1.], vec![1., 2., 0.]],
        );
        let mut f = LDLFactors::<f64>::new(3, 0);
        let mut ws = vec![];
        add(&mut f, &store, &mut ws, 0);
        add(&mut f, &store, &mut ws, 1);
        add(&mut f, &store, &mut ws, 2);
        assert_eq!(f.sing_ind, Some(2));
        assert_eq!(f.D[2], 0.);

        // the null direction annihilates the active normals
        let mut p = vec![0.; 4];
        f.singular_direction(2, &mut p);
        for c in 0..3 {
            let v: f64 = (0..3).map(|k| p[k] * store.row(ws[k])[c]).sum();
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn test_full_rank_is_singular() {
        let store = ConstraintStore::from_rows(
            2,
            &[vec![1., 0.], vec![0., 1.], vec![1., 1.]],
        );
        let mut f = LDLFactors::<f64>::new(2, 0);
        let mut ws = vec![];
        add(&mut f, &store, &mut ws, 0);
        add(&mut f, &store, &mut ws, 1);
        assert_eq!(f.sing_ind, None);
        add(&mut f, &store, &mut ws, 2);
        assert_eq!(f.sing_ind, Some(2));

        // nothing further can be added
        assert_eq!(
            f.add(&store, &ws, 0, 0., 1e-11),
            Err(LDLError::DimensionExceeded { n_active: 3, n: 2 })
        );
    }

    #[test]
    fn test_soft_rows_shift_diagonal() {
        let store = ConstraintStore::from_rows(1, &[vec![1.], vec![1.], vec![2.]]);
        let mut f = LDLFactors::<f64>::new(1, 1);
        let mut ws = vec![];
        add(&mut f, &store, &mut ws, 0);

        // a copy of the first row is independent once shifted
        f.add(&store, &ws, 1, 0.5, 1e-11).unwrap();
        ws.push(1);
        assert_eq!(f.sing_ind, None);
        assert_eq!(f.l(1, 0), 1.);
        assert!((f.D[1] - 0.5).abs() < 1e-15);

        // a second hard row exceeds the rank
        add(&mut f, &store, &mut ws, 2);
        assert_eq!(f.sing_ind, Some(2));
        assert_eq!(f.capacity(), 3);
        assert!(matches!(
            f.add(&store, &ws, 0, 0., 1e-11),
            Err(LDLError::DimensionExceeded { .. })
        ));

        // removing the hard copy leaves the shifted row alone
        f.sing_ind = None;
        remove(&mut f, &mut ws, 2);
        remove(&mut f, &mut ws, 0);
        assert_eq!(ws, vec![1]);
        assert!((f.D[0] - 1.5).abs() < 1e-15);
    }

    #[test]
    fn test_bad_remove_position() {
        let mut f = LDLFactors::<f64>::new(2, 0);
        assert_eq!(
            f.remove(1, 1, 1e-11),
            Err(LDLError::BadPosition {
                position: 1,
                n_active: 1
            })
        );
    }

    #[test]
    fn test_random_updates_match_gram() {
        let n = 7;
        let m = 12;
        let mut rng = Lcg(12345);
        let rows: Vec<Vec<f64>> = (0..m)
            .map(|_| (0..n).map(|_| rng.next()).collect())
            .collect();
        let store = ConstraintStore::from_rows(n, &rows);

        let mut f = LDLFactors::<f64>::new(n, 0);
        let mut ws: Vec<usize> = vec![];

        for _ in 0..200 {
            let grow = ws.is_empty() || (ws.len() < n - 1 && rng.next() > -0.2);
            if grow {
                let free: Vec<usize> = (0..m).filter(|i| !ws.contains(i)).collect();
                let id = free[rng.below(free.len())];
                add(&mut f, &store, &mut ws, id);
                assert_eq!(f.sing_ind, None);
            } else {
                let pos = rng.below(ws.len());
                remove(&mut f, &mut ws, pos);
            }
            let k = ws.len();
            let G1 = gram_from_factors(&f, k);
            let G2 = gram_from_rows(&store, &ws);
            assert!(G1.norm_inf_diff(&G2) < 1e-9);
        }
    }

    #[test]
    fn test_solve() {
        let store = ConstraintStore::from_rows(
            3,
            &[vec![2., 0., 1.], vec![1., 1., 0.], vec![0., 3., 1.]],
        );
        let mut f = LDLFactors::<f64>::new(3, 0);
        let mut ws = vec![];
        for id in 0..3 {
            add(&mut f, &store, &mut ws, id);
        }
        let G = gram_from_rows(&store, &ws);
        let x = [1., -2., 0.5];
        let mut b: Vec<f64> = (0..3)
            .map(|i| (0..3).map(|j| G[i * 3 + j] * x[j]).sum())
            .collect();
        f.solve(&mut b);
        assert!(b.norm_inf_diff(&x) < 1e-12);
    }
}
