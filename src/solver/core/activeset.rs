#![allow(non_snake_case)]

use super::workspace::{BoundSide, Workspace};
use super::CoreSettings;
use crate::algebra::*;

/// Exit condition of one active-set solve
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub(crate) enum LDPExit {
    Optimal,
    Infeasible,
    IterationLimit,
    NumericalError,
    // the dual objective exceeded the supplied bound
    Pruned,
}

// outcome of a single iteration
enum Step {
    Continue,
    Exit(LDPExit),
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    /// Dual active-set iteration on the least-distance problem.
    ///
    /// Starts from the current working set, which must carry dual feasible
    /// multipliers, and first brings in any pending immutable constraints.
    /// `fval_bound` is compared against `½‖u‖²`.
    pub fn solve_ldp(&mut self, settings: &CoreSettings<T>, fval_bound: T) -> LDPExit {
        loop {
            if self.iterations >= settings.max_iter {
                return LDPExit::IterationLimit;
            }
            self.iterations += 1;

            let step = if let Some(s) = self.factors.sing_ind {
                self.resolve_singular(s, settings)
            } else if let Some((id, side)) = self.pending.pop_front() {
                self.add_immutable(id, side, settings)
            } else {
                self.dual_step(settings, fval_bound)
            };

            if let Step::Exit(exit) = step {
                return exit;
            }
        }
    }

    fn add_immutable(&mut self, id: usize, side: BoundSide, settings: &CoreSettings<T>) -> Step {
        if let Some(pos) = self.position_of(id) {
            if self.immutable[pos] {
                return Step::Continue;
            }
            if self.deactivate(pos, settings.zero_tol).is_err() {
                return Step::Exit(LDPExit::NumericalError);
            }
        }
        self.grow(id, side, true, settings.zero_tol)
    }

    // A singular addition is always resolved before the next one, so the
    // factor never runs out of room.  An error here means the working set
    // itself is corrupt.
    fn grow(&mut self, id: usize, side: BoundSide, immutable: bool, zero_tol: T) -> Step {
        debug_assert!(self.factors.sing_ind.is_none());
        match self.activate(id, side, immutable, T::zero(), zero_tol) {
            Ok(()) => Step::Continue,
            Err(_) => Step::Exit(LDPExit::NumericalError),
        }
    }

    // solve L D Lᵀ λ* = -d_W into lam_star
    fn compute_csp(&mut self) {
        let k = self.n_active();
        for i in 0..k {
            self.lam_star[i] = -self.bound(self.WS[i], self.sides[i]);
        }
        self.factors.solve(&mut self.lam_star[..k]);
    }

    fn is_dual_infeasible(&self, pos: usize, lam: T, dual_tol: T) -> bool {
        if self.immutable[pos] {
            return false;
        }
        match self.sides[pos] {
            BoundSide::Upper => lam < -dual_tol,
            BoundSide::Lower => lam > dual_tol,
        }
    }

    fn dual_step(&mut self, settings: &CoreSettings<T>, fval_bound: T) -> Step {
        self.compute_csp();

        let k = self.n_active();
        if !self.lam_star[..k].is_finite() {
            return Step::Exit(LDPExit::NumericalError);
        }

        // blocking constraint: smallest ratio, ties to the lowest id
        let mut blocking: Option<(usize, T)> = None;
        for i in 0..k {
            if !self.is_dual_infeasible(i, self.lam_star[i], settings.dual_tol) {
                continue;
            }
            let alpha = self.lam[i] / (self.lam[i] - self.lam_star[i]);
            blocking = match blocking {
                Some((b, ab))
                    if ab < alpha || (ab == alpha && self.WS[b] < self.WS[i]) =>
                {
                    Some((b, ab))
                }
                _ => Some((i, alpha)),
            };
        }

        match blocking {
            None => {
                self.lam.copy_from(&self.lam_star[..k]);
                self.update_primal();
                if self.fval > fval_bound {
                    return Step::Exit(LDPExit::Pruned);
                }
                match self.most_violated(settings.primal_tol) {
                    None => Step::Exit(LDPExit::Optimal),
                    Some((id, side)) => {
                        let immutable = self.is_equality(id);
                        self.grow(id, side, immutable, settings.zero_tol)
                    }
                }
            }
            Some((pos, alpha)) => {
                for i in 0..k {
                    let d = self.lam_star[i] - self.lam[i];
                    self.lam[i] += alpha * d;
                }
                match self.deactivate(pos, settings.zero_tol) {
                    Ok(()) => Step::Continue,
                    Err(_) => Step::Exit(LDPExit::NumericalError),
                }
            }
        }
    }

    /// Inactive constraint under the limit with the largest violation above `primal_tol`
    pub fn most_violated(&self, primal_tol: T) -> Option<(usize, BoundSide)> {
        let mut best: Option<(usize, BoundSide)> = None;
        let mut worst = primal_tol;
        for id in 0..self.m_limit {
            if self.is_active[id] {
                continue;
            }
            let mu = self.M.row(id).dot(&self.u);
            let (viol, side) = {
                let up = mu - self.dupper[id];
                let lo = self.dlower[id] - mu;
                if up >= lo {
                    (up, BoundSide::Upper)
                } else {
                    (lo, BoundSide::Lower)
                }
            };
            // strict comparison keeps the lowest id on ties
            if viol > worst {
                worst = viol;
                best = Some((id, side));
            }
        }
        best
    }

    // The working set is linearly dependent at position s.  Move along
    // the null direction of M_Wᵀ until a multiplier reaches zero and
    // drop that constraint.  If none can reach zero the dual objective is
    // unbounded along p and the constraints are infeasible.
    fn resolve_singular(&mut self, s: usize, settings: &CoreSettings<T>) -> Step {
        let k = self.n_active();
        let zero_tol = settings.zero_tol;

        let mut p = std::mem::take(&mut self.p);
        self.factors.singular_direction(s, &mut p[..k]);

        // rounding noise in p is not part of the dependency
        for pi in p[..s].iter_mut() {
            if pi.abs() <= zero_tol {
                *pi = T::zero();
            }
        }

        // orient p so that λ_s moves into its feasible half-line, or
        // for a free multiplier so that the dual objective grows
        let mut gain = T::zero();
        for i in 0..=s {
            gain -= self.bound(self.WS[i], self.sides[i]) * p[i];
        }
        let flip = if self.immutable[s] {
            gain < T::zero()
        } else {
            self.sides[s] == BoundSide::Lower
        };
        if flip {
            p[..k].negate();
            gain = -gain;
        }

        let result = if gain <= settings.primal_tol {
            // redundant: no dual progress is possible along p
            self.deactivate(s, zero_tol).map(|_| Step::Continue)
        } else {
            let mut blocking: Option<(usize, T)> = None;
            for i in 0..s {
                if self.immutable[i] {
                    continue;
                }
                let moving_to_zero = match self.sides[i] {
                    BoundSide::Upper => p[i] < T::zero(),
                    BoundSide::Lower => p[i] > T::zero(),
                };
                if !moving_to_zero {
                    continue;
                }
                let t = -self.lam[i] / p[i];
                blocking = match blocking {
                    Some((b, tb)) if tb < t || (tb == t && self.WS[b] < self.WS[i]) => {
                        Some((b, tb))
                    }
                    _ => Some((i, t)),
                };
            }

            match blocking {
                Some((pos, t)) => {
                    for i in 0..=s {
                        self.lam[i] += t * p[i];
                    }
                    self.lam[pos] = T::zero();
                    self.deactivate(pos, zero_tol).map(|_| Step::Continue)
                }
                None => Ok(Step::Exit(LDPExit::Infeasible)),
            }
        };

        self.p = p;
        result.unwrap_or(Step::Exit(LDPExit::NumericalError))
    }
}
