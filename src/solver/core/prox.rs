#![allow(non_snake_case)]

use super::activeset::LDPExit;
use super::workspace::Workspace;
use super::CoreSettings;
use crate::algebra::*;

/// Proximal-point state for a cost that is only semidefinite.
///
/// Each outer iteration solves
///
/// ```text
/// minimize    ½ xᵀHx + fᵀx + ½ε‖x - xₖ‖²
/// ```
///
/// over the same constraints, whose least-distance form only differs from
/// the previous one in the shift `v = R⁻ᵀ(f - εxₖ)` with `RᵀR = H + εI`.
#[derive(Debug, Clone)]
pub(crate) struct ProxState<T> {
    pub eps: T,
    R: Matrix<T>,
    f: Vec<T>,
    // b / ‖R⁻ᵀaᵢ‖ with absent bounds as ±∞
    blower: Vec<T>,
    bupper: Vec<T>,
    pub v: Vec<T>,
    pub x: Vec<T>,
    x_new: Vec<T>,
}

impl<T> ProxState<T>
where
    T: FloatT,
{
    pub fn new(eps: T, R: Matrix<T>, f: &[T], blower: Vec<T>, bupper: Vec<T>) -> Self {
        let n = f.len();
        Self {
            eps,
            R,
            f: f.to_vec(),
            blower,
            bupper,
            v: vec![T::zero(); n],
            x: vec![T::zero(); n],
            x_new: vec![T::zero(); n],
        }
    }

    /// Restart the outer iteration from the origin
    pub fn reset(&mut self) {
        self.x.set(T::zero());
    }

    // v = R⁻ᵀ(f - εx) and d = b + M v
    fn shift_bounds(&mut self, work: &mut Workspace<T>) {
        self.v.waxpby(T::one(), &self.f, -self.eps, &self.x);
        solve_upper_transpose(&self.R, &mut self.v);
        for i in 0..work.m {
            let Mv = work.M.row(i).dot(&self.v);
            work.dlower[i] = self.blower[i] + Mv;
            work.dupper[i] = self.bupper[i] + Mv;
        }
    }

    // x = R⁻¹(u - v)
    fn recover(&mut self, u: &[T]) {
        self.x_new.waxpby(T::one(), u, -T::one(), &self.v);
        solve_upper(&self.R, &mut self.x_new);
    }
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    /// Solve the loaded problem, with proximal-point outer iterations
    /// when they are enabled.
    ///
    /// The working set carries over between outer iterations since only
    /// the bounds move.  Stops once successive iterates are within
    /// `eta_prox` of each other.  Every inner solve uses at least one
    /// iteration, so `max_iter` also bounds the outer loop.
    pub fn solve_prox(&mut self, settings: &CoreSettings<T>, fval_bound: T) -> LDPExit {
        let Some(mut prox) = self.prox.take() else {
            return self.solve_ldp(settings, fval_bound);
        };

        let exit = loop {
            prox.shift_bounds(self);
            let exit = self.solve_ldp(settings, T::infinity());
            if exit != LDPExit::Optimal {
                break exit;
            }
            prox.recover(&self.u);
            let step = prox.x_new.norm_inf_diff(&prox.x);
            std::mem::swap(&mut prox.x, &mut prox.x_new);
            if step <= settings.eta_prox {
                break LDPExit::Optimal;
            }
        };

        self.prox = Some(prox);
        exit
    }
}
