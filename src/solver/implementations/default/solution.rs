#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::workspace::LDPSolution;
use crate::solver::core::SolverStatus;

/// Solution returned by [`DefaultSolver`](super::DefaultSolver)
#[derive(Debug, Clone)]
pub struct DefaultSolution<T> {
    /// primal solution
    pub x: Vec<T>,
    /// constraint multipliers.  Positive at an upper bound, negative at a
    /// lower bound and zero for inactive constraints.
    pub lam: Vec<T>,
    /// ids of the constraints active at the solution
    pub active: Vec<usize>,
    /// violation of each soft constraint, zero for the others
    pub slack: Vec<T>,
    /// largest soft constraint violation
    pub soft_slack: T,
    /// final solver status
    pub status: SolverStatus,
    /// objective value
    pub obj_val: T,
    /// active-set iterations
    pub iterations: u32,
    /// branch-and-bound nodes processed
    pub nodes: u32,
    /// leading priority levels solved, for hierarchical solves
    pub levels_satisfied: usize,
    /// setup time in seconds
    pub setup_time: f64,
    /// solve time in seconds
    pub solve_time: f64,
}

impl<T> DefaultSolution<T>
where
    T: FloatT,
{
    /// Create a new `DefaultSolution` object
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::nan(); n],
            lam: vec![T::nan(); m],
            active: Vec::new(),
            slack: vec![T::nan(); m],
            soft_slack: T::nan(),
            status: SolverStatus::Unsolved,
            obj_val: T::nan(),
            iterations: 0,
            nodes: 0,
            levels_satisfied: 0,
            setup_time: 0f64,
            solve_time: 0f64,
        }
    }

    /// Map the least-distance point back to the user problem.  Without a
    /// point every value is NaN.
    pub(crate) fn post_process(
        &mut self,
        data: &DefaultProblemData<T>,
        ldp: Option<&LDPSolution<T>>,
        info: &DefaultInfo<T>,
    ) {
        self.status = info.status;
        self.iterations = info.iterations;
        self.nodes = info.nodes;
        self.levels_satisfied = info.levels_satisfied;
        self.active.clear();

        match ldp {
            Some(ldp) => {
                data.recover_x(&mut self.x, &ldp.u, ldp.v.as_deref());
                self.lam.set(T::zero());
                for entry in ldp.active.iter() {
                    self.lam[entry.id] = entry.lam * data.scalings[entry.id];
                    self.active.push(entry.id);
                }
                // the slack penalty in ldp.fval is not part of the objective
                self.obj_val = match ldp.v {
                    Some(_) => data.eval_objective(&self.x),
                    None => data.objective(ldp.u.sumsq() * (0.5).as_T()),
                };
                self.compute_slack(data);
            }
            None => {
                self.x.set(T::nan());
                self.lam.set(T::nan());
                self.slack.set(T::nan());
                self.soft_slack = T::nan();
                self.obj_val = T::nan();
            }
        }
    }

    // violation max(0, aᵢx - bupperᵢ, blowerᵢ - aᵢx) of the soft constraints
    fn compute_slack(&mut self, data: &DefaultProblemData<T>) {
        self.slack.set(T::zero());
        self.soft_slack = T::zero();
        if data.soft_ids.is_empty() {
            return;
        }
        let mut Ax = vec![T::zero(); data.m];
        data.A.gemv(&mut Ax, &self.x, T::one(), T::zero());
        for &id in data.soft_ids.iter() {
            let over = Ax[id] - data.bupper[id];
            let under = data.blower[id] - Ax[id];
            let s = T::max(T::zero(), T::max(over, under));
            self.slack[id] = s;
            self.soft_slack = T::max(self.soft_slack, s);
        }
    }

    pub(crate) fn finalize(&mut self, info: &DefaultInfo<T>) {
        self.setup_time = info.setup_time;
        self.solve_time = info.solve_time;
    }
}
