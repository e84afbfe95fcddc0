use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::core::SolverStatus;
use crate::timers::*;

/// Progress and exit information for [`DefaultSolver`](super::DefaultSolver)

#[derive(Default, Debug)]
pub struct DefaultInfo<T> {
    /// total active-set iterations, over all nodes and levels
    pub iterations: u32,
    /// branch-and-bound nodes processed
    pub nodes: u32,
    /// leading priority levels solved, for hierarchical solves
    pub levels_satisfied: usize,
    pub obj_val: T,
    pub setup_time: f64,
    pub solve_time: f64,
    pub status: SolverStatus,

    pub(crate) stream: PrintTarget,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            obj_val: T::nan(),
            ..Self::default()
        }
    }

    pub(crate) fn reset(&mut self, timers: &mut Timers) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.nodes = 0;
        self.levels_satisfied = 0;
        self.obj_val = T::nan();
        self.solve_time = 0f64;

        timers.reset_timer("solve");
    }

    pub(crate) fn finalize(&mut self, iterations: u32, timers: &Timers) {
        self.iterations = iterations;
        self.setup_time = timers.elapsed("setup").as_secs_f64();
        self.solve_time = timers.elapsed("solve").as_secs_f64();
    }
}
