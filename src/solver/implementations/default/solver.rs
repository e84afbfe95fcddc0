#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::solver::core::hierarchical::solve_hierarchical;
use crate::solver::core::workspace::{LDPSolution, Workspace};
use crate::solver::core::{solve_core, traits::InfoPrint, traits::Settings};
use crate::solver::core::{SettingsError, SolverStatus};
use crate::timers::*;
use std::io::Write;

/// Solver for dense (mixed-integer) quadratic programs
///
/// ```text
/// minimize    ½ xᵀHx + fᵀx
/// subject to  blower ≤ A x ≤ bupper
/// ```
///
/// Constraints listed in `bin_ids` are binary: at the solution they sit at
/// either their lower or their upper bound.

pub struct DefaultSolver<T: FloatT> {
    pub data: DefaultProblemData<T>,
    pub info: DefaultInfo<T>,
    pub solution: DefaultSolution<T>,
    pub settings: DefaultSettings<T>,
    pub(crate) work: Workspace<T>,
    pub(crate) timers: Option<Timers>,
}

// outcome of one solve, before mapping back to the user problem
struct Outcome<T> {
    status: SolverStatus,
    solution: Option<LDPSolution<T>>,
    nodes: u32,
    levels_satisfied: usize,
}

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    pub fn new(
        H: &Matrix<T>,
        f: &[T],
        A: &Matrix<T>,
        blower: &[T],
        bupper: &[T],
        bin_ids: &[usize],
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        settings.validate()?;

        let mut timers = Timers::default();
        let data;

        timeit! {timers => "setup"; {
            data = DefaultProblemData::new(H, f, A, blower, bupper, bin_ids, settings.eps_prox);
        }}
        let data = data?;

        let work = data.workspace();
        let mut info = DefaultInfo::<T>::new();
        info.setup_time = timers.elapsed("setup").as_secs_f64();
        let solution = DefaultSolution::<T>::new(data.n, data.m);

        Ok(Self {
            data,
            info,
            solution,
            settings,
            work,
            timers: Some(timers),
        })
    }

    /// Solve the problem.  The outcome is recorded in `self.solution`.
    ///
    /// An `Err` is returned only for invalid settings or a failed write to
    /// the print target.  Infeasibility and limits are reported through the
    /// solution status.
    pub fn solve(&mut self) -> Result<(), SolverError> {
        self.run(None)
    }

    /// Solve with constraints introduced in priority levels.
    ///
    /// Level `k` considers constraint ids below `break_points[k]`.  Points
    /// must be strictly increasing and the last must equal the number of
    /// constraints.  The solution holds the point of the last level that
    /// solved, and `levels_satisfied` counts those levels.
    pub fn solve_hierarchical(&mut self, break_points: &[usize]) -> Result<(), SolverError> {
        check_break_points(break_points, self.data.m)?;
        self.run(Some(break_points))
    }

    /// Mark constraints as soft.  A soft constraint may be violated at a
    /// cost of `½‖s‖²/rho_soft` in its slack `s`.  Replaces any earlier
    /// soft set.  Binary constraints cannot be soft.
    pub fn set_soft(&mut self, soft_ids: &[usize]) -> Result<(), SolverError> {
        self.data.check_soft_ids(soft_ids)?;
        self.work.set_soft(soft_ids);
        self.data.soft_ids = soft_ids.to_vec();
        Ok(())
    }

    /// Print the collected timings to the print target
    pub fn print_timers(&mut self) -> Result<(), SolverError> {
        if let Some(ref timers) = self.timers {
            timers.print(&mut self.info.stream)?;
            self.info.stream.flush()?;
        }
        Ok(())
    }

    fn run(&mut self, break_points: Option<&[usize]>) -> Result<(), SolverError> {
        self.settings.validate()?;
        if self.settings.eps_prox != self.data.eps_prox {
            return Err(SettingsError::BadFieldValue {
                field: "eps_prox",
                reason: "cannot be changed after setup",
            }
            .into());
        }

        //timers is stored as an option so that
        //we can swap it out here and avoid
        //borrow conflicts with other fields.
        let mut timers = self.timers.take().unwrap_or_default();
        let result = self.run_timed(&mut timers, break_points);
        self.timers = Some(timers);
        result
    }

    fn run_timed(
        &mut self,
        timers: &mut Timers,
        break_points: Option<&[usize]>,
    ) -> Result<(), SolverError> {
        let printed;
        notimeit! {timers; {
            printed = self.info.print_configuration(&self.settings, &self.data);
        }}
        printed?;

        self.info.reset(timers);
        self.reset_workspace();

        let cutoff = self.settings.fval_bound - self.data.obj_offset;
        let obj_offset = self.data.obj_offset;
        let outcome;

        timeit! {timers => "solve"; {
            outcome = match break_points {
                None => solve_core(
                    &mut self.work,
                    &self.data.bin_ids,
                    &self.settings,
                    &mut self.info,
                    cutoff,
                    obj_offset,
                )
                .map(|r| Outcome {
                    status: r.status,
                    solution: r.solution,
                    nodes: r.nodes,
                    levels_satisfied: 0,
                }),
                Some(break_points) => solve_hierarchical(
                    &mut self.work,
                    &self.data.bin_ids,
                    break_points,
                    &self.settings,
                    &mut self.info,
                    cutoff,
                    obj_offset,
                )
                .map(|r| {
                    let status = r.last.status;
                    let solution = match status {
                        SolverStatus::Solved => r.last.solution,
                        _ => r.satisfied.and_then(|s| s.solution),
                    };
                    Outcome {
                        status,
                        solution,
                        nodes: r.nodes,
                        levels_satisfied: r.levels_satisfied,
                    }
                }),
            };
        }}
        let mut outcome = outcome?;

        // the proximal objective is only known once x is
        if self.data.eps_prox > T::zero() && outcome.status == SolverStatus::Solved {
            let cut = outcome.solution.as_ref().map_or(false, |ldp| {
                let mut x = vec![T::zero(); self.data.n];
                self.data.recover_x(&mut x, &ldp.u, ldp.v.as_deref());
                self.data.eval_objective(&x) > self.settings.fval_bound
            });
            if cut {
                outcome.status = SolverStatus::Cutoff;
                outcome.solution = None;
            }
        }

        self.info.status = outcome.status;
        self.info.nodes = outcome.nodes;
        self.info.levels_satisfied = outcome.levels_satisfied;
        self.info.finalize(self.work.iterations, timers);

        self.solution
            .post_process(&self.data, outcome.solution.as_ref(), &self.info);
        self.info.obj_val = self.solution.obj_val;
        self.solution.finalize(&self.info);

        self.info.print_footer(&self.settings)?;
        Ok(())
    }

    // cold start with every constraint considered
    fn reset_workspace(&mut self) {
        let work = &mut self.work;
        work.clear_working_set();
        work.m_limit = work.m;
        work.iterations = 0;
        work.rho_soft = self.settings.rho_soft;
        if let Some(ref mut prox) = work.prox {
            prox.reset();
        }
        work.queue_equalities();
    }
}

fn check_break_points(break_points: &[usize], m: usize) -> Result<(), SolverError> {
    let Some(&last) = break_points.last() else {
        return Err(SolverError::BadBreakPoints("no break points given"));
    };
    if break_points.windows(2).any(|w| w[0] >= w[1]) || break_points[0] == 0 {
        return Err(SolverError::BadBreakPoints(
            "break points must be positive and strictly increasing",
        ));
    }
    if last != m {
        return Err(SolverError::BadBreakPoints(
            "last break point must equal the number of constraints",
        ));
    }
    Ok(())
}

impl<T> ConfigurablePrintTarget for DefaultSolver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.info.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_break_points() {
        assert!(check_break_points(&[1, 3], 3).is_ok());
        assert!(check_break_points(&[3], 3).is_ok());
        for bad in [&[][..], &[0, 3], &[2, 2, 3], &[1, 2]] {
            assert!(matches!(
                check_break_points(bad, 3),
                Err(SolverError::BadBreakPoints(_))
            ));
        }
    }

    #[test]
    fn test_resolve_after_settings_change() {
        // min ½‖x‖² - x₀  s.t.  x₀ ≤ 0.5
        let H = Matrix::<f64>::identity(2);
        let A = Matrix::from(&[[1., 0.]]);
        let mut solver = DefaultSolver::new(
            &H,
            &[-1., 0.],
            &A,
            &[-1e30],
            &[0.5],
            &[],
            DefaultSettings::default(),
        )
        .unwrap();

        solver.solve().unwrap();
        assert_eq!(solver.solution.status, SolverStatus::Solved);
        assert!(solver.solution.x.norm_inf_diff(&[0.5, 0.]) < 1e-10);
        assert!((solver.solution.lam[0] - 0.5).abs() < 1e-10);
        assert_eq!(solver.solution.active, vec![0]);
        let first_iterations = solver.solution.iterations;

        // a second solve starts cold and repeats the same work
        solver.solve().unwrap();
        assert_eq!(solver.solution.iterations, first_iterations);

        // objective at the optimum is -0.375
        solver.settings.fval_bound = -0.5;
        solver.solve().unwrap();
        assert_eq!(solver.solution.status, SolverStatus::Cutoff);
        assert!(solver.solution.obj_val.is_nan());

        solver.settings.primal_tol = -1.;
        assert!(matches!(solver.solve(), Err(SolverError::Settings(_))));
    }
}
