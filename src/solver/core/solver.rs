use super::activeset::LDPExit;
use super::bnb::BranchAndBound;
use super::traits::{InfoPrint, Settings};
use super::workspace::{LDPSolution, Workspace};
use crate::algebra::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of solver at termination

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Solver terminated with a solution.
    Solved,
    /// Problem is primal infeasible.
    PrimalInfeasible,
    /// Every candidate exceeded the user supplied objective bound.
    Cutoff,
    /// Iteration limit reached before a solution was found.
    MaxIterations,
    /// Node limit reached.  The best integer solution found so far, if any, is returned.
    MaxNodes,
    /// Solver terminated with a numerical error
    NumericalError,
}

impl SolverStatus {
    /// No point satisfies the constraints, or none beats the objective bound.
    pub fn is_infeasible(&self) -> bool {
        matches!(*self, SolverStatus::PrimalInfeasible | SolverStatus::Cutoff)
    }

    /// The solver failed for numerical reasons.
    pub fn is_errored(&self) -> bool {
        matches!(*self, SolverStatus::NumericalError)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<LDPExit> for SolverStatus {
    fn from(exit: LDPExit) -> Self {
        match exit {
            LDPExit::Optimal => SolverStatus::Solved,
            LDPExit::Infeasible => SolverStatus::PrimalInfeasible,
            LDPExit::Pruned => SolverStatus::Cutoff,
            LDPExit::IterationLimit => SolverStatus::MaxIterations,
            LDPExit::NumericalError => SolverStatus::NumericalError,
        }
    }
}

// ---------------------------------
// core driver
// ---------------------------------

/// Outcome of one call into the core
#[derive(Debug, Clone)]
pub(crate) struct CoreResult<T> {
    pub status: SolverStatus,
    // best feasible point, if one was found
    pub solution: Option<LDPSolution<T>>,
    pub nodes: u32,
}

/// Solve the least-distance problem currently loaded in `work`.
///
/// Runs the branch-and-bound driver when any binary constraint lies under
/// the workspace limit, and the active-set iteration otherwise, wrapped
/// in proximal-point iterations when those are enabled.
/// `cutoff` bounds the least-distance objective and `obj_offset` maps it
/// to the user objective for printing.
pub(crate) fn solve_core<T, I>(
    work: &mut Workspace<T>,
    bin_ids: &[usize],
    settings: &I::SE,
    info: &mut I,
    cutoff: T,
    obj_offset: T,
) -> std::io::Result<CoreResult<T>>
where
    T: FloatT,
    I: InfoPrint<T>,
{
    let set = settings.core();

    if bin_ids.iter().any(|&id| id < work.m_limit) {
        let mut bnb = BranchAndBound::new(bin_ids, set, cutoff, obj_offset);
        let status = bnb.daqp_bnb(work, settings, info)?;
        Ok(CoreResult {
            status,
            solution: bnb.incumbent.take(),
            nodes: bnb.nodes,
        })
    } else {
        let exit = work.solve_prox(set, cutoff);
        let solution = match exit {
            LDPExit::Optimal => Some(work.snapshot()),
            _ => None,
        };
        Ok(CoreResult {
            status: exit.into(),
            solution,
            nodes: 0,
        })
    }
}
