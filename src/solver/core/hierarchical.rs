use super::solver::{solve_core, CoreResult};
use super::traits::{InfoPrint, Settings};
use super::workspace::Workspace;
use super::SolverStatus;
use crate::algebra::*;

/// Outcome of a sequence of priority levels
#[derive(Debug, Clone)]
pub(crate) struct HierarchicalResult<T> {
    /// Status of the last level attempted.
    pub last: CoreResult<T>,
    /// Number of leading levels solved to optimality.
    pub levels_satisfied: usize,
    /// Result of the last satisfied level.
    pub satisfied: Option<CoreResult<T>>,
    pub nodes: u32,
}

/// Solve with constraints introduced in priority levels.
///
/// Level `k` considers constraint ids below `break_points[k]` and starts from
/// the working set of level `k-1`.  The sequence stops at the first level
/// that does not solve.  `break_points` must already be validated.
pub(crate) fn solve_hierarchical<T, I>(
    work: &mut Workspace<T>,
    bin_ids: &[usize],
    break_points: &[usize],
    settings: &I::SE,
    info: &mut I,
    cutoff: T,
    obj_offset: T,
) -> std::io::Result<HierarchicalResult<T>>
where
    T: FloatT,
    I: InfoPrint<T>,
{
    let zero_tol = settings.core().zero_tol;
    let mut satisfied: Option<CoreResult<T>> = None;
    let mut nodes = 0;

    for (level, &limit) in break_points.iter().enumerate() {
        work.m_limit = limit;

        let warm = satisfied
            .as_ref()
            .and_then(|r| r.solution.as_ref())
            .map(|s| s.active.clone())
            .unwrap_or_default();
        if work.load_warm_start(&warm, zero_tol).is_err() {
            let last = CoreResult {
                status: SolverStatus::NumericalError,
                solution: None,
                nodes: 0,
            };
            return Ok(HierarchicalResult {
                last,
                levels_satisfied: level,
                satisfied,
                nodes,
            });
        }

        let result = solve_core(work, bin_ids, settings, info, cutoff, obj_offset)?;
        nodes += result.nodes;
        info.print_level(settings, level, limit, result.status)?;

        if result.status != SolverStatus::Solved {
            return Ok(HierarchicalResult {
                last: result,
                levels_satisfied: level,
                satisfied,
                nodes,
            });
        }
        satisfied = Some(result);
    }

    // every level solved: the last one is also the final result
    let last = satisfied.clone().unwrap_or(CoreResult {
        status: SolverStatus::Solved,
        solution: None,
        nodes: 0,
    });
    Ok(HierarchicalResult {
        last,
        levels_satisfied: break_points.len(),
        satisfied,
        nodes,
    })
}
