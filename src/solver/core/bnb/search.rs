use super::branching::get_branch_id;
use super::node::{BoundFixing, NodeArena, NodeId, NodeStatus};
use super::queue::{NodeQueue, NodeQueueT};
use super::NodeReport;
use crate::algebra::*;
use crate::solver::core::activeset::LDPExit;
use crate::solver::core::factorization::LDLError;
use crate::solver::core::traits::{InfoPrint, Settings};
use crate::solver::core::workspace::{BoundSide, LDPSolution, Workspace};
use crate::solver::core::{CoreSettings, SolverStatus};

/// Branch-and-bound over binary constraints
pub(crate) struct BranchAndBound<T: FloatT> {
    pub bin_ids: Vec<usize>,
    pub arena: NodeArena<T>,
    queue: NodeQueue<T>,
    pub incumbent: Option<LDPSolution<T>>,
    // number of processed nodes
    pub nodes: u32,
    // the workspace holds this node's final state
    last_processed: Option<NodeId>,
    // bounds before any fixing
    dlower: Vec<T>,
    dupper: Vec<T>,
    // least-distance objective bound supplied by the user
    cutoff: T,
    cutoff_hit: bool,
    // converts least-distance objectives to user objectives
    obj_offset: T,
}

impl<T> BranchAndBound<T>
where
    T: FloatT,
{
    pub fn new(bin_ids: &[usize], settings: &CoreSettings<T>, cutoff: T, obj_offset: T) -> Self {
        Self {
            bin_ids: bin_ids.to_vec(),
            arena: NodeArena::new(),
            queue: NodeQueue::new(settings.node_selection),
            incumbent: None,
            nodes: 0,
            last_processed: None,
            dlower: Vec::new(),
            dupper: Vec::new(),
            cutoff,
            cutoff_hit: false,
            obj_offset,
        }
    }

    fn node_bound(&self) -> T {
        match self.incumbent {
            Some(ref inc) => T::min(inc.fval, self.cutoff),
            None => self.cutoff,
        }
    }

    /// Run the search from the workspace as currently prepared.
    ///
    /// The root node is solved from the live working set; every other
    /// node either continues from its parent's final state or is
    /// rebuilt from its fixings and warm start.  A fixing collapses the
    /// bounds of its constraint, and the bounds are restored on return.
    pub fn daqp_bnb<I>(
        &mut self,
        work: &mut Workspace<T>,
        settings: &I::SE,
        info: &mut I,
    ) -> std::io::Result<SolverStatus>
    where
        I: InfoPrint<T>,
    {
        let set = settings.core();

        self.arena.clear();
        self.queue = NodeQueue::new(set.node_selection);
        self.incumbent = None;
        self.nodes = 0;
        self.last_processed = None;
        self.cutoff_hit = false;
        self.dlower.clone_from(&work.dlower);
        self.dupper.clone_from(&work.dupper);

        let root = self.arena.push_root(T::neg_infinity(), work.warm_start());
        self.queue.push(root, T::neg_infinity());

        let mut status = SolverStatus::Solved;

        while !self.queue.is_empty() {
            if self.nodes >= set.max_nodes {
                status = SolverStatus::MaxNodes;
                break;
            }
            let Some(id) = self.queue.pop() else { break };

            // bound test before any work on the node
            if let Some(ref inc) = self.incumbent {
                if self.arena[id].bound >= inc.fval {
                    self.arena[id].status = NodeStatus::Pruned;
                    self.arena[id].warm_start = Vec::new();
                    info.print_node(settings, &self.report(id))?;
                    continue;
                }
            }

            match self.process_node(id, work, set) {
                Ok((NodeStatus::Active, Some(branch_id))) => {
                    self.spawn_children(id, branch_id, work);
                    self.arena[id].status = NodeStatus::Fathomed;
                }
                Ok((node_status, _)) => {
                    self.arena[id].status = node_status;
                }
                Err(stop) => {
                    status = stop;
                    break;
                }
            }
            info.print_node(settings, &self.report(id))?;
        }

        work.dlower.copy_from(&self.dlower);
        work.dupper.copy_from(&self.dupper);

        if status == SolverStatus::Solved && self.incumbent.is_none() {
            status = if self.cutoff_hit {
                SolverStatus::Cutoff
            } else {
                SolverStatus::PrimalInfeasible
            };
        }

        Ok(status)
    }

    /// Solve the relaxation at node `id` and classify it.
    ///
    /// Returns the new status and, for an `Active` node, the binary
    /// constraint to branch on.  An infeasible relaxation only closes the
    /// node.  Iteration limits and numerical failures stop the whole
    /// search and are returned as `Err`.
    pub fn process_node(
        &mut self,
        id: NodeId,
        work: &mut Workspace<T>,
        settings: &CoreSettings<T>,
    ) -> Result<(NodeStatus, Option<usize>), SolverStatus> {
        self.arena[id].status = NodeStatus::Active;

        if self.prepare_workspace(id, work, settings.zero_tol).is_err() {
            return Err(SolverStatus::NumericalError);
        }
        self.nodes += 1;

        let exit = work.solve_ldp(settings, self.node_bound());
        self.last_processed = Some(id);
        self.arena[id].warm_start = Vec::new();

        let outcome = match exit {
            LDPExit::Optimal => {
                self.arena[id].fval = Some(work.fval);
                let dominated = self
                    .incumbent
                    .as_ref()
                    .map_or(false, |inc| work.fval >= inc.fval);

                if dominated {
                    (NodeStatus::Pruned, None)
                } else {
                    let rule = settings.branching_rule;
                    match get_branch_id(work, &self.arena[id], &self.bin_ids, rule, settings.int_tol) {
                        None => {
                            self.incumbent = Some(work.snapshot());
                            (NodeStatus::IntegerFeasible, None)
                        }
                        Some(branch_id) => (NodeStatus::Active, Some(branch_id)),
                    }
                }
            }
            LDPExit::Pruned => {
                if self.incumbent.is_none() {
                    self.cutoff_hit = true;
                }
                (NodeStatus::Pruned, None)
            }
            LDPExit::Infeasible => (NodeStatus::Infeasible, None),
            LDPExit::IterationLimit => return Err(SolverStatus::MaxIterations),
            LDPExit::NumericalError => return Err(SolverStatus::NumericalError),
        };
        Ok(outcome)
    }

    /// Create the two children of `id` fixing `branch_id` at each bound.
    ///
    /// The child on the side nearer the relaxed value gets the lower id
    /// and is explored first.
    pub fn spawn_children(&mut self, id: NodeId, branch_id: usize, work: &Workspace<T>) {
        let value = work.binary_value(branch_id);
        let (near, far) = if value.to_upper < value.to_lower {
            (BoundSide::Upper, BoundSide::Lower)
        } else {
            (BoundSide::Lower, BoundSide::Upper)
        };
        let bound = work.fval;
        let warm = work.warm_start();

        let near_id = self
            .arena
            .push_child(id, BoundFixing::new(branch_id, near), bound, warm.clone());
        let far_id = self
            .arena
            .push_child(id, BoundFixing::new(branch_id, far), bound, warm);

        // last pushed is popped first by the depth-first queue
        self.queue.push(far_id, bound);
        self.queue.push(near_id, bound);
    }

    fn prepare_workspace(
        &self,
        id: NodeId,
        work: &mut Workspace<T>,
        zero_tol: T,
    ) -> Result<(), LDLError> {
        let node = &self.arena[id];
        let parent = match node.parent {
            // root: solve from the working set as given
            None => return Ok(()),
            Some(p) => p,
        };

        if self.last_processed == Some(parent) {
            // the workspace holds the parent's optimum and fixings
            if let Some(fixing) = node.fixings.last() {
                work.fix(fixing.id(), fixing.side());
                work.pending.push_back((fixing.id(), fixing.side()));
            }
            return Ok(());
        }

        work.dlower.copy_from(&self.dlower);
        work.dupper.copy_from(&self.dupper);
        for fixing in node.fixings.iter() {
            work.fix(fixing.id(), fixing.side());
        }
        // fixed constraints are now equalities and get queued
        work.load_warm_start(&node.warm_start, zero_tol)
    }

    fn report(&self, id: NodeId) -> NodeReport<T> {
        let node = &self.arena[id];
        NodeReport {
            id,
            depth: node.depth,
            status: node.status,
            objective: node.fval.map(|f| f + self.obj_offset),
            incumbent: self.incumbent.as_ref().map(|inc| inc.fval + self.obj_offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::queue::NodeSelection;
    use super::*;
    use crate::solver::core::workspace::ConstraintStore;
    use crate::solver::DefaultSettings;

    struct Quiet;
    impl InfoPrint<f64> for Quiet {
        type D = ();
        type SE = DefaultSettings<f64>;
        fn print_configuration(&mut self, _: &Self::SE, _: &()) -> std::io::Result<()> {
            Ok(())
        }
        fn print_node(&mut self, _: &Self::SE, _: &NodeReport<f64>) -> std::io::Result<()> {
            Ok(())
        }
        fn print_footer(&mut self, _: &Self::SE) -> std::io::Result<()> {
            Ok(())
        }
    }

    // min ½‖u - c‖² over u ∈ {0,1}ⁿ, expressed as an LDP with the shift
    // absorbed into the bounds:  -c ≤ u - c ≤ 1 - c  for w = u - c
    fn box_problem(c: &[f64]) -> Workspace<f64> {
        let n = c.len();
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1. } else { 0. }).collect())
            .collect();
        let store = ConstraintStore::from_rows(n, &rows);
        let lo = c.iter().map(|ci| -ci).collect();
        let hi = c.iter().map(|ci| 1. - ci).collect();
        Workspace::new(store, lo, hi, n)
    }

    fn run(c: &[f64], selection: NodeSelection) -> (SolverStatus, BranchAndBound<f64>) {
        let mut work = box_problem(c);
        let mut settings = DefaultSettings::default();
        settings.node_selection = selection;
        let bins: Vec<usize> = (0..c.len()).collect();
        let mut bnb = BranchAndBound::new(&bins, &settings, f64::INFINITY, 0.);
        let status = bnb.daqp_bnb(&mut work, &settings, &mut Quiet).unwrap();
        (status, bnb)
    }

    #[test]
    fn test_rounding_problem() {
        let c = [0.3, 0.8, 0.6];
        for selection in [NodeSelection::DepthFirst, NodeSelection::BestBound] {
            let (status, bnb) = run(&c, selection);
            assert_eq!(status, SolverStatus::Solved);
            let inc = bnb.incumbent.unwrap();
            // w = u - c at the nearest vertex (0,1,1)
            let expected = [-0.3, 0.2, 0.4];
            assert!(inc.u.norm_inf_diff(&expected) < 1e-9);
            assert!((inc.fval - 0.5 * (0.09 + 0.04 + 0.16)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_depth_first_node_count() {
        // nearest-side diving reaches the optimum (0,1) at the third node.
        // The two remaining siblings are processed and cut off by the
        // incumbent objective inside the active-set iteration.
        let (status, bnb) = run(&[0.4, 0.7], NodeSelection::DepthFirst);
        assert_eq!(status, SolverStatus::Solved);
        assert_eq!(bnb.nodes, 5);
        assert_eq!(bnb.arena.len(), 5);
        assert_eq!(bnb.arena[0].status, NodeStatus::Fathomed);
        assert_eq!(bnb.arena[1].status, NodeStatus::Fathomed);
        assert_eq!(bnb.arena[1].fixings, vec![BoundFixing::Lower(0)]);
        assert_eq!(
            bnb.arena[3].fixings,
            vec![BoundFixing::Lower(0), BoundFixing::Upper(1)]
        );
        assert_eq!(bnb.arena[3].status, NodeStatus::IntegerFeasible);
        assert_eq!(bnb.arena[4].status, NodeStatus::Pruned);
        assert_eq!(bnb.arena[2].status, NodeStatus::Pruned);

        let inc = bnb.incumbent.unwrap();
        assert!(inc.u.norm_inf_diff(&[-0.4, 0.3]) < 1e-12);
    }

    #[test]
    fn test_max_nodes() {
        let mut work = box_problem(&[0.4, 0.7]);
        let settings = crate::solver::DefaultSettingsBuilder::default()
            .max_nodes(1u32)
            .build()
            .unwrap();
        let mut bnb = BranchAndBound::new(&[0, 1], &settings, f64::INFINITY, 0.);
        let status = bnb.daqp_bnb(&mut work, &settings, &mut Quiet).unwrap();
        assert_eq!(status, SolverStatus::MaxNodes);
        assert_eq!(bnb.nodes, 1);
        assert!(bnb.incumbent.is_none());
    }

    #[test]
    fn test_cutoff() {
        let mut work = box_problem(&[0.5, 0.5]);
        let settings = DefaultSettings::default();
        let mut bnb = BranchAndBound::new(&[0, 1], &settings, 0.1, 0.);
        let status = bnb.daqp_bnb(&mut work, &settings, &mut Quiet).unwrap();
        assert_eq!(status, SolverStatus::Cutoff);
    }
}
