#![allow(non_snake_case)]

use daqp::{algebra::*, solver::*};

// min ½‖x‖² with
//   level 0 : x₀ ≥ 1
//   level 1 : x₁ ≤ -1
//   level 2 : x₀ ≤ 0, which conflicts with level 0
fn levels_solver(settings: DefaultSettings<f64>) -> DefaultSolver<f64> {
    #[rustfmt::skip]
    let A = Matrix::from(
        &[[1., 0.],
          [0., 1.],
          [1., 0.]]);
    let blower = [1., -1e30, -1e30];
    let bupper = [1e30, -1., 0.];
    DefaultSolver::new(
        &Matrix::identity(2),
        &[0., 0.],
        &A,
        &blower,
        &bupper,
        &[],
        settings,
    )
    .unwrap()
}

#[test]
fn test_hierarchical_stops_at_conflict() {
    let mut solver = levels_solver(DefaultSettings::default());
    solver.solve_hierarchical(&[1, 2, 3]).unwrap();

    let sol = &solver.solution;
    assert_eq!(sol.status, SolverStatus::PrimalInfeasible);
    assert_eq!(sol.levels_satisfied, 2);

    // point of the last satisfied level
    assert!(sol.x.norm_inf_diff(&[1., -1.]) <= 1e-12);
    assert!(f64::abs(sol.obj_val - 1.) <= 1e-12);
}

#[test]
fn test_hierarchical_single_level_matches_solve() {
    let mut solver = levels_solver(DefaultSettings::default());
    solver.solve_hierarchical(&[3]).unwrap();
    let status = solver.solution.status;
    assert_eq!(solver.solution.levels_satisfied, 0);

    solver.solve().unwrap();
    assert_eq!(solver.solution.status, status);
    assert_eq!(status, SolverStatus::PrimalInfeasible);
}

#[test]
fn test_hierarchical_all_levels() {
    let A = Matrix::from(&[[1., 0.], [1., 1.]]);
    let mut solver = DefaultSolver::new(
        &Matrix::identity(2),
        &[0., 0.],
        &A,
        &[1., 3.],
        &[1e30, 3.],
        &[],
        DefaultSettings::default(),
    )
    .unwrap();
    solver.solve_hierarchical(&[1, 2]).unwrap();

    let sol = &solver.solution;
    assert_eq!(sol.status, SolverStatus::Solved);
    assert_eq!(sol.levels_satisfied, 2);
    assert!(sol.x.norm_inf_diff(&[1.5, 1.5]) <= 1e-10);
}

#[test]
fn test_hierarchical_with_binaries() {
    // x₀ binary in level 1 only, level 0 asks for x₁ ≥ 0.5
    let A = Matrix::from(&[[0., 1.], [1., 0.]]);
    let mut solver = DefaultSolver::new(
        &Matrix::identity(2),
        &[-0.4, 0.],
        &A,
        &[0.5, 0.],
        &[1e30, 1.],
        &[1],
        DefaultSettings::default(),
    )
    .unwrap();
    solver.solve_hierarchical(&[1, 2]).unwrap();

    let sol = &solver.solution;
    assert_eq!(sol.status, SolverStatus::Solved);
    assert_eq!(sol.levels_satisfied, 2);
    assert!(sol.x.norm_inf_diff(&[0., 0.5]) <= 1e-10);
    assert!(sol.nodes >= 1);
}

#[test]
fn test_hierarchical_bad_break_points() {
    let mut solver = levels_solver(DefaultSettings::default());
    for bad in [&[][..], &[2, 1, 3], &[1, 2], &[0, 3], &[1, 1, 3]] {
        assert!(matches!(
            solver.solve_hierarchical(bad),
            Err(SolverError::BadBreakPoints(_))
        ));
    }
    assert_eq!(solver.solution.status, SolverStatus::Unsolved);
}
