#![allow(non_snake_case)]
#![allow(clippy::type_complexity)]
use daqp::{algebra::*, solver::*};

// a collection of tests to ensure that data of
// incompatible dimension won't be accepted

fn api_dim_check_data() -> (Matrix<f64>, Vec<f64>, Matrix<f64>, Vec<f64>, Vec<f64>) {
    let H = Matrix::<f64>::identity(4);
    let f = vec![0.; 4];
    let mut A = Matrix::<f64>::zeros((6, 4));
    for i in 0..6 {
        A[(i, i % 4)] = 1.;
    }
    let blower = vec![-1.; 6];
    let bupper = vec![1.; 6];
    (H, f, A, blower, bupper)
}

fn setup(
    H: &Matrix<f64>,
    f: &[f64],
    A: &Matrix<f64>,
    blower: &[f64],
    bupper: &[f64],
    bin_ids: &[usize],
) -> Result<DefaultSolver<f64>, SolverError> {
    DefaultSolver::new(H, f, A, blower, bupper, bin_ids, DefaultSettings::default())
}

#[test]
fn api_dim_check_working() {
    // This example should work because dimensions are
    // all compatible.  All following checks vary one
    // of these sizes to test dimension checks

    let (H, f, A, blower, bupper) = api_dim_check_data();
    assert!(setup(&H, &f, &A, &blower, &bupper, &[0, 5]).is_ok());
}

#[test]
fn api_dim_check_bad_H() {
    let (_H, f, A, blower, bupper) = api_dim_check_data();
    let H = Matrix::<f64>::identity(3);
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::IncompatibleDimension(_))
    ));

    let H = Matrix::<f64>::zeros((4, 3));
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::IncompatibleDimension(_))
    ));
}

#[test]
fn api_dim_check_bad_f() {
    let (H, _f, A, blower, bupper) = api_dim_check_data();
    let f = vec![0.; 5];
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::IncompatibleDimension(_))
    ));
}

#[test]
fn api_dim_check_bad_A_rows() {
    let (H, f, _A, blower, bupper) = api_dim_check_data();
    let A = Matrix::<f64>::zeros((5, 4));
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::IncompatibleDimension(_))
    ));
}

#[test]
fn api_dim_check_bad_A_cols() {
    let (H, f, _A, blower, bupper) = api_dim_check_data();
    let A = Matrix::<f64>::zeros((6, 3));
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::IncompatibleDimension(_))
    ));
}

#[test]
fn api_dim_check_bad_bounds() {
    let (H, f, A, blower, _bupper) = api_dim_check_data();
    let bupper = vec![1.; 5];
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::IncompatibleDimension(_))
    ));

    let mut bupper = vec![1.; 6];
    bupper[3] = -2.;
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::InconsistentBounds(3))
    ));

    bupper[3] = f64::NAN;
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::InconsistentBounds(3))
    ));
}

#[test]
fn api_dim_check_bad_binaries() {
    let (H, f, A, mut blower, bupper) = api_dim_check_data();
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[6]),
        Err(SolverError::BadBinaryId(6))
    ));
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[2, 4, 2]),
        Err(SolverError::DuplicateBinaryId(2))
    ));

    blower[4] = -1e30;
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[4]),
        Err(SolverError::UnboundedBinary(4))
    ));
}

#[test]
fn api_check_nonconvex() {
    let (mut H, f, A, blower, bupper) = api_dim_check_data();
    H[(2, 2)] = -1.;
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::NonConvex(2))
    ));
}

#[test]
fn api_check_zero_row() {
    let (H, f, mut A, blower, bupper) = api_dim_check_data();
    A[(1, 1)] = 0.;
    assert!(matches!(
        setup(&H, &f, &A, &blower, &bupper, &[]),
        Err(SolverError::ZeroConstraint(1))
    ));
}

#[test]
fn api_check_bad_settings() {
    let (H, f, A, blower, bupper) = api_dim_check_data();
    let mut settings = DefaultSettings::default();
    settings.zero_tol = 0.;
    assert!(matches!(
        DefaultSolver::new(&H, &f, &A, &blower, &bupper, &[], settings),
        Err(SolverError::Settings(SettingsError::BadFieldValue { field: "zero_tol", .. }))
    ));

    // the builder rejects the same value
    assert!(DefaultSettingsBuilder::<f64>::default()
        .max_nodes(0)
        .build()
        .is_err());
}
