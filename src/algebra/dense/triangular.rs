use crate::algebra::{FloatT, Matrix};

/// Solves `Rᵀ x = b` in place for upper triangular `R` (forward substitution).
pub(crate) fn solve_upper_transpose<T: FloatT>(R: &Matrix<T>, b: &mut [T]) {
    let n = R.nrows();
    assert_eq!(b.len(), n);
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s -= R[(k, i)] * b[k];
        }
        b[i] = s / R[(i, i)];
    }
}

/// Solves `R x = b` in place for upper triangular `R` (backward substitution).
pub(crate) fn solve_upper<T: FloatT>(R: &Matrix<T>, b: &mut [T]) {
    let n = R.nrows();
    assert_eq!(b.len(), n);
    for i in (0..n).rev() {
        let mut s = b[i];
        for k in (i + 1)..n {
            s -= R[(i, k)] * b[k];
        }
        b[i] = s / R[(i, i)];
    }
}

#[test]
fn test_triangular_solves() {
    let R = Matrix::from(&[[2., 1., -1.], [0., 1., 3.], [0., 0., 4.]]);
    let x = [1., -2., 0.5];

    // b = R x
    let mut b = vec![0.; 3];
    R.gemv(&mut b, &x, 1., 0.);
    solve_upper(&R, &mut b);
    for (bi, xi) in b.iter().zip(x.iter()) {
        assert!(f64::abs(bi - xi) < 1e-14);
    }

    // b = Rᵀ x
    let mut b = vec![0.; 3];
    for i in 0..3 {
        for k in 0..3 {
            b[i] += R[(k, i)] * x[k];
        }
    }
    solve_upper_transpose(&R, &mut b);
    for (bi, xi) in b.iter().zip(x.iter()) {
        assert!(f64::abs(bi - xi) < 1e-14);
    }
}
