use crate::algebra::{DenseFactorizationError, FloatT, Matrix};

/// Dense Cholesky factorization `A = RᵀR` with `R` upper triangular.
pub(crate) struct CholeskyEngine<T> {
    /// upper triangular factor (stored as square dense)
    pub R: Matrix<T>,
}

impl<T> CholeskyEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let R = Matrix::<T>::zeros((n, n));
        Self { R }
    }

    /// Factor the symmetric matrix `A`.  Only the upper triangle of `A` is read.
    pub fn factor(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        if A.size() != self.R.size() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }

        let n = A.nrows();
        let R = &mut self.R;
        R.data_mut().iter_mut().for_each(|r| *r = T::zero());

        for j in 0..n {
            // diagonal
            let mut s = A[(j, j)];
            for k in 0..j {
                s -= R[(k, j)] * R[(k, j)];
            }
            if !(s > T::zero()) {
                return Err(DenseFactorizationError::Cholesky(j));
            }
            let rjj = T::sqrt(s);
            R[(j, j)] = rjj;

            // remainder of row j
            for i in (j + 1)..n {
                let mut s = A[(j, i)];
                for k in 0..j {
                    s -= R[(k, j)] * R[(k, i)];
                }
                R[(j, i)] = s / rjj;
            }
        }
        Ok(())
    }
}

#[test]
fn test_cholesky() {
    #[rustfmt::skip]
    let S = Matrix::from(
        &[[ 8., -2., 4.],
          [-2., 12., 2.],
          [ 4.,  2., 6.]]);

    let mut eng = CholeskyEngine::<f64>::new(3);
    assert!(eng.factor(&S).is_ok());

    // check RᵀR = S
    for i in 0..3 {
        for j in 0..3 {
            let mut v = 0.;
            for k in 0..3 {
                v += eng.R[(k, i)] * eng.R[(k, j)];
            }
            assert!(f64::abs(v - S[(i, j)]) < 1e-12);
        }
    }
}

#[test]
fn test_cholesky_indefinite() {
    let S = Matrix::from(&[[1., 2.], [2., 1.]]);
    let mut eng = CholeskyEngine::<f64>::new(2);
    assert_eq!(eng.factor(&S), Err(DenseFactorizationError::Cholesky(1)));

    let mut eng = CholeskyEngine::<f64>::new(3);
    assert_eq!(
        eng.factor(&S),
        Err(DenseFactorizationError::IncompatibleDimension)
    );
}
