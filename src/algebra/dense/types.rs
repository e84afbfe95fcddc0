use crate::algebra::{FloatT, VectorMath};
use std::ops::{Index, IndexMut};

/// Dense matrix in column major format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use daqp::algebra::Matrix;
///
/// let A : Matrix<f64> = Matrix::from(
///      &[[1., 3., 5.],
///        [2., 0., 6.],
///        [0., 4., 7.]]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// vector of data in column major format
    pub data: Vec<T>,
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        let data = vec![T::zero(); m * n];
        Self { m, n, data }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        for i in 0..n {
            mat[(i, i)] = T::one();
        }
        mat
    }

    /// build from a vector of rows, all of the same length
    pub fn from_rows(rows: &[Vec<T>]) -> Self {
        let m = rows.len();
        let n = rows.first().map_or(0, |r| r.len());
        let mut mat = Matrix::zeros((m, n));
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n);
            for (j, &v) in row.iter().enumerate() {
                mat[(i, j)] = v;
            }
        }
        mat
    }

    pub fn new_from_slice(size: (usize, usize), src: &[T]) -> Self {
        let (m, n) = size;
        assert!(m * n == src.len());
        Self {
            m,
            n,
            data: src.to_vec(),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }
    pub fn nrows(&self) -> usize {
        self.m
    }
    pub fn ncols(&self) -> usize {
        self.n
    }
    pub fn is_square(&self) -> bool {
        self.m == self.n
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        assert!(col < self.n);
        &self.data[(col * self.m)..(col + 1) * self.m]
    }

    /// copy row `i` into `out`
    pub fn row_into(&self, i: usize, out: &mut [T]) {
        assert_eq!(out.len(), self.n);
        for (j, v) in out.iter_mut().enumerate() {
            *v = self[(i, j)];
        }
    }

    /// true if the matrix is symmetric to within `tol`
    pub fn is_symmetric(&self, tol: T) -> bool {
        if !self.is_square() {
            return false;
        }
        for j in 0..self.n {
            for i in (j + 1)..self.n {
                if T::abs(self[(i, j)] - self[(j, i)]) > tol {
                    return false;
                }
            }
        }
        true
    }

    /// y = a*self*x + b*y
    pub fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);
        y.scale(b);
        for (j, &xj) in x.iter().enumerate() {
            let axj = a * xj;
            for (yi, &cij) in y.iter_mut().zip(self.col_slice(j)) {
                *yi += cij * axj;
            }
        }
    }

    /// quadratic form y'*self*x
    pub fn quad_form(&self, y: &[T], x: &[T]) -> T {
        let mut out = T::zero();
        for (j, &xj) in x.iter().enumerate() {
            out += xj * self.col_slice(j).dot(y);
        }
        out
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &T {
        &self.data[idx.0 + self.m * idx.1]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut T {
        &mut self.data[idx.0 + self.m * idx.1]
    }
}

impl<const M: usize, const N: usize, T> From<&[[T; N]; M]> for Matrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; N]; M]) -> Matrix<T> {
        let mut mat = Matrix::zeros((M, N));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                mat[(i, j)] = v;
            }
        }
        mat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_indexing() {
        let A = Matrix::from(&[[1.0, 4.0, 7.0], [2.0, 5.0, 8.0], [3.0, 6.0, 9.0]]);
        assert_eq!(A[(0, 0)], 1.0);
        assert_eq!(A[(1, 0)], 2.0);
        assert_eq!(A[(0, 2)], 7.0);
        assert_eq!(A.data(), &[1., 2., 3., 4., 5., 6., 7., 8., 9.]);

        let mut row = vec![0.; 3];
        A.row_into(2, &mut row);
        assert_eq!(row, vec![3., 6., 9.]);
    }

    #[test]
    fn test_gemv_and_quad_form() {
        let A = Matrix::from(&[[2.0, 1.0], [1.0, 3.0]]);
        let x = [1.0, -1.0];
        let mut y = vec![1.0, 1.0];
        A.gemv(&mut y, &x, 1.0, 2.0);
        assert_eq!(y, vec![3.0, 0.0]);
        assert_eq!(A.quad_form(&x, &x), 3.0);
        assert!(A.is_symmetric(0.0));
    }
}
