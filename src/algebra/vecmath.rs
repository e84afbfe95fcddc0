use super::{FloatT, VectorMath};
use std::iter::zip;

impl<T: FloatT> VectorMath for [T] {
    type T = T;
    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn scalarop(&mut self, op: impl Fn(T) -> T) -> &mut Self {
        for x in &mut *self {
            *x = op(*x);
        }
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.scalarop(|_x| c)
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.scalarop(|x| x * c)
    }

    fn negate(&mut self) -> &mut Self {
        self.scalarop(|x| -x)
    }

    fn normalize(&mut self) -> T {
        let norm = self.norm();
        if norm == T::zero() {
            return T::zero();
        }
        self.scale(norm.recip());
        norm
    }

    fn dot(&self, y: &[T]) -> T {
        let iter = zip(self, y);
        let op = |(&x, &y)| x * y;
        accumulate_pairwise(iter, op)
    }

    fn sumsq(&self) -> T {
        self.dot(self)
    }

    // 2-norm
    fn norm(&self) -> T {
        T::sqrt(self.sumsq())
    }

    // Returns infinity norm
    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for v in self.iter().map(|v| v.abs()) {
            if v.is_nan() {
                return T::nan();
            }
            out = if v > out { v } else { out };
        }
        out
    }

    // max absolute difference (used for unit testing)
    fn norm_inf_diff(&self, b: &[T]) -> T {
        zip(self, b).fold(T::zero(), |acc, (x, y)| T::max(acc, T::abs(*x - *y)))
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|&x| T::is_finite(x))
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());

        zip(&mut *self, x).for_each(|(y, x)| *y = a * (*x) + b * (*y));
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());

        for (w, (x, y)) in zip(&mut *self, zip(x, y)) {
            *w = a * (*x) + b * (*y);
        }
        self
    }
}

// ---------------------------------------------------------------------
// generic pairwise accumulator utility for sums, dot products etc

fn accumulate_pairwise<T, I, A, F>(x: I, op: F) -> T
where
    T: FloatT,
    I: IntoIterator<Item = A> + Clone,
    I::IntoIter: ExactSizeIterator,
    F: Fn(A) -> T,
{
    const BASE_CASE_DIM: usize = 16;

    let n = x.clone().into_iter().len();
    return if n == 0 {
        T::zero()
    } else {
        accumulate_pairwise_inner(x, &op, 0, n)
    };

    fn accumulate_pairwise_inner<T, I, A, F>(x: I, op: &F, i1: usize, n: usize) -> T
    where
        T: FloatT,
        I: IntoIterator<Item = A> + Clone,
        I::IntoIter: ExactSizeIterator,
        F: Fn(A) -> T,
    {
        if n < BASE_CASE_DIM {
            x.into_iter()
                .skip(i1)
                .take(n)
                .fold(T::zero(), |acc, x| acc + op(x))
        } else {
            let n2 = n / 2;
            accumulate_pairwise_inner(x.clone(), op, i1, n2)
                + accumulate_pairwise_inner(x, op, i1 + n2, n - n2)
        }
    }
}

#[test]
fn test_dot_product() {
    let x = vec![1., 2., 3., 4.];
    let y = vec![4., 5., 6., 7.];
    assert_eq!(x.dot(&y), 60.);
}

#[test]
fn test_dot() {
    let maxlen = 128 * 7 + 1; //awkward length to test base case
    let x: Vec<f64> = (1..=maxlen).map(|x| x as f64).collect();
    let y: Vec<f64> = (1..=maxlen).map(|y| (y as f64 - 3.0) / 2.0).collect();

    for i in 0..=x.len() {
        let xt = &x[0..i];
        let yt = &y[0..i];
        let dot1 = zip(xt, yt).fold(0.0, |acc, (&x, &y)| acc + x * y);
        let dot2 = xt.dot(yt);
        assert_eq!(dot1, dot2);
    }
}

#[test]
fn test_normalize() {
    let mut x = vec![3., 4.];
    assert_eq!(x.normalize(), 5.);
    assert!(x.norm_inf_diff(&[0.6, 0.8]) < 1e-15);

    let mut z = vec![0., 0.];
    assert_eq!(z.normalize(), 0.);
    assert_eq!(z, vec![0., 0.]);
}

#[test]
fn test_norms_and_blas() {
    let x = vec![1., -5., 2.];
    assert_eq!(x.norm_inf(), 5.);
    assert!(x.is_finite());

    let mut y = vec![1., 1., 1.];
    y.axpby(2., &x, -1.);
    assert_eq!(y, vec![1., -11., 3.]);

    let mut w = vec![0.; 3];
    w.waxpby(1., &x, 1., &y);
    assert_eq!(w, vec![2., -16., 5.]);
}
