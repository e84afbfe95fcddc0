#![allow(non_snake_case)]
use crate::algebra::*;
use crate::solver::core::prox::ProxState;
use crate::solver::core::workspace::{ConstraintStore, Workspace};
use crate::solver::core::SettingsError;
use crate::solver::utils::infbounds::{lower_is_absent, upper_is_absent};
use thiserror::Error;

/// Error type returned by problem setup and other contract violations
#[derive(Error, Debug)]
pub enum SolverError {
    /// Problem data with inconsistent sizes
    #[error("Incompatible dimension: {0}")]
    IncompatibleDimension(&'static str),
    /// The cost matrix is not positive definite
    #[error("Cost matrix is not positive definite (pivot {0})")]
    NonConvex(usize),
    /// A constraint row with no nonzero entries
    #[error("Constraint {0} has an all zero row")]
    ZeroConstraint(usize),
    /// Lower bound above upper bound, or a NaN bound
    #[error("Inconsistent bounds for constraint {0}")]
    InconsistentBounds(usize),
    /// A binary constraint id that is not a constraint
    #[error("Binary constraint id {0} out of range")]
    BadBinaryId(usize),
    /// A binary constraint id given more than once
    #[error("Binary constraint id {0} given more than once")]
    DuplicateBinaryId(usize),
    /// A binary constraint without two finite bounds
    #[error("Binary constraint {0} must have finite lower and upper bounds")]
    UnboundedBinary(usize),
    /// Hierarchical break points that do not partition the constraints
    #[error("Bad break points: {0}")]
    BadBreakPoints(&'static str),
    /// A soft constraint id that is not a constraint
    #[error("Soft constraint id {0} out of range")]
    BadSoftId(usize),
    /// A constraint marked both soft and binary
    #[error("Constraint {0} cannot be both soft and binary")]
    SoftBinary(usize),
    /// Binary constraints together with proximal-point iterations
    #[error("Binary constraints are not supported with eps_prox > 0")]
    BinaryWithProx,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------
// Data type for default problem format
// ---------------

/// Problem data for the dense quadratic program
///
/// ```text
/// minimize    ½ xᵀHx + fᵀx
/// subject to  blower ≤ A x ≤ bupper
/// ```
///
/// held together with its least-distance reformulation.  With `H = RᵀR`
/// the substitution `u = R x + v`, `v = R⁻ᵀ f` gives
///
/// ```text
/// minimize    ½‖u‖²
/// subject to  dlower ≤ M u ≤ dupper
/// ```
///
/// with `M = A R⁻¹` and `d = b + M v`.  The rows of `M` are scaled to unit norm.
///
/// With a proximal-point weight `ε > 0` the factored matrix is `H + εI`
/// and `v` moves with every outer iteration.

pub struct DefaultProblemData<T> {
    pub H: Matrix<T>,
    pub f: Vec<T>,
    pub A: Matrix<T>,
    pub blower: Vec<T>,
    pub bupper: Vec<T>,
    pub n: usize,
    pub m: usize,
    /// Constraint ids restricted to the values of their bounds.
    pub bin_ids: Vec<usize>,
    /// Constraint ids that may be violated at a cost.
    pub soft_ids: Vec<usize>,

    pub(crate) cholesky: CholeskyEngine<T>,
    pub(crate) v: Vec<T>,
    // row scalings of M, so that λ_i = λ̂_i scaling_i
    pub(crate) scalings: Vec<T>,
    pub(crate) M: ConstraintStore<T>,
    pub(crate) dlower: Vec<T>,
    pub(crate) dupper: Vec<T>,
    // user objective = least-distance objective + obj_offset
    pub(crate) obj_offset: T,
    pub(crate) eps_prox: T,
    pub(crate) prox: Option<ProxState<T>>,
}

impl<T> DefaultProblemData<T>
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
        eps_prox: T,
    ) -> Result<Self, SolverError> {
        let n = H.nrows();
        let m = blower.len();
        check_dimensions(H, f, A, blower, bupper, bin_ids)?;
        if eps_prox > T::zero() && !bin_ids.is_empty() {
            return Err(SolverError::BinaryWithProx);
        }

        let mut Hreg = H.clone();
        for i in 0..n {
            Hreg[(i, i)] += eps_prox;
        }
        let mut cholesky = CholeskyEngine::<T>::new(n);
        cholesky.factor(&Hreg).map_err(|e| match e {
            DenseFactorizationError::Cholesky(j) => SolverError::NonConvex(j),
            DenseFactorizationError::IncompatibleDimension => {
                SolverError::IncompatibleDimension("H")
            }
        })?;
        let R = &cholesky.R;

        // v = R⁻ᵀ f
        let mut v = f.to_vec();
        solve_upper_transpose(R, &mut v);

        // rows of M = A R⁻¹ are R⁻ᵀ aᵢ
        let mut M = ConstraintStore::zeros(n, m);
        let mut scalings = vec![T::one(); m];
        let mut dlower = vec![T::zero(); m];
        let mut dupper = vec![T::zero(); m];
        // bounds without the shift, for proximal-point iterations
        let mut blower_s = vec![T::zero(); m];
        let mut bupper_s = vec![T::zero(); m];

        for i in 0..m {
            let row = M.row_mut(i);
            A.row_into(i, row);
            solve_upper_transpose(R, row);

            let Mv = row.dot(&v);
            let norm = row.normalize();
            if norm == T::zero() {
                return Err(SolverError::ZeroConstraint(i));
            }
            scalings[i] = T::recip(norm);

            if lower_is_absent(blower[i]) {
                dlower[i] = T::neg_infinity();
                blower_s[i] = T::neg_infinity();
            } else {
                dlower[i] = (blower[i] + Mv) / norm;
                blower_s[i] = blower[i] / norm;
            }
            if upper_is_absent(bupper[i]) {
                dupper[i] = T::infinity();
                bupper_s[i] = T::infinity();
            } else {
                dupper[i] = (bupper[i] + Mv) / norm;
                bupper_s[i] = bupper[i] / norm;
            }

            // keep equalities exact after scaling
            if blower[i] == bupper[i] {
                dlower[i] = dupper[i];
                blower_s[i] = bupper_s[i];
            }
        }

        let obj_offset = -(v.sumsq() * (0.5).as_T());
        let prox = if eps_prox > T::zero() {
            let R = cholesky.R.clone();
            Some(ProxState::new(eps_prox, R, f, blower_s, bupper_s))
        } else {
            None
        };

        Ok(Self {
            H: H.clone(),
            f: f.to_vec(),
            A: A.clone(),
            blower: blower.to_vec(),
            bupper: bupper.to_vec(),
            n,
            m,
            bin_ids: bin_ids.to_vec(),
            soft_ids: Vec::new(),
            cholesky,
            v,
            scalings,
            M,
            dlower,
            dupper,
            obj_offset,
            eps_prox,
            prox,
        })
    }

    /// Fresh least-distance workspace for this problem
    pub(crate) fn workspace(&self) -> Workspace<T> {
        let mut work = Workspace::new(
            self.M.clone(),
            self.dlower.clone(),
            self.dupper.clone(),
            self.n,
        );
        work.prox = self.prox.clone();
        work
    }

    /// Check soft constraint ids against the problem
    pub(crate) fn check_soft_ids(&self, soft_ids: &[usize]) -> Result<(), SolverError> {
        for &id in soft_ids {
            if id >= self.m {
                return Err(SolverError::BadSoftId(id));
            }
            if self.bin_ids.contains(&id) {
                return Err(SolverError::SoftBinary(id));
            }
        }
        Ok(())
    }

    /// Map a least-distance point back to `x = R⁻¹(u - v)`.  A shift
    /// other than the setup one is passed as `v`.
    pub(crate) fn recover_x(&self, x: &mut [T], u: &[T], v: Option<&[T]>) {
        let v = v.unwrap_or(&self.v);
        x.waxpby(T::one(), u, -T::one(), v);
        solve_upper(&self.cholesky.R, x);
    }

    /// User objective from a least-distance objective
    pub(crate) fn objective(&self, fval: T) -> T {
        fval + self.obj_offset
    }

    /// ½ xᵀHx + fᵀx evaluated directly
    pub fn eval_objective(&self, x: &[T]) -> T {
        self.H.quad_form(x, x) * (0.5).as_T() + self.f.dot(x)
    }
}

fn check_dimensions<T: FloatT>(
    H: &Matrix<T>,
    f: &[T],
    A: &Matrix<T>,
    blower: &[T],
    bupper: &[T],
    bin_ids: &[usize],
) -> Result<(), SolverError> {
    let n = H.nrows();
    let m = blower.len();

    if !H.is_square() {
        return Err(SolverError::IncompatibleDimension("H must be square"));
    }
    if f.len() != n {
        return Err(SolverError::IncompatibleDimension("f and H"));
    }
    if A.nrows() != m || (m > 0 && A.ncols() != n) {
        return Err(SolverError::IncompatibleDimension("A and H or bounds"));
    }
    if bupper.len() != m {
        return Err(SolverError::IncompatibleDimension("blower and bupper"));
    }
    for (i, (&lo, &hi)) in blower.iter().zip(bupper.iter()).enumerate() {
        // also catches NaN
        if !(lo <= hi) {
            return Err(SolverError::InconsistentBounds(i));
        }
    }

    let mut seen = vec![false; m];
    for &id in bin_ids {
        if id >= m {
            return Err(SolverError::BadBinaryId(id));
        }
        if seen[id] {
            return Err(SolverError::DuplicateBinaryId(id));
        }
        seen[id] = true;
        if lower_is_absent(blower[id]) || upper_is_absent(bupper[id]) {
            return Err(SolverError::UnboundedBinary(id));
        }
    }
    Ok(())
}
