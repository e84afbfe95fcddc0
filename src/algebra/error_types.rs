use thiserror::Error;

/// Error type returned by dense matrix construction and factorization routines.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    /// Indicates inputs have incompatible dimension
    IncompatibleDimension,
    #[error("Cholesky factorization failed at column {0} (matrix not positive definite)")]
    /// Non-positive pivot encountered in the given column
    Cholesky(usize),
}
