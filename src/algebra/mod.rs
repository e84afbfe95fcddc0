//! DAQP linear algebra routines
//!
//! This module provides the dense linear algebra used by the solver:
//! a column major [`Matrix`](crate::algebra::Matrix) type, vector
//! operations on slices of [`FloatT`](crate::algebra::FloatT) and a small
//! set of triangular solves and factorizations.   No external BLAS or
//! LAPACK library is required.

//Rust hates greek characters
#![allow(confusable_idents)]

mod error_types;
mod floats;
mod math_traits;
mod scalarmath;
mod vecmath;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub(crate) use scalarmath::*;

mod dense;
pub use dense::*;
