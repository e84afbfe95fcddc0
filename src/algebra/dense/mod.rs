#![allow(non_snake_case)]

mod cholesky;
mod triangular;
mod types;

pub use cholesky::*;
pub use triangular::*;
pub use types::*;
