// package together all of the following and re-export
// in a partially flattened structure :
// : incremental LDLᵀ factorization of the working set
// : least-distance workspace and active-set iteration
// : proximal-point outer iterations
// : branch-and-bound and hierarchical drivers
// : user settings and traits

pub mod bnb;
pub mod traits;

pub(crate) mod activeset;
pub(crate) mod factorization;
pub(crate) mod hierarchical;
pub(crate) mod prox;
pub(crate) mod workspace;

pub use factorization::LDLError;
pub use workspace::{BoundSide, WarmStartEntry};

//partially flatten top level pieces

mod settings;
mod solver;
pub use settings::*;
pub use solver::*;
