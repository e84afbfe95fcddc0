//! DAQP solver main module.
//!
//! This module contains the main types and traits for the DAQP solver.
//!
//! The solver comes with a [default implementation](crate::solver::implementations::default)
//! for dense quadratic programs in the format described in the top level
//! [API page](crate).   Internally every problem is reduced to a
//! least-distance problem and solved by a dual active-set iteration over
//! an incrementally updated LDLᵀ factorization of the working set, with
//! branch-and-bound over binary constraints on top.

pub(crate) const _INFINITY_DEFAULT: f64 = 1e20;
// internal module structure
pub(crate) mod core;
pub mod implementations;
pub(crate) mod utils;

//Here we expose only part of the solver internals
//and rearrange public modules a bit to give a more
//user friendly API

pub use crate::solver::utils::infbounds::{default_infinity, get_infinity, set_infinity};

//user facing status and error types
pub use crate::solver::core::{BoundSide, LDLError, SettingsError, SolverStatus, WarmStartEntry};

//branch-and-bound configuration and progress reporting
pub use crate::solver::core::bnb;
pub use crate::solver::core::bnb::{BranchingRule, NodeReport, NodeSelection, NodeStatus};

//user facing traits required to define new implementations
pub use crate::solver::core::traits;
pub use crate::solver::core::CoreSettings;

pub use crate::solver::implementations::default;
pub use crate::solver::implementations::default::*;
