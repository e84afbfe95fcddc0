//!  __DAQP.rs__ is a Rust implementation of a dual active-set solver for dense
//! convex quadratic programs, including mixed-integer programs with binary
//! constraints.  DAQP solves the following problem:
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T H x + f^T x\\\\\[2ex\]
//!  \text{subject to} & b_l \le Ax \le b_u \\\\\[1ex\]
//!         & (Ax)_i \in \\{ (b_l)_i, (b_u)_i \\}, \quad i \in \mathcal{B}
//!  \end{array}
//! $$
//!
//! with decision variables
//! $x \in \mathbb{R}^n$
//! and data matrices
//! $H=H^\top \succ 0$,
//! $f \in \mathbb{R}^n$,
//! $A \in \mathbb{R}^{m \times n}$ and
//! $b_l, b_u \in \mathbb{R}^m$.
//! Constraints in the index set $\mathcal{B}$ are binary.
//!
//! ## Features
//!
//! * __Least-distance reformulation__: The problem is transformed once into a least-distance
//!   problem using a Cholesky factor of $H$.  Each active-set iteration then only
//!   updates an LDLᵀ factorization of the active constraint rows, one row at a time.
//!
//! * __Branch and bound__: Binary constraints are handled by branch and bound, with depth
//!   first or best bound node selection.  Each node reuses the factorization of its parent
//!   whenever possible.
//!
//! * __Hierarchical solves__: Constraints can be introduced in priority levels.  The solver
//!   reports how many leading levels could be satisfied.
//!
//! # Example
//!
//! ```
//! use daqp::{algebra::*, solver::*};
//!
//! // minimize ½‖x‖² - x₀ - x₁  subject to  x₀ + x₁ ≤ 1
//! let H = Matrix::identity(2);
//! let f = [-1f64, -1.];
//! let A = Matrix::from(&[[1., 1.]]);
//!
//! let settings = DefaultSettingsBuilder::default()
//!     .verbose(false)
//!     .build()
//!     .unwrap();
//!
//! let mut solver = DefaultSolver::new(&H, &f, &A, &[-1e30], &[1.], &[], settings).unwrap();
//! solver.solve().unwrap();
//!
//! assert_eq!(solver.solution.status, SolverStatus::Solved);
//! assert!((solver.solution.x[0] - 0.5).abs() < 1e-9);
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod solver;
pub mod timers;
