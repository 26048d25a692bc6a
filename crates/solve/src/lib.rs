//! # aquifer-solve
//!
//! Calibrates an [`aquifer_model::Model`]: assembles the free parameters,
//! minimises the (noise-weighted) sum of squared residuals with a pluggable
//! bounded least-squares solver, estimates the parameter covariance and
//! reports goodness-of-fit statistics.
//!
//! ```mermaid
//! graph LR
//!     M["Model"] -->|"free parameters, bounds"| S["LeastSquaresSolver"]
//!     S -->|"x, Jacobian"| C["covariance s^2 (J^T J)^+"]
//!     S --> R["FitResult"]
//!     C --> R
//!     R -->|"fit(): write back on success"| M
//! ```
//!
//! The default solver, [`NelderMeadSolver`], runs `argmin`'s Nelder-Mead in
//! an unconstrained space obtained through [`BoundTransform`] and estimates
//! the residual Jacobian at the optimum by finite differences.

mod bounds;
mod covariance;
mod error;
mod fit;
mod nelder_mead;
mod solver;

pub use bounds::BoundTransform;
pub use covariance::{correlation, covariance};
pub use error::SolveError;
pub use fit::{FitOptions, FitResult, calibrate, fit};
pub use nelder_mead::NelderMeadSolver;
pub use solver::{LeastSquaresSolver, ResidualFn, SolverOutput, finite_difference_jacobian};
