//! Bounded Nelder-Mead least squares on top of `argmin`.

use argmin::core::{CostFunction, Executor, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bounds::BoundTransform;
use crate::error::SolveError;
use crate::solver::{
    LeastSquaresSolver, ResidualFn, SolverOutput, finite_difference_jacobian, sum_of_squares,
};

/// Nelder-Mead simplex search in the unconstrained space of
/// [`BoundTransform`].
///
/// The initial simplex offsets every coordinate of the start point by
/// `initial_step * max(|u|, 1)`. Candidates whose residuals cannot be
/// evaluated cost `f64::MAX`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadSolver {
    max_iters: u64,
    sd_tolerance: f64,
    initial_step: f64,
    jacobian: bool,
}

impl Default for NelderMeadSolver {
    fn default() -> Self {
        Self {
            max_iters: 5000,
            sd_tolerance: 1e-10,
            initial_step: 0.05,
            jacobian: true,
        }
    }
}

impl NelderMeadSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iteration cap.
    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Convergence threshold on the standard deviation of the simplex costs.
    pub fn with_sd_tolerance(mut self, tol: f64) -> Self {
        self.sd_tolerance = tol;
        self
    }

    /// Relative size of the initial simplex.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Whether to estimate the Jacobian at the optimum.
    pub fn with_jacobian(mut self, jacobian: bool) -> Self {
        self.jacobian = jacobian;
        self
    }

    pub fn max_iters(&self) -> u64 {
        self.max_iters
    }

    pub fn sd_tolerance(&self) -> f64 {
        self.sd_tolerance
    }

    pub fn initial_step(&self) -> f64 {
        self.initial_step
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        if self.max_iters == 0 {
            return Err(SolveError::InvalidOptions(
                "max_iters must be at least 1".into(),
            ));
        }
        if !self.sd_tolerance.is_finite() || self.sd_tolerance <= 0.0 {
            return Err(SolveError::InvalidOptions(format!(
                "sd_tolerance must be positive, got {}",
                self.sd_tolerance
            )));
        }
        if !self.initial_step.is_finite() || self.initial_step <= 0.0 {
            return Err(SolveError::InvalidOptions(format!(
                "initial_step must be positive, got {}",
                self.initial_step
            )));
        }
        Ok(())
    }

    fn simplex(&self, u0: &[f64]) -> Vec<Vec<f64>> {
        let mut simplex = Vec::with_capacity(u0.len() + 1);
        simplex.push(u0.to_vec());
        for i in 0..u0.len() {
            let mut vertex = u0.to_vec();
            vertex[i] += self.initial_step * u0[i].abs().max(1.0);
            simplex.push(vertex);
        }
        simplex
    }
}

/// Sum of squared residuals over internal coordinates.
struct BoundedCost<'a, 'f> {
    residuals: &'a ResidualFn<'f>,
    transforms: &'a [BoundTransform],
}

impl BoundedCost<'_, '_> {
    fn external(&self, u: &[f64]) -> Vec<f64> {
        self.transforms
            .iter()
            .zip(u)
            .map(|(t, &u)| t.to_external(u))
            .collect()
    }
}

impl CostFunction for BoundedCost<'_, '_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, u: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let x = self.external(u);
        Ok((self.residuals)(&x)
            .and_then(|r| sum_of_squares(&r))
            .unwrap_or(f64::MAX))
    }
}

impl LeastSquaresSolver for NelderMeadSolver {
    fn name(&self) -> &'static str {
        "nelder_mead"
    }

    fn minimize(
        &self,
        residuals: &ResidualFn<'_>,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<SolverOutput, SolveError> {
        self.validate()?;
        if x0.len() != bounds.len() {
            return Err(SolveError::DimensionMismatch {
                x0: x0.len(),
                bounds: bounds.len(),
            });
        }
        if x0.is_empty() {
            return Err(SolveError::NoFreeParameters);
        }

        let transforms: Vec<BoundTransform> = bounds
            .iter()
            .map(|&(lo, hi)| BoundTransform::new(lo, hi))
            .collect();
        let u0: Vec<f64> = transforms
            .iter()
            .zip(x0)
            .map(|(t, &x)| t.to_internal(x))
            .collect();

        let cost = BoundedCost {
            residuals,
            transforms: &transforms,
        };
        let solver = NelderMead::new(self.simplex(&u0))
            .with_sd_tolerance(self.sd_tolerance)
            .map_err(|e| SolveError::Optimizer(e.to_string()))?;
        let result = Executor::new(cost, solver)
            .configure(|state| state.max_iters(self.max_iters))
            .run()
            .map_err(|e| SolveError::Optimizer(e.to_string()))?;

        let state = result.state();
        let u_best = state.best_param.clone().unwrap_or(u0);
        let success = matches!(
            state.termination_status,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
        let iterations = state.iter;
        let x: Vec<f64> = transforms
            .iter()
            .zip(&u_best)
            .map(|(t, &u)| t.to_external(u))
            .collect();
        let cost = residuals(&x)
            .and_then(|r| sum_of_squares(&r))
            .unwrap_or(f64::NAN);
        debug!(iterations, cost, success, "nelder-mead finished");

        let jacobian = if self.jacobian {
            finite_difference_jacobian(residuals, &x, bounds)
        } else {
            None
        };
        Ok(SolverOutput {
            x,
            success,
            cost,
            iterations,
            jacobian,
        })
    }
}
