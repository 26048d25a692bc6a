//! The bounded least-squares solver contract.

use ndarray::Array2;

use crate::error::SolveError;

/// Residual vector of a candidate parameter vector.
///
/// Returns `None` when the candidate cannot be evaluated; solvers treat such
/// points as infinitely bad rather than aborting.
pub type ResidualFn<'a> = dyn Fn(&[f64]) -> Option<Vec<f64>> + 'a;

/// Result of one minimisation.
#[derive(Clone, Debug)]
pub struct SolverOutput {
    /// Best parameter vector found (external, bounded space).
    pub x: Vec<f64>,
    /// `true` when the solver met its convergence criterion.
    pub success: bool,
    /// Sum of squared residuals at `x`.
    pub cost: f64,
    /// Iterations performed.
    pub iterations: u64,
    /// Jacobian of the residual vector at `x` (`n_residuals x n_params`),
    /// when the solver provides one.
    pub jacobian: Option<Array2<f64>>,
}

/// A minimiser of `sum(r(x)^2)` subject to box bounds.
pub trait LeastSquaresSolver {
    /// Short identifier for logs and results.
    fn name(&self) -> &'static str;

    /// Minimises the sum of squared residuals starting from `x0`, keeping
    /// every component of `x` inside its `(pmin, pmax)` bound.
    ///
    /// Failing to converge is reported through [`SolverOutput::success`];
    /// an `Err` is reserved for unusable input.
    fn minimize(
        &self,
        residuals: &ResidualFn<'_>,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<SolverOutput, SolveError>;
}

/// Sum of squares, or `None` when any term is not finite.
pub(crate) fn sum_of_squares(r: &[f64]) -> Option<f64> {
    let s: f64 = r.iter().map(|v| v * v).sum();
    s.is_finite().then_some(s)
}

/// Forward-difference Jacobian of `residuals` at `x`.
///
/// Steps that would leave the feasible box are taken backwards instead.
/// Returns `None` if any evaluation fails.
pub fn finite_difference_jacobian(
    residuals: &ResidualFn<'_>,
    x: &[f64],
    bounds: &[(f64, f64)],
) -> Option<Array2<f64>> {
    let r0 = residuals(x)?;
    let mut jac = Array2::zeros((r0.len(), x.len()));
    let mut xp = x.to_vec();
    for (j, &xj) in x.iter().enumerate() {
        let (_, hi) = bounds[j];
        let mut h = f64::EPSILON.sqrt() * xj.abs().max(1.0);
        if xj + h > hi {
            h = -h;
        }
        xp[j] = xj + h;
        let rp = residuals(&xp)?;
        xp[j] = xj;
        if rp.len() != r0.len() {
            return None;
        }
        for (i, (a, b)) in rp.iter().zip(&r0).enumerate() {
            jac[[i, j]] = (a - b) / h;
        }
    }
    jac.iter().all(|v| v.is_finite()).then_some(jac)
}
