//! Parameter covariance from the residual Jacobian.

use nalgebra::DMatrix;
use ndarray::Array2;

/// `s^2 (J^T J)^+` with `s^2 = sse / (n - k)`.
///
/// The pseudo-inverse drops eigenvalues below `k * eps * max_eigenvalue`, so
/// unidentifiable directions yield zero variance instead of blowing up.
/// Returns `None` when `n <= k`, the Jacobian is degenerate, or `sse` is not
/// finite.
pub fn covariance(jacobian: &Array2<f64>, sse: f64) -> Option<DMatrix<f64>> {
    let (n, k) = jacobian.dim();
    if n <= k || k == 0 || !sse.is_finite() {
        return None;
    }
    let s2 = sse / (n - k) as f64;
    let jtj = DMatrix::from_fn(k, k, |a, b| jacobian.column(a).dot(&jacobian.column(b)));
    let eig = jtj.symmetric_eigen();
    let max = eig.eigenvalues.iter().cloned().fold(0.0, f64::max);
    if max.is_nan() || max <= 0.0 {
        return None;
    }
    let tol = max * k as f64 * f64::EPSILON;
    let mut cov = DMatrix::zeros(k, k);
    for (i, &lambda) in eig.eigenvalues.iter().enumerate() {
        if lambda > tol {
            let v = eig.eigenvectors.column(i);
            cov += (&v * v.transpose()) / lambda;
        }
    }
    let cov = cov * s2;
    cov.iter().all(|v| v.is_finite()).then_some(cov)
}

/// Correlation matrix of a covariance matrix; entries with zero variance
/// are NaN.
pub fn correlation(cov: &DMatrix<f64>) -> DMatrix<f64> {
    let sd: Vec<f64> = cov.diagonal().iter().map(|v| v.max(0.0).sqrt()).collect();
    DMatrix::from_fn(cov.nrows(), cov.ncols(), |i, j| {
        let denom = sd[i] * sd[j];
        if denom > 0.0 {
            cov[(i, j)] / denom
        } else {
            f64::NAN
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn ordinary_least_squares_covariance() {
        // Straight line through x = 0, 1, 2, 3; J = -[1, x].
        let j = array![[-1.0, 0.0], [-1.0, -1.0], [-1.0, -2.0], [-1.0, -3.0]];
        let sse = 2.0;
        let cov = covariance(&j, sse).unwrap();
        // (X^T X)^-1 = [[7, -3], [-3, 2]] / 10, s^2 = 2 / 2.
        assert_relative_eq!(cov[(0, 0)], 0.7, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], -0.3, epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 1)], 0.2, epsilon = 1e-12);

        let corr = correlation(&cov);
        assert_relative_eq!(corr[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(corr[(0, 1)], -0.3 / (0.7f64 * 0.2).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn too_few_residuals() {
        let j = array![[1.0, 0.0], [0.0, 1.0]];
        assert!(covariance(&j, 1.0).is_none());
    }

    #[test]
    fn zero_jacobian() {
        let j = Array2::zeros((5, 2));
        assert!(covariance(&j, 1.0).is_none());
    }

    #[test]
    fn rank_deficient_uses_pseudo_inverse() {
        // Second column duplicates the first.
        let j = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let cov = covariance(&j, 1.0).unwrap();
        assert!(cov.iter().all(|v| v.is_finite()));
        assert_relative_eq!(cov[(0, 0)], cov[(1, 1)], epsilon = 1e-12);
    }
}
