//! Goodness-of-fit diagnostics comparing observed and simulated heads.

use serde::{Deserialize, Serialize};

use crate::{pearson_correlation, population_variance, sum_of_squares};

/// Root mean squared error of a residual series. Returns NaN if empty.
pub fn rmse(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return f64::NAN;
    }
    (sum_of_squares(residuals) / residuals.len() as f64).sqrt()
}

/// Explained variance percentage: `max(0, 1 - var(res) / var(obs)) * 100`.
///
/// Returns NaN when the observations have zero variance.
pub fn evp(observed: &[f64], residuals: &[f64]) -> f64 {
    let var_obs = population_variance(observed);
    if var_obs == 0.0 {
        return f64::NAN;
    }
    (1.0 - population_variance(residuals) / var_obs).max(0.0) * 100.0
}

/// Nash-Sutcliffe efficiency: `1 - SSE / Σ(obs - mean(obs))²`.
pub fn nse(observed: &[f64], residuals: &[f64]) -> f64 {
    let m = crate::mean(observed);
    let denom: f64 = observed.iter().map(|o| (o - m) * (o - m)).sum();
    if denom == 0.0 {
        return f64::NAN;
    }
    1.0 - sum_of_squares(residuals) / denom
}

/// Akaike information criterion for a least-squares fit with `k` free parameters.
pub fn aic(sse: f64, n: usize, k: usize) -> f64 {
    let nf = n as f64;
    nf * (sse / nf).ln() + 2.0 * k as f64
}

/// Bayesian information criterion for a least-squares fit with `k` free parameters.
pub fn bic(sse: f64, n: usize, k: usize) -> f64 {
    let nf = n as f64;
    nf * (sse / nf).ln() + k as f64 * nf.ln()
}

/// Summary diagnostics of a calibrated model over its calibration window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    /// Number of observations used.
    pub n_observations: usize,
    /// Number of free (optimised) parameters.
    pub n_parameters: usize,
    /// Root mean squared error of the residuals.
    #[serde(with = "crate::float_serde")]
    pub rmse: f64,
    /// Explained variance percentage.
    #[serde(with = "crate::float_serde")]
    pub evp: f64,
    /// Nash-Sutcliffe efficiency.
    #[serde(with = "crate::float_serde")]
    pub nse: f64,
    /// Squared Pearson correlation between observed and simulated heads.
    #[serde(with = "crate::float_serde")]
    pub r2: f64,
    /// Akaike information criterion of the objective.
    #[serde(with = "crate::float_serde")]
    pub aic: f64,
    /// Bayesian information criterion of the objective.
    #[serde(with = "crate::float_serde")]
    pub bic: f64,
}

impl FitStatistics {
    /// Computes the diagnostics from paired observed/simulated heads.
    ///
    /// `objective` is the weighted sum of squares minimised by the
    /// calibration (innovations when a noise model was used); the
    /// information criteria are computed from it, the remaining metrics
    /// from the plain residuals.
    pub fn compute(observed: &[f64], simulated: &[f64], objective: f64, n_parameters: usize) -> Self {
        let residuals: Vec<f64> = observed
            .iter()
            .zip(simulated.iter())
            .map(|(o, s)| o - s)
            .collect();
        let n = residuals.len();
        let r2 = pearson_correlation(observed, simulated).map_or(f64::NAN, |r| r * r);

        Self {
            n_observations: n,
            n_parameters,
            rmse: rmse(&residuals),
            evp: evp(observed, &residuals),
            nse: nse(observed, &residuals),
            r2,
            aic: aic(objective, n, n_parameters),
            bic: bic(objective, n, n_parameters),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rmse_basic() {
        assert_relative_eq!(rmse(&[3.0, -4.0]), (12.5_f64).sqrt(), epsilon = 1e-12);
        assert!(rmse(&[]).is_nan());
    }

    #[test]
    fn perfect_fit_metrics() {
        let obs = [1.0, 2.0, 4.0, 3.0, 5.0];
        let res = [0.0; 5];
        assert_relative_eq!(evp(&obs, &res), 100.0);
        assert_relative_eq!(nse(&obs, &res), 1.0);
    }

    #[test]
    fn evp_clamped_at_zero() {
        let obs = [1.0, 1.1, 0.9, 1.0];
        let res = [5.0, -5.0, 5.0, -5.0];
        assert_eq!(evp(&obs, &res), 0.0);
    }

    #[test]
    fn constant_observations_give_nan() {
        let obs = [2.0, 2.0, 2.0];
        assert!(evp(&obs, &[0.1, 0.0, -0.1]).is_nan());
        assert!(nse(&obs, &[0.1, 0.0, -0.1]).is_nan());
    }

    #[test]
    fn information_criteria_penalise_parameters() {
        let a2 = aic(10.0, 100, 2);
        let a3 = aic(10.0, 100, 3);
        assert_relative_eq!(a3 - a2, 2.0, epsilon = 1e-12);
        let b2 = bic(10.0, 100, 2);
        let b3 = bic(10.0, 100, 3);
        assert_relative_eq!(b3 - b2, (100.0_f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn fit_statistics_compute() {
        let obs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sim = [1.1, 1.9, 3.0, 4.2, 4.9];
        let res: Vec<f64> = obs.iter().zip(sim.iter()).map(|(o, s)| o - s).collect();
        let sse: f64 = res.iter().map(|r| r * r).sum();
        let stats = FitStatistics::compute(&obs, &sim, sse, 2);
        assert_eq!(stats.n_observations, 5);
        assert_eq!(stats.n_parameters, 2);
        assert_relative_eq!(stats.rmse, (sse / 5.0).sqrt(), epsilon = 1e-12);
        assert!(stats.r2 > 0.98 && stats.r2 <= 1.0, "r2 = {}", stats.r2);
        assert!(stats.nse > 0.98, "nse = {}", stats.nse);
    }

    #[test]
    fn perfect_fit_statistics_survive_json() {
        let stats = FitStatistics::compute(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0], 0.0, 2);
        assert_eq!(stats.aic, f64::NEG_INFINITY);
        let json = serde_json::to_string(&stats).unwrap();
        let back: FitStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn fit_statistics_serde_round_trip() {
        let stats = FitStatistics::compute(&[1.0, 2.0, 3.0], &[1.0, 2.1, 2.9], 0.02, 1);
        let json = serde_json::to_string(&stats).unwrap();
        let back: FitStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, back);
    }
}
