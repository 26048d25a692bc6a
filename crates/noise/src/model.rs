//! Noise model variants and the residual-to-innovation transform.

use aquifer_params::{Parameter, ParameterSet};
use aquifer_series::TimeSeries;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NoiseError;

/// Prefix of the noise parameter names.
pub const NOISE_PREFIX: &str = "noise";

/// Kind of autoregressive noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// First-order autoregressive noise in continuous time, parameter
    /// `alpha` (decay time, days).
    Ar1,
    /// ARMA(1,1) in continuous time, parameters `alpha` and `beta`.
    Arma11,
}

impl NoiseKind {
    /// Identifier used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseKind::Ar1 => "ar1",
            NoiseKind::Arma11 => "arma11",
        }
    }

    fn param_names(&self) -> &'static [&'static str] {
        match self {
            NoiseKind::Ar1 => &["alpha"],
            NoiseKind::Arma11 => &["alpha", "beta"],
        }
    }
}

/// Residuals transformed into (approximately) independent innovations.
#[derive(Clone, Debug, PartialEq)]
pub struct Innovations {
    /// Observation times.
    pub times: Vec<f64>,
    /// Innovations `v_i`.
    pub values: Vec<f64>,
    /// Per-innovation weights `w_i`.
    pub weights: Vec<f64>,
}

impl Innovations {
    /// `w_i v_i`, the vector whose sum of squares is the objective.
    pub fn weighted(&self) -> Vec<f64> {
        self.values
            .iter()
            .zip(&self.weights)
            .map(|(v, w)| v * w)
            .collect()
    }

    /// Number of innovations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when there are no innovations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A noise model with its own parameters.
///
/// The sum of squared weighted innovations approximates a negative
/// log-likelihood under correlated residuals. Objectives computed with and
/// without a noise model (or with different noise models) are not directly
/// comparable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    kind: NoiseKind,
    parameters: ParameterSet,
}

impl NoiseModel {
    /// A noise model of `kind` with default parameters.
    pub fn new(kind: NoiseKind) -> Self {
        let params = match kind {
            NoiseKind::Ar1 => vec![Parameter::new("alpha", 14.0, 1e-5, 5000.0)],
            NoiseKind::Arma11 => vec![
                Parameter::new("alpha", 14.0, 1e-5, 5000.0),
                Parameter::new("beta", 1.0, 1e-5, 5000.0),
            ],
        };
        Self {
            kind,
            parameters: params
                .into_iter()
                .map(|p| p.prefixed(NOISE_PREFIX))
                .collect(),
        }
    }

    /// AR(1) noise model.
    pub fn ar1() -> Self {
        Self::new(NoiseKind::Ar1)
    }

    /// ARMA(1,1) noise model.
    pub fn arma11() -> Self {
        Self::new(NoiseKind::Arma11)
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    pub fn n_params(&self) -> usize {
        self.kind.param_names().len()
    }

    fn check(&self, p: &[f64]) -> Result<(), NoiseError> {
        if p.len() != self.n_params() {
            return Err(NoiseError::ParameterCount {
                expected: self.n_params(),
                got: p.len(),
            });
        }
        for (&name, &value) in self.kind.param_names().iter().zip(p) {
            if value <= 0.0 {
                return Err(NoiseError::NonPositiveParameter { name, value });
            }
        }
        Ok(())
    }

    /// Transforms a residual series into innovations and weights.
    pub fn transform(&self, p: &[f64], residuals: &TimeSeries) -> Result<Innovations, NoiseError> {
        self.transform_values(p, residuals.times(), residuals.values())
    }

    /// Transforms residuals at strictly increasing `times`.
    ///
    /// The decay uses elapsed time, not the step count, so irregular
    /// sampling is honoured exactly. The first innovation equals the first
    /// residual. With fewer than two residuals the residuals are returned
    /// with unit weights.
    pub fn transform_values(
        &self,
        p: &[f64],
        times: &[f64],
        residuals: &[f64],
    ) -> Result<Innovations, NoiseError> {
        if times.len() != residuals.len() {
            return Err(NoiseError::LengthMismatch {
                times: times.len(),
                values: residuals.len(),
            });
        }
        self.check(p)?;
        let n = residuals.len();
        if n < 2 {
            debug!(n, "too few residuals for the noise recursion, returning them unweighted");
            return Ok(Innovations {
                times: times.to_vec(),
                values: residuals.to_vec(),
                weights: vec![1.0; n],
            });
        }

        let alpha = p[0];
        let mut values = Vec::with_capacity(n);
        values.push(residuals[0]);
        match self.kind {
            NoiseKind::Ar1 => {
                for i in 1..n {
                    let dt = times[i] - times[i - 1];
                    values.push(residuals[i] - (-dt / alpha).exp() * residuals[i - 1]);
                }
            }
            NoiseKind::Arma11 => {
                let beta = p[1];
                for i in 1..n {
                    let dt = times[i] - times[i - 1];
                    let v = residuals[i]
                        - (-dt / alpha).exp() * residuals[i - 1]
                        - (-dt / beta).exp() * values[i - 1];
                    values.push(v);
                }
            }
        }

        let weights = match self.kind {
            NoiseKind::Ar1 => ar1_weights(times, alpha),
            NoiseKind::Arma11 => vec![1.0; n],
        };
        Ok(Innovations {
            times: times.to_vec(),
            values,
            weights,
        })
    }
}

/// `w_i = N / sqrt(1 - exp(-2 dt_i / alpha))` with `w_0 = N`, where the
/// normaliser `N` makes the product of all weights one.
fn ar1_weights(times: &[f64], alpha: f64) -> Vec<f64> {
    let n = times.len();
    let log_terms: Vec<f64> = times
        .windows(2)
        .map(|w| (-(-2.0 * (w[1] - w[0]) / alpha).exp()).ln_1p())
        .collect();
    let norm = (log_terms.iter().sum::<f64>() / (2.0 * n as f64)).exp();
    std::iter::once(norm)
        .chain(log_terms.iter().map(|l| norm / (0.5 * l).exp()))
        .collect()
}
