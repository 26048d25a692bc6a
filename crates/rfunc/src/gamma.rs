//! Gamma response: `A P(n, t/a)` with `P` the regularised lower incomplete
//! gamma function.

use aquifer_params::Parameter;
use statrs::distribution::{ContinuousCDF, Gamma};
use statrs::function::gamma::gamma_lr;

use crate::error::RfuncError;

pub(crate) const NAMES: &[&str] = &["A", "n", "a"];

pub(crate) fn shape_defaults() -> Vec<Parameter> {
    vec![
        Parameter::new("n", 1.0, 0.01, 100.0),
        Parameter::new("a", 10.0, 0.01, 5000.0),
    ]
}

pub(crate) fn check(p: &[f64]) -> Result<(), RfuncError> {
    crate::require_positive("n", p[1])?;
    crate::require_positive("a", p[2])
}

pub(crate) fn step(p: &[f64], t: &[f64]) -> Vec<f64> {
    let (gain, n, a) = (p[0], p[1], p[2]);
    t.iter()
        .map(|&t| if t <= 0.0 { 0.0 } else { gain * gamma_lr(n, t / a) })
        .collect()
}

pub(crate) fn duration(p: &[f64], cutoff: f64) -> Result<f64, RfuncError> {
    let dist = Gamma::new(p[1], 1.0).map_err(|e| RfuncError::SpecialFunction(e.to_string()))?;
    Ok(p[2] * dist.inverse_cdf(cutoff))
}
