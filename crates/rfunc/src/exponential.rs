//! Exponential response: `A (1 - exp(-t/a))`.

use aquifer_params::Parameter;

use crate::error::RfuncError;

pub(crate) const NAMES: &[&str] = &["A", "a"];

pub(crate) fn shape_defaults() -> Vec<Parameter> {
    vec![Parameter::new("a", 10.0, 0.01, 1000.0)]
}

pub(crate) fn check(p: &[f64]) -> Result<(), RfuncError> {
    crate::require_positive("a", p[1])
}

pub(crate) fn step(p: &[f64], t: &[f64]) -> Vec<f64> {
    let (gain, a) = (p[0], p[1]);
    t.iter().map(|&t| gain * -(-t / a).exp_m1()).collect()
}

pub(crate) fn duration(p: &[f64], cutoff: f64) -> Result<f64, RfuncError> {
    Ok(-p[1] * (-cutoff).ln_1p())
}
