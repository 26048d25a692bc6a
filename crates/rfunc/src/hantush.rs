//! Hantush response for a well in a leaky aquifer, normalised so the gain
//! equals `A`.
//!
//! The well function is evaluated with the exponential-integral
//! approximation of Veling & Maas; `tau = t / cS` and `rho = r / lambda`.

use aquifer_params::Parameter;

use crate::error::RfuncError;
use crate::special::{bessel_k0, exp1, lambert_w0};

pub(crate) const NAMES: &[&str] = &["A", "rho", "cS"];

pub(crate) fn shape_defaults() -> Vec<Parameter> {
    vec![
        Parameter::new("rho", 1.0, 1e-4, 10.0),
        Parameter::new("cS", 100.0, 1e-3, 1e4),
    ]
}

pub(crate) fn check(p: &[f64]) -> Result<(), RfuncError> {
    crate::require_positive("rho", p[1])?;
    crate::require_positive("cS", p[2])
}

pub(crate) fn step(p: &[f64], t: &[f64]) -> Vec<f64> {
    let (gain, rho, cs) = (p[0], p[1], p[2]);
    let k0 = bessel_k0(rho);
    let e_rho = exp1(rho);
    let w = (e_rho - k0) / (e_rho - exp1(rho / 2.0));
    let r2 = rho * rho / 4.0;
    t.iter()
        .map(|&t| {
            if t <= 0.0 {
                return 0.0;
            }
            let tau = t / cs;
            let tail = exp1(tau + r2 / tau);
            let f = if tau < rho / 2.0 {
                w * exp1(r2 / tau) - (w - 1.0) * tail
            } else {
                2.0 * k0 - w * exp1(tau) + (w - 1.0) * tail
            };
            gain * f / (2.0 * k0)
        })
        .collect()
}

pub(crate) fn duration(p: &[f64], cutoff: f64) -> Result<f64, RfuncError> {
    let (rho, cs) = (p[1], p[2]);
    let k0 = bessel_k0(rho);
    Ok(cs * lambert_w0(1.0 / ((1.0 - cutoff) * k0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_monotone_and_bounded() {
        let p = [1.0, 0.5, 50.0];
        let t: Vec<f64> = (1..2000).map(f64::from).collect();
        let s = step(&p, &t);
        assert!(s.windows(2).all(|w| w[1] >= w[0] - 1e-12));
        assert!(s.iter().all(|&v| (0.0..=1.0 + 1e-9).contains(&v)));
    }

    #[test]
    fn duration_reaches_cutoff() {
        for &rho in &[0.01, 0.5, 2.0, 5.0] {
            let p = [1.0, rho, 100.0];
            let t = duration(&p, 0.999).unwrap();
            let s = step(&p, &[t])[0];
            assert!(s >= 0.999 - 1e-6, "rho={rho}: step at duration {s}");
        }
    }
}
