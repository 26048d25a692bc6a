//! Polder response for drainage to a river or ditch, normalised so the
//! gain equals `A`.
//!
//! With `x = sqrt(b)` and `y = sqrt(t/a)` the normalised step response is
//! `0.5 [exp(4x) erfc(x/y + y) + erfc(x/y - y)]`.

use aquifer_params::Parameter;

use crate::error::RfuncError;
use crate::special::erfc;

pub(crate) const NAMES: &[&str] = &["A", "a", "b"];

const MAX_BISECTIONS: usize = 200;

pub(crate) fn shape_defaults() -> Vec<Parameter> {
    vec![
        Parameter::new("a", 10.0, 0.01, 1000.0),
        Parameter::new("b", 1.0, 1e-6, 25.0),
    ]
}

pub(crate) fn check(p: &[f64]) -> Result<(), RfuncError> {
    crate::require_positive("a", p[1])?;
    crate::require_positive("b", p[2])
}

/// `exp(shift) * erfc(z)` without overflow for large `shift` and `z`.
fn scaled_erfc(shift: f64, z: f64) -> f64 {
    if z < 25.0 {
        return (shift + erfc(z).ln()).exp();
    }
    let z2 = z * z;
    (shift - z2).exp() / (z * std::f64::consts::PI.sqrt()) * (1.0 - 0.5 / z2)
}

fn normalised(x: f64, a: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let y = (t / a).sqrt();
    0.5 * (scaled_erfc(4.0 * x, x / y + y) + erfc(x / y - y))
}

pub(crate) fn step(p: &[f64], t: &[f64]) -> Vec<f64> {
    let (gain, a, b) = (p[0], p[1], p[2]);
    let x = b.sqrt();
    t.iter().map(|&t| gain * normalised(x, a, t)).collect()
}

pub(crate) fn duration(p: &[f64], cutoff: f64) -> Result<f64, RfuncError> {
    let (a, b) = (p[1], p[2]);
    let x = b.sqrt();
    let mut lo = 0.0;
    let mut hi = a;
    let mut doublings = 0;
    while normalised(x, a, hi) < cutoff {
        lo = hi;
        hi *= 2.0;
        doublings += 1;
        if doublings > 1000 || !hi.is_finite() {
            return Err(RfuncError::SpecialFunction(format!(
                "polder step never reaches cutoff {cutoff} (a={a}, b={b})"
            )));
        }
    }
    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if normalised(x, a, mid) >= cutoff {
            hi = mid;
        } else {
            lo = mid;
        }
        if hi - lo <= 1e-10 * hi {
            break;
        }
    }
    Ok(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalised_step_limits() {
        let x = 1.0;
        assert_eq!(normalised(x, 10.0, 0.0), 0.0);
        assert!(normalised(x, 10.0, 1e-3) < 1e-12);
        assert!((normalised(x, 10.0, 1e7) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn step_is_monotone() {
        let p = [1.0, 20.0, 4.0];
        let t: Vec<f64> = (1..3000).map(f64::from).collect();
        let s = step(&p, &t);
        assert!(s.windows(2).all(|w| w[1] >= w[0] - 1e-12));
    }

    #[test]
    fn duration_brackets_cutoff() {
        let p = [1.0, 20.0, 4.0];
        let t = duration(&p, 0.999).unwrap();
        assert!(step(&p, &[t])[0] >= 0.999);
        assert!(step(&p, &[t * 0.99])[0] < 0.999);
    }

    #[test]
    fn large_b_does_not_overflow() {
        let s = step(&[1.0, 10.0, 1e4], &[1e3, 1e5, 1e7]);
        assert!(s.iter().all(|v| v.is_finite()));
    }
}
