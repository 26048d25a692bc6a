//! Four-parameter response: the step response is the normalised integral of
//! `tau^(n-1) exp(-tau/a - a b / tau)`.
//!
//! There is no closed form, so the cumulative curve is integrated on a
//! log-spaced grid in `u = tau / a` and interpolated.

use aquifer_params::Parameter;

use crate::error::RfuncError;

pub(crate) const NAMES: &[&str] = &["A", "n", "a", "b"];

const INTERVALS: usize = 4000;
const LOG_TAIL: f64 = 40.0;
const WALK: f64 = 0.25;
const MAX_SPAN: f64 = 700.0;

pub(crate) fn shape_defaults() -> Vec<Parameter> {
    vec![
        Parameter::new("n", 1.0, -10.0, 10.0),
        Parameter::new("a", 10.0, 0.01, 5000.0),
        Parameter::new("b", 10.0, 1e-6, 25.0),
    ]
}

pub(crate) fn check(p: &[f64]) -> Result<(), RfuncError> {
    crate::require_positive("a", p[2])?;
    if p[3] < 0.0 {
        return Err(RfuncError::NonPositiveParameter {
            name: "b",
            value: p[3],
        });
    }
    if p[3] == 0.0 {
        // Without the b/u term the integrand is only integrable at 0 for n > 0.
        crate::require_positive("n", p[1])?;
    }
    Ok(())
}

/// Normalised cumulative curve over `s = ln(u)`.
struct Curve {
    s_lo: f64,
    ds: f64,
    cum: Vec<f64>,
}

impl Curve {
    fn new(n: f64, b: f64) -> Self {
        let h = |s: f64| n * s - s.exp() - b * (-s).exp();
        let s_peak = ((n + (n * n + 4.0 * b).sqrt()) / 2.0).ln();
        let h_max = h(s_peak);

        let mut s_lo = s_peak;
        while h_max - h(s_lo) < LOG_TAIL && s_peak - s_lo < MAX_SPAN {
            s_lo -= WALK;
        }
        let mut s_hi = s_peak;
        while h_max - h(s_hi) < LOG_TAIL && s_hi - s_peak < MAX_SPAN {
            s_hi += WALK;
        }

        let ds = (s_hi - s_lo) / INTERVALS as f64;
        let f: Vec<f64> = (0..=INTERVALS)
            .map(|i| (h(s_lo + i as f64 * ds) - h_max).exp())
            .collect();
        let mut cum = Vec::with_capacity(INTERVALS + 1);
        cum.push(0.0);
        let mut acc = 0.0;
        for w in f.windows(2) {
            acc += 0.5 * (w[0] + w[1]) * ds;
            cum.push(acc);
        }
        if acc > 0.0 {
            cum.iter_mut().for_each(|c| *c /= acc);
        }
        Self { s_lo, ds, cum }
    }

    fn at(&self, s: f64) -> f64 {
        let x = (s - self.s_lo) / self.ds;
        if x <= 0.0 {
            return 0.0;
        }
        if x >= INTERVALS as f64 {
            return 1.0;
        }
        let i = x.floor() as usize;
        let frac = x - i as f64;
        self.cum[i] + frac * (self.cum[i + 1] - self.cum[i])
    }

    fn inverse(&self, level: f64) -> f64 {
        let i = self.cum.partition_point(|&c| c < level);
        if i == 0 {
            return self.s_lo;
        }
        if i > INTERVALS {
            return self.s_lo + INTERVALS as f64 * self.ds;
        }
        let (c0, c1) = (self.cum[i - 1], self.cum[i]);
        let frac = if c1 > c0 { (level - c0) / (c1 - c0) } else { 1.0 };
        self.s_lo + (i as f64 - 1.0 + frac) * self.ds
    }
}

pub(crate) fn step(p: &[f64], t: &[f64]) -> Vec<f64> {
    let (gain, n, a, b) = (p[0], p[1], p[2], p[3]);
    let curve = Curve::new(n, b);
    t.iter()
        .map(|&t| {
            if t <= 0.0 {
                0.0
            } else {
                gain * curve.at((t / a).ln())
            }
        })
        .collect()
}

pub(crate) fn duration(p: &[f64], cutoff: f64) -> Result<f64, RfuncError> {
    let (n, a, b) = (p[1], p[2], p[3]);
    let curve = Curve::new(n, b);
    Ok(a * curve.inverse(cutoff).exp())
}
