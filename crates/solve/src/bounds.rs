//! Maps bounded parameters onto an unconstrained internal space.
//!
//! Two-sided bounds use `x = lo + (sin(u) + 1)(hi - lo)/2`, one-sided bounds
//! use `x = lo - 1 + sqrt(u^2 + 1)` (or its mirror for an upper bound).
//! Every internal value maps into the feasible interval, so an
//! unconstrained optimiser never proposes an out-of-bounds parameter.

/// Transform for one parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundTransform {
    /// No finite bound.
    Free,
    /// Finite lower bound only.
    Lower(f64),
    /// Finite upper bound only.
    Upper(f64),
    /// Both bounds finite.
    Both(f64, f64),
}

impl BoundTransform {
    /// Picks the transform for `[pmin, pmax]`; infinite bounds are treated
    /// as absent.
    pub fn new(pmin: f64, pmax: f64) -> Self {
        match (pmin.is_finite(), pmax.is_finite()) {
            (true, true) => BoundTransform::Both(pmin, pmax),
            (true, false) => BoundTransform::Lower(pmin),
            (false, true) => BoundTransform::Upper(pmax),
            (false, false) => BoundTransform::Free,
        }
    }

    /// Internal value of external `x`, which is first clamped into bounds.
    pub fn to_internal(&self, x: f64) -> f64 {
        match *self {
            BoundTransform::Free => x,
            BoundTransform::Lower(lo) => {
                let y = x.max(lo) - lo + 1.0;
                (y * y - 1.0).sqrt()
            }
            BoundTransform::Upper(hi) => {
                let y = hi - x.min(hi) + 1.0;
                (y * y - 1.0).sqrt()
            }
            BoundTransform::Both(lo, hi) => {
                let width = hi - lo;
                if width <= 0.0 {
                    return 0.0;
                }
                (2.0 * (x.clamp(lo, hi) - lo) / width - 1.0)
                    .clamp(-1.0, 1.0)
                    .asin()
            }
        }
    }

    /// External value of internal `u`.
    pub fn to_external(&self, u: f64) -> f64 {
        match *self {
            BoundTransform::Free => u,
            BoundTransform::Lower(lo) => lo - 1.0 + (u * u + 1.0).sqrt(),
            BoundTransform::Upper(hi) => hi + 1.0 - (u * u + 1.0).sqrt(),
            BoundTransform::Both(lo, hi) => {
                (lo + (u.sin() + 1.0) * (hi - lo) / 2.0).clamp(lo, hi)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn picks_variant() {
        assert_eq!(BoundTransform::new(0.0, 1.0), BoundTransform::Both(0.0, 1.0));
        assert_eq!(
            BoundTransform::new(0.0, f64::INFINITY),
            BoundTransform::Lower(0.0)
        );
        assert_eq!(
            BoundTransform::new(f64::NEG_INFINITY, 2.0),
            BoundTransform::Upper(2.0)
        );
        assert_eq!(
            BoundTransform::new(f64::NEG_INFINITY, f64::INFINITY),
            BoundTransform::Free
        );
    }

    #[test]
    fn interior_values_survive_the_round_trip() {
        let cases = [
            (BoundTransform::Both(0.01, 1000.0), 10.0),
            (BoundTransform::Both(-2.0, 0.0), -1.0),
            (BoundTransform::Lower(1e-5), 3.7),
            (BoundTransform::Upper(-1e-5), -42.0),
            (BoundTransform::Free, -5.5),
        ];
        for (tr, x) in cases {
            assert_relative_eq!(tr.to_external(tr.to_internal(x)), x, max_relative = 1e-12);
        }
    }

    #[test]
    fn any_internal_value_is_feasible() {
        let tr = BoundTransform::Both(1.0, 3.0);
        let lower = BoundTransform::Lower(2.0);
        let upper = BoundTransform::Upper(-1.0);
        for u in [-1e6, -10.0, -1.0, 0.0, 0.3, 7.0, 1e6] {
            let x = tr.to_external(u);
            assert!((1.0..=3.0).contains(&x), "u={u} gave {x}");
            assert!(lower.to_external(u) >= 2.0);
            assert!(upper.to_external(u) <= -1.0);
        }
    }

    #[test]
    fn out_of_bounds_start_is_clamped() {
        let tr = BoundTransform::Both(0.0, 1.0);
        assert_relative_eq!(tr.to_external(tr.to_internal(5.0)), 1.0, epsilon = 1e-12);
        let tr = BoundTransform::Lower(0.0);
        assert_relative_eq!(tr.to_external(tr.to_internal(-3.0)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_interval() {
        let tr = BoundTransform::Both(2.0, 2.0);
        assert_eq!(tr.to_internal(2.0), 0.0);
        assert_eq!(tr.to_external(123.0), 2.0);
    }
}
