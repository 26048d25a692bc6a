//! Special functions used by the response functions.
//!
//! The exponential integral and the complementary error function come from
//! `statrs`; the modified Bessel function K0 and the principal branch of the
//! Lambert W function are evaluated here.

use statrs::function::{erf, exponential};

/// Exponential integral E1(x) for x > 0.
///
/// Returns NaN when `statrs` rejects the argument (x <= 0 or NaN).
pub fn exp1(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    // E1 underflows long before the continued fraction loses accuracy.
    if x > 700.0 {
        return 0.0;
    }
    exponential::integral(x, 1).unwrap_or(f64::NAN)
}

/// Complementary error function.
pub fn erfc(x: f64) -> f64 {
    erf::erfc(x)
}

/// Modified Bessel function of the first kind, order zero (A&S 9.8.1-9.8.2).
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax <= 3.75 {
        let t = (x / 3.75).powi(2);
        1.0 + t
            * (3.515_622_9
                + t * (3.089_942_4
                    + t * (1.206_749_2 + t * (0.265_973_2 + t * (0.036_076_8 + t * 0.004_581_3)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.398_942_28
                + t * (0.013_285_92
                    + t * (0.002_253_19
                        + t * (-0.001_575_65
                            + t * (0.009_162_81
                                + t * (-0.020_577_06
                                    + t * (0.026_355_37
                                        + t * (-0.016_476_33 + t * 0.003_923_77))))))))
    }
}

/// Modified Bessel function of the second kind, order zero (A&S 9.8.5-9.8.6).
///
/// Defined for x > 0; returns NaN otherwise.
pub fn bessel_k0(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    if x <= 2.0 {
        let t = x * x / 4.0;
        -(x / 2.0).ln() * bessel_i0(x)
            + (-0.577_215_66
                + t * (0.422_784_20
                    + t * (0.230_697_56
                        + t * (0.034_885_90
                            + t * (0.002_626_98 + t * (0.000_107_50 + t * 0.000_007_40))))))
    } else {
        let t = 2.0 / x;
        ((-x).exp() / x.sqrt())
            * (1.253_314_14
                + t * (-0.078_323_58
                    + t * (0.021_895_68
                        + t * (-0.010_624_46
                            + t * (0.005_878_72 + t * (-0.002_515_40 + t * 0.000_532_08))))))
    }
}

/// Principal branch W0 of the Lambert W function for x >= 0.
///
/// Halley iteration from a logarithmic starting point.
pub fn lambert_w0(x: f64) -> f64 {
    if x.is_nan() || x < 0.0 {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x.is_infinite() {
        return f64::INFINITY;
    }
    let mut w = if x < 1.0 {
        x / (1.0 + x)
    } else {
        let l = x.ln();
        l - l.max(1.0).ln().max(0.0)
    };
    for _ in 0..64 {
        let ew = w.exp();
        let f = w * ew - x;
        let wp1 = w + 1.0;
        let denom = ew * wp1 - (w + 2.0) * f / (2.0 * wp1);
        let step = f / denom;
        w -= step;
        if step.abs() <= 1e-14 * (1.0 + w.abs()) {
            break;
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exp1_reference_values() {
        assert_relative_eq!(exp1(1.0), 0.219_383_934_395_520_27, epsilon = 1e-10);
        assert_relative_eq!(exp1(0.1), 1.822_923_958_419_390_7, epsilon = 1e-9);
        assert_relative_eq!(exp1(5.0), 0.001_148_295_591_275_325_7, epsilon = 1e-12);
        assert_eq!(exp1(800.0), 0.0);
        assert!(exp1(0.0).is_nan());
    }

    #[test]
    fn bessel_k0_reference_values() {
        assert_relative_eq!(bessel_k0(0.5), 0.924_419_071_227_665_9, epsilon = 1e-6);
        assert_relative_eq!(bessel_k0(1.0), 0.421_024_438_240_708_3, epsilon = 1e-6);
        assert_relative_eq!(bessel_k0(3.0), 0.034_739_504_386_279_7, epsilon = 1e-7);
        assert!(bessel_k0(-1.0).is_nan());
    }

    #[test]
    fn lambert_w0_inverts_w_exp_w() {
        for &x in &[1e-6, 0.1, 1.0, std::f64::consts::E, 10.0, 1e4, 1e8] {
            let w = lambert_w0(x);
            assert_relative_eq!(w * w.exp(), x, max_relative = 1e-10);
        }
        assert_relative_eq!(lambert_w0(std::f64::consts::E), 1.0, epsilon = 1e-12);
        assert_eq!(lambert_w0(0.0), 0.0);
    }

    #[test]
    fn erfc_limits() {
        assert_relative_eq!(erfc(0.0), 1.0);
        assert!(erfc(10.0) < 1e-40);
        assert_relative_eq!(erfc(-10.0), 2.0);
    }
}
