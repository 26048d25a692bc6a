//! Discrete causal convolution of a stress with a block response.
//!
//! `h[i] = sum_j s[i - j] * block[j]`, for `i` in `0..s.len()`. The kernel
//! is cut to the stress length; lags before the first stress sample
//! contribute nothing.

use num_complex::Complex;
use rustfft::FftPlanner;

/// Work size `n * m` above which [`convolve`] switches to the FFT path.
pub const FFT_THRESHOLD: usize = 1 << 16;

/// Kernels at most this long always use the direct path.
pub const FFT_MIN_KERNEL: usize = 64;

/// Convolves, picking the direct or FFT path by problem size.
///
/// Inputs with NaN or infinite values always take the direct path: the FFT
/// would spread a single non-finite value over every output sample.
pub fn convolve(stress: &[f64], block: &[f64]) -> Vec<f64> {
    let m = block.len().min(stress.len());
    if m > FFT_MIN_KERNEL
        && stress.len().saturating_mul(m) > FFT_THRESHOLD
        && all_finite(stress)
        && all_finite(&block[..m])
    {
        convolve_fft(stress, block)
    } else {
        convolve_direct(stress, block)
    }
}

fn all_finite(x: &[f64]) -> bool {
    x.iter().all(|v| v.is_finite())
}

/// Direct O(n m) convolution.
pub fn convolve_direct(stress: &[f64], block: &[f64]) -> Vec<f64> {
    let n = stress.len();
    let m = block.len().min(n);
    (0..n)
        .map(|i| {
            let jmax = m.min(i + 1);
            (0..jmax).map(|j| stress[i - j] * block[j]).sum()
        })
        .collect()
}

/// Zero-padded FFT convolution.
pub fn convolve_fft(stress: &[f64], block: &[f64]) -> Vec<f64> {
    let n = stress.len();
    if n == 0 {
        return Vec::new();
    }
    let m = block.len().min(n);
    if m == 0 {
        return vec![0.0; n];
    }
    let npad = (n + m - 1).next_power_of_two();

    let pad = |x: &[f64]| -> Vec<Complex<f64>> {
        x.iter()
            .map(|&v| Complex::new(v, 0.0))
            .chain(std::iter::repeat_n(Complex::new(0.0, 0.0), npad - x.len()))
            .collect()
    };
    let mut a = pad(stress);
    let mut b = pad(&block[..m]);

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(npad);
    let inverse = planner.plan_fft_inverse(npad);
    forward.process(&mut a);
    forward.process(&mut b);
    let mut product: Vec<Complex<f64>> = a.iter().zip(&b).map(|(x, y)| x * y).collect();
    inverse.process(&mut product);

    // rustfft is unnormalized
    let norm = 1.0 / npad as f64;
    product[..n].iter().map(|c| c.re * norm).collect()
}
