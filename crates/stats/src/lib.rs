//! Statistics of heads, stresses and residuals.
//!
//! Descriptive statistics used to scale default parameters and to summarise
//! residuals live at the crate root; goodness-of-fit diagnostics comparing
//! observed and simulated heads live in [`metrics`].

pub mod float_serde;
pub mod metrics;

pub use metrics::FitStatistics;

/// Mean of a head, stress or residual series. 0.0 when empty.
pub fn mean(data: &[f64]) -> f64 {
    match data.len() {
        0 => 0.0,
        n => data.iter().sum::<f64>() / n as f64,
    }
}

fn squared_deviations(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|&x| (x - m).powi(2)).sum()
}

/// Sample variance (`n - 1` denominator); 0.0 below two values.
pub fn variance(data: &[f64]) -> f64 {
    match data.len() {
        0 | 1 => 0.0,
        n => squared_deviations(data) / (n - 1) as f64,
    }
}

/// Population variance (`n` denominator), as used for the explained
/// variance of residuals. 0.0 when empty.
pub fn population_variance(data: &[f64]) -> f64 {
    match data.len() {
        0 => 0.0,
        n => squared_deviations(data) / n as f64,
    }
}

/// Sample standard deviation, e.g. of a stress when scaling the default gain.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Sum of squared residuals.
pub fn sum_of_squares(data: &[f64]) -> f64 {
    data.iter().map(|r| r * r).sum()
}

/// Correlation between observed and simulated heads.
///
/// Pairs with a non-finite member are skipped. `None` with fewer than three
/// usable pairs or when either side is constant.
pub fn pearson_correlation(observed: &[f64], simulated: &[f64]) -> Option<f64> {
    let (obs, sim): (Vec<f64>, Vec<f64>) = observed
        .iter()
        .zip(simulated)
        .filter(|(o, s)| o.is_finite() && s.is_finite())
        .map(|(&o, &s)| (o, s))
        .unzip();
    if obs.len() < 3 {
        return None;
    }

    let (mo, ms) = (mean(&obs), mean(&sim));
    let cov: f64 = obs.iter().zip(&sim).map(|(o, s)| (o - mo) * (s - ms)).sum();
    let denom = (squared_deviations(&obs) * squared_deviations(&sim)).sqrt();
    (denom > 0.0).then(|| cov / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HEADS: [f64; 8] = [10.2, 10.4, 10.4, 10.4, 10.5, 10.5, 10.7, 10.9];

    #[test]
    fn mean_of_heads() {
        assert_relative_eq!(mean(&HEADS), 10.5, epsilon = 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn spread_of_heads() {
        // Deviations from 10.5 sum to 0.32 when squared.
        assert_relative_eq!(population_variance(&HEADS), 0.04, epsilon = 1e-12);
        assert_relative_eq!(variance(&HEADS), 0.32 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(sd(&HEADS), (0.32f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn spread_needs_enough_values() {
        assert_eq!(sd(&[5.0]), 0.0);
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(population_variance(&[]), 0.0);
        assert_relative_eq!(variance(&[-0.2, 0.2]), 0.08, epsilon = 1e-12);
    }

    #[test]
    fn residual_sum_of_squares() {
        assert_relative_eq!(sum_of_squares(&[0.1, -0.2, 0.3]), 0.14, epsilon = 1e-12);
    }

    #[test]
    fn correlation_of_shifted_simulation() {
        let sim: Vec<f64> = HEADS.iter().map(|h| 2.0 * h - 5.0).collect();
        assert_relative_eq!(pearson_correlation(&HEADS, &sim).unwrap(), 1.0, epsilon = 1e-12);
        let flipped: Vec<f64> = HEADS.iter().map(|h| -h).collect();
        assert_relative_eq!(
            pearson_correlation(&HEADS, &flipped).unwrap(),
            -1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn correlation_skips_missing_heads() {
        let obs = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let sim = [2.0, 4.0, f64::NAN, 8.0, 10.0];
        assert_relative_eq!(pearson_correlation(&obs, &sim).unwrap(), 1.0, epsilon = 1e-12);
        assert!(pearson_correlation(&[1.0, 2.0], &[3.0, 4.0]).is_none());
        assert!(pearson_correlation(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).is_none());
    }
}
