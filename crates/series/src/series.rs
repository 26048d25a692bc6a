//! Ordered `(time, value)` series.

use serde::{Deserialize, Serialize};

use crate::TIME_TOLERANCE;
use crate::error::SeriesError;

/// An ordered, non-empty sequence of `(time, value)` pairs with strictly
/// increasing, finite timestamps (days). Values may be NaN.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries", into = "RawSeries")]
pub struct TimeSeries {
    times: Vec<f64>,
    values: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct RawSeries {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl TryFrom<RawSeries> for TimeSeries {
    type Error = SeriesError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        TimeSeries::new(raw.times, raw.values)
    }
}

impl From<TimeSeries> for RawSeries {
    fn from(ts: TimeSeries) -> Self {
        RawSeries {
            times: ts.times,
            values: ts.values,
        }
    }
}

impl TimeSeries {
    /// Creates a series after validating lengths and timestamp ordering.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`SeriesError::EmptySeries`] | no samples |
    /// | [`SeriesError::LengthMismatch`] | `times.len() != values.len()` |
    /// | [`SeriesError::NonFiniteTime`] | a timestamp is NaN or infinite |
    /// | [`SeriesError::NotIncreasing`] | timestamps not strictly increasing |
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self, SeriesError> {
        if times.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        for (i, t) in times.iter().enumerate() {
            if !t.is_finite() {
                return Err(SeriesError::NonFiniteTime { index: i });
            }
            if i > 0 && *t <= times[i - 1] {
                return Err(SeriesError::NotIncreasing { index: i });
            }
        }
        Ok(Self { times, values })
    }

    /// Creates a regularly spaced series starting at `start` with step `dt`.
    pub fn regular(start: f64, dt: f64, values: Vec<f64>) -> Result<Self, SeriesError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SeriesError::InvalidTimeStep { dt });
        }
        let times = (0..values.len()).map(|i| start + i as f64 * dt).collect();
        Self::new(times, values)
    }

    /// Timestamps in days.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// First timestamp.
    pub fn start(&self) -> f64 {
        self.times[0]
    }

    /// Last timestamp.
    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Mean of the finite values (0.0 if none are finite).
    pub fn mean(&self) -> f64 {
        let finite: Vec<f64> = self.values.iter().copied().filter(|v| v.is_finite()).collect();
        aquifer_stats::mean(&finite)
    }

    /// Sample standard deviation of the finite values.
    pub fn std(&self) -> f64 {
        let finite: Vec<f64> = self.values.iter().copied().filter(|v| v.is_finite()).collect();
        aquifer_stats::sd(&finite)
    }

    /// Elapsed time between consecutive samples; the first entry is
    /// `f64::INFINITY` (no predecessor).
    pub fn time_steps(&self) -> Vec<f64> {
        std::iter::once(f64::INFINITY)
            .chain(self.times.windows(2).map(|w| w[1] - w[0]))
            .collect()
    }

    /// Returns the samples with `tmin <= t <= tmax`.
    ///
    /// # Errors
    ///
    /// [`SeriesError::InvalidWindow`] if `tmin > tmax` or either is NaN,
    /// [`SeriesError::EmptyWindow`] if no sample falls inside.
    pub fn window(&self, tmin: f64, tmax: f64) -> Result<TimeSeries, SeriesError> {
        if tmin.is_nan() || tmax.is_nan() || tmin > tmax {
            return Err(SeriesError::InvalidWindow { tmin, tmax });
        }
        let lo = self.times.partition_point(|&t| t < tmin - TIME_TOLERANCE);
        let hi = self.times.partition_point(|&t| t <= tmax + TIME_TOLERANCE);
        if lo >= hi {
            return Err(SeriesError::EmptyWindow { tmin, tmax });
        }
        Ok(Self {
            times: self.times[lo..hi].to_vec(),
            values: self.values[lo..hi].to_vec(),
        })
    }

    /// Returns a copy with every value mapped through `f`.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> TimeSeries {
        Self {
            times: self.times.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Linear interpolation at `t`; NaN outside the series span.
    pub fn interpolate_at(&self, t: f64) -> f64 {
        if t < self.start() - TIME_TOLERANCE || t > self.end() + TIME_TOLERANCE {
            return f64::NAN;
        }
        let i = self.times.partition_point(|&x| x < t);
        if i == 0 {
            return self.values[0];
        }
        if i >= self.times.len() {
            return self.values[self.times.len() - 1];
        }
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        if (t1 - t).abs() <= TIME_TOLERANCE {
            return self.values[i];
        }
        let w = (t - t0) / (t1 - t0);
        self.values[i - 1] + w * (self.values[i] - self.values[i - 1])
    }

    /// Consumes the series, returning `(times, values)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.times, self.values)
    }
}
