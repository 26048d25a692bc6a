//! Regular simulation time grid.

use crate::TIME_TOLERANCE;
use crate::error::SeriesError;
use crate::series::TimeSeries;

/// A regular time grid `start, start + dt, ..., start + (len - 1) * dt`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationGrid {
    start: f64,
    dt: f64,
    len: usize,
}

impl SimulationGrid {
    /// Builds the grid covering `[start, end]` with step `dt`.
    ///
    /// The last grid point is the largest `start + k * dt <= end`
    /// (within [`TIME_TOLERANCE`]); the grid always holds at least one point.
    pub fn new(start: f64, end: f64, dt: f64) -> Result<Self, SeriesError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SeriesError::InvalidTimeStep { dt });
        }
        if !start.is_finite() || !end.is_finite() || end < start {
            return Err(SeriesError::InvalidWindow {
                tmin: start,
                tmax: end,
            });
        }
        let steps = ((end - start + TIME_TOLERANCE) / dt).floor() as usize;
        Ok(Self {
            start,
            dt,
            len: steps + 1,
        })
    }

    /// Builds a grid of exactly `len` points.
    pub fn with_len(start: f64, dt: f64, len: usize) -> Result<Self, SeriesError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SeriesError::InvalidTimeStep { dt });
        }
        Ok(Self {
            start,
            dt,
            len: len.max(1),
        })
    }

    /// First grid time.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Last grid time.
    pub fn end(&self) -> f64 {
        self.time(self.len - 1)
    }

    /// Grid step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; a grid holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Time of grid point `i`.
    pub fn time(&self, i: usize) -> f64 {
        self.start + i as f64 * self.dt
    }

    /// All grid times.
    pub fn times(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.time(i)).collect()
    }

    /// Index of the first grid point at or after `t`, clamped to the grid.
    pub fn index_at_or_after(&self, t: f64) -> usize {
        let x = ((t - self.start - TIME_TOLERANCE) / self.dt).ceil();
        if x <= 0.0 {
            0
        } else {
            (x as usize).min(self.len - 1)
        }
    }

    /// Wraps `values` (one per grid point) into a [`TimeSeries`].
    pub fn to_series(&self, values: Vec<f64>) -> Result<TimeSeries, SeriesError> {
        if values.len() != self.len {
            return Err(SeriesError::LengthMismatch {
                times: self.len,
                values: values.len(),
            });
        }
        TimeSeries::new(self.times(), values)
    }

    /// Returns the grid samples with `tmin <= t <= tmax` as a series.
    pub fn window_series(
        &self,
        values: &[f64],
        tmin: f64,
        tmax: f64,
    ) -> Result<TimeSeries, SeriesError> {
        if values.len() != self.len {
            return Err(SeriesError::LengthMismatch {
                times: self.len,
                values: values.len(),
            });
        }
        let (times, vals): (Vec<f64>, Vec<f64>) = (0..self.len)
            .map(|i| (self.time(i), values[i]))
            .filter(|(t, _)| *t >= tmin - TIME_TOLERANCE && *t <= tmax + TIME_TOLERANCE)
            .unzip();
        if times.is_empty() {
            return Err(SeriesError::EmptyWindow { tmin, tmax });
        }
        TimeSeries::new(times, vals)
    }

    /// Linearly interpolates grid `values` at arbitrary time `t`.
    ///
    /// Exact at grid points; NaN outside the grid span.
    pub fn interpolate(&self, values: &[f64], t: f64) -> f64 {
        debug_assert_eq!(values.len(), self.len);
        let x = (t - self.start) / self.dt;
        let last = (self.len - 1) as f64;
        if x < -TIME_TOLERANCE / self.dt || x > last + TIME_TOLERANCE / self.dt {
            return f64::NAN;
        }
        let x = x.clamp(0.0, last);
        let lo = x.floor() as usize;
        let frac = x - lo as f64;
        if frac * self.dt <= TIME_TOLERANCE || lo + 1 >= self.len {
            return values[lo];
        }
        if (1.0 - frac) * self.dt <= TIME_TOLERANCE {
            return values[lo + 1];
        }
        values[lo] + frac * (values[lo + 1] - values[lo])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_covers_span() {
        let g = SimulationGrid::new(0.0, 10.0, 1.0).unwrap();
        assert_eq!(g.len(), 11);
        assert_eq!(g.end(), 10.0);

        let g = SimulationGrid::new(0.0, 10.0, 3.0).unwrap();
        assert_eq!(g.times(), vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn single_point_grid() {
        let g = SimulationGrid::new(5.0, 5.0, 1.0).unwrap();
        assert_eq!(g.len(), 1);
        assert!(!g.is_empty());
    }

    #[test]
    fn invalid_grid() {
        assert!(matches!(
            SimulationGrid::new(0.0, 1.0, -1.0),
            Err(SeriesError::InvalidTimeStep { .. })
        ));
        assert!(matches!(
            SimulationGrid::new(2.0, 1.0, 1.0),
            Err(SeriesError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn index_at_or_after() {
        let g = SimulationGrid::new(0.0, 10.0, 1.0).unwrap();
        assert_eq!(g.index_at_or_after(-5.0), 0);
        assert_eq!(g.index_at_or_after(3.0), 3);
        assert_eq!(g.index_at_or_after(3.2), 4);
        assert_eq!(g.index_at_or_after(50.0), 10);
    }

    #[test]
    fn interpolation_exact_and_between() {
        let g = SimulationGrid::new(0.0, 4.0, 2.0).unwrap();
        let v = [0.0, 4.0, 2.0];
        assert_relative_eq!(g.interpolate(&v, 2.0), 4.0);
        assert_relative_eq!(g.interpolate(&v, 1.0), 2.0);
        assert_relative_eq!(g.interpolate(&v, 3.0), 3.0);
        assert_relative_eq!(g.interpolate(&v, 4.0), 2.0);
        assert!(g.interpolate(&v, 4.5).is_nan());
    }

    #[test]
    fn window_series_truncates() {
        let g = SimulationGrid::new(0.0, 9.0, 1.0).unwrap();
        let v: Vec<f64> = (0..10).map(f64::from).collect();
        let ts = g.window_series(&v, 3.0, 5.0).unwrap();
        assert_eq!(ts.times(), &[3.0, 4.0, 5.0]);
        assert_eq!(ts.values(), &[3.0, 4.0, 5.0]);
    }
}
