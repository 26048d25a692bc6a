//! Alignment of stress series onto the simulation grid.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TIME_TOLERANCE;
use crate::grid::SimulationGrid;
use crate::series::TimeSeries;

/// How grid points without a covering stress sample are filled.
///
/// `Mean` is the default for both the span before the first sample
/// (warmup) and the span after the last one. Gaps inside the span take the
/// `after` policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Mean of the finite stress values.
    #[default]
    Mean,
    /// Zero.
    Zero,
    /// A fixed value.
    Value(f64),
}

impl FillPolicy {
    /// The fill value this policy yields for `series`.
    pub fn resolve(&self, series: &TimeSeries) -> f64 {
        match self {
            FillPolicy::Mean => series.mean(),
            FillPolicy::Zero => 0.0,
            FillPolicy::Value(v) => *v,
        }
    }
}

/// A stress series sampled on a [`SimulationGrid`].
#[derive(Clone, Debug, PartialEq)]
pub struct Aligned {
    /// One value per grid point.
    pub values: Vec<f64>,
    /// Number of grid points before the series start that were filled.
    pub filled_before: usize,
    /// Number of grid points after the series end that were filled.
    pub filled_after: usize,
    /// Number of grid points inside the span that fell in a gap.
    pub filled_gaps: usize,
}

/// Length of the period a single sample covers: the grid step, or the
/// series' smallest sampling interval when that is coarser.
fn sample_period(series: &TimeSeries, dt: f64) -> f64 {
    let step = series
        .times()
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() { step.max(dt) } else { dt }
}

/// Samples `series` onto `grid`.
///
/// A stress value reported at time `T` is the flux over the period ending at
/// `T`, so grid point `t` takes the first sample with timestamp `>= t`,
/// provided that sample lies less than one period after `t`. The period is
/// the grid step, or the series' smallest sampling interval when coarser.
/// Grid points before the first sample are filled per `before`; points
/// after the last sample and points in gaps inside the span per `after`.
pub fn align_to_grid(
    series: &TimeSeries,
    grid: &SimulationGrid,
    before: FillPolicy,
    after: FillPolicy,
) -> Aligned {
    let times = series.times();
    let values = series.values();
    let fill_before = before.resolve(series);
    let fill_after = after.resolve(series);
    let period = sample_period(series, grid.dt());

    let mut out = Vec::with_capacity(grid.len());
    let mut filled_before = 0;
    let mut filled_after = 0;
    let mut filled_gaps = 0;
    let mut j = 0;
    for i in 0..grid.len() {
        let t = grid.time(i);
        if t < series.start() - TIME_TOLERANCE {
            out.push(fill_before);
            filled_before += 1;
            continue;
        }
        if t > series.end() + TIME_TOLERANCE {
            out.push(fill_after);
            filled_after += 1;
            continue;
        }
        while j < times.len() && times[j] < t - TIME_TOLERANCE {
            j += 1;
        }
        let k = j.min(times.len() - 1);
        if times[k] - t < period - TIME_TOLERANCE {
            out.push(values[k]);
        } else {
            out.push(fill_after);
            filled_gaps += 1;
        }
    }

    if filled_before > 0 || filled_after > 0 || filled_gaps > 0 {
        debug!(
            filled_before,
            filled_after,
            filled_gaps,
            fill_before,
            fill_after,
            "stress filled where no sample covers the grid"
        );
    }

    Aligned {
        values: out,
        filled_before,
        filled_after,
        filled_gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(start: f64, end: f64) -> SimulationGrid {
        SimulationGrid::new(start, end, 1.0).unwrap()
    }

    #[test]
    fn identical_grid_copies_values() {
        let ts = TimeSeries::regular(0.0, 1.0, vec![1.0, 2.0, 3.0]).unwrap();
        let a = align_to_grid(&ts, &grid(0.0, 2.0), FillPolicy::Mean, FillPolicy::Mean);
        assert_eq!(a.values, vec![1.0, 2.0, 3.0]);
        assert_eq!((a.filled_before, a.filled_after), (0, 0));
    }

    #[test]
    fn before_span_filled_with_mean() {
        let ts = TimeSeries::regular(3.0, 1.0, vec![2.0, 4.0]).unwrap();
        let a = align_to_grid(&ts, &grid(0.0, 4.0), FillPolicy::Mean, FillPolicy::Zero);
        assert_eq!(a.values, vec![3.0, 3.0, 3.0, 2.0, 4.0]);
        assert_eq!(a.filled_before, 3);
    }

    #[test]
    fn after_span_filled_per_policy() {
        let ts = TimeSeries::regular(0.0, 1.0, vec![2.0, 4.0]).unwrap();
        let a = align_to_grid(
            &ts,
            &grid(0.0, 3.0),
            FillPolicy::Mean,
            FillPolicy::Value(-1.0),
        );
        assert_eq!(a.values, vec![2.0, 4.0, -1.0, -1.0]);
        assert_eq!(a.filled_after, 2);
    }

    #[test]
    fn gap_inside_span_uses_fill_policy() {
        // Daily samples with t = 1..3 missing.
        let ts = TimeSeries::new(vec![0.0, 4.0, 5.0], vec![1.0, 8.0, 2.0]).unwrap();
        let a = align_to_grid(&ts, &grid(0.0, 5.0), FillPolicy::Zero, FillPolicy::Value(-1.0));
        assert_eq!(a.values, vec![1.0, -1.0, -1.0, -1.0, 8.0, 2.0]);
        assert_eq!((a.filled_before, a.filled_after, a.filled_gaps), (0, 0, 3));
    }

    #[test]
    fn coarse_series_covers_its_own_period() {
        // Sums over three days reported at the end of each period.
        let ts = TimeSeries::regular(3.0, 3.0, vec![6.0, 9.0]).unwrap();
        let a = align_to_grid(&ts, &grid(2.0, 6.0), FillPolicy::Zero, FillPolicy::Zero);
        assert_eq!(a.values, vec![0.0, 6.0, 9.0, 9.0, 9.0]);
        assert_eq!((a.filled_before, a.filled_gaps), (1, 0));
    }

    #[test]
    fn fill_policy_resolve() {
        let ts = TimeSeries::regular(0.0, 1.0, vec![1.0, 3.0]).unwrap();
        assert_eq!(FillPolicy::Mean.resolve(&ts), 2.0);
        assert_eq!(FillPolicy::Zero.resolve(&ts), 0.0);
        assert_eq!(FillPolicy::Value(7.5).resolve(&ts), 7.5);
        assert_eq!(FillPolicy::default(), FillPolicy::Mean);
    }
}
