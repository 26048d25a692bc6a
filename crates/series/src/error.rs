//! Error types for the aquifer-series crate.

/// Error type for all fallible operations in the aquifer-series crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    /// Returned when a series has no samples.
    #[error("time series is empty")]
    EmptySeries,

    /// Returned when timestamps and values differ in length.
    #[error("length mismatch: {times} timestamps, {values} values")]
    LengthMismatch {
        /// Number of timestamps.
        times: usize,
        /// Number of values.
        values: usize,
    },

    /// Returned when timestamps are not strictly increasing.
    #[error("timestamps not strictly increasing at index {index}")]
    NotIncreasing {
        /// Index of the first offending timestamp.
        index: usize,
    },

    /// Returned when a timestamp is NaN or infinite.
    #[error("non-finite timestamp at index {index}")]
    NonFiniteTime {
        /// Index of the offending timestamp.
        index: usize,
    },

    /// Returned when a time step is not finite and positive.
    #[error("invalid time step: dt={dt} (must be finite and > 0)")]
    InvalidTimeStep {
        /// The rejected time step.
        dt: f64,
    },

    /// Returned when a window `[tmin, tmax]` is empty or inverted.
    #[error("invalid window: tmin={tmin}, tmax={tmax}")]
    InvalidWindow {
        /// Window start.
        tmin: f64,
        /// Window end.
        tmax: f64,
    },

    /// Returned when no sample falls inside a requested window.
    #[error("no samples between tmin={tmin} and tmax={tmax}")]
    EmptyWindow {
        /// Window start.
        tmin: f64,
        /// Window end.
        tmax: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(SeriesError::EmptySeries.to_string(), "time series is empty");
        assert_eq!(
            SeriesError::LengthMismatch {
                times: 3,
                values: 2
            }
            .to_string(),
            "length mismatch: 3 timestamps, 2 values"
        );
        assert_eq!(
            SeriesError::NotIncreasing { index: 4 }.to_string(),
            "timestamps not strictly increasing at index 4"
        );
        assert_eq!(
            SeriesError::InvalidTimeStep { dt: 0.0 }.to_string(),
            "invalid time step: dt=0 (must be finite and > 0)"
        );
        assert_eq!(
            SeriesError::EmptyWindow {
                tmin: 1.0,
                tmax: 2.0
            }
            .to_string(),
            "no samples between tmin=1 and tmax=2"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<SeriesError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SeriesError>();
    }
}
