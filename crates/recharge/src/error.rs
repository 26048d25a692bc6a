//! Error types for the aquifer-recharge crate.

use aquifer_series::SeriesError;

/// Error type for all fallible operations in the aquifer-recharge crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RechargeError {
    /// Returned when snow accounting is enabled but no temperature is given.
    #[error("snow accounting requires a temperature series")]
    MissingTemperature,

    /// Returned when an input series does not match the precipitation length.
    #[error("{name} has {got} values, expected {expected}")]
    LengthMismatch {
        /// Which input.
        name: &'static str,
        /// Precipitation length.
        expected: usize,
        /// Input length.
        got: usize,
    },

    /// Returned when an input series is not on the precipitation timestamps.
    #[error("{name} is not aligned with the precipitation timestamps")]
    MisalignedSeries {
        /// Which input.
        name: &'static str,
    },

    /// Returned when the input series is not regularly spaced.
    #[error("recharge input must be regularly spaced (step {first} at start, {found} at index {index})")]
    IrregularSeries {
        /// First time step.
        first: f64,
        /// Deviating time step.
        found: f64,
        /// Index of the deviating step.
        index: usize,
    },

    /// Returned when the parameter slice has the wrong length.
    #[error("wrong number of parameters: expected {expected}, got {got}")]
    ParameterCount {
        /// Parameters the transform takes.
        expected: usize,
        /// Parameters supplied.
        got: usize,
    },

    /// Returned when a parameter that must be positive is not.
    #[error("parameter '{name}' must be positive, got {value}")]
    NonPositiveParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Returned when a parameter that must be non-negative is negative.
    #[error("parameter '{name}' must be non-negative, got {value}")]
    NegativeParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Returned when the time step is not finite and positive.
    #[error("invalid time step: dt={dt} (must be finite and > 0)")]
    InvalidTimeStep {
        /// The rejected time step.
        dt: f64,
    },

    /// Time-series construction failed.
    #[error(transparent)]
    Series(#[from] SeriesError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_missing_temperature() {
        assert_eq!(
            RechargeError::MissingTemperature.to_string(),
            "snow accounting requires a temperature series"
        );
    }

    #[test]
    fn error_length_mismatch() {
        let err = RechargeError::LengthMismatch {
            name: "evaporation",
            expected: 10,
            got: 9,
        };
        assert_eq!(err.to_string(), "evaporation has 9 values, expected 10");
    }

    #[test]
    fn error_negative_parameter() {
        let err = RechargeError::NegativeParameter {
            name: "simax",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "parameter 'simax' must be non-negative, got -1");
    }

    #[test]
    fn error_wraps_series_error() {
        let err: RechargeError = SeriesError::EmptySeries.into();
        assert_eq!(err.to_string(), SeriesError::EmptySeries.to_string());
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<RechargeError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<RechargeError>();
    }
}
