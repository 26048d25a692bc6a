//! Error types for the aquifer-noise crate.

/// Error type for all fallible operations in the aquifer-noise crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NoiseError {
    /// Returned when the parameter slice has the wrong length.
    #[error("wrong number of noise parameters: expected {expected}, got {got}")]
    ParameterCount {
        /// Parameters the noise model takes.
        expected: usize,
        /// Parameters supplied.
        got: usize,
    },

    /// Returned when a decay time is not positive.
    #[error("noise parameter '{name}' must be positive, got {value}")]
    NonPositiveParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Returned when times and residuals differ in length.
    #[error("length mismatch: {times} times but {values} residuals")]
    LengthMismatch {
        /// Number of timestamps.
        times: usize,
        /// Number of residuals.
        values: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_parameter_count() {
        let err = NoiseError::ParameterCount {
            expected: 1,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "wrong number of noise parameters: expected 1, got 2"
        );
    }

    #[test]
    fn error_non_positive() {
        let err = NoiseError::NonPositiveParameter {
            name: "alpha",
            value: -3.0,
        };
        assert_eq!(err.to_string(), "noise parameter 'alpha' must be positive, got -3");
    }

    #[test]
    fn error_length_mismatch() {
        let err = NoiseError::LengthMismatch {
            times: 3,
            values: 4,
        };
        assert_eq!(err.to_string(), "length mismatch: 3 times but 4 residuals");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<NoiseError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<NoiseError>();
    }
}
