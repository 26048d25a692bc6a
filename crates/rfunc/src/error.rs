//! Error types for the aquifer-rfunc crate.

/// Error type for all fallible operations in the aquifer-rfunc crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RfuncError {
    /// Returned when the time step is not finite and positive.
    #[error("invalid time step: dt={dt} (must be finite and > 0)")]
    InvalidTimeStep {
        /// The rejected time step.
        dt: f64,
    },

    /// Returned when the cutoff fraction is outside (0, 1).
    #[error("invalid cutoff: {cutoff} (must lie in (0, 1))")]
    InvalidCutoff {
        /// The rejected cutoff.
        cutoff: f64,
    },

    /// Returned when a shape parameter that must be positive is not.
    #[error("parameter '{name}' must be positive, got {value}")]
    NonPositiveParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Returned when the parameter slice has the wrong length.
    #[error("wrong number of parameters: expected {expected}, got {got}")]
    ParameterCount {
        /// Parameters the response function takes.
        expected: usize,
        /// Parameters supplied.
        got: usize,
    },

    /// Returned when a response function name is not recognised.
    #[error("unknown response function: '{0}'")]
    UnknownKind(String),

    /// Returned when a special-function evaluation fails.
    #[error("special function evaluation failed: {0}")]
    SpecialFunction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_time_step() {
        let err = RfuncError::InvalidTimeStep { dt: -1.0 };
        assert_eq!(
            err.to_string(),
            "invalid time step: dt=-1 (must be finite and > 0)"
        );
    }

    #[test]
    fn error_invalid_cutoff() {
        let err = RfuncError::InvalidCutoff { cutoff: 1.5 };
        assert_eq!(err.to_string(), "invalid cutoff: 1.5 (must lie in (0, 1))");
    }

    #[test]
    fn error_non_positive_parameter() {
        let err = RfuncError::NonPositiveParameter {
            name: "a",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "parameter 'a' must be positive, got 0");
    }

    #[test]
    fn error_parameter_count() {
        let err = RfuncError::ParameterCount {
            expected: 3,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "wrong number of parameters: expected 3, got 2"
        );
    }

    #[test]
    fn error_unknown_kind() {
        let err = RfuncError::UnknownKind("linear".into());
        assert_eq!(err.to_string(), "unknown response function: 'linear'");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<RfuncError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<RfuncError>();
    }
}
