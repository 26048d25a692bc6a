//! Error types for the aquifer-convolve crate.

use aquifer_params::ParamsError;
use aquifer_recharge::RechargeError;
use aquifer_rfunc::RfuncError;
use aquifer_series::SeriesError;

/// Error type for all fallible operations in the aquifer-convolve crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvolveError {
    /// Returned when a stress model is given an empty name.
    #[error("stress model name must not be empty")]
    EmptyName,

    /// Returned when the parameter slice has the wrong length.
    #[error("stress model '{name}' takes {expected} parameters, got {got}")]
    ParameterCount {
        /// Stress model name.
        name: String,
        /// Parameters the stress model takes.
        expected: usize,
        /// Parameters supplied.
        got: usize,
    },

    /// Returned when the kernel options are invalid.
    #[error("invalid stress settings: {0}")]
    InvalidSettings(String),

    /// Response function error.
    #[error(transparent)]
    Rfunc(#[from] RfuncError),

    /// Recharge transform error.
    #[error(transparent)]
    Recharge(#[from] RechargeError),

    /// Time-series error.
    #[error(transparent)]
    Series(#[from] SeriesError),

    /// Parameter error.
    #[error(transparent)]
    Params(#[from] ParamsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_parameter_count() {
        let err = ConvolveError::ParameterCount {
            name: "rain".into(),
            expected: 3,
            got: 1,
        };
        assert_eq!(err.to_string(), "stress model 'rain' takes 3 parameters, got 1");
    }

    #[test]
    fn error_empty_name() {
        assert_eq!(
            ConvolveError::EmptyName.to_string(),
            "stress model name must not be empty"
        );
    }

    #[test]
    fn error_wraps_rfunc_error() {
        let inner = RfuncError::InvalidTimeStep { dt: 0.0 };
        let err: ConvolveError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<ConvolveError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<ConvolveError>();
    }
}
