//! Error types for the aquifer-solve crate.

use aquifer_model::ModelError;
use aquifer_series::SeriesError;

/// Error type for all fallible operations in the aquifer-solve crate.
///
/// Non-convergence of the optimiser is not an error: it is reported through
/// [`FitResult::success`](crate::FitResult::success).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    /// Returned when a free parameter has a lower bound above its upper bound.
    #[error("invalid bounds for '{name}': pmin ({pmin}) > pmax ({pmax})")]
    InvalidBounds {
        /// Parameter name.
        name: String,
        /// Lower bound.
        pmin: f64,
        /// Upper bound.
        pmax: f64,
    },

    /// Returned when every parameter is fixed.
    #[error("no free parameters to optimise")]
    NoFreeParameters,

    /// Returned when the observation weights do not match the window.
    #[error("expected {expected} weights (one per observation in the window), got {got}")]
    WeightsLength {
        /// Observations in the calibration window.
        expected: usize,
        /// Weights supplied.
        got: usize,
    },

    /// Returned when a weight is negative or not finite.
    #[error("weights must be finite and non-negative")]
    InvalidWeights,

    /// Returned when the start vector and the bounds differ in length.
    #[error("start vector has {x0} values but {bounds} bounds were given")]
    DimensionMismatch {
        /// Length of the start vector.
        x0: usize,
        /// Number of bounds.
        bounds: usize,
    },

    /// Returned when solver or fit options are invalid.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Returned when the optimiser backend fails outright.
    #[error("optimiser failed: {0}")]
    Optimizer(String),

    /// Model error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Time-series error.
    #[error(transparent)]
    Series(#[from] SeriesError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_bounds() {
        let err = SolveError::InvalidBounds {
            name: "rain_a".into(),
            pmin: 10.0,
            pmax: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid bounds for 'rain_a': pmin (10) > pmax (1)"
        );
    }

    #[test]
    fn error_no_free_parameters() {
        assert_eq!(
            SolveError::NoFreeParameters.to_string(),
            "no free parameters to optimise"
        );
    }

    #[test]
    fn error_weights_length() {
        let err = SolveError::WeightsLength {
            expected: 10,
            got: 3,
        };
        assert_eq!(
            err.to_string(),
            "expected 10 weights (one per observation in the window), got 3"
        );
    }

    #[test]
    fn error_dimension_mismatch() {
        let err = SolveError::DimensionMismatch { x0: 2, bounds: 3 };
        assert_eq!(
            err.to_string(),
            "start vector has 2 values but 3 bounds were given"
        );
    }

    #[test]
    fn error_model_is_transparent() {
        let err = SolveError::from(ModelError::NoNoiseModel);
        assert_eq!(err.to_string(), "model has no noise model");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<SolveError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SolveError>();
    }
}
