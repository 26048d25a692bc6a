//! Error types for the aquifer-model crate.

use aquifer_convolve::ConvolveError;
use aquifer_noise::NoiseError;
use aquifer_params::ParamsError;
use aquifer_series::SeriesError;

/// Error type for all fallible operations in the aquifer-model crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Returned when the observation series holds no finite value.
    #[error("observation series has no finite values")]
    NoObservations,

    /// Returned when a stress model name is already in use.
    #[error("stress model '{0}' already exists")]
    DuplicateStressModel(String),

    /// Returned when a stress model name is not found.
    #[error("unknown stress model '{name}' (available: {available})")]
    UnknownStressModel {
        /// Requested name.
        name: String,
        /// Comma-separated list of known names.
        available: String,
    },

    /// Returned when the parameter vector has the wrong length.
    #[error("wrong number of parameters: expected {expected}, got {got}")]
    ParameterCount {
        /// Parameters the model takes.
        expected: usize,
        /// Parameters supplied.
        got: usize,
    },

    /// Returned when `tmin` or `tmax` lies outside the observations.
    #[error("{which}={value} lies outside the observations [{start}, {end}]")]
    WindowOutsideObservations {
        /// `"tmin"` or `"tmax"`.
        which: &'static str,
        /// Rejected value.
        value: f64,
        /// First observation time.
        start: f64,
        /// Last observation time.
        end: f64,
    },

    /// Returned when `tmax` does not exceed `tmin`.
    #[error("tmax ({tmax}) must be larger than tmin ({tmin})")]
    InvalidWindow {
        /// Window start.
        tmin: f64,
        /// Window end.
        tmax: f64,
    },

    /// Returned when the window holds no observation.
    #[error("no observations between tmin={tmin} and tmax={tmax}")]
    NoObservationsInWindow {
        /// Window start.
        tmin: f64,
        /// Window end.
        tmax: f64,
    },

    /// Returned when innovations are requested from a model without noise model.
    #[error("model has no noise model")]
    NoNoiseModel,

    /// Returned when model settings are invalid.
    #[error("invalid model settings: {0}")]
    InvalidSettings(String),

    /// Stress model error.
    #[error(transparent)]
    Convolve(#[from] ConvolveError),

    /// Noise model error.
    #[error(transparent)]
    Noise(#[from] NoiseError),

    /// Parameter error.
    #[error(transparent)]
    Params(#[from] ParamsError),

    /// Time-series error.
    #[error(transparent)]
    Series(#[from] SeriesError),
}
