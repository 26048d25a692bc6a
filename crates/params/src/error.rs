//! Error types for the aquifer-params crate.

/// Error type for all fallible operations in the aquifer-params crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    /// Returned when a parameter's lower bound exceeds its upper bound.
    #[error("invalid bounds for parameter '{name}': pmin={pmin} > pmax={pmax}")]
    InvalidBounds {
        /// Parameter name.
        name: String,
        /// Lower bound.
        pmin: f64,
        /// Upper bound.
        pmax: f64,
    },

    /// Returned when a varying parameter's initial value lies outside its bounds.
    #[error("initial value {initial} of parameter '{name}' outside bounds [{pmin}, {pmax}]")]
    InitialOutOfBounds {
        /// Parameter name.
        name: String,
        /// Initial value.
        initial: f64,
        /// Lower bound.
        pmin: f64,
        /// Upper bound.
        pmax: f64,
    },

    /// Returned when a value vector does not match the set length.
    #[error("length mismatch: expected {expected} values, got {got}")]
    LengthMismatch {
        /// Expected number of values.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Returned when a sub-range does not fit inside the set.
    #[error("range {start}..{end} out of bounds for {len} parameters")]
    RangeOutOfBounds {
        /// Start of the requested range.
        start: usize,
        /// End of the requested range.
        end: usize,
        /// Number of parameters in the set.
        len: usize,
    },

    /// Returned when a parameter name is not present in the set.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Returned when two parameters in one set share a name.
    #[error("duplicate parameter name '{0}'")]
    DuplicateName(String),
}
