//! # aquifer-noise
//!
//! Noise models that turn serially correlated, irregularly spaced residuals
//! into weighted innovations whose sum of squares serves as a calibration
//! objective.
//!
//! ```mermaid
//! graph LR
//!     A["residuals r(t_i)"] -->|"v_i = r_i - exp(-dt_i/alpha) r_(i-1)"| B["innovations"]
//!     B -->|"w_i"| C["weighted innovations"]
//!     C --> D["objective = sum (w_i v_i)^2"]
//! ```
//!
//! ```
//! use aquifer_noise::NoiseModel;
//!
//! let nm = NoiseModel::ar1();
//! let inn = nm
//!     .transform_values(&[10.0], &[0.0, 1.0, 5.0], &[0.2, 0.1, -0.3])
//!     .unwrap();
//! assert_eq!(inn.values[0], 0.2);
//! assert_eq!(inn.weights.len(), 3);
//! ```

mod error;
mod model;

pub use error::NoiseError;
pub use model::{Innovations, NOISE_PREFIX, NoiseKind, NoiseModel};
