//! # aquifer-model
//!
//! Composes stress models, a constant offset `d` and an optional noise
//! model into a simulated head series, and exposes the residuals and
//! objective used for calibration.
//!
//! ```mermaid
//! graph TD
//!     A["stress model 1"] --> S["sum"]
//!     B["stress model n"] --> S
//!     D["constant_d"] --> S
//!     S -->|"drop warmup"| H["simulated head"]
//!     H -->|"obs - sim at obs times"| R["residuals"]
//!     R -->|"noise model"| I["innovations"]
//! ```
//!
//! ```
//! use aquifer_convolve::StressModel;
//! use aquifer_model::{Model, ModelSettings};
//! use aquifer_rfunc::ResponseFunction;
//! use aquifer_series::TimeSeries;
//!
//! let obs = TimeSeries::regular(0.0, 1.0, vec![1.0, 1.2, 1.1, 1.3]).unwrap();
//! let rain = TimeSeries::regular(-30.0, 1.0, vec![2.0; 40]).unwrap();
//! let sm = StressModel::new("rain", rain, ResponseFunction::Exponential).unwrap();
//! let model = Model::new(obs)
//!     .unwrap()
//!     .with_stress_model(sm)
//!     .unwrap()
//!     .with_settings(ModelSettings::new().with_warmup(30.0))
//!     .unwrap();
//! let p = model.optimal_values();
//! let head = model.simulate(&p, 0.0, 3.0).unwrap();
//! assert_eq!(head.len(), 4);
//! ```

mod error;
mod model;
mod settings;

pub use error::ModelError;
pub use model::{CONSTANT_NAME, Model};
pub use settings::{DEFAULT_WARMUP, ModelSettings};
