//! # aquifer-params
//!
//! Named, bounded model parameters and the ordered sets that group them
//! per model component.
//!
//! ## Workflow
//!
//! ```mermaid
//! graph LR
//!     A["Parameter::new(name, initial, pmin, pmax)"] --> B["ParameterSet"]
//!     B -->|".validate()?"| C["checked bounds"]
//!     B -->|".free_indices()"| D["optimizer vector"]
//!     B -->|".set_optimal(values)"| E["calibrated set"]
//! ```
//!
//! Fixed parameters (`vary == false`) stay in the set and take part in
//! every model evaluation, but are never handed to the optimizer.
//!
//! ```
//! use aquifer_params::{Parameter, ParameterSet};
//!
//! let mut set = ParameterSet::new();
//! set.push(Parameter::new("rain_A", 1.0, 1e-5, 100.0));
//! set.push(Parameter::new("rain_a", 10.0, 0.01, 1000.0).fixed());
//! assert_eq!(set.free_indices(), vec![0]);
//! assert!(set.validate().is_ok());
//! ```

mod error;
mod parameter;
mod set;

pub use error::ParamsError;
pub use parameter::Parameter;
pub use set::ParameterSet;
