//! # aquifer-rfunc
//!
//! Parametric response functions mapping a parameter vector and a time step
//! to a discrete response kernel.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["ResponseFunction"] -->|".default_parameters(prefix, up, meanstress)"| B["ParameterSet"]
//!     A -->|".duration(p, cutoff)?"| C["kernel length"]
//!     A -->|".kernel(p, &KernelOptions)?"| D["Kernel"]
//!     D -->|".block()"| E["block response"]
//!     D -->|".step()"| F["step response"]
//! ```
//!
//! Every variant takes the gain `A` as its first parameter, so the step
//! response approaches `A` whatever the time step.
//!
//! ```
//! use aquifer_rfunc::{KernelOptions, ResponseFunction};
//!
//! let rf = ResponseFunction::Exponential;
//! let kernel = rf.kernel(&[0.8, 50.0], &KernelOptions::new(1.0)).unwrap();
//! let step = kernel.step();
//! assert!((step[step.len() - 1] - 0.8).abs() < 0.8 * 1e-3);
//! ```

mod error;
mod exponential;
mod four_param;
mod gamma;
mod hantush;
mod kernel;
mod polder;
mod response;
pub mod special;

pub use error::RfuncError;
pub use kernel::{DEFAULT_CUTOFF, DEFAULT_MAX_LEN, Kernel, KernelOptions};
pub use response::ResponseFunction;

pub(crate) use response::require_positive;
