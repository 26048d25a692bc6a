//! # aquifer-convolve
//!
//! Convolution of stresses with response kernels on a regular
//! [`SimulationGrid`](aquifer_series::SimulationGrid).
//!
//! ```mermaid
//! graph LR
//!     A["StressInput"] -->|"align_to_grid + recharge"| B["stress on grid"]
//!     C["ResponseFunction"] -->|"kernel(dt)"| D["block response"]
//!     B --> E["convolve()"]
//!     D --> E
//!     E --> F["contribution"]
//! ```
//!
//! Grid points before the stress starts are filled with the stress mean by
//! default, so a warmup longer than the available data does not start from
//! a zero stress.

mod convolution;
mod error;
mod stress;

pub use convolution::{FFT_MIN_KERNEL, FFT_THRESHOLD, convolve, convolve_direct, convolve_fft};
pub use error::ConvolveError;
pub use stress::{StressInput, StressModel, StressSettings};
