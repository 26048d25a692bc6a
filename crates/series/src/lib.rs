//! # aquifer-series
//!
//! Time series containers and the regular simulation grid that every
//! model evaluation runs on.
//!
//! Time is measured in days (`f64`) since an arbitrary epoch. Stress and
//! observation series may be irregularly spaced; simulations always run on
//! a regular [`SimulationGrid`] with step `dt`.
//!
//! ```mermaid
//! graph LR
//!     A["TimeSeries (irregular stress)"] -->|"align_to_grid()"| B["values on SimulationGrid"]
//!     B -->|"convolution"| C["head on grid"]
//!     C -->|"SimulationGrid::interpolate()"| D["head at observation times"]
//! ```

mod align;
mod error;
mod grid;
mod series;

pub use align::{Aligned, FillPolicy, align_to_grid};
pub use error::SeriesError;
pub use grid::SimulationGrid;
pub use series::TimeSeries;

/// Tolerance (days) used when comparing timestamps.
pub const TIME_TOLERANCE: f64 = 1e-6;
