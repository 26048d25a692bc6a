//! # aquifer-recharge
//!
//! Transforms turning precipitation and potential evaporation (and, with
//! snow accounting, temperature) into an effective recharge stress.
//!
//! ```mermaid
//! graph LR
//!     P["precipitation"] --> S["snow store (optional)"]
//!     T["temperature"] --> S
//!     S -->|"rain + melt"| I["interception bucket"]
//!     E["potential evaporation"] --> I
//!     I -->|"effective precipitation"| R["root zone"]
//!     E --> R
//!     R -->|"percolation"| O["recharge"]
//!     R -->|"overflow"| Q["runoff"]
//! ```
//!
//! The soil-moisture recursion is inherently sequential: every step depends
//! on the storages left by the previous one.
//!
//! ```
//! use aquifer_recharge::Recharge;
//!
//! let rch = Recharge::flex();
//! let p = rch.default_parameters("rch").initial_values();
//! let out = rch.compute(&p, &[5.0; 30], &[1.0; 30], None, 1.0).unwrap();
//! assert_eq!(out.recharge.len(), 30);
//! assert_eq!(out.clipped, 0);
//! ```

mod error;
pub mod processes;
mod state;
mod transform;

pub use error::RechargeError;
pub use state::FlexState;
pub use transform::{Recharge, RechargeOutput};
