//! Storage states carried between time steps.

use serde::{Deserialize, Serialize};

/// Storages of the soil-moisture model, in the precipitation unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexState {
    /// Snow pack.
    pub snowpack: f64,
    /// Interception bucket.
    pub interception: f64,
    /// Root-zone storage.
    pub root_zone: f64,
}

impl FlexState {
    /// Starting state: empty snow and interception, root zone half full.
    pub fn initialize(srmax: f64) -> Self {
        Self {
            snowpack: 0.0,
            interception: 0.0,
            root_zone: 0.5 * srmax,
        }
    }

    /// Total water held in all storages.
    pub fn total(&self) -> f64 {
        self.snowpack + self.interception + self.root_zone
    }
}
