//! Model-wide simulation settings.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Default warmup period (days).
pub const DEFAULT_WARMUP: f64 = 3650.0;

/// Simulation time step and warmup length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    dt: f64,
    warmup: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dt: 1.0,
            warmup: DEFAULT_WARMUP,
        }
    }
}

impl ModelSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation time step in days.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Length of the period simulated before `tmin` and then discarded.
    pub fn with_warmup(mut self, warmup: f64) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn warmup(&self) -> f64 {
        self.warmup
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ModelError::InvalidSettings(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        if !self.warmup.is_finite() || self.warmup < 0.0 {
            return Err(ModelError::InvalidSettings(format!(
                "warmup must be finite and >= 0, got {}",
                self.warmup
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = ModelSettings::default();
        assert_eq!(s.dt(), 1.0);
        assert_eq!(s.warmup(), DEFAULT_WARMUP);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn validation() {
        assert!(ModelSettings::new().with_dt(0.0).validate().is_err());
        assert!(ModelSettings::new().with_warmup(-1.0).validate().is_err());
        assert!(ModelSettings::new().with_warmup(0.0).validate().is_ok());
    }

    #[test]
    fn toml_partial() {
        let s: ModelSettings = toml::from_str("warmup = 365.0").unwrap();
        assert_eq!(s.warmup(), 365.0);
        assert_eq!(s.dt(), 1.0);
    }
}
