//! Discrete response kernels.

use serde::{Deserialize, Serialize};

use crate::error::RfuncError;

/// Default fraction of the gain at which a kernel is cut off.
pub const DEFAULT_CUTOFF: f64 = 0.999;

/// Default cap on the number of kernel samples.
pub const DEFAULT_MAX_LEN: usize = 100_000;

/// Sampling options for [`crate::ResponseFunction::kernel`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelOptions {
    dt: f64,
    cutoff: f64,
    max_len: usize,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            dt: 1.0,
            cutoff: DEFAULT_CUTOFF,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl KernelOptions {
    /// Options with time step `dt` and default cutoff and cap.
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            ..Self::default()
        }
    }

    /// Sets the cutoff fraction.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Sets the sample cap (at least one sample is always kept).
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(1);
        self
    }

    /// Time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Cutoff fraction.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Sample cap.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Validates the time step and cutoff.
    pub fn validate(&self) -> Result<(), RfuncError> {
        check_dt(self.dt)?;
        check_cutoff(self.cutoff)
    }
}

pub(crate) fn check_dt(dt: f64) -> Result<(), RfuncError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(RfuncError::InvalidTimeStep { dt });
    }
    Ok(())
}

pub(crate) fn check_cutoff(cutoff: f64) -> Result<(), RfuncError> {
    if !(cutoff > 0.0 && cutoff < 1.0) {
        return Err(RfuncError::InvalidCutoff { cutoff });
    }
    Ok(())
}

/// A block response sampled at a fixed time step.
///
/// `block[0]` is the step response after one step; every later entry is the
/// step increment over one step. The step response is the running sum of the
/// block response.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    block: Vec<f64>,
    dt: f64,
    duration: f64,
    truncated: bool,
}

impl Kernel {
    pub(crate) fn from_step(step: &[f64], dt: f64, duration: f64, truncated: bool) -> Self {
        let mut block = Vec::with_capacity(step.len());
        let mut prev = 0.0;
        for &s in step {
            block.push(s - prev);
            prev = s;
        }
        Self {
            block,
            dt,
            duration,
            truncated,
        }
    }

    pub(crate) fn nan(dt: f64) -> Self {
        Self {
            block: vec![f64::NAN],
            dt,
            duration: f64::NAN,
            truncated: false,
        }
    }

    /// Block response samples.
    pub fn block(&self) -> &[f64] {
        &self.block
    }

    /// Step response: running sum of [`Kernel::block`].
    pub fn step(&self) -> Vec<f64> {
        self.block
            .iter()
            .scan(0.0, |acc, &b| {
                *acc += b;
                Some(*acc)
            })
            .collect()
    }

    /// Consumes the kernel, returning the block response.
    pub fn into_block(self) -> Vec<f64> {
        self.block
    }

    /// Number of samples (never zero).
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// Always `false`.
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Sampling time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Time at which the continuous step response reaches the cutoff.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// `true` if the sample cap cut the kernel short of its duration.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_defaults_and_builders() {
        let o = KernelOptions::default();
        assert_eq!(o.dt(), 1.0);
        assert_eq!(o.cutoff(), DEFAULT_CUTOFF);
        let o = KernelOptions::new(0.5).with_cutoff(0.99).with_max_len(0);
        assert_eq!((o.dt(), o.cutoff(), o.max_len()), (0.5, 0.99, 1));
    }

    #[test]
    fn options_validation() {
        assert!(KernelOptions::new(1.0).validate().is_ok());
        assert_eq!(
            KernelOptions::new(0.0).validate(),
            Err(RfuncError::InvalidTimeStep { dt: 0.0 })
        );
        assert!(matches!(
            KernelOptions::new(1.0).with_cutoff(1.0).validate(),
            Err(RfuncError::InvalidCutoff { .. })
        ));
    }

    #[test]
    fn block_is_step_increments() {
        let k = Kernel::from_step(&[0.5, 0.75, 0.875], 1.0, 3.0, false);
        assert_eq!(k.block(), &[0.5, 0.25, 0.125]);
        assert_eq!(k.step(), vec![0.5, 0.75, 0.875]);
        assert_eq!(k.len(), 3);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let o: KernelOptions = serde_json::from_str(r#"{"dt":0.25}"#).unwrap();
        assert_eq!(o.dt(), 0.25);
        assert_eq!(o.max_len(), DEFAULT_MAX_LEN);
    }
}
