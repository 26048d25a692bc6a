//! Stress models: a stress input, a response function and their parameters.

use aquifer_params::ParameterSet;
use aquifer_recharge::{Recharge, RechargeError};
use aquifer_rfunc::{DEFAULT_CUTOFF, DEFAULT_MAX_LEN, Kernel, KernelOptions, ResponseFunction};
use aquifer_series::{FillPolicy, SimulationGrid, TimeSeries, align_to_grid};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::convolution::convolve;
use crate::error::ConvolveError;

/// Per-stress-model settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressSettings {
    fill_before: FillPolicy,
    fill_after: FillPolicy,
    cutoff: f64,
    up: Option<bool>,
    max_len: usize,
}

impl Default for StressSettings {
    fn default() -> Self {
        Self {
            fill_before: FillPolicy::Mean,
            fill_after: FillPolicy::Mean,
            cutoff: DEFAULT_CUTOFF,
            up: Some(true),
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl StressSettings {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill policy for grid points before the stress starts.
    pub fn with_fill_before(mut self, fill: FillPolicy) -> Self {
        self.fill_before = fill;
        self
    }

    /// Fill policy for grid points after the stress ends.
    pub fn with_fill_after(mut self, fill: FillPolicy) -> Self {
        self.fill_after = fill;
        self
    }

    /// Kernel cutoff fraction.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Expected sign of the gain: `Some(true)` rising head, `Some(false)`
    /// falling head, `None` unknown.
    pub fn with_up(mut self, up: Option<bool>) -> Self {
        self.up = up;
        self
    }

    /// Kernel sample cap.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn fill_before(&self) -> FillPolicy {
        self.fill_before
    }

    pub fn fill_after(&self) -> FillPolicy {
        self.fill_after
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn up(&self) -> Option<bool> {
        self.up
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Checks the cutoff and the sample cap.
    pub fn validate(&self) -> Result<(), ConvolveError> {
        if !(self.cutoff > 0.0 && self.cutoff < 1.0) {
            return Err(ConvolveError::InvalidSettings(format!(
                "cutoff must lie in (0, 1), got {}",
                self.cutoff
            )));
        }
        if self.max_len == 0 {
            return Err(ConvolveError::InvalidSettings(
                "max_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn kernel_options(&self, dt: f64) -> KernelOptions {
        KernelOptions::new(dt)
            .with_cutoff(self.cutoff)
            .with_max_len(self.max_len)
    }
}

/// The stress a [`StressModel`] convolves.
#[derive(Clone, Debug, PartialEq)]
pub enum StressInput {
    /// A single series used as is.
    Single(TimeSeries),
    /// Recharge computed from precipitation and evaporation (and temperature
    /// with snow accounting) on every evaluation.
    Recharge {
        /// Precipitation.
        precipitation: TimeSeries,
        /// Potential evaporation.
        evaporation: TimeSeries,
        /// Mean daily temperature.
        temperature: Option<TimeSeries>,
        /// The transform.
        transform: Recharge,
    },
}

/// One explanatory term of a head model: a stress convolved with a
/// response function.
///
/// Parameters are laid out response function first (gain leading), then
/// recharge parameters, all named `{name}_{parameter}`.
#[derive(Clone, Debug, PartialEq)]
pub struct StressModel {
    name: String,
    input: StressInput,
    rfunc: ResponseFunction,
    parameters: ParameterSet,
    settings: StressSettings,
}

impl StressModel {
    /// A stress model on a single series, with default parameters scaled by
    /// the stress standard deviation.
    pub fn new(
        name: impl Into<String>,
        stress: TimeSeries,
        rfunc: ResponseFunction,
    ) -> Result<Self, ConvolveError> {
        Self::build(name.into(), StressInput::Single(stress), rfunc)
    }

    /// A recharge stress model on precipitation and evaporation.
    ///
    /// Fails with [`RechargeError::MissingTemperature`] when the transform
    /// does snow accounting; use [`StressModel::recharge_with_temperature`].
    pub fn recharge(
        name: impl Into<String>,
        precipitation: TimeSeries,
        evaporation: TimeSeries,
        rfunc: ResponseFunction,
        transform: Recharge,
    ) -> Result<Self, ConvolveError> {
        if transform.requires_temperature() {
            return Err(RechargeError::MissingTemperature.into());
        }
        let input = StressInput::Recharge {
            precipitation,
            evaporation,
            temperature: None,
            transform,
        };
        Self::build(name.into(), input, rfunc)
    }

    /// A recharge stress model with the temperature series used by snow
    /// accounting.
    pub fn recharge_with_temperature(
        name: impl Into<String>,
        precipitation: TimeSeries,
        evaporation: TimeSeries,
        temperature: TimeSeries,
        rfunc: ResponseFunction,
        transform: Recharge,
    ) -> Result<Self, ConvolveError> {
        let input = StressInput::Recharge {
            precipitation,
            evaporation,
            temperature: Some(temperature),
            transform,
        };
        Self::build(name.into(), input, rfunc)
    }

    fn build(
        name: String,
        input: StressInput,
        rfunc: ResponseFunction,
    ) -> Result<Self, ConvolveError> {
        if name.trim().is_empty() {
            return Err(ConvolveError::EmptyName);
        }
        let settings = StressSettings::default();
        let mut model = Self {
            name,
            input,
            rfunc,
            parameters: ParameterSet::new(),
            settings,
        };
        model.parameters = model.default_parameters();
        Ok(model)
    }

    /// Replaces the settings and re-derives the default parameters (the
    /// gain bounds depend on [`StressSettings::up`]).
    pub fn with_settings(mut self, settings: StressSettings) -> Result<Self, ConvolveError> {
        settings.validate()?;
        self.settings = settings;
        self.parameters = self.default_parameters();
        Ok(self)
    }

    /// Replaces the parameter set; names and order must match the defaults.
    pub fn with_parameters(mut self, parameters: ParameterSet) -> Result<Self, ConvolveError> {
        if parameters.len() != self.n_params() {
            return Err(ConvolveError::ParameterCount {
                name: self.name.clone(),
                expected: self.n_params(),
                got: parameters.len(),
            });
        }
        parameters.validate()?;
        self.parameters = parameters;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &StressInput {
        &self.input
    }

    pub fn rfunc(&self) -> ResponseFunction {
        self.rfunc
    }

    pub fn settings(&self) -> &StressSettings {
        &self.settings
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Mutable access for fixing, freeing or re-bounding parameters.
    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    /// Total number of parameters.
    pub fn n_params(&self) -> usize {
        self.rfunc.n_params() + self.transform().map_or(0, |t| t.n_params())
    }

    fn transform(&self) -> Option<Recharge> {
        match &self.input {
            StressInput::Single(_) => None,
            StressInput::Recharge { transform, .. } => Some(*transform),
        }
    }

    /// Standard deviation of the raw stress used to scale the default gain.
    fn meanstress(&self) -> f64 {
        let sd = match &self.input {
            StressInput::Single(s) => s.std(),
            StressInput::Recharge { precipitation, .. } => precipitation.std(),
        };
        if sd.is_finite() && sd > 0.0 { sd } else { 1.0 }
    }

    fn default_parameters(&self) -> ParameterSet {
        let mut set = self
            .rfunc
            .default_parameters(&self.name, self.settings.up, self.meanstress());
        if let Some(t) = self.transform() {
            for p in t.default_parameters(&self.name).iter() {
                set.push(p.clone());
            }
        }
        set
    }

    fn split<'a>(&self, p: &'a [f64]) -> Result<(&'a [f64], &'a [f64]), ConvolveError> {
        if p.len() != self.n_params() {
            return Err(ConvolveError::ParameterCount {
                name: self.name.clone(),
                expected: self.n_params(),
                got: p.len(),
            });
        }
        Ok(p.split_at(self.rfunc.n_params()))
    }

    /// First and last timestamp of the raw stress input.
    pub fn span(&self) -> (f64, f64) {
        match &self.input {
            StressInput::Single(s) => (s.start(), s.end()),
            StressInput::Recharge {
                precipitation,
                evaporation,
                ..
            } => (
                precipitation.start().max(evaporation.start()),
                precipitation.end().min(evaporation.end()),
            ),
        }
    }

    /// The stress on `grid` (after the recharge transform, if any).
    pub fn stress(&self, p: &[f64], grid: &SimulationGrid) -> Result<Vec<f64>, ConvolveError> {
        let (_, p_rch) = self.split(p)?;
        let s = &self.settings;
        match &self.input {
            StressInput::Single(series) => {
                Ok(align_to_grid(series, grid, s.fill_before, s.fill_after).values)
            }
            StressInput::Recharge {
                precipitation,
                evaporation,
                temperature,
                transform,
            } => {
                let prec = align_to_grid(precipitation, grid, s.fill_before, s.fill_after);
                let evap = align_to_grid(evaporation, grid, s.fill_before, s.fill_after);
                let temp = temperature
                    .as_ref()
                    .map(|t| align_to_grid(t, grid, s.fill_before, s.fill_after).values);
                let out = transform.compute(
                    p_rch,
                    &prec.values,
                    &evap.values,
                    temp.as_deref(),
                    grid.dt(),
                )?;
                Ok(out.recharge)
            }
        }
    }

    /// The response kernel at the grid step.
    pub fn kernel(&self, p: &[f64], dt: f64) -> Result<Kernel, ConvolveError> {
        let (p_rf, _) = self.split(p)?;
        Ok(self.rfunc.kernel(p_rf, &self.settings.kernel_options(dt))?)
    }

    /// Time for the step response to reach the cutoff.
    pub fn response_duration(&self, p: &[f64]) -> Result<f64, ConvolveError> {
        let (p_rf, _) = self.split(p)?;
        Ok(self.rfunc.duration(p_rf, self.settings.cutoff)?)
    }

    /// Contribution of this stress model to the head on every grid point.
    pub fn contribution(
        &self,
        p: &[f64],
        grid: &SimulationGrid,
    ) -> Result<Vec<f64>, ConvolveError> {
        let stress = self.stress(p, grid)?;
        let kernel = self.kernel(p, grid.dt())?;
        debug!(
            stress_model = %self.name,
            n = stress.len(),
            kernel_len = kernel.len(),
            "convolving stress"
        );
        Ok(convolve(&stress, kernel.block()))
    }
}
