//! The head model: stress models, a constant offset and an optional noise
//! model.

use std::ops::Range;

use aquifer_convolve::StressModel;
use aquifer_noise::{Innovations, NoiseModel};
use aquifer_params::{Parameter, ParameterSet, ParamsError};
use aquifer_series::{SimulationGrid, TIME_TOLERANCE, TimeSeries};
use tracing::{debug, instrument};

use crate::error::ModelError;
use crate::settings::ModelSettings;

/// Name of the constant offset parameter.
pub const CONSTANT_NAME: &str = "constant_d";

/// A lumped head model.
///
/// The full parameter vector is laid out as: every stress model in
/// insertion order, then `constant_d`, then the noise parameters.
#[derive(Clone, Debug)]
pub struct Model {
    observations: TimeSeries,
    stress_models: Vec<StressModel>,
    constant: ParameterSet,
    noise: Option<NoiseModel>,
    settings: ModelSettings,
}

impl Model {
    /// Creates a model for `observations`. NaN observations are dropped.
    pub fn new(observations: TimeSeries) -> Result<Self, ModelError> {
        let (times, values): (Vec<f64>, Vec<f64>) = observations
            .times()
            .iter()
            .zip(observations.values())
            .filter(|(_, v)| v.is_finite())
            .map(|(t, v)| (*t, *v))
            .unzip();
        if times.is_empty() {
            return Err(ModelError::NoObservations);
        }
        let dropped = observations.len() - times.len();
        if dropped > 0 {
            debug!(dropped, "dropped non-finite observations");
        }
        let observations = TimeSeries::new(times, values)?;
        let constant = ParameterSet::from_parameters(vec![Parameter::unbounded(
            CONSTANT_NAME,
            observations.mean(),
        )])?;
        Ok(Self {
            observations,
            stress_models: Vec::new(),
            constant,
            noise: None,
            settings: ModelSettings::default(),
        })
    }

    /// Adds a stress model; names must be unique.
    pub fn with_stress_model(mut self, stress_model: StressModel) -> Result<Self, ModelError> {
        if self.stress_model(stress_model.name()).is_some() {
            return Err(ModelError::DuplicateStressModel(
                stress_model.name().to_string(),
            ));
        }
        let mut all = self.parameters();
        all.try_extend(stress_model.parameters())?;
        self.stress_models.push(stress_model);
        Ok(self)
    }

    /// Sets the noise model.
    pub fn with_noise_model(mut self, noise: NoiseModel) -> Result<Self, ModelError> {
        let mut all = ParameterSet::new();
        for sm in &self.stress_models {
            all.try_extend(sm.parameters())?;
        }
        all.try_extend(&self.constant)?;
        all.try_extend(noise.parameters())?;
        self.noise = Some(noise);
        Ok(self)
    }

    /// Replaces the settings.
    pub fn with_settings(mut self, settings: ModelSettings) -> Result<Self, ModelError> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    pub fn observations(&self) -> &TimeSeries {
        &self.observations
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn stress_models(&self) -> &[StressModel] {
        &self.stress_models
    }

    pub fn noise_model(&self) -> Option<&NoiseModel> {
        self.noise.as_ref()
    }

    /// Looks a stress model up by name.
    pub fn stress_model(&self, name: &str) -> Option<&StressModel> {
        self.stress_models.iter().find(|sm| sm.name() == name)
    }

    /// The full ordered parameter set.
    pub fn parameters(&self) -> ParameterSet {
        let mut all = ParameterSet::new();
        for set in self.component_sets() {
            for p in set.iter() {
                all.push(p.clone());
            }
        }
        all
    }

    /// Length of the full parameter vector.
    pub fn n_params(&self) -> usize {
        self.component_sets().iter().map(|s| s.len()).sum()
    }

    /// Current (optimal) parameter values.
    pub fn optimal_values(&self) -> Vec<f64> {
        self.parameters().optimal_values()
    }

    /// Position of `constant_d` in the full vector.
    pub fn constant_index(&self) -> usize {
        self.stress_models.iter().map(|sm| sm.n_params()).sum()
    }

    /// Positions of the noise parameters in the full vector.
    pub fn noise_range(&self) -> Range<usize> {
        let start = self.constant_index() + 1;
        start..start + self.noise.as_ref().map_or(0, |n| n.n_params())
    }

    /// Overwrites all current values.
    pub fn set_optimal(&mut self, values: &[f64]) -> Result<(), ModelError> {
        self.check_len(values.len())?;
        let mut offset = 0;
        for set in self.component_sets_mut() {
            let n = set.len();
            set.set_optimal(&values[offset..offset + n])?;
            offset += n;
        }
        Ok(())
    }

    /// Overwrites all stored initial values.
    pub fn set_initial(&mut self, values: &[f64]) -> Result<(), ModelError> {
        self.check_len(values.len())?;
        let mut offset = 0;
        for set in self.component_sets_mut() {
            let n = set.len();
            set.set_initial(&values[offset..offset + n])?;
            offset += n;
        }
        Ok(())
    }

    /// Resets every current value to its initial value.
    pub fn reset(&mut self) {
        for set in self.component_sets_mut() {
            set.reset();
        }
    }

    /// Fixes (`false`) or frees (`true`) the parameter called `name`.
    pub fn set_vary(&mut self, name: &str, vary: bool) -> Result<(), ModelError> {
        let set = self.owning_set(name)?;
        Ok(set.set_vary(name, vary)?)
    }

    /// Sets the initial (and current) value of the parameter called `name`.
    pub fn set_initial_value(&mut self, name: &str, value: f64) -> Result<(), ModelError> {
        let set = self.owning_set(name)?;
        Ok(set.set_initial_value(name, value)?)
    }

    /// Replaces the bounds of the parameter called `name`.
    pub fn set_bounds(&mut self, name: &str, pmin: f64, pmax: f64) -> Result<(), ModelError> {
        let set = self.owning_set(name)?;
        Ok(set.set_bounds(name, pmin, pmax)?)
    }

    /// Resolves a calibration window against the observations.
    ///
    /// Missing bounds default to the first/last observation. Both must lie
    /// within the observation span, `tmax` must exceed `tmin`, and at least
    /// one observation must fall in the window.
    pub fn window(&self, tmin: Option<f64>, tmax: Option<f64>) -> Result<(f64, f64), ModelError> {
        let (start, end) = (self.observations.start(), self.observations.end());
        let check = |which: &'static str, value: f64| {
            if value.is_nan() || value < start - TIME_TOLERANCE || value > end + TIME_TOLERANCE {
                Err(ModelError::WindowOutsideObservations {
                    which,
                    value,
                    start,
                    end,
                })
            } else {
                Ok(value)
            }
        };
        let tmin = match tmin {
            Some(t) => check("tmin", t)?,
            None => start,
        };
        let tmax = match tmax {
            Some(t) => check("tmax", t)?,
            None => end,
        };
        if tmax <= tmin {
            return Err(ModelError::InvalidWindow { tmin, tmax });
        }
        if self.observations.window(tmin, tmax).is_err() {
            return Err(ModelError::NoObservationsInWindow { tmin, tmax });
        }
        Ok((tmin, tmax))
    }

    /// Regular grid from `tmin - warmup` covering `tmax`, with `tmin` on a
    /// grid point.
    pub fn grid(&self, tmin: f64, tmax: f64) -> Result<SimulationGrid, ModelError> {
        if tmin.is_nan() || tmax.is_nan() || tmax < tmin {
            return Err(ModelError::InvalidWindow { tmin, tmax });
        }
        let dt = self.settings.dt();
        let n_warmup = (self.settings.warmup() / dt).ceil() as usize;
        let n_window = ((tmax - tmin - TIME_TOLERANCE) / dt).ceil().max(0.0) as usize;
        Ok(SimulationGrid::with_len(
            tmin - n_warmup as f64 * dt,
            dt,
            n_warmup + n_window + 1,
        )?)
    }

    /// Simulated head on every point of `grid`, warmup included.
    pub fn simulate_grid(&self, p: &[f64], grid: &SimulationGrid) -> Result<Vec<f64>, ModelError> {
        self.check_len(p.len())?;
        let d = p[self.constant_index()];
        let mut head = vec![d; grid.len()];
        let mut offset = 0;
        for sm in &self.stress_models {
            let n = sm.n_params();
            let h = sm.contribution(&p[offset..offset + n], grid)?;
            head.iter_mut().zip(&h).for_each(|(a, b)| *a += b);
            offset += n;
        }
        Ok(head)
    }

    /// Simulated head on the regular grid within `[tmin, tmax]`.
    ///
    /// The warmup period is simulated but not returned. NaN parameters
    /// propagate into the output instead of failing.
    #[instrument(level = "debug", skip(self, p))]
    pub fn simulate(&self, p: &[f64], tmin: f64, tmax: f64) -> Result<TimeSeries, ModelError> {
        let grid = self.grid(tmin, tmax)?;
        let head = self.simulate_grid(p, &grid)?;
        Ok(grid.window_series(&head, tmin, tmax)?)
    }

    /// Observed minus simulated head at the observation times in the window.
    pub fn residuals(
        &self,
        p: &[f64],
        tmin: Option<f64>,
        tmax: Option<f64>,
    ) -> Result<TimeSeries, ModelError> {
        let (tmin, tmax) = self.window(tmin, tmax)?;
        let obs = self.observations.window(tmin, tmax)?;
        let grid = self.grid(tmin, tmax)?;
        let head = self.simulate_grid(p, &grid)?;
        let r = obs
            .times()
            .iter()
            .zip(obs.values())
            .map(|(&t, &h)| h - grid.interpolate(&head, t))
            .collect();
        Ok(TimeSeries::new(obs.times().to_vec(), r)?)
    }

    /// Residuals passed through the noise model.
    pub fn innovations(
        &self,
        p: &[f64],
        tmin: Option<f64>,
        tmax: Option<f64>,
    ) -> Result<Innovations, ModelError> {
        let noise = self.noise.as_ref().ok_or(ModelError::NoNoiseModel)?;
        let r = self.residuals(p, tmin, tmax)?;
        Ok(noise.transform(&p[self.noise_range()], &r)?)
    }

    /// Sum of squared residuals, or of weighted innovations when `noise` is
    /// set and the model has a noise model.
    pub fn sse(
        &self,
        p: &[f64],
        tmin: Option<f64>,
        tmax: Option<f64>,
        noise: bool,
    ) -> Result<f64, ModelError> {
        if noise && self.noise.is_some() {
            let inn = self.innovations(p, tmin, tmax)?;
            Ok(inn.weighted().iter().map(|v| v * v).sum())
        } else {
            let r = self.residuals(p, tmin, tmax)?;
            Ok(r.values().iter().map(|v| v * v).sum())
        }
    }

    /// Contribution of one stress model within `[tmin, tmax]`, warmup
    /// applied.
    pub fn contribution(
        &self,
        name: &str,
        p: &[f64],
        tmin: f64,
        tmax: f64,
    ) -> Result<TimeSeries, ModelError> {
        let (sm, range) = self.locate(name)?;
        self.check_len(p.len())?;
        let grid = self.grid(tmin, tmax)?;
        let h = sm.contribution(&p[range], &grid)?;
        Ok(grid.window_series(&h, tmin, tmax)?)
    }

    /// The stress of one stress model on the grid within `[tmin, tmax]`
    /// (after the recharge transform, if any).
    pub fn stress(
        &self,
        name: &str,
        p: &[f64],
        tmin: f64,
        tmax: f64,
    ) -> Result<TimeSeries, ModelError> {
        let (sm, range) = self.locate(name)?;
        self.check_len(p.len())?;
        let grid = self.grid(tmin, tmax)?;
        let s = sm.stress(&p[range], &grid)?;
        Ok(grid.window_series(&s, tmin, tmax)?)
    }

    /// Block response of one stress model at the model time step.
    pub fn block_response(&self, name: &str, p: &[f64]) -> Result<Vec<f64>, ModelError> {
        let (sm, range) = self.locate(name)?;
        self.check_len(p.len())?;
        Ok(sm.kernel(&p[range], self.settings.dt())?.into_block())
    }

    /// Step response of one stress model at the model time step.
    pub fn step_response(&self, name: &str, p: &[f64]) -> Result<Vec<f64>, ModelError> {
        let (sm, range) = self.locate(name)?;
        self.check_len(p.len())?;
        Ok(sm.kernel(&p[range], self.settings.dt())?.step())
    }

    fn locate(&self, name: &str) -> Result<(&StressModel, Range<usize>), ModelError> {
        let mut offset = 0;
        for sm in &self.stress_models {
            let n = sm.n_params();
            if sm.name() == name {
                return Ok((sm, offset..offset + n));
            }
            offset += n;
        }
        Err(ModelError::UnknownStressModel {
            name: name.to_string(),
            available: self
                .stress_models
                .iter()
                .map(|sm| sm.name())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    fn component_sets(&self) -> Vec<&ParameterSet> {
        let mut sets: Vec<&ParameterSet> =
            self.stress_models.iter().map(|sm| sm.parameters()).collect();
        sets.push(&self.constant);
        if let Some(noise) = &self.noise {
            sets.push(noise.parameters());
        }
        sets
    }

    fn component_sets_mut(&mut self) -> Vec<&mut ParameterSet> {
        let mut sets: Vec<&mut ParameterSet> = self
            .stress_models
            .iter_mut()
            .map(|sm| sm.parameters_mut())
            .collect();
        sets.push(&mut self.constant);
        if let Some(noise) = &mut self.noise {
            sets.push(noise.parameters_mut());
        }
        sets
    }

    fn owning_set(&mut self, name: &str) -> Result<&mut ParameterSet, ModelError> {
        self.component_sets_mut()
            .into_iter()
            .find(|set| set.index_of(name).is_some())
            .ok_or_else(|| ParamsError::UnknownParameter(name.to_string()).into())
    }

    fn check_len(&self, got: usize) -> Result<(), ModelError> {
        let expected = self.n_params();
        if got != expected {
            return Err(ModelError::ParameterCount { expected, got });
        }
        Ok(())
    }
}
