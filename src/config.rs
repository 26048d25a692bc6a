use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use aquifer_model::ModelSettings;
use aquifer_noise::NoiseKind;
use aquifer_recharge::Recharge;
use aquifer_rfunc::ResponseFunction;
use aquifer_solve::{FitOptions, NelderMeadSolver};

/// Top-level configuration of a synthetic calibration run.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AquiferConfig {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Simulation time step and warmup.
    #[serde(default)]
    pub model: ModelSettings,

    /// Synthetic record settings.
    #[serde(default)]
    pub synthetic: SyntheticToml,

    /// Stress blocks, in model order.
    #[serde(default, rename = "stress")]
    pub stresses: Vec<StressToml>,

    /// Noise model used during calibration.
    #[serde(default)]
    pub noise: Option<NoiseToml>,

    /// Solver settings.
    #[serde(default)]
    pub solver: NelderMeadSolver,

    /// Calibration options.
    #[serde(default)]
    pub fit: FitOptions,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyntheticToml {
    /// Length of the forcing record, days.
    #[serde(default = "default_n_days")]
    pub n_days: usize,
    /// Mean spacing of the observations, days.
    #[serde(default = "default_obs_interval")]
    pub obs_interval: f64,
    /// Draw exponential gaps between observations instead of a fixed step.
    #[serde(default)]
    pub irregular: bool,
    /// True constant offset `d`.
    #[serde(default = "default_constant")]
    pub constant: f64,
    /// Standard deviation of the AR(1) head noise (0 disables it).
    #[serde(default)]
    pub noise_sd: f64,
    /// Decay time of the AR(1) head noise, days.
    #[serde(default = "default_noise_alpha")]
    pub noise_alpha: f64,
}

impl Default for SyntheticToml {
    fn default() -> Self {
        Self {
            n_days: default_n_days(),
            obs_interval: default_obs_interval(),
            irregular: false,
            constant: default_constant(),
            noise_sd: 0.0,
            noise_alpha: default_noise_alpha(),
        }
    }
}

fn default_n_days() -> usize {
    7300
}
fn default_obs_interval() -> f64 {
    14.0
}
fn default_constant() -> f64 {
    10.0
}
fn default_noise_alpha() -> f64 {
    10.0
}

/// Synthetic forcing of a stress block.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ForcingToml {
    /// Intermittent rainfall, mm/day.
    Rainfall,
    /// Seasonal potential evaporation, mm/day.
    Evaporation,
    /// Piecewise constant pumping rate.
    Pumping,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StressToml {
    pub name: String,
    pub rfunc: ResponseFunction,
    /// Forcing for single-series blocks; ignored when `recharge` is set.
    #[serde(default = "default_forcing")]
    pub forcing: ForcingToml,
    /// Turns the block into a recharge block on rainfall and evaporation.
    #[serde(default)]
    pub recharge: Option<Recharge>,
    /// True parameter values: response function first, then recharge.
    pub parameters: Vec<f64>,
}

fn default_forcing() -> ForcingToml {
    ForcingToml::Rainfall
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseToml {
    #[serde(default = "default_noise_kind")]
    pub kind: NoiseKind,
}

fn default_noise_kind() -> NoiseKind {
    NoiseKind::Ar1
}

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<AquiferConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: AquiferConfig =
        toml::from_str(&toml_str).context("failed to parse TOML config")?;
    config.model.validate().context("invalid [model] settings")?;
    config.solver.validate().context("invalid [solver] settings")?;
    config.fit.validate().context("invalid [fit] settings")?;
    Ok(config)
}
