//! Recharge transform variants.

use aquifer_params::{Parameter, ParameterSet};
use aquifer_series::{TIME_TOLERANCE, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RechargeError;
use crate::processes;
use crate::state::FlexState;

const FLEX_NAMES: &[&str] = &["srmax", "lp", "ks", "gamma", "simax", "kv"];
const FLEX_SNOW_NAMES: &[&str] = &["srmax", "lp", "ks", "gamma", "simax", "kv", "tt", "k"];
const LINEAR_NAMES: &[&str] = &["f"];

/// Transform from precipitation and potential evaporation to recharge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recharge {
    /// `R = P + f E`, with `f` typically negative.
    Linear,
    /// Interception bucket plus a non-linear root-zone reservoir, with an
    /// optional degree-day snow store in front.
    FlexModel {
        /// Enables the snow sub-step (needs a temperature series).
        #[serde(default)]
        snow: bool,
    },
}

/// Result of running a recharge transform.
#[derive(Clone, Debug, PartialEq)]
pub struct RechargeOutput {
    /// Recharge rate, one value per input step.
    pub recharge: Vec<f64>,
    /// Steps in which the root-zone storage had to be clamped at zero.
    pub clipped: usize,
    /// Total overflow above the root-zone capacity.
    pub runoff: f64,
    /// Total actual evaporation (interception plus root zone).
    pub evaporation: f64,
    /// Storages after the last step.
    pub state: FlexState,
}

impl Recharge {
    /// The linear transform.
    pub fn linear() -> Self {
        Recharge::Linear
    }

    /// The soil-moisture transform without snow.
    pub fn flex() -> Self {
        Recharge::FlexModel { snow: false }
    }

    /// Enables snow accounting; no effect on [`Recharge::Linear`].
    pub fn with_snow(self) -> Self {
        match self {
            Recharge::Linear => Recharge::Linear,
            Recharge::FlexModel { .. } => Recharge::FlexModel { snow: true },
        }
    }

    /// Identifier used in configuration files and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Recharge::Linear => "linear",
            Recharge::FlexModel { .. } => "flex_model",
        }
    }

    /// Whether a temperature series is required.
    pub fn requires_temperature(&self) -> bool {
        matches!(self, Recharge::FlexModel { snow: true })
    }

    /// Unprefixed parameter names.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            Recharge::Linear => LINEAR_NAMES,
            Recharge::FlexModel { snow: false } => FLEX_NAMES,
            Recharge::FlexModel { snow: true } => FLEX_SNOW_NAMES,
        }
    }

    /// Number of parameters.
    pub fn n_params(&self) -> usize {
        self.param_names().len()
    }

    /// Default parameters named `{prefix}_{name}`.
    pub fn default_parameters(&self, prefix: &str) -> ParameterSet {
        let params = match self {
            Recharge::Linear => vec![Parameter::new("f", -1.0, -2.0, 0.0)],
            Recharge::FlexModel { snow } => {
                let mut v = vec![
                    Parameter::new("srmax", 250.0, 1e-5, 1e3),
                    Parameter::new("lp", 0.25, 1e-5, 1.0).fixed(),
                    Parameter::new("ks", 100.0, 1.0, 1e4),
                    Parameter::new("gamma", 2.0, 1e-5, 20.0),
                    Parameter::new("simax", 2.0, 0.0, 10.0).fixed(),
                    Parameter::new("kv", 1.0, 0.25, 2.0).fixed(),
                ];
                if *snow {
                    v.push(Parameter::new("tt", 0.0, -5.0, 5.0));
                    v.push(Parameter::new("k", 2.0, 1.0, 20.0));
                }
                v
            }
        };
        params.into_iter().map(|p| p.prefixed(prefix)).collect()
    }

    /// Checks the parameter count and the sign constraints.
    pub fn check_parameters(&self, p: &[f64]) -> Result<(), RechargeError> {
        if p.len() != self.n_params() {
            return Err(RechargeError::ParameterCount {
                expected: self.n_params(),
                got: p.len(),
            });
        }
        if p.iter().any(|v| v.is_nan()) {
            return Ok(());
        }
        if let Recharge::FlexModel { snow } = self {
            for (i, name) in ["srmax", "lp", "ks", "gamma"].into_iter().enumerate() {
                if p[i] <= 0.0 {
                    return Err(RechargeError::NonPositiveParameter { name, value: p[i] });
                }
            }
            let mut non_negative = vec![("simax", p[4]), ("kv", p[5])];
            if *snow {
                non_negative.push(("k", p[7]));
            }
            for (name, value) in non_negative {
                if value < 0.0 {
                    return Err(RechargeError::NegativeParameter { name, value });
                }
            }
        }
        Ok(())
    }

    /// Runs the transform over aligned input slices with time step `dt`.
    ///
    /// Precipitation and evaporation are rates per unit time; the recharge
    /// is returned as a rate in the same unit. The state recursion runs
    /// strictly forward in time.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`RechargeError::ParameterCount`] | wrong number of parameters |
    /// | [`RechargeError::NonPositiveParameter`] / [`RechargeError::NegativeParameter`] | parameter outside its physical domain |
    /// | [`RechargeError::InvalidTimeStep`] | `dt` not finite and positive |
    /// | [`RechargeError::LengthMismatch`] | input slices of unequal length |
    /// | [`RechargeError::MissingTemperature`] | snow enabled without temperature |
    pub fn compute(
        &self,
        p: &[f64],
        precipitation: &[f64],
        evaporation: &[f64],
        temperature: Option<&[f64]>,
        dt: f64,
    ) -> Result<RechargeOutput, RechargeError> {
        self.check_parameters(p)?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(RechargeError::InvalidTimeStep { dt });
        }
        let n = precipitation.len();
        if evaporation.len() != n {
            return Err(RechargeError::LengthMismatch {
                name: "evaporation",
                expected: n,
                got: evaporation.len(),
            });
        }
        let temperature = match (self.requires_temperature(), temperature) {
            (true, None) => return Err(RechargeError::MissingTemperature),
            (true, Some(t)) if t.len() != n => {
                return Err(RechargeError::LengthMismatch {
                    name: "temperature",
                    expected: n,
                    got: t.len(),
                });
            }
            (true, Some(t)) => Some(t),
            (false, _) => None,
        };

        if p.iter().any(|v| v.is_nan()) {
            return Ok(RechargeOutput {
                recharge: vec![f64::NAN; n],
                clipped: 0,
                runoff: f64::NAN,
                evaporation: f64::NAN,
                state: FlexState::default(),
            });
        }

        let output = match self {
            Recharge::Linear => RechargeOutput {
                recharge: precipitation
                    .iter()
                    .zip(evaporation)
                    .map(|(&pr, &ep)| pr + p[0] * ep)
                    .collect(),
                clipped: 0,
                runoff: 0.0,
                evaporation: 0.0,
                state: FlexState::default(),
            },
            Recharge::FlexModel { .. } => run_flex(p, precipitation, evaporation, temperature, dt),
        };
        if output.clipped > 0 {
            warn!(
                transform = self.name(),
                clipped = output.clipped,
                steps = n,
                "root-zone storage clamped at zero"
            );
        }
        Ok(output)
    }

    /// Runs the transform on series sharing one regular time axis and
    /// returns the recharge on that axis.
    pub fn compute_series(
        &self,
        p: &[f64],
        precipitation: &TimeSeries,
        evaporation: &TimeSeries,
        temperature: Option<&TimeSeries>,
    ) -> Result<(TimeSeries, RechargeOutput), RechargeError> {
        check_same_axis("evaporation", precipitation, evaporation)?;
        if let Some(t) = temperature {
            check_same_axis("temperature", precipitation, t)?;
        }
        let dt = regular_step(precipitation)?;
        let output = self.compute(
            p,
            precipitation.values(),
            evaporation.values(),
            temperature.map(|t| t.values()),
            dt,
        )?;
        let series = TimeSeries::new(precipitation.times().to_vec(), output.recharge.clone())?;
        Ok((series, output))
    }
}

fn run_flex(
    p: &[f64],
    precipitation: &[f64],
    evaporation: &[f64],
    temperature: Option<&[f64]>,
    dt: f64,
) -> RechargeOutput {
    let (srmax, lp, ks, gamma, simax, kv) = (p[0], p[1], p[2], p[3], p[4], p[5]);
    let mut state = FlexState::initialize(srmax);
    let mut recharge = Vec::with_capacity(precipitation.len());
    let mut clipped = 0;
    let mut runoff = 0.0;
    let mut total_evaporation = 0.0;

    for i in 0..precipitation.len() {
        let mut liquid = precipitation[i] * dt;
        if let Some(temp) = temperature {
            let (tt, k) = (p[6], p[7]);
            let (rain, snowfall) = processes::partition_precipitation(liquid, temp[i], tt);
            state.snowpack += snowfall;
            let melt = processes::snow_melt(state.snowpack, temp[i], tt, k, dt);
            state.snowpack -= melt;
            liquid = rain + melt;
        }

        let demand = evaporation[i].max(0.0) * dt;
        let (si, pe, ei) = processes::interception(state.interception, liquid, demand, simax);
        state.interception = si;

        let ea = processes::root_zone_evaporation(state.root_zone, demand - ei, srmax, lp, kv);
        let r = processes::percolation(state.root_zone, srmax, ks, gamma, dt);
        let step = processes::root_zone_step(state.root_zone, pe, ea, r, srmax);
        state.root_zone = step.storage;
        if step.clipped {
            clipped += 1;
        }
        runoff += step.runoff;
        total_evaporation += ei + step.evaporation;
        recharge.push(step.percolation / dt);
    }

    RechargeOutput {
        recharge,
        clipped,
        runoff,
        evaporation: total_evaporation,
        state,
    }
}

fn check_same_axis(
    name: &'static str,
    reference: &TimeSeries,
    other: &TimeSeries,
) -> Result<(), RechargeError> {
    if other.len() != reference.len() {
        return Err(RechargeError::LengthMismatch {
            name,
            expected: reference.len(),
            got: other.len(),
        });
    }
    let aligned = reference
        .times()
        .iter()
        .zip(other.times())
        .all(|(a, b)| (a - b).abs() <= TIME_TOLERANCE);
    if !aligned {
        return Err(RechargeError::MisalignedSeries { name });
    }
    Ok(())
}

fn regular_step(series: &TimeSeries) -> Result<f64, RechargeError> {
    let times = series.times();
    if times.len() < 2 {
        return Ok(1.0);
    }
    let first = times[1] - times[0];
    for (i, w) in times.windows(2).enumerate() {
        let found = w[1] - w[0];
        if (found - first).abs() > TIME_TOLERANCE {
            return Err(RechargeError::IrregularSeries {
                first,
                found,
                index: i + 1,
            });
        }
    }
    Ok(first)
}
