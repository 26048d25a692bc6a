//! Synthetic command: generate heads from known parameters, then calibrate
//! a fresh model on them.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};
use serde::Serialize;
use tracing::{info, info_span, warn};

use aquifer_convolve::StressModel;
use aquifer_model::{CONSTANT_NAME, Model};
use aquifer_noise::NoiseModel;
use aquifer_series::TimeSeries;
use aquifer_solve::{FitResult, fit};

use crate::cli::SyntheticArgs;
use crate::config::{self, AquiferConfig, ForcingToml, StressToml, SyntheticToml};

/// Daily forcing series starting at t = 0.
struct Forcing {
    rainfall: TimeSeries,
    evaporation: TimeSeries,
    temperature: TimeSeries,
    pumping: TimeSeries,
}

impl Forcing {
    fn generate<R: Rng>(n_days: usize, rng: &mut R) -> Result<Self> {
        let wet = Exp::new(1.0 / 6.0).context("invalid rainfall distribution")?;
        let jitter = Normal::new(0.0, 2.0).context("invalid temperature distribution")?;
        let season = |t: f64, shift: f64| (2.0 * std::f64::consts::PI * (t - shift) / 365.25).sin();

        let mut rainfall = Vec::with_capacity(n_days);
        let mut evaporation = Vec::with_capacity(n_days);
        let mut temperature = Vec::with_capacity(n_days);
        let mut pumping = Vec::with_capacity(n_days);
        let mut rate = 0.0;
        let mut next_switch = 0.0;
        for i in 0..n_days {
            let t = i as f64;
            let p = if rng.random_range(0.0..1.0) < 0.35 {
                wet.sample(rng)
            } else {
                0.0
            };
            rainfall.push(p);
            evaporation.push((2.0 + 1.5 * season(t, 80.0)).max(0.1));
            temperature.push(8.0 + 10.0 * season(t, 100.0) + jitter.sample(rng));
            if t >= next_switch {
                rate = 50.0 * f64::from(rng.random_range(0..4u8));
                next_switch = t + rng.random_range(180.0..720.0);
            }
            pumping.push(rate);
        }
        Ok(Self {
            rainfall: TimeSeries::regular(0.0, 1.0, rainfall)?,
            evaporation: TimeSeries::regular(0.0, 1.0, evaporation)?,
            temperature: TimeSeries::regular(0.0, 1.0, temperature)?,
            pumping: TimeSeries::regular(0.0, 1.0, pumping)?,
        })
    }

    fn series(&self, forcing: ForcingToml) -> &TimeSeries {
        match forcing {
            ForcingToml::Rainfall => &self.rainfall,
            ForcingToml::Evaporation => &self.evaporation,
            ForcingToml::Pumping => &self.pumping,
        }
    }
}

/// Observation times from `start` to `end`, regular or with exponential gaps.
fn observation_times<R: Rng>(
    cfg: &SyntheticToml,
    start: f64,
    end: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if cfg.obs_interval.is_nan() || cfg.obs_interval <= 0.0 {
        bail!("obs_interval must be positive, got {}", cfg.obs_interval);
    }
    if end <= start {
        bail!("record too short: observations would start at {start} but the record ends at {end}");
    }
    let gaps = Exp::new(1.0 / cfg.obs_interval).context("invalid observation interval")?;
    let mut times = vec![start];
    loop {
        let gap = if cfg.irregular {
            gaps.sample(rng).max(0.01)
        } else {
            cfg.obs_interval
        };
        let t = times[times.len() - 1] + gap;
        if t > end {
            break;
        }
        times.push(t);
    }
    Ok(times)
}

/// Continuous-time AR(1) noise at `times`.
fn ar1_noise<R: Rng>(times: &[f64], sd: f64, alpha: f64, rng: &mut R) -> Result<Vec<f64>> {
    if sd == 0.0 {
        return Ok(vec![0.0; times.len()]);
    }
    let normal = Normal::new(0.0, 1.0).context("invalid noise distribution")?;
    let mut noise = Vec::with_capacity(times.len());
    let mut eps = sd * normal.sample(rng);
    noise.push(eps);
    for w in times.windows(2) {
        let phi = (-(w[1] - w[0]) / alpha).exp();
        eps = phi * eps + sd * (1.0 - phi * phi).sqrt() * normal.sample(rng);
        noise.push(eps);
    }
    Ok(noise)
}

fn stress_model(block: &StressToml, forcing: &Forcing) -> Result<StressModel> {
    let sm = match block.recharge {
        Some(transform) => {
            if transform.requires_temperature() {
                StressModel::recharge_with_temperature(
                    block.name.as_str(),
                    forcing.rainfall.clone(),
                    forcing.evaporation.clone(),
                    forcing.temperature.clone(),
                    block.rfunc,
                    transform,
                )?
            } else {
                StressModel::recharge(
                    block.name.as_str(),
                    forcing.rainfall.clone(),
                    forcing.evaporation.clone(),
                    block.rfunc,
                    transform,
                )?
            }
        }
        None => StressModel::new(
            block.name.as_str(),
            forcing.series(block.forcing).clone(),
            block.rfunc,
        )?,
    };
    if block.parameters.len() != sm.n_params() {
        bail!(
            "stress '{}' takes {} parameters {:?}, got {}",
            block.name,
            sm.n_params(),
            sm.parameters().names(),
            block.parameters.len()
        );
    }
    Ok(sm)
}

#[derive(Serialize)]
struct Report<'a> {
    seed: Option<u64>,
    n_observations: usize,
    truth: BTreeMap<String, f64>,
    fit: &'a FitResult,
}

/// Runs the synthetic generate-then-calibrate experiment.
pub fn run(args: SyntheticArgs) -> Result<()> {
    let _cmd = info_span!("synthetic").entered();
    let mut config = config::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    let (result, truth, n_obs) = experiment(&config)?;

    println!(
        "{:<24} {:>12} {:>12} {:>12}",
        "parameter", "true", "fitted", "stderr"
    );
    for (name, &value) in result.names().iter().zip(result.optimal()) {
        let stderr = result.stderr_of(name).unwrap_or(f64::NAN);
        let true_value = truth.get(name).copied().unwrap_or(f64::NAN);
        println!("{name:<24} {true_value:>12.5} {value:>12.5} {stderr:>12.5}");
    }
    let stats = result.statistics();
    println!(
        "success={} iterations={} rmse={:.4} evp={:.2}% aic={:.2}",
        result.success(),
        result.iterations(),
        stats.rmse,
        stats.evp,
        stats.aic
    );

    if let Some(path) = &args.output {
        let report = Report {
            seed: config.seed,
            n_observations: n_obs,
            truth,
            fit: &result,
        };
        let json = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

/// Generates the record and calibrates; returns the fit, the true values by
/// parameter name, and the number of observations.
fn experiment(config: &AquiferConfig) -> Result<(FitResult, BTreeMap<String, f64>, usize)> {
    if config.stresses.is_empty() {
        bail!("no [[stress]] blocks configured");
    }
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let syn = &config.synthetic;

    let forcing = Forcing::generate(syn.n_days, &mut rng)?;
    let start = config.model.warmup().max(0.0);
    let end = syn.n_days.saturating_sub(1) as f64;
    let times = observation_times(syn, start, end, &mut rng)?;
    info!(n_days = syn.n_days, n_obs = times.len(), "forcing generated");

    let stress_models = config
        .stresses
        .iter()
        .map(|block| {
            stress_model(block, &forcing).with_context(|| format!("stress block '{}'", block.name))
        })
        .collect::<Result<Vec<_>>>()?;

    // Heads from the true parameters.
    let placeholder = TimeSeries::new(times.clone(), vec![0.0; times.len()])?;
    let mut truth_model = Model::new(placeholder)?.with_settings(config.model)?;
    let mut truth_vector = Vec::new();
    for (sm, block) in stress_models.iter().zip(&config.stresses) {
        truth_model = truth_model.with_stress_model(sm.clone())?;
        truth_vector.extend_from_slice(&block.parameters);
    }
    truth_vector.push(syn.constant);
    let tmin = times[0];
    let tmax = times[times.len() - 1];
    let head = truth_model.simulate(&truth_vector, tmin, tmax)?;
    let noise = ar1_noise(&times, syn.noise_sd, syn.noise_alpha, &mut rng)?;
    let heads: Vec<f64> = times
        .iter()
        .zip(&noise)
        .map(|(&t, e)| head.interpolate_at(t) + e)
        .collect();
    if heads.iter().any(|h| !h.is_finite()) {
        bail!("true parameters produce non-finite heads");
    }

    let mut truth: BTreeMap<String, f64> = truth_model
        .parameters()
        .names()
        .into_iter()
        .map(String::from)
        .zip(truth_vector.iter().copied())
        .collect();

    // Calibrate a fresh model with default parameters.
    let mut model = Model::new(TimeSeries::new(times.clone(), heads)?)?.with_settings(config.model)?;
    for sm in stress_models {
        model = model.with_stress_model(sm)?;
    }
    if let Some(noise) = &config.noise {
        model = model.with_noise_model(NoiseModel::new(noise.kind))?;
        if syn.noise_sd > 0.0 {
            truth.insert("noise_alpha".to_string(), syn.noise_alpha);
        }
    }
    info!(n_params = model.n_params(), "calibrating");

    let two_stage = model.noise_model().is_some() && config.fit.noise();
    if two_stage {
        let first = fit(
            &mut model,
            &config.solver,
            &config.fit.clone().with_noise(false),
        )?;
        if !first.success() {
            warn!("first stage (no noise model) did not converge");
        }
    }
    let options = if two_stage {
        config.fit.clone().with_initial(false)
    } else {
        config.fit.clone()
    };
    let result = fit(&mut model, &config.solver, &options)?;
    info!(
        success = result.success(),
        constant = result.value(CONSTANT_NAME),
        "calibration done"
    );
    Ok((result, truth, times.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn syn(obs_interval: f64, irregular: bool) -> SyntheticToml {
        SyntheticToml {
            obs_interval,
            irregular,
            ..SyntheticToml::default()
        }
    }

    #[test]
    fn forcing_is_physical() {
        let mut rng = StdRng::seed_from_u64(1);
        let f = Forcing::generate(800, &mut rng).unwrap();
        assert_eq!(f.rainfall.len(), 800);
        assert!(f.rainfall.values().iter().all(|&p| p >= 0.0));
        assert!(f.evaporation.values().iter().all(|&e| e > 0.0));
        assert!(f.pumping.values().iter().all(|&q| (0.0..=150.0).contains(&q)));
        let wet = f.rainfall.values().iter().filter(|&&p| p > 0.0).count();
        assert!((200..360).contains(&wet), "wet days = {wet}");
    }

    #[test]
    fn regular_observation_times() {
        let mut rng = StdRng::seed_from_u64(2);
        let t = observation_times(&syn(10.0, false), 100.0, 150.0, &mut rng).unwrap();
        assert_eq!(t, vec![100.0, 110.0, 120.0, 130.0, 140.0, 150.0]);
    }

    #[test]
    fn irregular_observation_times() {
        let mut rng = StdRng::seed_from_u64(3);
        let t = observation_times(&syn(5.0, true), 0.0, 1000.0, &mut rng).unwrap();
        assert!(t.windows(2).all(|w| w[1] > w[0]));
        assert!(*t.last().unwrap() <= 1000.0);
        let mean_gap = t[t.len() - 1] / (t.len() - 1) as f64;
        assert!((3.5..6.5).contains(&mean_gap), "mean gap = {mean_gap}");
    }

    #[test]
    fn short_record_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(observation_times(&syn(1.0, false), 3650.0, 100.0, &mut rng).is_err());
        assert!(observation_times(&syn(0.0, false), 0.0, 100.0, &mut rng).is_err());
    }

    #[test]
    fn ar1_noise_has_requested_spread() {
        let mut rng = StdRng::seed_from_u64(5);
        let times: Vec<f64> = (0..20_000).map(|i| i as f64 * 3.0).collect();
        let e = ar1_noise(&times, 0.1, 5.0, &mut rng).unwrap();
        let sd = aquifer_stats::sd(&e);
        assert!((sd - 0.1).abs() < 0.01, "sd = {sd}");
        assert_eq!(ar1_noise(&times[..3], 0.0, 5.0, &mut rng).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn parameter_count_checked() {
        let mut rng = StdRng::seed_from_u64(6);
        let forcing = Forcing::generate(100, &mut rng).unwrap();
        let block: StressToml = toml::from_str(
            "name = \"rain\"\nrfunc = \"gamma\"\nparameters = [1.0, 2.0]\n",
        )
        .unwrap();
        let err = stress_model(&block, &forcing).unwrap_err();
        assert!(err.to_string().contains("takes 3 parameters"));
    }

    #[test]
    fn end_to_end_with_report() {
        let mut cfg = tempfile::NamedTempFile::new().unwrap();
        cfg.write_all(
            br#"
seed = 11

[model]
warmup = 365.0

[synthetic]
n_days = 1200
obs_interval = 3.0

[[stress]]
name = "rain"
rfunc = "exponential"
parameters = [0.05, 30.0]
"#,
        )
        .unwrap();
        let out = tempfile::NamedTempFile::new().unwrap();
        run(SyntheticArgs {
            config: cfg.path().to_path_buf(),
            seed: None,
            output: Some(out.path().to_path_buf()),
        })
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.path()).unwrap()).unwrap();
        assert_eq!(json["seed"], 11);
        assert_eq!(json["truth"]["rain_a"], 30.0);
        let names = json["fit"]["names"].as_array().unwrap();
        assert_eq!(names.len(), 3);
        let a = json["fit"]["optimal"][1].as_f64().unwrap();
        assert!((a - 30.0).abs() < 1.5, "a = {a}");
    }
}
