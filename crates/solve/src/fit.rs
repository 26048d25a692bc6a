//! Model calibration: free-parameter assembly, objective, write-back.

use aquifer_model::Model;
use aquifer_stats::FitStatistics;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::covariance::{correlation, covariance};
use crate::error::SolveError;
use crate::solver::{LeastSquaresSolver, sum_of_squares};

/// Options of one calibration run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    tmin: Option<f64>,
    tmax: Option<f64>,
    warmup: Option<f64>,
    fit_constant: bool,
    noise: bool,
    weights: Option<Vec<f64>>,
    initial: bool,
    write_back: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            tmin: None,
            tmax: None,
            warmup: None,
            fit_constant: true,
            noise: true,
            weights: None,
            initial: true,
            write_back: true,
        }
    }
}

impl FitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of the calibration window; defaults to the first observation.
    pub fn with_tmin(mut self, tmin: f64) -> Self {
        self.tmin = Some(tmin);
        self
    }

    /// End of the calibration window; defaults to the last observation.
    pub fn with_tmax(mut self, tmax: f64) -> Self {
        self.tmax = Some(tmax);
        self
    }

    /// Overrides the model's warmup length for this run.
    pub fn with_warmup(mut self, warmup: f64) -> Self {
        self.warmup = Some(warmup);
        self
    }

    /// Whether `constant_d` is optimised (otherwise held at its current value).
    pub fn with_fit_constant(mut self, fit_constant: bool) -> Self {
        self.fit_constant = fit_constant;
        self
    }

    /// Whether the objective uses the noise model's weighted innovations.
    pub fn with_noise(mut self, noise: bool) -> Self {
        self.noise = noise;
        self
    }

    /// Per-observation weights, one for each observation in the window.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// `true` resets to stored initial values before optimising; `false`
    /// warm-starts from the current values.
    pub fn with_initial(mut self, initial: bool) -> Self {
        self.initial = initial;
        self
    }

    /// Whether [`fit`] writes the optimum back into the model on success.
    pub fn with_write_back(mut self, write_back: bool) -> Self {
        self.write_back = write_back;
        self
    }

    pub fn tmin(&self) -> Option<f64> {
        self.tmin
    }

    pub fn tmax(&self) -> Option<f64> {
        self.tmax
    }

    pub fn warmup(&self) -> Option<f64> {
        self.warmup
    }

    pub fn fit_constant(&self) -> bool {
        self.fit_constant
    }

    pub fn noise(&self) -> bool {
        self.noise
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn initial(&self) -> bool {
        self.initial
    }

    pub fn write_back(&self) -> bool {
        self.write_back
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        if let Some(w) = self.warmup {
            if !w.is_finite() || w < 0.0 {
                return Err(SolveError::InvalidOptions(format!(
                    "warmup must be finite and non-negative, got {w}"
                )));
            }
        }
        if let Some(w) = &self.weights {
            if w.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(SolveError::InvalidWeights);
            }
        }
        Ok(())
    }
}

/// Outcome of a calibration run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    names: Vec<String>,
    #[serde(with = "aquifer_stats::float_serde::vec")]
    optimal: Vec<f64>,
    free: Vec<usize>,
    /// NaN for fixed parameters.
    #[serde(with = "aquifer_stats::float_serde::vec")]
    stderr: Vec<f64>,
    covariance: Option<Vec<Vec<f64>>>,
    success: bool,
    iterations: u64,
    #[serde(with = "aquifer_stats::float_serde")]
    objective: f64,
    #[serde(with = "aquifer_stats::float_serde")]
    initial_objective: f64,
    noise: bool,
    tmin: f64,
    tmax: f64,
    solver: String,
    statistics: FitStatistics,
}

impl FitResult {
    /// Names of all model parameters, in model order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Full parameter vector at the optimum (fixed parameters included).
    pub fn optimal(&self) -> &[f64] {
        &self.optimal
    }

    /// Positions of the optimised parameters in the full vector.
    pub fn free(&self) -> &[usize] {
        &self.free
    }

    /// Standard errors for the full vector; NaN for parameters that were
    /// not optimised or when no covariance is available.
    pub fn stderr(&self) -> &[f64] {
        &self.stderr
    }

    /// Covariance of the free parameters, in the order of [`Self::free`].
    pub fn covariance(&self) -> Option<&[Vec<f64>]> {
        self.covariance.as_deref()
    }

    /// Correlation matrix of the free parameters.
    pub fn correlation(&self) -> Option<Vec<Vec<f64>>> {
        let cov = self.covariance.as_ref()?;
        let k = cov.len();
        let m = nalgebra::DMatrix::from_fn(k, k, |i, j| cov[i][j]);
        let c = correlation(&m);
        Some((0..k).map(|i| (0..k).map(|j| c[(i, j)]).collect()).collect())
    }

    /// Optimum of the parameter called `name`.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.optimal[i])
    }

    /// Standard error of the parameter called `name`.
    pub fn stderr_of(&self, name: &str) -> Option<f64> {
        self.position(name).map(|i| self.stderr[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// `false` when the solver stopped without meeting its criterion.
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Objective (weighted sum of squares) at the optimum.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Objective at the start point.
    pub fn initial_objective(&self) -> f64 {
        self.initial_objective
    }

    /// Whether the objective used the noise model.
    pub fn noise(&self) -> bool {
        self.noise
    }

    /// Calibration window.
    pub fn window(&self) -> (f64, f64) {
        (self.tmin, self.tmax)
    }

    pub fn solver(&self) -> &str {
        &self.solver
    }

    pub fn statistics(&self) -> &FitStatistics {
        &self.statistics
    }
}

/// Objective vector: residuals or weighted innovations, times the
/// observation weights.
fn objective_vector(
    model: &Model,
    p: &[f64],
    window: (f64, f64),
    noise: bool,
    weights: Option<&[f64]>,
) -> Result<Vec<f64>, SolveError> {
    let (tmin, tmax) = window;
    let mut r = if noise {
        model.innovations(p, Some(tmin), Some(tmax))?.weighted()
    } else {
        model
            .residuals(p, Some(tmin), Some(tmax))?
            .values()
            .to_vec()
    };
    if let Some(w) = weights {
        r.iter_mut().zip(w).for_each(|(r, w)| *r *= w);
    }
    Ok(r)
}

/// Calibrates a copy of `model`; `model` itself is left untouched.
///
/// # Errors
///
/// Invalid options, malformed bounds, an invalid window or mismatched
/// weights are reported before optimisation starts, as is any model error
/// raised by evaluating the initial parameters. Non-convergence is not an
/// error.
#[instrument(skip_all, fields(solver = solver.name()))]
pub fn calibrate<S: LeastSquaresSolver + ?Sized>(
    model: &Model,
    solver: &S,
    options: &FitOptions,
) -> Result<FitResult, SolveError> {
    options.validate()?;
    let mut work = model.clone();
    if let Some(warmup) = options.warmup() {
        let settings = work.settings().with_warmup(warmup);
        work = work.with_settings(settings)?;
    }
    if options.initial() {
        work.reset();
    }
    let window = work.window(options.tmin(), options.tmax())?;

    let use_noise = options.noise() && work.noise_model().is_some();
    if options.noise() && !use_noise {
        warn!("noise requested but the model has no noise model; fitting plain residuals");
    }
    if use_noise {
        info!(
            "objective uses noise-model innovations; it is not comparable with objectives of other noise models"
        );
    }

    let params = work.parameters();
    let all_bounds = params.bounds();
    let mut free = params.free_indices();
    if !options.fit_constant() {
        let c = work.constant_index();
        free.retain(|&i| i != c);
    }
    if !use_noise {
        let noise = work.noise_range();
        free.retain(|i| !noise.contains(i));
    }
    for &i in &free {
        let (pmin, pmax) = all_bounds[i];
        if pmin.is_nan() || pmax.is_nan() || pmin > pmax {
            return Err(SolveError::InvalidBounds {
                name: params.names()[i].to_string(),
                pmin,
                pmax,
            });
        }
    }
    if free.is_empty() {
        return Err(SolveError::NoFreeParameters);
    }

    let observed = work.observations().window(window.0, window.1)?;
    if let Some(w) = options.weights() {
        if w.len() != observed.len() {
            return Err(SolveError::WeightsLength {
                expected: observed.len(),
                got: w.len(),
            });
        }
    }

    let base = params.optimal_values();
    let bounds: Vec<(f64, f64)> = free.iter().map(|&i| all_bounds[i]).collect();
    let x0: Vec<f64> = free
        .iter()
        .zip(&bounds)
        .map(|(&i, &(lo, hi))| base[i].clamp(lo, hi))
        .collect();
    let expand = |x: &[f64]| {
        let mut p = base.clone();
        for (&i, &v) in free.iter().zip(x) {
            p[i] = v;
        }
        p
    };
    // Configuration errors (missing inputs, invalid fixed parameters)
    // surface here, before the solver runs.
    let r0 = objective_vector(&work, &expand(&x0), window, use_noise, options.weights())?;
    let initial_objective = sum_of_squares(&r0).unwrap_or(f64::NAN);
    let residuals =
        |x: &[f64]| objective_vector(&work, &expand(x), window, use_noise, options.weights()).ok();
    let out = solver.minimize(&residuals, &x0, &bounds)?;
    let optimal = expand(&out.x);
    if !out.success {
        warn!(
            iterations = out.iterations,
            cost = out.cost,
            "solver did not converge; returning the last iterate"
        );
    }

    let cov = out.jacobian.as_ref().and_then(|j| covariance(j, out.cost));
    let mut stderr = vec![f64::NAN; optimal.len()];
    if let Some(cov) = &cov {
        for (a, &i) in free.iter().enumerate() {
            stderr[i] = cov[(a, a)].max(0.0).sqrt();
        }
    }
    let covariance = cov.map(|c| {
        (0..c.nrows())
            .map(|i| (0..c.ncols()).map(|j| c[(i, j)]).collect())
            .collect()
    });

    let residual_series = work.residuals(&optimal, Some(window.0), Some(window.1))?;
    let simulated: Vec<f64> = observed
        .values()
        .iter()
        .zip(residual_series.values())
        .map(|(o, r)| o - r)
        .collect();
    let statistics = FitStatistics::compute(observed.values(), &simulated, out.cost, free.len());
    info!(
        success = out.success,
        iterations = out.iterations,
        objective = out.cost,
        rmse = statistics.rmse,
        "calibration finished"
    );

    Ok(FitResult {
        names: params.names().into_iter().map(String::from).collect(),
        optimal,
        free,
        stderr,
        covariance,
        success: out.success,
        iterations: out.iterations,
        objective: out.cost,
        initial_objective,
        noise: use_noise,
        tmin: window.0,
        tmax: window.1,
        solver: solver.name().to_string(),
        statistics,
    })
}

/// Calibrates `model` and, on success, writes the optimum back into its
/// parameters (unless disabled in `options`).
pub fn fit<S: LeastSquaresSolver + ?Sized>(
    model: &mut Model,
    solver: &S,
    options: &FitOptions,
) -> Result<FitResult, SolveError> {
    let result = calibrate(model, solver, options)?;
    if result.success() && options.write_back() {
        model.set_optimal(result.optimal())?;
    }
    Ok(result)
}
