//! The response function variants and their shared evaluation path.

use std::fmt;
use std::str::FromStr;

use aquifer_params::{Parameter, ParameterSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RfuncError;
use crate::kernel::{Kernel, KernelOptions, check_cutoff};
use crate::{exponential, four_param, gamma, hantush, polder};

/// A parametric response function. The gain `A` is always the first
/// parameter; the remaining ones shape the response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFunction {
    /// `A, a`
    Exponential,
    /// `A, n, a`
    Gamma,
    /// `A, rho, cS`
    Hantush,
    /// `A, a, b`
    Polder,
    /// `A, n, a, b`
    FourParam,
}

impl ResponseFunction {
    /// All variants.
    pub const ALL: [ResponseFunction; 5] = [
        ResponseFunction::Exponential,
        ResponseFunction::Gamma,
        ResponseFunction::Hantush,
        ResponseFunction::Polder,
        ResponseFunction::FourParam,
    ];

    /// Identifier used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            ResponseFunction::Exponential => "exponential",
            ResponseFunction::Gamma => "gamma",
            ResponseFunction::Hantush => "hantush",
            ResponseFunction::Polder => "polder",
            ResponseFunction::FourParam => "four_param",
        }
    }

    /// Unprefixed parameter names, gain first.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            ResponseFunction::Exponential => exponential::NAMES,
            ResponseFunction::Gamma => gamma::NAMES,
            ResponseFunction::Hantush => hantush::NAMES,
            ResponseFunction::Polder => polder::NAMES,
            ResponseFunction::FourParam => four_param::NAMES,
        }
    }

    /// Number of parameters.
    pub fn n_params(&self) -> usize {
        self.param_names().len()
    }

    /// Default parameters named `{prefix}_{name}`.
    ///
    /// `up` fixes the sign of the gain (`None` leaves it free);
    /// `meanstress` scales the gain so that a typical stress produces a
    /// head change of order one. Non-finite or non-positive values fall
    /// back to 1.
    pub fn default_parameters(
        &self,
        prefix: &str,
        up: Option<bool>,
        meanstress: f64,
    ) -> ParameterSet {
        let shape = match self {
            ResponseFunction::Exponential => exponential::shape_defaults(),
            ResponseFunction::Gamma => gamma::shape_defaults(),
            ResponseFunction::Hantush => hantush::shape_defaults(),
            ResponseFunction::Polder => polder::shape_defaults(),
            ResponseFunction::FourParam => four_param::shape_defaults(),
        };
        std::iter::once(gain_parameter(up, meanstress))
            .chain(shape)
            .map(|p| p.prefixed(prefix))
            .collect()
    }

    /// The gain (asymptotic step response) encoded in `p`.
    pub fn gain(&self, p: &[f64]) -> f64 {
        p.first().copied().unwrap_or(f64::NAN)
    }

    /// Checks the parameter count and the positivity of the shape
    /// parameters.
    pub fn check_parameters(&self, p: &[f64]) -> Result<(), RfuncError> {
        if p.len() != self.n_params() {
            return Err(RfuncError::ParameterCount {
                expected: self.n_params(),
                got: p.len(),
            });
        }
        if p.iter().any(|v| v.is_nan()) {
            return Ok(());
        }
        match self {
            ResponseFunction::Exponential => exponential::check(p),
            ResponseFunction::Gamma => gamma::check(p),
            ResponseFunction::Hantush => hantush::check(p),
            ResponseFunction::Polder => polder::check(p),
            ResponseFunction::FourParam => four_param::check(p),
        }
    }

    /// Continuous step response evaluated at times `t` (`t <= 0` gives 0).
    pub fn step_at(&self, p: &[f64], t: &[f64]) -> Result<Vec<f64>, RfuncError> {
        self.check_parameters(p)?;
        if p.iter().any(|v| v.is_nan()) {
            return Ok(vec![f64::NAN; t.len()]);
        }
        Ok(self.step_unchecked(p, t))
    }

    /// Time at which the step response reaches `cutoff` of the gain.
    ///
    /// NaN parameters give a NaN duration.
    pub fn duration(&self, p: &[f64], cutoff: f64) -> Result<f64, RfuncError> {
        check_cutoff(cutoff)?;
        self.check_parameters(p)?;
        if p.iter().any(|v| v.is_nan()) {
            return Ok(f64::NAN);
        }
        self.duration_unchecked(p, cutoff)
    }

    /// Samples the block response on `t_k = dt (k + 1)` until the step
    /// response reaches the cutoff or the sample cap is hit.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`RfuncError::InvalidTimeStep`] | `dt` not finite and positive |
    /// | [`RfuncError::InvalidCutoff`] | cutoff outside (0, 1) |
    /// | [`RfuncError::ParameterCount`] | wrong number of parameters |
    /// | [`RfuncError::NonPositiveParameter`] | a shape parameter is <= 0 |
    ///
    /// NaN parameters are not an error: the kernel is a single NaN sample.
    pub fn kernel(&self, p: &[f64], options: &KernelOptions) -> Result<Kernel, RfuncError> {
        options.validate()?;
        self.check_parameters(p)?;
        let dt = options.dt();
        if p.iter().any(|v| v.is_nan()) {
            return Ok(Kernel::nan(dt));
        }

        let duration = self.duration_unchecked(p, options.cutoff())?;
        let wanted = (duration / dt).ceil().max(1.0);
        let cap = options.max_len();
        let truncated = !(wanted <= cap as f64);
        let len = if truncated { cap } else { wanted as usize };
        if truncated {
            warn!(
                response = self.name(),
                duration,
                dt,
                max_len = cap,
                "response kernel truncated at sample cap"
            );
        }

        let t: Vec<f64> = (0..len).map(|k| dt * (k + 1) as f64).collect();
        let step = self.step_unchecked(p, &t);
        debug!(response = self.name(), len, duration, "sampled response kernel");
        Ok(Kernel::from_step(&step, dt, duration, truncated))
    }

    /// Block response at step `dt`.
    pub fn block(&self, p: &[f64], dt: f64, cutoff: f64) -> Result<Vec<f64>, RfuncError> {
        let options = KernelOptions::new(dt).with_cutoff(cutoff);
        Ok(self.kernel(p, &options)?.into_block())
    }

    /// Step response at step `dt`: the running sum of [`Self::block`].
    pub fn step(&self, p: &[f64], dt: f64, cutoff: f64) -> Result<Vec<f64>, RfuncError> {
        let options = KernelOptions::new(dt).with_cutoff(cutoff);
        Ok(self.kernel(p, &options)?.step())
    }

    fn step_unchecked(&self, p: &[f64], t: &[f64]) -> Vec<f64> {
        match self {
            ResponseFunction::Exponential => exponential::step(p, t),
            ResponseFunction::Gamma => gamma::step(p, t),
            ResponseFunction::Hantush => hantush::step(p, t),
            ResponseFunction::Polder => polder::step(p, t),
            ResponseFunction::FourParam => four_param::step(p, t),
        }
    }

    fn duration_unchecked(&self, p: &[f64], cutoff: f64) -> Result<f64, RfuncError> {
        match self {
            ResponseFunction::Exponential => exponential::duration(p, cutoff),
            ResponseFunction::Gamma => gamma::duration(p, cutoff),
            ResponseFunction::Hantush => hantush::duration(p, cutoff),
            ResponseFunction::Polder => polder::duration(p, cutoff),
            ResponseFunction::FourParam => four_param::duration(p, cutoff),
        }
    }
}

impl fmt::Display for ResponseFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResponseFunction {
    type Err = RfuncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|r| r.name() == key || (key == "fourparam" && *r == Self::FourParam))
            .ok_or_else(|| RfuncError::UnknownKind(s.to_string()))
    }
}

fn gain_parameter(up: Option<bool>, meanstress: f64) -> Parameter {
    let scale = if meanstress.is_finite() && meanstress > 0.0 {
        meanstress
    } else {
        1.0
    };
    match up {
        Some(true) => Parameter::new("A", 1.0 / scale, 1e-5, 100.0 / scale),
        Some(false) => Parameter::new("A", -1.0 / scale, -100.0 / scale, -1e-5),
        None => Parameter::unbounded("A", 1.0 / scale),
    }
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), RfuncError> {
    if value <= 0.0 {
        return Err(RfuncError::NonPositiveParameter { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn defaults(rf: ResponseFunction) -> Vec<f64> {
        rf.default_parameters("x", Some(true), 1.0).initial_values()
    }

    #[test]
    fn defaults_are_prefixed_and_valid() {
        for rf in ResponseFunction::ALL {
            let set = rf.default_parameters("rain", Some(true), 2.0);
            assert_eq!(set.len(), rf.n_params());
            assert_eq!(set.names()[0], "rain_A");
            assert_relative_eq!(set.initial_values()[0], 0.5);
            assert!(set.validate().is_ok(), "{rf}");
        }
    }

    #[test]
    fn gain_sign_follows_up() {
        let set = ResponseFunction::Exponential.default_parameters("well", Some(false), 4.0);
        let a = set.get("well_A").unwrap();
        assert_relative_eq!(a.initial(), -0.25);
        assert_relative_eq!(a.pmin(), -25.0);
        assert_relative_eq!(a.pmax(), -1e-5);

        let set = ResponseFunction::Exponential.default_parameters("s", None, 0.0);
        let a = set.get("s_A").unwrap();
        assert_eq!(a.initial(), 1.0);
        assert!(a.pmin().is_infinite() && a.pmax().is_infinite());
    }

    #[test]
    fn short_response_keeps_one_sample() {
        let k = ResponseFunction::Exponential
            .kernel(&[1.0, 0.01], &KernelOptions::new(1.0))
            .unwrap();
        assert_eq!(k.len(), 1);
        assert_relative_eq!(k.block()[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_parameter_gives_single_nan_sample() {
        for rf in ResponseFunction::ALL {
            let mut p = defaults(rf);
            p[1] = f64::NAN;
            let k = rf.kernel(&p, &KernelOptions::default()).unwrap();
            assert_eq!(k.len(), 1);
            assert!(k.block()[0].is_nan());
            assert!(rf.duration(&p, 0.999).unwrap().is_nan());
        }
    }

    #[test]
    fn invalid_dt_rejected() {
        let err = ResponseFunction::Gamma
            .block(&[1.0, 1.0, 10.0], -1.0, 0.999)
            .unwrap_err();
        assert_eq!(err, RfuncError::InvalidTimeStep { dt: -1.0 });
    }

    #[test]
    fn non_positive_shape_rejected() {
        let err = ResponseFunction::Hantush
            .step(&[1.0, 0.0, 100.0], 1.0, 0.999)
            .unwrap_err();
        assert_eq!(
            err,
            RfuncError::NonPositiveParameter {
                name: "rho",
                value: 0.0
            }
        );
        assert!(matches!(
            ResponseFunction::Gamma.step(&[1.0, -1.0, 10.0], 1.0, 0.999),
            Err(RfuncError::NonPositiveParameter { name: "n", .. })
        ));
    }

    #[test]
    fn wrong_parameter_count_rejected() {
        assert_eq!(
            ResponseFunction::Polder.duration(&[1.0, 2.0], 0.999),
            Err(RfuncError::ParameterCount {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn cap_truncates_and_flags() {
        let options = KernelOptions::new(1.0).with_max_len(10);
        let k = ResponseFunction::Exponential
            .kernel(&[1.0, 100.0], &options)
            .unwrap();
        assert_eq!(k.len(), 10);
        assert!(k.truncated());
        let k = ResponseFunction::Exponential
            .kernel(&[1.0, 1.0], &options)
            .unwrap();
        assert!(!k.truncated());
    }

    #[test]
    fn negative_gain_decreases_monotonically() {
        let s = ResponseFunction::Gamma
            .step(&[-2.0, 1.5, 20.0], 1.0, 0.999)
            .unwrap();
        assert!(s.windows(2).all(|w| w[1] <= w[0]));
        assert!((s[s.len() - 1] + 2.0).abs() <= 2.0 * 1e-3);
    }

    #[test]
    fn parse_and_display() {
        for rf in ResponseFunction::ALL {
            assert_eq!(rf.to_string().parse::<ResponseFunction>().unwrap(), rf);
        }
        assert_eq!(
            "Four-Param".parse::<ResponseFunction>().unwrap(),
            ResponseFunction::FourParam
        );
        assert!(matches!(
            "linear".parse::<ResponseFunction>(),
            Err(RfuncError::UnknownKind(_))
        ));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ResponseFunction::FourParam).unwrap();
        assert_eq!(json, "\"four_param\"");
        let rf: ResponseFunction = serde_json::from_str("\"hantush\"").unwrap();
        assert_eq!(rf, ResponseFunction::Hantush);
    }
}
