//! A single named, bounded model parameter.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

/// A named model parameter with bounds, a fixed flag and a current value.
///
/// Unbounded sides are represented by `f64::NEG_INFINITY` / `f64::INFINITY`
/// and serialized as `null` (JSON) or left out (TOML).
/// `optimal` holds the current value used for evaluation; it starts equal
/// to `initial` and is overwritten by calibration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    initial: f64,
    #[serde(with = "lower_bound", default = "unbounded_below")]
    pmin: f64,
    #[serde(with = "upper_bound", default = "unbounded_above")]
    pmax: f64,
    #[serde(default = "default_vary")]
    vary: bool,
    optimal: f64,
}

fn default_vary() -> bool {
    true
}

fn unbounded_below() -> f64 {
    f64::NEG_INFINITY
}

fn unbounded_above() -> f64 {
    f64::INFINITY
}

mod lower_bound {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        (*v != f64::NEG_INFINITY).then_some(*v).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NEG_INFINITY))
    }
}

mod upper_bound {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        (*v != f64::INFINITY).then_some(*v).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::INFINITY))
    }
}

impl Parameter {
    /// Creates a varying parameter; `optimal` starts at `initial`.
    pub fn new(name: impl Into<String>, initial: f64, pmin: f64, pmax: f64) -> Self {
        Self {
            name: name.into(),
            initial,
            pmin,
            pmax,
            vary: true,
            optimal: initial,
        }
    }

    /// Creates a varying parameter without bounds.
    pub fn unbounded(name: impl Into<String>, initial: f64) -> Self {
        Self::new(name, initial, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Marks the parameter as fixed (excluded from optimisation).
    pub fn fixed(mut self) -> Self {
        self.vary = false;
        self
    }

    /// Sets the vary flag.
    pub fn with_vary(mut self, vary: bool) -> Self {
        self.vary = vary;
        self
    }

    /// Replaces the initial value and resets `optimal` to it.
    pub fn with_initial(mut self, initial: f64) -> Self {
        self.initial = initial;
        self.optimal = initial;
        self
    }

    /// Replaces the bounds.
    pub fn with_bounds(mut self, pmin: f64, pmax: f64) -> Self {
        self.pmin = pmin;
        self.pmax = pmax;
        self
    }

    /// Returns a copy renamed with `prefix_` prepended.
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.name = format!("{prefix}_{}", self.name);
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored initial value.
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// Lower bound.
    pub fn pmin(&self) -> f64 {
        self.pmin
    }

    /// Upper bound.
    pub fn pmax(&self) -> f64 {
        self.pmax
    }

    /// Whether the parameter is optimised.
    pub fn vary(&self) -> bool {
        self.vary
    }

    /// Current (optimal) value.
    pub fn optimal(&self) -> f64 {
        self.optimal
    }

    pub(crate) fn set_initial(&mut self, initial: f64) {
        self.initial = initial;
    }

    pub(crate) fn set_optimal(&mut self, value: f64) {
        self.optimal = value;
    }

    pub(crate) fn set_vary(&mut self, vary: bool) {
        self.vary = vary;
    }

    /// Checks `pmin <= pmax`, and `pmin <= initial <= pmax` for varying
    /// parameters. NaN bounds are rejected.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.pmin.is_nan() || self.pmax.is_nan() || self.pmin > self.pmax {
            return Err(ParamsError::InvalidBounds {
                name: self.name.clone(),
                pmin: self.pmin,
                pmax: self.pmax,
            });
        }
        if self.vary && !(self.initial >= self.pmin && self.initial <= self.pmax) {
            return Err(ParamsError::InitialOutOfBounds {
                name: self.name.clone(),
                initial: self.initial,
                pmin: self.pmin,
                pmax: self.pmax,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_optimal_to_initial() {
        let p = Parameter::new("A", 2.0, 0.0, 10.0);
        assert_eq!(p.name(), "A");
        assert_eq!(p.initial(), 2.0);
        assert_eq!(p.optimal(), 2.0);
        assert!(p.vary());
    }

    #[test]
    fn builder_chaining() {
        let p = Parameter::new("a", 10.0, 0.01, 1000.0)
            .with_initial(20.0)
            .with_bounds(1.0, 100.0)
            .fixed()
            .prefixed("rain");
        assert_eq!(p.name(), "rain_a");
        assert_eq!(p.initial(), 20.0);
        assert_eq!(p.optimal(), 20.0);
        assert_eq!((p.pmin(), p.pmax()), (1.0, 100.0));
        assert!(!p.vary());
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let p = Parameter::new("A", 1.0, 2.0, 1.0);
        assert!(matches!(p.validate(), Err(ParamsError::InvalidBounds { .. })));
    }

    #[test]
    fn validate_rejects_nan_bounds() {
        let p = Parameter::new("A", 1.0, f64::NAN, 1.0);
        assert!(matches!(p.validate(), Err(ParamsError::InvalidBounds { .. })));
    }

    #[test]
    fn validate_initial_outside_bounds() {
        let p = Parameter::new("A", 5.0, 0.0, 1.0);
        assert!(matches!(
            p.validate(),
            Err(ParamsError::InitialOutOfBounds { .. })
        ));
        // Fixed parameters may sit outside their bounds.
        assert!(p.fixed().validate().is_ok());
    }

    #[test]
    fn unbounded_is_valid() {
        let p = Parameter::unbounded("d", -3.5);
        assert!(p.validate().is_ok());
        assert_eq!(p.pmin(), f64::NEG_INFINITY);
        assert_eq!(p.pmax(), f64::INFINITY);
    }

    #[test]
    fn serde_round_trip() {
        let p = Parameter::new("rain_A", 0.5, 1e-5, 50.0).fixed();
        let json = serde_json::to_string(&p).unwrap();
        let back: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn json_round_trip_unbounded() {
        let p = Parameter::unbounded("constant_d", 2.0);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains(r#""pmin":null"#), "{json}");
        let back: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        let one_sided = Parameter::new("a", 1.0, 0.0, f64::INFINITY);
        let json = serde_json::to_string(&one_sided).unwrap();
        let back: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pmin(), 0.0);
        assert_eq!(back.pmax(), f64::INFINITY);
    }

    #[test]
    fn missing_bounds_read_as_unbounded() {
        let p: Parameter = serde_json::from_str(r#"{"name":"d","initial":0.5,"optimal":0.5}"#).unwrap();
        assert_eq!((p.pmin(), p.pmax()), (f64::NEG_INFINITY, f64::INFINITY));
    }

    #[test]
    fn serde_vary_defaults_to_true() {
        let json = r#"{"name":"a","initial":1.0,"pmin":0.0,"pmax":2.0,"optimal":1.5}"#;
        let p: Parameter = serde_json::from_str(json).unwrap();
        assert!(p.vary());
        assert_eq!(p.optimal(), 1.5);
    }
}
