//! Ordered parameter sets.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::parameter::Parameter;

/// An ordered collection of uniquely named [`Parameter`]s.
///
/// Order is significant: it defines the layout of the value vectors passed
/// to model components (gain first for response functions).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Builds a set from parameters, rejecting duplicate names.
    pub fn from_parameters(params: Vec<Parameter>) -> Result<Self, ParamsError> {
        let mut set = Self::new();
        for p in params {
            set.try_push(p)?;
        }
        Ok(set)
    }

    /// Appends a parameter, replacing any existing parameter of the same name.
    pub fn push(&mut self, param: Parameter) {
        match self.index_of(param.name()) {
            Some(i) => self.params[i] = param,
            None => self.params.push(param),
        }
    }

    /// Appends a parameter, failing on a duplicate name.
    pub fn try_push(&mut self, param: Parameter) -> Result<(), ParamsError> {
        if self.index_of(param.name()).is_some() {
            return Err(ParamsError::DuplicateName(param.name().to_string()));
        }
        self.params.push(param);
        Ok(())
    }

    /// Appends all parameters of `other`, failing on a duplicate name.
    pub fn try_extend(&mut self, other: &ParameterSet) -> Result<(), ParamsError> {
        for p in other.iter() {
            self.try_push(p.clone())?;
        }
        Ok(())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the set holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over the parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Returns the parameters as a slice.
    pub fn as_slice(&self) -> &[Parameter] {
        &self.params
    }

    /// Position of the parameter called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name() == name)
    }

    /// Looks a parameter up by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    /// Parameter names in order.
    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name()).collect()
    }

    /// Stored initial values in order.
    pub fn initial_values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.initial()).collect()
    }

    /// Current (optimal) values in order.
    pub fn optimal_values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.optimal()).collect()
    }

    /// Indices of the varying parameters, i.e. the optimizer's free vector layout.
    pub fn free_indices(&self) -> Vec<usize> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.vary())
            .map(|(i, _)| i)
            .collect()
    }

    /// `(pmin, pmax)` pairs in order.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.params.iter().map(|p| (p.pmin(), p.pmax())).collect()
    }

    /// Validates every parameter (see [`Parameter::validate`]).
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.params.iter().try_for_each(Parameter::validate)
    }

    /// Overwrites all current values.
    pub fn set_optimal(&mut self, values: &[f64]) -> Result<(), ParamsError> {
        self.check_len(values.len())?;
        for (p, &v) in self.params.iter_mut().zip(values) {
            p.set_optimal(v);
        }
        Ok(())
    }

    /// Overwrites all initial values.
    pub fn set_initial(&mut self, values: &[f64]) -> Result<(), ParamsError> {
        self.check_len(values.len())?;
        for (p, &v) in self.params.iter_mut().zip(values) {
            p.set_initial(v);
        }
        Ok(())
    }

    /// Sets the current value of one parameter.
    pub fn set_value(&mut self, name: &str, value: f64) -> Result<(), ParamsError> {
        let i = self.require(name)?;
        self.params[i].set_optimal(value);
        Ok(())
    }

    /// Sets the initial (and current) value of one parameter.
    pub fn set_initial_value(&mut self, name: &str, value: f64) -> Result<(), ParamsError> {
        let i = self.require(name)?;
        self.params[i].set_initial(value);
        self.params[i].set_optimal(value);
        Ok(())
    }

    /// Fixes or frees one parameter.
    pub fn set_vary(&mut self, name: &str, vary: bool) -> Result<(), ParamsError> {
        let i = self.require(name)?;
        self.params[i].set_vary(vary);
        Ok(())
    }

    /// Replaces one parameter's bounds.
    pub fn set_bounds(&mut self, name: &str, pmin: f64, pmax: f64) -> Result<(), ParamsError> {
        let i = self.require(name)?;
        let p = self.params[i].clone().with_bounds(pmin, pmax);
        self.params[i] = p;
        Ok(())
    }

    /// Resets every current value to its stored initial value.
    pub fn reset(&mut self) {
        for p in &mut self.params {
            let v = p.initial();
            p.set_optimal(v);
        }
    }

    /// Sub-set covering `range`, in order.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Result<ParameterSet, ParamsError> {
        let params = self
            .params
            .get(range.clone())
            .ok_or(ParamsError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.params.len(),
            })?;
        Ok(Self {
            params: params.to_vec(),
        })
    }

    fn require(&self, name: &str) -> Result<usize, ParamsError> {
        self.index_of(name)
            .ok_or_else(|| ParamsError::UnknownParameter(name.to_string()))
    }

    fn check_len(&self, got: usize) -> Result<(), ParamsError> {
        if got != self.params.len() {
            return Err(ParamsError::LengthMismatch {
                expected: self.params.len(),
                got,
            });
        }
        Ok(())
    }
}

impl FromIterator<Parameter> for ParameterSet {
    /// Collects parameters; later duplicates replace earlier ones.
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut set = Self::new();
        for p in iter {
            set.push(p);
        }
        set
    }
}
