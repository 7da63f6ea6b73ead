//! Runtime options declared by methods.
//!
//! Every method publishes a list of [`OptionSpec`]s. Values are kept as strings, exactly as a
//! user supplies them, and are validated against their spec when set so that typed reads
//! during a calculation cannot fail on well-formed input.

use crate::error::ChargeError;
use std::collections::BTreeMap;
use std::fmt;

/// Value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Str,
    Int,
    Double,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionKind::Str => "str",
            OptionKind::Int => "int",
            OptionKind::Double => "double",
        })
    }
}

/// Declaration of a single option: name, type, default and the allowed choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Option name as given on the command line.
    pub name: &'static str,
    /// One-line help text.
    pub description: &'static str,
    /// Type values must parse as.
    pub kind: OptionKind,
    /// Value used when the option is not set. Must itself be valid.
    pub default: &'static str,
    /// Allowed values; empty means any value of the right type.
    pub choices: &'static [&'static str],
}

impl OptionSpec {
    /// Checks `value` against the type and choices of this option.
    pub fn validate(&self, value: &str) -> Result<(), ChargeError> {
        let invalid = |reason: String| ChargeError::InvalidOptionValue {
            option: self.name.to_string(),
            value: value.to_string(),
            reason,
        };

        match self.kind {
            OptionKind::Str => {}
            OptionKind::Int => {
                value
                    .parse::<i64>()
                    .map_err(|e| invalid(format!("expected an integer ({e})")))?;
            }
            OptionKind::Double => {
                let parsed = value
                    .parse::<f64>()
                    .map_err(|e| invalid(format!("expected a number ({e})")))?;
                if !parsed.is_finite() {
                    return Err(invalid("expected a finite number".to_string()));
                }
            }
        }

        if !self.choices.is_empty() && !self.choices.contains(&value) {
            return Err(invalid(format!(
                "allowed values are {}",
                self.choices.join(", ")
            )));
        }
        Ok(())
    }
}

/// Current option values of one method, initialised from the declared defaults.
#[derive(Debug, Clone)]
pub struct OptionValues {
    method: &'static str,
    specs: Vec<OptionSpec>,
    values: BTreeMap<&'static str, String>,
}

impl OptionValues {
    /// Starts from the defaults of `specs`.
    ///
    /// # Arguments
    ///
    /// * `method` - Name of the owning method, used in errors.
    /// * `specs` - The options the method declares.
    pub fn new(method: &'static str, specs: Vec<OptionSpec>) -> Self {
        let values = specs
            .iter()
            .map(|spec| (spec.name, spec.default.to_string()))
            .collect();
        Self {
            method,
            specs,
            values,
        }
    }

    /// The declared options.
    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }

    fn spec(&self, name: &str) -> Result<&OptionSpec, ChargeError> {
        self.specs
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ChargeError::UnknownOption {
                method: self.method.to_string(),
                option: name.to_string(),
            })
    }

    /// Replaces the value of `name` after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::UnknownOption`] if the method declares no such option and
    /// [`ChargeError::InvalidOptionValue`] if the value has the wrong type or is not one of
    /// the allowed choices.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ChargeError> {
        let spec = *self.spec(name)?;
        spec.validate(value)?;
        self.values.insert(spec.name, value.to_string());
        Ok(())
    }

    /// Current value of `name` as a string.
    pub fn get_str(&self, name: &str) -> Result<&str, ChargeError> {
        let spec = self.spec(name)?;
        Ok(self.values.get(spec.name).map_or(spec.default, String::as_str))
    }

    /// Current value of `name` as an integer.
    pub fn get_i64(&self, name: &str) -> Result<i64, ChargeError> {
        let raw = self.get_str(name)?;
        raw.parse().map_err(|e| ChargeError::InvalidOptionValue {
            option: name.to_string(),
            value: raw.to_string(),
            reason: format!("expected an integer ({e})"),
        })
    }

    /// Current value of `name` as a float.
    pub fn get_f64(&self, name: &str) -> Result<f64, ChargeError> {
        let raw = self.get_str(name)?;
        raw.parse().map_err(|e| ChargeError::InvalidOptionValue {
            option: name.to_string(),
            value: raw.to_string(),
            reason: format!("expected a number ({e})"),
        })
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}
