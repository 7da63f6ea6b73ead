//! Calculated charges and the statistics used to compare two charge sets.

use crate::error::ChargeError;
use std::collections::HashSet;

/// Charges of a set of molecules, in molecule order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Charges {
    method: String,
    parameters: Option<String>,
    entries: Vec<(String, Vec<f64>)>,
}

impl Charges {
    /// Creates an empty charge set.
    ///
    /// # Arguments
    ///
    /// * `method` - Internal name of the method that produced the charges.
    /// * `parameters` - Name of the parameter set used, if any.
    pub fn new(method: impl Into<String>, parameters: Option<String>) -> Self {
        Self {
            method: method.into(),
            parameters,
            entries: Vec::new(),
        }
    }

    /// Appends the charges of one molecule.
    pub fn insert(&mut self, name: impl Into<String>, charges: Vec<f64>) {
        self.entries.push((name.into(), charges));
    }

    /// Internal name of the method that produced the charges.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Name of the parameter set, if the method used one.
    pub fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }

    /// Charges of the first molecule called `name`.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, q)| q.as_slice())
    }

    /// Molecule names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterates over `(molecule name, charges)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.entries.iter().map(|(n, q)| (n.as_str(), q.as_slice()))
    }

    /// Number of molecules with charges.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Root-mean-square deviation per molecule, averaged over molecules.
pub fn rmsd(a: &Charges, b: &Charges) -> Result<f64, ChargeError> {
    per_molecule_mean(a, b, |x, y| {
        let sum: f64 = x.iter().zip(y).map(|(p, q)| (p - q).powi(2)).sum();
        (sum / x.len() as f64).sqrt()
    })
}

/// Squared Pearson correlation per molecule, averaged over molecules.
///
/// A molecule whose charges have no variance in either set contributes 1.0 when the two
/// vectors are identical and 0.0 otherwise.
pub fn pearson2(a: &Charges, b: &Charges) -> Result<f64, ChargeError> {
    per_molecule_mean(a, b, |x, y| {
        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (p, q) in x.iter().zip(y) {
            cov += (p - mean_x) * (q - mean_y);
            var_x += (p - mean_x).powi(2);
            var_y += (q - mean_y).powi(2);
        }
        if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
            return if x == y { 1.0 } else { 0.0 };
        }
        cov * cov / (var_x * var_y)
    })
}

/// Largest absolute deviation per molecule, averaged over molecules.
pub fn max_deviation(a: &Charges, b: &Charges) -> Result<f64, ChargeError> {
    per_molecule_mean(a, b, |x, y| {
        x.iter()
            .zip(y)
            .map(|(p, q)| (p - q).abs())
            .fold(0.0, f64::max)
    })
}

/// Mean absolute deviation per molecule, averaged over molecules.
pub fn average_deviation(a: &Charges, b: &Charges) -> Result<f64, ChargeError> {
    per_molecule_mean(a, b, |x, y| {
        x.iter().zip(y).map(|(p, q)| (p - q).abs()).sum::<f64>() / x.len() as f64
    })
}

/// Applies `metric` to every molecule and averages the results.
///
/// Molecules are paired by name, so the two sets may list them in different orders; they
/// must contain the same names.
fn per_molecule_mean(
    a: &Charges,
    b: &Charges,
    metric: impl Fn(&[f64], &[f64]) -> f64,
) -> Result<f64, ChargeError> {
    let a_names: HashSet<&str> = a.names().collect();
    let b_names: HashSet<&str> = b.names().collect();
    if a.len() != b.len() || a_names != b_names {
        return Err(ChargeError::MismatchedCharges(
            "Trying to compare two different sets of molecules".to_string(),
        ));
    }
    if a.is_empty() {
        return Err(ChargeError::MismatchedCharges(
            "Charge sets contain no molecules".to_string(),
        ));
    }

    let mut total = 0.0;
    for (name, x) in a.iter() {
        let y = b.get(name).unwrap_or_default();
        if x.len() != y.len() || x.is_empty() {
            return Err(ChargeError::MismatchedCharges(format!(
                "molecule '{name}' has {} and {} charges",
                x.len(),
                y.len()
            )));
        }
        total += metric(x, y);
    }
    Ok(total / a.len() as f64)
}
