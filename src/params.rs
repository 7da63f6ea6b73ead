//! Parameter sets and utilities for loading and saving them as TOML.
//!
//! A parameter set has up to three blocks. The `common` block holds named scalars shared by
//! every atom. The `atom` and `bond` blocks each hold an ordered list of parameter names and
//! one value vector per type key. A method accepts a parameter set only if the three name
//! lists equal its declared signature.
//!
//! ```toml
//! [metadata]
//! name = "EEM example"
//! method = "eem"
//!
//! [common]
//! names = ["kappa"]
//! values = [0.5]
//!
//! [atom]
//! names = ["A", "B"]
//! data = [
//!     { key = ["C", "hbo", "1"], value = [2.48, 0.91] },
//!     { key = ["H", "plain", "*"], value = [2.39, 0.95] },
//! ]
//!
//! [bond]
//! names = ["kappa"]
//! data = [{ key = ["C", "H", "bo", "1"], value = [1.2] }]
//! ```
//!
//! Atom keys have three fields `(symbol, scheme, value)`. Bond keys have either four fields
//! `(symbol1, symbol2, scheme, value)` or eight fields that spell out both endpoint atom keys
//! `(symbol1, scheme1, value1, symbol2, scheme2, value2, scheme, value)`.

use crate::classify::{AtomScheme, AtomTypeKey, BondScheme, BondTypeKey};
use crate::error::ChargeError;
use crate::method::Method;
use crate::model::MoleculeSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::path::Path;

/// Descriptive header of a parameter set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Human-readable name of the parameter set.
    pub name: String,
    /// Internal name of the method the set was fitted for.
    pub method: String,
    /// Publication or other origin of the values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Named scalar parameters shared by all atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonBlock {
    names: Vec<String>,
    values: Vec<f64>,
}

impl CommonBlock {
    /// Creates a block from parallel name and value lists.
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Self {
        Self { names, values }
    }

    /// Parameter names, in signature order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values, parallel to [`CommonBlock::names`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Looks up a value by parameter name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }
}

/// Per-type parameter vectors for atoms or bonds.
///
/// Keys keep file order; during classification the position of a key becomes the type index
/// stored on atoms and bonds, so `values(type_index)` resolves a type to its coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedBlock<K> {
    names: Vec<String>,
    keys: Vec<K>,
    values: Vec<Vec<f64>>,
}

impl<K: Eq + Hash + Clone + fmt::Display> KeyedBlock<K> {
    /// Creates a block from its name list and `(key, values)` entries.
    ///
    /// Validation happens when the block is assembled into [`Parameters`].
    pub fn new(names: Vec<String>, entries: Vec<(K, Vec<f64>)>) -> Self {
        let (keys, values) = entries.into_iter().unzip();
        Self {
            names,
            keys,
            values,
        }
    }

    /// Parameter names, in signature order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Type keys in file order; a type index is a position in this list.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Number of type keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Coefficients of the type at `type_index`, ordered like [`names`](Self::names).
    pub fn values(&self, type_index: usize) -> &[f64] {
        &self.values[type_index]
    }

    /// Position of `key`, if present.
    pub fn find(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Iterates over `(key, values)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[f64])> {
        self.keys.iter().zip(self.values.iter().map(Vec::as_slice))
    }

    fn validate(&self, block: &str) -> Result<(), ChargeError> {
        let mut seen = HashSet::with_capacity(self.keys.len());
        for (key, values) in self.keys.iter().zip(&self.values) {
            if values.len() != self.names.len() {
                return Err(ChargeError::InvalidParameters(format!(
                    "{block} entry '{key}' has {} values for {} names",
                    values.len(),
                    self.names.len()
                )));
            }
            if !seen.insert(key.clone()) {
                return Err(ChargeError::InvalidParameters(format!(
                    "{block} entry '{key}' is listed more than once"
                )));
            }
        }
        Ok(())
    }
}

/// A complete parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    metadata: Metadata,
    common: Option<CommonBlock>,
    atom: Option<KeyedBlock<AtomTypeKey>>,
    bond: Option<KeyedBlock<BondTypeKey>>,
}

impl Parameters {
    /// Assembles a parameter set from its blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::InvalidParameters`] if a value vector does not match its block's
    /// name list or a key appears twice.
    pub fn new(
        metadata: Metadata,
        common: Option<CommonBlock>,
        atom: Option<KeyedBlock<AtomTypeKey>>,
        bond: Option<KeyedBlock<BondTypeKey>>,
    ) -> Result<Self, ChargeError> {
        if let Some(common) = &common {
            if common.names.len() != common.values.len() {
                return Err(ChargeError::InvalidParameters(format!(
                    "common block has {} names but {} values",
                    common.names.len(),
                    common.values.len()
                )));
            }
        }
        if let Some(atom) = &atom {
            atom.validate("atom")?;
        }
        if let Some(bond) = &bond {
            bond.validate("bond")?;
        }
        Ok(Self {
            metadata,
            common,
            atom,
            bond,
        })
    }

    /// Loads a parameter set from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ChargeError::IoError` if the file cannot be read, a
    /// `ChargeError::DeserializationError` if the TOML is malformed, or one of the content
    /// errors of [`Parameters::load_from_str`].
    pub fn load_from_file(path: &Path) -> Result<Self, ChargeError> {
        let content = std::fs::read_to_string(path).map_err(|io_error| ChargeError::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;

        Self::load_from_str(&content)
    }

    /// Parses a parameter set from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ChargeError::DeserializationError` for malformed TOML,
    /// `ChargeError::UnknownScheme` for a key naming an unknown classification scheme, and
    /// `ChargeError::InvalidParameters` for keys of the wrong arity, value vectors that do not
    /// match the name list, or duplicate keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use eqcharge::Parameters;
    ///
    /// let toml_data = r#"
    /// [metadata]
    /// name = "demo"
    /// method = "eem"
    ///
    /// [common]
    /// names = ["kappa"]
    /// values = [0.5]
    ///
    /// [atom]
    /// names = ["A", "B"]
    /// data = [{ key = ["H", "plain", "*"], value = [2.4, 0.9] }]
    /// "#;
    ///
    /// let params = Parameters::load_from_str(toml_data).unwrap();
    /// assert_eq!(params.atom().unwrap().len(), 1);
    /// ```
    pub fn load_from_str(toml_str: &str) -> Result<Self, ChargeError> {
        let raw: RawParameters = toml::from_str(toml_str)?;
        raw.into_parameters()
    }

    /// Renders the parameter set as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ChargeError::SerializationError` if the TOML encoder rejects a value.
    pub fn to_toml_string(&self) -> Result<String, ChargeError> {
        let raw = RawParameters::from_parameters(self);
        toml::to_string(&raw).map_err(ChargeError::from)
    }

    /// Writes the parameter set to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a serialization error as for [`Parameters::to_toml_string`], or a
    /// `ChargeError::IoError` carrying `path` if the file cannot be written.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ChargeError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|io_error| ChargeError::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })
    }

    /// Builds a zero-valued template for `method` over the types currently registered in
    /// `set`.
    ///
    /// The set should have been classified with [`MoleculeSet::classify_atoms`] and
    /// [`MoleculeSet::classify_bonds`] beforehand; blocks the method does not use are left
    /// out. Used to seed parameter fitting.
    pub fn for_method(set: &MoleculeSet, method: &dyn Method) -> Self {
        let signature = method.signature();
        let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

        let common = (!signature.common.is_empty()).then(|| {
            CommonBlock::new(owned(signature.common), vec![0.0; signature.common.len()])
        });
        let atom = (!signature.atom.is_empty()).then(|| {
            KeyedBlock::new(
                owned(signature.atom),
                set.atom_types()
                    .iter()
                    .map(|k| (k.clone(), vec![0.0; signature.atom.len()]))
                    .collect(),
            )
        });
        let bond = (!signature.bond.is_empty()).then(|| {
            KeyedBlock::new(
                owned(signature.bond),
                set.bond_types()
                    .iter()
                    .map(|k| (k.clone(), vec![0.0; signature.bond.len()]))
                    .collect(),
            )
        });

        Self {
            metadata: Metadata {
                name: format!("{} template", method.name()),
                method: method.name().to_string(),
                source: None,
            },
            common,
            atom,
            bond,
        }
    }

    /// The descriptive header.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Shorthand for `metadata().name`.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The `common` block, if present.
    pub fn common(&self) -> Option<&CommonBlock> {
        self.common.as_ref()
    }

    /// The `atom` block, if present.
    pub fn atom(&self) -> Option<&KeyedBlock<AtomTypeKey>> {
        self.atom.as_ref()
    }

    /// The `bond` block, if present.
    pub fn bond(&self) -> Option<&KeyedBlock<BondTypeKey>> {
        self.bond.as_ref()
    }

    /// Number of free parameters: all common values plus every atom and bond coefficient.
    pub fn vector_len(&self) -> usize {
        self.common.as_ref().map_or(0, |c| c.values.len())
            + self.atom.as_ref().map_or(0, |a| a.values.iter().map(Vec::len).sum())
            + self.bond.as_ref().map_or(0, |b| b.values.iter().map(Vec::len).sum())
    }

    /// Flattens all values into one vector: common values, then atom vectors in key order,
    /// then bond vectors in key order.
    pub fn to_vector(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.vector_len());
        if let Some(common) = &self.common {
            out.extend_from_slice(&common.values);
        }
        if let Some(atom) = &self.atom {
            atom.values.iter().for_each(|v| out.extend_from_slice(v));
        }
        if let Some(bond) = &self.bond {
            bond.values.iter().for_each(|v| out.extend_from_slice(v));
        }
        out
    }

    /// Restores values from a vector laid out as by [`Parameters::to_vector`].
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::VectorLength`] if `values` has the wrong length; the set is left
    /// unchanged in that case.
    pub fn set_from_vector(&mut self, values: &[f64]) -> Result<(), ChargeError> {
        let expected = self.vector_len();
        if values.len() != expected {
            return Err(ChargeError::VectorLength {
                expected,
                got: values.len(),
            });
        }

        let mut rest = values;
        let mut take = |dst: &mut [f64]| {
            let (head, tail) = rest.split_at(dst.len());
            dst.copy_from_slice(head);
            rest = tail;
        };
        if let Some(common) = &mut self.common {
            take(&mut common.values);
        }
        if let Some(atom) = &mut self.atom {
            atom.values.iter_mut().for_each(|v| take(v));
        }
        if let Some(bond) = &mut self.bond {
            bond.values.iter_mut().for_each(|v| take(v));
        }
        Ok(())
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parameters: {} ({})", self.metadata.name, self.metadata.method)?;
        if let Some(source) = &self.metadata.source {
            writeln!(f, "Source: {source}")?;
        }
        if let Some(common) = &self.common {
            writeln!(f, "Common:")?;
            for (name, value) in common.names.iter().zip(&common.values) {
                writeln!(f, "  {name:<12} {value:>10.6}")?;
            }
        }
        if let Some(atom) = &self.atom {
            writeln!(f, "Atom: {}", atom.names.join(", "))?;
            for (key, values) in atom.iter() {
                writeln!(f, "  {:<16} {}", key.to_string(), join_values(values))?;
            }
        }
        if let Some(bond) = &self.bond {
            writeln!(f, "Bond: {}", bond.names.join(", "))?;
            for (key, values) in bond.iter() {
                writeln!(f, "  {:<16} {}", key.to_string(), join_values(values))?;
            }
        }
        Ok(())
    }
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:>10.6}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Serialize, Deserialize)]
struct RawParameters {
    metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    common: Option<RawCommon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    atom: Option<RawBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bond: Option<RawBlock>,
}

#[derive(Serialize, Deserialize)]
struct RawCommon {
    names: Vec<String>,
    values: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct RawBlock {
    names: Vec<String>,
    #[serde(default)]
    data: Vec<RawEntry>,
}

#[derive(Serialize, Deserialize)]
struct RawEntry {
    key: Vec<String>,
    value: Vec<f64>,
}

impl RawParameters {
    fn into_parameters(self) -> Result<Parameters, ChargeError> {
        let common = self.common.map(|c| CommonBlock::new(c.names, c.values));

        let atom = self
            .atom
            .map(|block| {
                let entries = block
                    .data
                    .into_iter()
                    .map(|entry| Ok((parse_atom_key(&entry.key)?, entry.value)))
                    .collect::<Result<Vec<_>, ChargeError>>()?;
                Ok::<_, ChargeError>(KeyedBlock::new(block.names, entries))
            })
            .transpose()?;

        let bond = self
            .bond
            .map(|block| {
                let entries = block
                    .data
                    .into_iter()
                    .map(|entry| Ok((parse_bond_key(&entry.key)?, entry.value)))
                    .collect::<Result<Vec<_>, ChargeError>>()?;
                Ok::<_, ChargeError>(KeyedBlock::new(block.names, entries))
            })
            .transpose()?;

        Parameters::new(self.metadata, common, atom, bond)
    }

    fn from_parameters(parameters: &Parameters) -> Self {
        Self {
            metadata: parameters.metadata.clone(),
            common: parameters.common.as_ref().map(|c| RawCommon {
                names: c.names.clone(),
                values: c.values.clone(),
            }),
            atom: parameters.atom.as_ref().map(|block| RawBlock {
                names: block.names.clone(),
                data: block
                    .iter()
                    .map(|(key, values)| RawEntry {
                        key: atom_key_fields(key),
                        value: values.to_vec(),
                    })
                    .collect(),
            }),
            bond: parameters.bond.as_ref().map(|block| RawBlock {
                names: block.names.clone(),
                data: block
                    .iter()
                    .map(|(key, values)| RawEntry {
                        key: bond_key_fields(key),
                        value: values.to_vec(),
                    })
                    .collect(),
            }),
        }
    }
}

fn parse_atom_key(fields: &[String]) -> Result<AtomTypeKey, ChargeError> {
    match fields {
        [symbol, scheme, value] => Ok(AtomTypeKey::new(
            symbol.as_str(),
            scheme.parse::<AtomScheme>()?,
            value.as_str(),
        )),
        _ => Err(ChargeError::InvalidParameters(format!(
            "atom key {fields:?} must have 3 fields"
        ))),
    }
}

fn parse_bond_key(fields: &[String]) -> Result<BondTypeKey, ChargeError> {
    match fields {
        [symbol1, symbol2, scheme, value] => Ok(BondTypeKey::new(
            symbol1.as_str(),
            symbol2.as_str(),
            scheme.parse::<BondScheme>()?,
            value.as_str(),
        )),
        [s1, c1, v1, s2, c2, v2, scheme, value] => Ok(BondTypeKey {
            first: parse_atom_key(&[s1.clone(), c1.clone(), v1.clone()])?,
            second: parse_atom_key(&[s2.clone(), c2.clone(), v2.clone()])?,
            scheme: scheme.parse::<BondScheme>()?,
            value: value.clone(),
        }),
        _ => Err(ChargeError::InvalidParameters(format!(
            "bond key {fields:?} must have 4 or 8 fields"
        ))),
    }
}

fn atom_key_fields(key: &AtomTypeKey) -> Vec<String> {
    vec![
        key.symbol.clone(),
        key.scheme.as_str().to_string(),
        key.value.clone(),
    ]
}

fn bond_key_fields(key: &BondTypeKey) -> Vec<String> {
    if key.has_plain_endpoints() {
        vec![
            key.first.symbol.clone(),
            key.second.symbol.clone(),
            key.scheme.as_str().to_string(),
            key.value.clone(),
        ]
    } else {
        let mut fields = atom_key_fields(&key.first);
        fields.extend(atom_key_fields(&key.second));
        fields.push(key.scheme.as_str().to_string());
        fields.push(key.value.clone());
        fields
    }
}
