//! Charge calculation methods and the machinery that binds them to parameters.
//!
//! A method is a stateless unit struct implementing [`Method`]. It declares the parameter
//! names it reads ([`Signature`]), its runtime options, and the derived molecular structures
//! it needs; the [`Calculator`] checks all of these before any numerical work starts and
//! hands the method a [`Context`] through which bound parameters and option values are read.
//!
//! The methods fall into a few families:
//!
//! - **Equalization** (`eem`, `qeq`, `sfkeem`, `eqeq`, `smpqeq`): a dense system with a
//!   Lagrange row for the total charge, solvable whole or per fragment.
//! - **Propagation** (`peoe`, `mpeoe`, `gdac`): damped charge transfer along bonds.
//! - **Bond variables** (`delre`, `kcm`, `sqe`, `sqeqp`, `abeem`): unknowns live on bonds.
//! - **Topological** (`tsef`, `denr`, `charge2`, `mgc`, `veem`) and the trivial `formal` and
//!   `dummy`.

mod abeem;
mod calculator;
mod charge2;
mod delre;
mod denr;
mod eem;
mod eqeq;
mod equalization;
mod kcm;
mod mgc;
pub mod options;
mod propagation;
mod qeq;
mod registry;
mod sfkeem;
mod smpqeq;
mod sqe;
mod trivial;
mod tsef;
mod veem;

pub use calculator::{Calculator, LARGE_MOLECULE_ATOMS, SetResult};
pub use equalization::{COVER_THRESHOLD_ATOMS, CUTOFF_THRESHOLD_ATOMS, Strategy};
pub use options::{OptionKind, OptionSpec, OptionValues};
pub use registry::{Candidate, available_methods, best_parameters, load_method, suitable_methods};

use crate::error::ChargeError;
use crate::model::{Molecule, Requirement};
use crate::params::Parameters;
use std::fmt;

/// The parameter names a method reads from each block, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Names of the `common` block.
    pub common: &'static [&'static str],
    /// Names of the `atom` block.
    pub atom: &'static [&'static str],
    /// Names of the `bond` block.
    pub bond: &'static [&'static str],
}

impl Signature {
    /// A method without parameters.
    pub const EMPTY: Signature = Signature {
        common: &[],
        atom: &[],
        bond: &[],
    };

    /// Returns `true` if the method reads no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.common.is_empty() && self.atom.is_empty() && self.bond.is_empty()
    }

    /// Checks that the `common`, `atom` and `bond` name lists of `parameters` equal this
    /// signature exactly. An absent block counts as an empty list.
    ///
    /// # Arguments
    ///
    /// * `method` - Name of the method, used in the error.
    /// * `parameters` - The parameter set to check.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::SignatureMismatch`] naming the first block that differs.
    pub fn check(&self, method: &str, parameters: &Parameters) -> Result<(), ChargeError> {
        let sections: [(&'static str, &[&str], &[String]); 3] = [
            (
                "common",
                self.common,
                parameters.common().map(|b| b.names()).unwrap_or_default(),
            ),
            (
                "atom",
                self.atom,
                parameters.atom().map(|b| b.names()).unwrap_or_default(),
            ),
            (
                "bond",
                self.bond,
                parameters.bond().map(|b| b.names()).unwrap_or_default(),
            ),
        ];

        for (section, expected, got) in sections {
            if !expected.iter().copied().eq(got.iter().map(String::as_str)) {
                return Err(ChargeError::SignatureMismatch {
                    method: method.to_string(),
                    section,
                    expected: expected.iter().map(|s| s.to_string()).collect(),
                    got: got.to_vec(),
                });
            }
        }
        Ok(())
    }
}

/// Whether a method uses connectivity only, geometry, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    TwoD,
    ThreeD,
    Other,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MethodKind::TwoD => "2D",
            MethodKind::ThreeD => "3D",
            MethodKind::Other => "other",
        })
    }
}

/// Descriptive information about a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodMetadata {
    /// Internal name used by the registry and in parameter files.
    pub name: &'static str,
    /// Descriptive name shown in method listings.
    pub full_name: &'static str,
    /// DOI of the publication that introduced the method, when there is one.
    pub publication: Option<&'static str>,
    /// Whether the method reads geometry.
    pub kind: MethodKind,
    /// Higher values are listed first and preferred when several methods apply.
    pub priority: u32,
}

/// The contract every charge calculation method fulfils.
pub trait Method: Send + Sync {
    fn metadata(&self) -> &'static MethodMetadata;

    fn name(&self) -> &'static str {
        self.metadata().name
    }

    /// Parameter names read from the bound parameter set.
    fn signature(&self) -> Signature {
        Signature::EMPTY
    }

    /// Options the method accepts, with their defaults.
    fn options(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    /// Derived structures that must be built on every molecule before calculation.
    fn requirements(&self) -> Vec<Requirement> {
        Vec::new()
    }

    fn is_suitable_for_molecule(&self, _molecule: &Molecule) -> bool {
        true
    }

    /// Returns `false` for methods whose cost or conditioning rules out very large inputs.
    fn is_suitable_for_large_molecule(&self) -> bool {
        true
    }

    /// Computes one charge per atom, in atom order.
    fn calculate_charges(
        &self,
        ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError>;
}

/// Read access to the parameters and options bound to a method.
///
/// Per-atom and per-bond lookups resolve the type index stored on each atom or bond during
/// classification.
pub struct Context<'a> {
    method: &'static str,
    signature: Signature,
    parameters: Option<&'a Parameters>,
    options: &'a OptionValues,
}

impl<'a> Context<'a> {
    /// Creates the context for one call of `method`.
    ///
    /// # Arguments
    ///
    /// * `method` - The method being called; its signature selects the blocks read.
    /// * `parameters` - The bound parameter set, if any.
    /// * `options` - Validated option values.
    pub fn new(
        method: &dyn Method,
        parameters: Option<&'a Parameters>,
        options: &'a OptionValues,
    ) -> Self {
        Self {
            method: method.name(),
            signature: method.signature(),
            parameters,
            options,
        }
    }

    /// Name of the method this context belongs to.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// The bound parameter set, if any.
    pub fn parameters(&self) -> Option<&'a Parameters> {
        self.parameters
    }

    fn bound(&self) -> Result<&'a Parameters, ChargeError> {
        self.parameters
            .ok_or_else(|| ChargeError::MissingParameters(self.method.to_string()))
    }

    /// Values of the common block, ordered like the method's signature.
    pub fn common(&self) -> Result<&'a [f64], ChargeError> {
        if self.signature.common.is_empty() {
            return Ok(&[]);
        }
        self.bound()?
            .common()
            .map(|block| block.values())
            .ok_or_else(|| ChargeError::MissingParameters(self.method.to_string()))
    }

    /// Parameter vector of every atom of `molecule`, in atom order.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::Unclassified`] if any atom lacks a type.
    pub fn atom_parameters(&self, molecule: &Molecule) -> Result<Vec<&'a [f64]>, ChargeError> {
        if self.signature.atom.is_empty() {
            return Ok(Vec::new());
        }
        let block = self
            .bound()?
            .atom()
            .ok_or_else(|| ChargeError::MissingParameters(self.method.to_string()))?;
        resolve(
            molecule,
            molecule.atoms().iter().map(|a| a.atom_type()),
            block.len(),
            |t| block.values(t),
        )
    }

    /// Parameter vector of every bond of `molecule`, in bond order.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::Unclassified`] if any bond lacks a type.
    pub fn bond_parameters(&self, molecule: &Molecule) -> Result<Vec<&'a [f64]>, ChargeError> {
        if self.signature.bond.is_empty() {
            return Ok(Vec::new());
        }
        let block = self
            .bound()?
            .bond()
            .ok_or_else(|| ChargeError::MissingParameters(self.method.to_string()))?;
        resolve(
            molecule,
            molecule.bonds().iter().map(|b| b.bond_type()),
            block.len(),
            |t| block.values(t),
        )
    }

    /// Raw value of option `name`.
    pub fn option_str(&self, name: &str) -> Result<&'a str, ChargeError> {
        self.options.get_str(name)
    }

    /// Value of integer option `name`.
    pub fn option_i64(&self, name: &str) -> Result<i64, ChargeError> {
        self.options.get_i64(name)
    }

    /// Value of floating-point option `name`.
    pub fn option_f64(&self, name: &str) -> Result<f64, ChargeError> {
        self.options.get_f64(name)
    }
}

fn resolve<'a>(
    molecule: &Molecule,
    types: impl Iterator<Item = Option<usize>>,
    registered: usize,
    values: impl Fn(usize) -> &'a [f64],
) -> Result<Vec<&'a [f64]>, ChargeError> {
    let mut resolved = Vec::new();
    let mut missing = 0;
    for t in types {
        match t {
            Some(t) if t < registered => resolved.push(values(t)),
            _ => missing += 1,
        }
    }
    if missing > 0 {
        return Err(ChargeError::Unclassified {
            molecule: molecule.name().to_string(),
            count: missing,
        });
    }
    Ok(resolved)
}
