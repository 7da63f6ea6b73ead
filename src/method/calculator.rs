//! Binding of a method to parameters and options, and per-molecule orchestration.

use super::equalization::redistribute_residual;
use super::options::OptionValues;
use super::{Context, Method, load_method};
use crate::charges::Charges;
use crate::error::ChargeError;
use crate::model::{Molecule, MoleculeSet, Requirement};
use crate::params::Parameters;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

/// Molecules with more atoms than this are refused by methods that are not suitable for
/// large molecules.
pub const LARGE_MOLECULE_ATOMS: usize = 20_000;

/// The outcome of calculating a whole molecule set.
#[derive(Debug)]
pub struct SetResult {
    /// Charges of every molecule that succeeded, in set order.
    pub charges: Charges,
    /// Name and error of every molecule that failed.
    pub failures: Vec<(String, ChargeError)>,
}

/// A method bound to a parameter set and option values, ready to calculate charges.
///
/// The calculator borrows the parameters, so it cannot outlive them.
///
/// # Examples
///
/// ```
/// use eqcharge::{Atom, Bond, Calculator, Molecule, periodic_table};
///
/// let o = periodic_table().by_symbol("O").unwrap();
/// let h = periodic_table().by_symbol("H").unwrap();
/// let mut water = Molecule::new(
///     "water",
///     vec![
///         Atom::new(o, [0.0, 0.0, 0.1]),
///         Atom::new(h, [0.76, 0.59, 0.0]),
///         Atom::new(h, [-0.76, 0.58, 0.02]),
///     ],
///     vec![Bond::new(0, 1, 1), Bond::new(0, 2, 1)],
/// )
/// .unwrap();
///
/// let calculator = Calculator::from_name("eqeq").unwrap();
/// water.fulfill(&calculator.requirements());
/// let charges = calculator.calculate_charges(&water).unwrap();
///
/// assert!(charges[0] < 0.0);
/// assert!((charges.iter().sum::<f64>()).abs() < 1e-6);
/// ```
pub struct Calculator<'p> {
    method: Box<dyn Method>,
    parameters: Option<&'p Parameters>,
    options: OptionValues,
}

impl<'p> Calculator<'p> {
    /// Creates a calculator for `method` with default options and no parameters.
    pub fn new(method: Box<dyn Method>) -> Self {
        let options = OptionValues::new(method.name(), method.options());
        Self {
            method,
            parameters: None,
            options,
        }
    }

    /// Creates a calculator for the registered method called `name`.
    pub fn from_name(name: &str) -> Result<Self, ChargeError> {
        Ok(Self::new(load_method(name)?))
    }

    /// Binds a parameter set.
    ///
    /// The `common`, `atom` and `bond` name lists of `parameters` must equal the method's
    /// signature exactly; an absent block counts as an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::SignatureMismatch`] naming the first block that differs.
    pub fn with_parameters(mut self, parameters: &'p Parameters) -> Result<Self, ChargeError> {
        self.method
            .signature()
            .check(self.method.name(), parameters)?;

        if parameters.metadata().method != self.method.name() {
            warn!(
                parameters = parameters.name(),
                fitted_for = %parameters.metadata().method,
                method = self.method.name(),
                "Parameter set was fitted for a different method"
            );
        }

        self.parameters = Some(parameters);
        Ok(self)
    }

    /// Sets a method option.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::UnknownOption`] or [`ChargeError::InvalidOptionValue`].
    pub fn with_option(mut self, name: &str, value: &str) -> Result<Self, ChargeError> {
        self.options.set(name, value)?;
        Ok(self)
    }

    /// The bound method.
    pub fn method(&self) -> &dyn Method {
        self.method.as_ref()
    }

    /// The bound parameter set, if any.
    pub fn parameters(&self) -> Option<&'p Parameters> {
        self.parameters
    }

    /// Current option values, defaults included.
    pub fn options(&self) -> &OptionValues {
        &self.options
    }

    /// Derived structures every molecule needs before [`Calculator::calculate_charges`].
    pub fn requirements(&self) -> Vec<Requirement> {
        self.method.requirements()
    }

    /// Classifies `set` against the bound parameters and builds the required structures.
    ///
    /// Molecules with atoms or bonds that match no parameter key are removed from the set;
    /// the number removed is returned. Parameter-free methods skip classification.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::MissingParameters`] if the method needs parameters and none
    /// are bound.
    #[instrument(skip_all, fields(method = self.method.name(), molecules = set.len()))]
    pub fn prepare(&self, set: &mut MoleculeSet, permissive: bool) -> Result<usize, ChargeError> {
        let removed = if self.method.signature().is_empty() {
            0
        } else {
            let parameters = self
                .parameters
                .ok_or_else(|| ChargeError::MissingParameters(self.method.name().to_string()))?;
            set.classify_set_from_parameters(parameters, true, permissive)
        };
        set.fulfill_requirements(&self.requirements());
        Ok(removed)
    }

    /// Calculates the charges of one molecule.
    ///
    /// Before dispatching, checks that the molecule has atoms, that the method accepts it,
    /// that every required structure has been built, and that all atoms and bonds the method
    /// reads parameters for are classified. The result is checked for length and finiteness
    /// and shifted uniformly so that it sums to the molecule's total formal charge.
    ///
    /// # Errors
    ///
    /// Any of the checks above, or a numerical failure of the method.
    pub fn calculate_charges(&self, molecule: &Molecule) -> Result<Vec<f64>, ChargeError> {
        let method = self.method.as_ref();
        let name = method.name();

        if molecule.is_empty() {
            return Err(ChargeError::NoAtoms);
        }
        if !method.is_suitable_for_molecule(molecule) {
            return Err(ChargeError::UnsuitableMolecule {
                method: name.to_string(),
                molecule: molecule.name().to_string(),
                reason: "the molecule contains elements the method cannot describe".to_string(),
            });
        }
        if molecule.len() > LARGE_MOLECULE_ATOMS && !method.is_suitable_for_large_molecule() {
            return Err(ChargeError::UnsuitableMolecule {
                method: name.to_string(),
                molecule: molecule.name().to_string(),
                reason: format!(
                    "{} atoms exceed the limit of {LARGE_MOLECULE_ATOMS}",
                    molecule.len()
                ),
            });
        }
        for requirement in method.requirements() {
            if !molecule.has_feature(requirement) {
                return Err(ChargeError::MissingFeature {
                    molecule: molecule.name().to_string(),
                    feature: requirement.as_str(),
                });
            }
        }

        let signature = method.signature();
        if !signature.is_empty() && self.parameters.is_none() {
            return Err(ChargeError::MissingParameters(name.to_string()));
        }
        let mut unclassified = 0;
        if !signature.atom.is_empty() {
            unclassified += molecule
                .atoms()
                .iter()
                .filter(|a| a.atom_type().is_none())
                .count();
        }
        if !signature.bond.is_empty() {
            unclassified += molecule
                .bonds()
                .iter()
                .filter(|b| b.bond_type().is_none())
                .count();
        }
        if unclassified > 0 {
            return Err(ChargeError::Unclassified {
                molecule: molecule.name().to_string(),
                count: unclassified,
            });
        }

        let ctx = Context::new(method, self.parameters, &self.options);
        let mut charges = method.calculate_charges(&ctx, molecule)?;

        if charges.len() != molecule.len() {
            return Err(ChargeError::ChargeCountMismatch {
                method: name.to_string(),
                expected: molecule.len(),
                got: charges.len(),
            });
        }
        if charges.iter().any(|q| !q.is_finite()) {
            return Err(ChargeError::NonFiniteCharges {
                method: name.to_string(),
                molecule: molecule.name().to_string(),
            });
        }

        redistribute_residual(&mut charges, molecule.total_charge() as f64);
        debug!(molecule = molecule.name(), atoms = charges.len(), "Calculated charges");
        Ok(charges)
    }

    /// Calculates every molecule of `set` in parallel.
    ///
    /// A failing molecule is logged and reported in [`SetResult::failures`]; it never stops
    /// the others.
    #[instrument(skip_all, fields(method = self.method.name(), molecules = set.len()))]
    pub fn calculate_set(&self, set: &MoleculeSet) -> SetResult {
        let results: Vec<Result<Vec<f64>, ChargeError>> = set
            .molecules()
            .par_iter()
            .map(|molecule| self.calculate_charges(molecule))
            .collect();

        let mut charges = Charges::new(
            self.method.name(),
            self.parameters.map(|p| p.name().to_string()),
        );
        let mut failures = Vec::new();
        for (molecule, result) in set.molecules().iter().zip(results) {
            match result {
                Ok(q) => charges.insert(molecule.name(), q),
                Err(e) => {
                    warn!(molecule = molecule.name(), error = %e, "Skipping molecule");
                    failures.push((molecule.name().to_string(), e));
                }
            }
        }

        info!(
            succeeded = charges.len(),
            failed = failures.len(),
            "Finished charge calculation"
        );
        SetResult { charges, failures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::periodic_table;
    use crate::model::{Atom, Bond};
    use approx::assert_relative_eq;

    fn eem_parameters(names: &str) -> Parameters {
        Parameters::load_from_str(&format!(
            r#"
            [metadata]
            name = "test"
            method = "eem"
            [common]
            names = ["kappa"]
            values = [0.5]
            [atom]
            names = {names}
            data = [
                {{ key = ["O", "plain", "*"], value = [2.5, 1.0] }},
                {{ key = ["H", "plain", "*"], value = [2.4, 1.0] }},
            ]
            "#
        ))
        .unwrap()
    }

    fn hydroxide() -> MoleculeSet {
        let el = |s: &str| periodic_table().by_symbol(s).unwrap();
        MoleculeSet::new(vec![
            Molecule::new(
                "hydroxide",
                vec![
                    Atom::new(el("O"), [0.0, 0.0, 0.0]).with_formal_charge(-1),
                    Atom::new(el("H"), [0.97, 0.03, -0.01]),
                ],
                vec![Bond::new(0, 1, 1)],
            )
            .unwrap(),
        ])
    }

    #[test]
    fn signature_gate_rejects_wrong_names() {
        let params = eem_parameters(r#"["A", "C"]"#);
        let result = Calculator::from_name("eem")
            .unwrap()
            .with_parameters(&params);
        assert!(matches!(
            result,
            Err(ChargeError::SignatureMismatch { section: "atom", .. })
        ));
    }

    #[test]
    fn parameter_free_method_rejects_parameters() {
        let params = eem_parameters(r#"["A", "B"]"#);
        assert!(Calculator::from_name("dummy")
            .unwrap()
            .with_parameters(&params)
            .is_err());
    }

    #[test]
    fn missing_requirements_are_reported() {
        let params = eem_parameters(r#"["A", "B"]"#);
        let mut set = hydroxide();
        set.classify_set_from_parameters(&params, false, false);
        let calculator = Calculator::from_name("eem")
            .unwrap()
            .with_parameters(&params)
            .unwrap();
        assert!(matches!(
            calculator.calculate_charges(&set.molecules()[0]),
            Err(ChargeError::MissingFeature { .. })
        ));
    }

    #[test]
    fn charged_molecule_sums_to_formal_charge() {
        let params = eem_parameters(r#"["A", "B"]"#);
        let mut set = hydroxide();
        let calculator = Calculator::from_name("eem")
            .unwrap()
            .with_parameters(&params)
            .unwrap();
        assert_eq!(calculator.prepare(&mut set, false).unwrap(), 0);

        let result = calculator.calculate_set(&set);
        assert!(result.failures.is_empty());
        let q = result.charges.get("hydroxide").unwrap();
        assert_relative_eq!(q.iter().sum::<f64>(), -1.0, epsilon = 1e-9);
        assert_eq!(result.charges.parameters(), Some("test"));
    }

    #[test]
    fn unclassified_molecule_fails_alone() {
        let params = eem_parameters(r#"["A", "B"]"#);
        let el = |s: &str| periodic_table().by_symbol(s).unwrap();
        let mut molecules = hydroxide().into_molecules();
        molecules.push(
            Molecule::new(
                "hcl",
                vec![
                    Atom::new(el("H"), [0.0, 0.0, 0.0]),
                    Atom::new(el("Cl"), [1.27, 0.02, 0.01]),
                ],
                vec![Bond::new(0, 1, 1)],
            )
            .unwrap(),
        );
        let mut set = MoleculeSet::new(molecules);
        set.classify_set_from_parameters(&params, false, false);
        set.fulfill_requirements(&[Requirement::DistanceTree, Requirement::BondInfo]);

        let calculator = Calculator::from_name("eem")
            .unwrap()
            .with_parameters(&params)
            .unwrap();
        let result = calculator.calculate_set(&set);
        assert_eq!(result.charges.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, "hcl");
        assert!(matches!(
            result.failures[0].1,
            ChargeError::Unclassified { count: 1, .. }
        ));
    }

    #[test]
    fn options_are_validated() {
        let calculator = Calculator::from_name("qeq").unwrap();
        assert!(calculator.with_option("overlap_term", "Ohno").is_ok());
        let calculator = Calculator::from_name("qeq").unwrap();
        assert!(matches!(
            calculator.with_option("iters", "3"),
            Err(ChargeError::UnknownOption { .. })
        ));
    }
}
