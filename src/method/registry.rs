use super::Method;
use super::abeem::Abeem;
use super::calculator::LARGE_MOLECULE_ATOMS;
use super::charge2::Charge2;
use super::delre::DelRe;
use super::denr::Denr;
use super::eem::Eem;
use super::eqeq::Eqeq;
use super::kcm::Kcm;
use super::mgc::Mgc;
use super::propagation::{Gdac, Mpeoe, Peoe};
use super::qeq::Qeq;
use super::sfkeem::Sfkeem;
use super::smpqeq::SmpQeq;
use super::sqe::{Sqe, SqeQp};
use super::trivial::{Dummy, Formal};
use super::tsef::Tsef;
use super::veem::Veem;
use crate::error::ChargeError;
use crate::model::MoleculeSet;
use crate::params::Parameters;
use tracing::debug;

fn all_methods() -> Vec<Box<dyn Method>> {
    vec![
        Box::new(Eem),
        Box::new(Abeem),
        Box::new(Sfkeem),
        Box::new(Qeq),
        Box::new(SmpQeq),
        Box::new(Eqeq),
        Box::new(DelRe),
        Box::new(Peoe),
        Box::new(Mpeoe),
        Box::new(Gdac),
        Box::new(Sqe),
        Box::new(SqeQp),
        Box::new(Mgc),
        Box::new(Kcm),
        Box::new(Denr),
        Box::new(Charge2),
        Box::new(Tsef),
        Box::new(Veem),
        Box::new(Formal),
        Box::new(Dummy),
    ]
}

/// Looks up a method by its internal name.
///
/// # Errors
///
/// Returns [`ChargeError::UnknownMethod`] if no method has that name.
///
/// # Examples
///
/// ```
/// let method = eqcharge::load_method("qeq").unwrap();
/// assert_eq!(method.name(), "qeq");
/// assert!(eqcharge::load_method("hf").is_err());
/// ```
pub fn load_method(name: &str) -> Result<Box<dyn Method>, ChargeError> {
    all_methods()
        .into_iter()
        .find(|method| method.name() == name)
        .ok_or_else(|| ChargeError::UnknownMethod(name.to_string()))
}

/// Every registered method, highest priority first.
pub fn available_methods() -> Vec<Box<dyn Method>> {
    let mut methods = all_methods();
    methods.sort_by_key(|method| std::cmp::Reverse(method.metadata().priority));
    methods
}

/// A method that can process a whole molecule set, with the parameter sets that cover it.
pub struct Candidate<'p> {
    /// The suitable method.
    pub method: Box<dyn Method>,
    /// Usable parameter sets in the order they were supplied. Empty for parameter-free
    /// methods.
    pub parameters: Vec<&'p Parameters>,
}

/// Parameter sets among `candidates` that were fitted for `method`, match its signature and
/// classify every atom and bond of `set`.
fn valid_parameters<'p>(
    set: &mut MoleculeSet,
    method: &dyn Method,
    candidates: &'p [Parameters],
    permissive: bool,
) -> Vec<&'p Parameters> {
    let signature = method.signature();
    candidates
        .iter()
        .filter(|p| p.metadata().method == method.name())
        .filter(|p| signature.check(method.name(), p).is_ok())
        .filter(|p| set.classify_set_from_parameters(p, false, permissive) == 0)
        .collect()
}

/// Lists every method able to calculate charges for all molecules of `set`, highest
/// priority first.
///
/// A method qualifies when it accepts every molecule, respects the large-molecule limit and,
/// if it reads parameters, at least one set in `candidates` classifies the whole of `set`.
///
/// # Arguments
///
/// * `set` - The molecules to cover. Classification is rerun for every candidate, so the
///   set must be prepared again before calculating.
/// * `candidates` - Parameter sets to choose from.
/// * `permissive` - Whether classification may fall back to relaxed type matching.
pub fn suitable_methods<'p>(
    set: &mut MoleculeSet,
    candidates: &'p [Parameters],
    permissive: bool,
) -> Vec<Candidate<'p>> {
    let mut results = Vec::new();
    for method in available_methods() {
        let suitable = set.molecules().iter().all(|molecule| {
            method.is_suitable_for_molecule(molecule)
                && (molecule.len() <= LARGE_MOLECULE_ATOMS
                    || method.is_suitable_for_large_molecule())
        });
        if !suitable {
            continue;
        }

        if method.signature().is_empty() {
            results.push(Candidate {
                method,
                parameters: Vec::new(),
            });
            continue;
        }

        let parameters = valid_parameters(set, method.as_ref(), candidates, permissive);
        if !parameters.is_empty() {
            debug!(method = method.name(), sets = parameters.len(), "Method is suitable");
            results.push(Candidate { method, parameters });
        }
    }
    results
}

/// The first parameter set in `candidates` that covers every molecule of `set` for
/// `method`, or `None` if there is none.
///
/// # Errors
///
/// Returns [`ChargeError::ParameterFreeMethod`] if `method` reads no parameters.
pub fn best_parameters<'p>(
    set: &mut MoleculeSet,
    method: &dyn Method,
    candidates: &'p [Parameters],
    permissive: bool,
) -> Result<Option<&'p Parameters>, ChargeError> {
    if method.signature().is_empty() {
        return Err(ChargeError::ParameterFreeMethod(method.name().to_string()));
    }
    Ok(valid_parameters(set, method, candidates, permissive)
        .into_iter()
        .next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_loadable() {
        let methods = available_methods();
        let names: HashSet<&str> = methods.iter().map(|m| m.name()).collect();
        assert_eq!(names.len(), methods.len());
        for name in names {
            assert_eq!(load_method(name).unwrap().name(), name);
        }
    }

    #[test]
    fn listed_by_descending_priority() {
        let priorities: Vec<u32> = available_methods()
            .iter()
            .map(|m| m.metadata().priority)
            .collect();
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(available_methods()[0].name(), "eem");
    }

    #[test]
    fn declared_option_defaults_are_valid() {
        for method in available_methods() {
            for spec in method.options() {
                spec.validate(spec.default).unwrap();
            }
        }
    }
}
