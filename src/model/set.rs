use super::{Molecule, Requirement};
use crate::classify::{AtomScheme, AtomTypeKey, BondScheme, BondTypeKey};
use crate::params::Parameters;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// An ordered collection of molecules sharing one atom-type and one bond-type registry.
///
/// Type indices stored on atoms and bonds point into these registries, so they are only
/// meaningful together with the classification pass that produced them. Every
/// classification call replaces the affected registry.
#[derive(Debug, Default)]
pub struct MoleculeSet {
    molecules: Vec<Molecule>,
    atom_types: Vec<AtomTypeKey>,
    bond_types: Vec<BondTypeKey>,
}

/// Summary counts of a classified set.
#[derive(Debug, Clone, PartialEq)]
pub struct SetStats {
    /// Number of molecules.
    pub molecules: usize,
    /// Number of atoms over all molecules.
    pub atoms: usize,
    /// Atom count per registry entry, in registry order.
    pub atom_type_counts: Vec<(AtomTypeKey, usize)>,
    /// Atoms without a type.
    pub unclassified_atoms: usize,
}

impl MoleculeSet {
    /// Creates an unclassified set.
    pub fn new(molecules: Vec<Molecule>) -> Self {
        Self {
            molecules,
            atom_types: Vec::new(),
            bond_types: Vec::new(),
        }
    }

    /// The molecules, in input order minus any removed.
    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    /// Number of molecules.
    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    /// The atom-type registry; atom type indices point into it.
    pub fn atom_types(&self) -> &[AtomTypeKey] {
        &self.atom_types
    }

    /// The bond-type registry; bond type indices point into it.
    pub fn bond_types(&self) -> &[BondTypeKey] {
        &self.bond_types
    }

    /// Consumes the set and returns its molecules.
    pub fn into_molecules(self) -> Vec<Molecule> {
        self.molecules
    }

    /// Rebuilds the atom-type registry from the structures themselves.
    ///
    /// Every atom receives the key derived under `scheme`; identical keys share one registry
    /// slot in first-seen order.
    pub fn classify_atoms(&mut self, scheme: AtomScheme) {
        let mut registry: Vec<AtomTypeKey> = Vec::new();
        for molecule in &mut self.molecules {
            let keys: Vec<AtomTypeKey> = (0..molecule.len())
                .map(|i| AtomTypeKey::describe(molecule, i, scheme))
                .collect();
            for (atom, key) in molecule.atoms_mut().iter_mut().zip(keys) {
                atom.atom_type = Some(find_or_append(&mut registry, key));
            }
        }
        debug!(scheme = %scheme, types = registry.len(), "Classified atoms");
        self.atom_types = registry;
    }

    /// Rebuilds the bond-type registry from the structures themselves.
    pub fn classify_bonds(&mut self, scheme: BondScheme) {
        let mut registry: Vec<BondTypeKey> = Vec::new();
        for molecule in &mut self.molecules {
            let keys: Vec<BondTypeKey> = molecule
                .bonds()
                .iter()
                .map(|bond| BondTypeKey::describe(molecule, bond, scheme))
                .collect();
            for (bond, key) in molecule.bonds_mut().iter_mut().zip(keys) {
                bond.bond_type = Some(find_or_append(&mut registry, key));
            }
        }
        debug!(scheme = %scheme, types = registry.len(), "Classified bonds");
        self.bond_types = registry;
    }

    /// Assigns every atom and bond the first matching type key of `parameters`.
    ///
    /// The registries are replaced by the parameter keys, so a type index equals the position
    /// of its value vector in the parameter block. When an atom or bond matches no key and
    /// `permissive` is set, a second scan uses the relaxed matching rules of
    /// [`classify`](crate::classify). A block absent from `parameters` clears the matching
    /// registry and leaves those atoms or bonds untyped.
    ///
    /// Returns the number of molecules that contain at least one unclassified atom or bond.
    /// With `remove_unclassified`, those molecules are dropped from the set.
    #[instrument(skip_all, fields(parameters = parameters.name(), molecules = self.molecules.len()))]
    pub fn classify_set_from_parameters(
        &mut self,
        parameters: &Parameters,
        remove_unclassified: bool,
        permissive: bool,
    ) -> usize {
        let mut unclassified = BTreeSet::new();

        self.atom_types = parameters
            .atom()
            .map(|block| block.keys().to_vec())
            .unwrap_or_default();
        self.bond_types = parameters
            .bond()
            .map(|block| block.keys().to_vec())
            .unwrap_or_default();

        for (m, molecule) in self.molecules.iter_mut().enumerate() {
            let atom_types: Vec<Option<usize>> = if parameters.atom().is_some() {
                (0..molecule.len())
                    .map(|i| {
                        first_match(&self.atom_types, permissive, |key, relaxed| {
                            key.matches(molecule, i, relaxed)
                        })
                    })
                    .collect()
            } else {
                vec![None; molecule.len()]
            };
            let bond_types: Vec<Option<usize>> = if parameters.bond().is_some() {
                molecule
                    .bonds()
                    .iter()
                    .map(|bond| {
                        first_match(&self.bond_types, permissive, |key, relaxed| {
                            key.matches(molecule, bond, relaxed)
                        })
                    })
                    .collect()
            } else {
                vec![None; molecule.bonds().len()]
            };

            let missing = (parameters.atom().is_some() && atom_types.iter().any(Option::is_none))
                || (parameters.bond().is_some() && bond_types.iter().any(Option::is_none));
            if missing {
                unclassified.insert(m);
            }

            for (atom, t) in molecule.atoms_mut().iter_mut().zip(atom_types) {
                atom.atom_type = t;
            }
            for (bond, t) in molecule.bonds_mut().iter_mut().zip(bond_types) {
                bond.bond_type = t;
            }
        }

        let count = unclassified.len();
        if count > 0 {
            if remove_unclassified {
                for &m in unclassified.iter().rev() {
                    let removed = self.molecules.remove(m);
                    warn!(molecule = removed.name(), "Removed molecule with unclassified atoms or bonds");
                }
            } else {
                warn!(count, "Molecules with unclassified atoms or bonds remain in the set");
            }
        }
        info!(unclassified = count, remaining = self.molecules.len(), "Classified molecule set");
        count
    }

    /// Builds the derived structures named in `requirements` for every molecule, in parallel.
    #[instrument(skip_all, fields(requirements = ?requirements))]
    pub fn fulfill_requirements(&mut self, requirements: &[Requirement]) {
        self.molecules
            .par_iter_mut()
            .for_each(|molecule| molecule.fulfill(requirements));
    }

    /// Counts molecules, atoms and atoms per registered type.
    pub fn stats(&self) -> SetStats {
        let mut counts = vec![0usize; self.atom_types.len()];
        let mut unclassified_atoms = 0;
        let mut atoms = 0;
        for molecule in &self.molecules {
            for atom in molecule.atoms() {
                atoms += 1;
                match atom.atom_type() {
                    Some(t) if t < counts.len() => counts[t] += 1,
                    _ => unclassified_atoms += 1,
                }
            }
        }
        SetStats {
            molecules: self.molecules.len(),
            atoms,
            atom_type_counts: self.atom_types.iter().cloned().zip(counts).collect(),
            unclassified_atoms,
        }
    }
}

fn find_or_append<K: PartialEq>(registry: &mut Vec<K>, key: K) -> usize {
    match registry.iter().position(|k| *k == key) {
        Some(i) => i,
        None => {
            registry.push(key);
            registry.len() - 1
        }
    }
}

/// Index of the first key accepted by `matches`, trying strict matching before relaxed.
fn first_match<K>(
    registry: &[K],
    permissive: bool,
    matches: impl Fn(&K, bool) -> bool,
) -> Option<usize> {
    registry
        .iter()
        .position(|key| matches(key, false))
        .or_else(|| {
            permissive
                .then(|| registry.iter().position(|key| matches(key, true)))
                .flatten()
        })
}
