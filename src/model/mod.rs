//! Molecular data model: atoms, bonds, molecules and molecule sets.
//!
//! Bonds refer to atoms by index into the owning molecule. Derived structures (adjacency,
//! bond distances, spatial index) live on the [`Molecule`] that owns them and are built once
//! through [`MoleculeSet::fulfill_requirements`] before any method reads them.

mod atom;
mod bond;
mod matrix;
mod molecule;
mod set;

pub use atom::{Atom, MoleculeId};
pub use bond::Bond;
pub use matrix::SquareMatrix;
pub use molecule::Molecule;
pub use set::{MoleculeSet, SetStats};

use std::fmt;

/// A derived molecular structure a method needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// Per-atom adjacency lists with bond orders.
    BondInfo,
    /// All-pairs shortest bond-path lengths. Implies [`Requirement::BondInfo`].
    BondDistances,
    /// k-d tree over atom coordinates.
    DistanceTree,
}

impl Requirement {
    /// Feature name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Requirement::BondInfo => "BOND_INFO",
            Requirement::BondDistances => "BOND_DISTANCES",
            Requirement::DistanceTree => "DISTANCE_TREE",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
