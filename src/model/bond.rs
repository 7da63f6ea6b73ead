use super::atom::Atom;
use crate::math::geometry;

/// A bond between two atoms of the same molecule.
///
/// Endpoints are stored as atom indices into the owning molecule, never as copies, so a
/// bond stays valid however the molecule is moved or cloned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    first: usize,
    second: usize,
    order: u8,
    pub(crate) bond_type: Option<usize>,
}

impl Bond {
    /// Creates a bond between atoms `first` and `second`.
    ///
    /// Aromatic bonds are expected to arrive normalized to order 1.
    pub fn new(first: usize, second: usize, order: u8) -> Self {
        Self {
            first,
            second,
            order,
            bond_type: None,
        }
    }

    /// Index of the first endpoint.
    #[inline]
    pub fn first(&self) -> usize {
        self.first
    }

    /// Index of the second endpoint.
    #[inline]
    pub fn second(&self) -> usize {
        self.second
    }

    /// Bond order, 1 to 3.
    #[inline]
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Index into the owning set's bond-type registry, if classified.
    #[inline]
    pub fn bond_type(&self) -> Option<usize> {
        self.bond_type
    }

    /// Returns `true` if `atom` is one of the two endpoints.
    #[inline]
    pub fn has_atom(&self, atom: usize) -> bool {
        self.first == atom || self.second == atom
    }

    /// Returns the endpoint opposite to `atom`, or `None` if `atom` is not an endpoint.
    pub fn partner(&self, atom: usize) -> Option<usize> {
        if self.first == atom {
            Some(self.second)
        } else if self.second == atom {
            Some(self.first)
        } else {
            None
        }
    }

    /// Centre of the bond.
    ///
    /// With `weighted` set, the centre is shifted toward the larger atom by weighting each
    /// endpoint with its covalent radius; otherwise it is the plain midpoint. `atoms` must be
    /// the atom list of the owning molecule.
    pub fn center(&self, atoms: &[Atom], weighted: bool) -> [f64; 3] {
        let a = &atoms[self.first];
        let b = &atoms[self.second];
        if weighted {
            geometry::weighted_midpoint(
                a.position(),
                a.element().covalent_radius,
                b.position(),
                b.element().covalent_radius,
            )
        } else {
            geometry::midpoint(a.position(), b.position())
        }
    }

    /// Bond length in angstroms.
    pub fn length(&self, atoms: &[Atom]) -> f64 {
        atoms[self.first].distance_to(&atoms[self.second])
    }
}
