use crate::element::Element;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one molecule object, used to scope atom equality.
///
/// Every [`Molecule`](super::Molecule) receives a fresh id at construction; clones keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoleculeId(u64);

impl MoleculeId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// One atom of a molecule.
///
/// `index` is the atom's position in its molecule's atom list and never changes after the
/// molecule is built. Two atoms compare equal only when they occupy the same position in the
/// same molecule object; element, coordinates and type play no part in equality.
#[derive(Debug, Clone)]
pub struct Atom {
    pub(crate) index: usize,
    pub(crate) molecule: MoleculeId,
    element: &'static Element,
    position: [f64; 3],
    formal_charge: i32,
    name: String,
    residue: String,
    residue_id: i32,
    chain_id: String,
    hetatm: bool,
    pub(crate) atom_type: Option<usize>,
}

impl Atom {
    /// Creates an atom detached from any molecule. [`Molecule::new`](super::Molecule::new)
    /// assigns its index and owner.
    pub fn new(element: &'static Element, position: [f64; 3]) -> Self {
        Self {
            index: 0,
            molecule: MoleculeId(u64::MAX),
            element,
            position,
            formal_charge: 0,
            name: element.symbol.clone(),
            residue: String::from("UNL"),
            residue_id: 0,
            chain_id: String::new(),
            hetatm: true,
            atom_type: None,
        }
    }

    /// Sets the formal charge. Readers call this once after parsing charge records.
    pub fn with_formal_charge(mut self, charge: i32) -> Self {
        self.formal_charge = charge;
        self
    }

    /// Attaches residue-level metadata as found in macromolecular formats.
    pub fn with_residue(
        mut self,
        name: impl Into<String>,
        residue: impl Into<String>,
        residue_id: i32,
        chain_id: impl Into<String>,
        hetatm: bool,
    ) -> Self {
        self.name = name.into();
        self.residue = residue.into();
        self.residue_id = residue_id;
        self.chain_id = chain_id.into();
        self.hetatm = hetatm;
        self
    }

    /// Overwrites the formal charge, for formats that list charges after the atom block.
    pub fn set_formal_charge(&mut self, charge: i32) {
        self.formal_charge = charge;
    }

    /// Position of the atom in its molecule.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The atom's element.
    #[inline]
    pub fn element(&self) -> &'static Element {
        self.element
    }

    /// Cartesian coordinates in angstroms.
    #[inline]
    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    /// Formal charge as read from the input.
    #[inline]
    pub fn formal_charge(&self) -> i32 {
        self.formal_charge
    }

    /// Atom name; the element symbol unless residue data says otherwise.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Residue name, `UNL` for small molecules.
    pub fn residue(&self) -> &str {
        &self.residue
    }

    /// Residue sequence number.
    pub fn residue_id(&self) -> i32 {
        self.residue_id
    }

    /// Chain identifier, empty when unknown.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Returns `true` for atoms outside standard residues.
    pub fn is_hetatm(&self) -> bool {
        self.hetatm
    }

    /// Index into the owning set's atom-type registry, or `None` before classification or
    /// when no type matched.
    #[inline]
    pub fn atom_type(&self) -> Option<usize> {
        self.atom_type
    }

    /// Euclidean distance to another atom in angstroms.
    #[inline]
    pub fn distance_to(&self, other: &Atom) -> f64 {
        crate::math::geometry::distance(self.position, other.position)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.molecule == other.molecule
    }
}

impl Eq for Atom {}

impl std::hash::Hash for Atom {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.molecule.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::periodic_table;

    #[test]
    fn new_atoms_default_to_an_unnamed_ligand() {
        let atom = Atom::new(periodic_table().by_symbol("N").unwrap(), [0.0; 3]);
        assert_eq!(atom.name(), "N");
        assert_eq!(atom.residue(), "UNL");
        assert_eq!(atom.residue_id(), 0);
        assert!(atom.is_hetatm());
        assert_eq!(atom.atom_type(), None);
    }

    #[test]
    fn residue_metadata_is_attached() {
        let atom = Atom::new(periodic_table().by_symbol("C").unwrap(), [1.0, 2.0, 3.0])
            .with_residue("CA", "GLY", 12, "A", false)
            .with_formal_charge(0);
        assert_eq!(atom.name(), "CA");
        assert_eq!(atom.residue(), "GLY");
        assert_eq!(atom.residue_id(), 12);
        assert_eq!(atom.chain_id(), "A");
        assert!(!atom.is_hetatm());
        assert_eq!(atom.position(), [1.0, 2.0, 3.0]);
    }
}
