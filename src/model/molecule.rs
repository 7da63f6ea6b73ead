use super::Requirement;
use super::atom::{Atom, MoleculeId};
use super::bond::Bond;
use super::matrix::SquareMatrix;
use crate::error::ChargeError;
use crate::math::geometry;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::OnceLock;

/// Marks unreachable pairs in the bond-distance table.
const UNREACHABLE: i32 = -1;

/// A molecule: atoms, bonds and the derived structures charge methods query.
///
/// Per-atom maximum bond order and bonded-element signature are computed at construction,
/// since classification needs them for every molecule. The adjacency lists (`BOND_INFO`),
/// the all-pairs bond-distance table (`BOND_DISTANCES`) and the k-d tree (`DISTANCE_TREE`)
/// are built on request through [`Molecule::fulfill`]. Querying a structure that was never
/// built is a contract violation and panics.
pub struct Molecule {
    id: MoleculeId,
    name: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    max_bond_orders: Vec<u8>,
    bonded_elements: Vec<String>,
    adjacency: Option<Vec<Vec<(usize, u8)>>>,
    bond_distances: Option<SquareMatrix<i32>>,
    distance_tree: OnceLock<ImmutableKdTree<f64, 3>>,
}

impl Molecule {
    /// Builds a molecule, assigning dense atom indices `0..n` in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`ChargeError::InvalidTopology`] if a bond references an atom outside the
    /// list, connects an atom to itself, has order zero, or duplicates another bond.
    pub fn new(
        name: impl Into<String>,
        mut atoms: Vec<Atom>,
        bonds: Vec<Bond>,
    ) -> Result<Self, ChargeError> {
        let name = name.into();
        let n = atoms.len();
        let id = MoleculeId::next();

        let mut seen = HashSet::with_capacity(bonds.len());
        for bond in &bonds {
            let (a, b) = (bond.first(), bond.second());
            if a >= n || b >= n {
                return Err(ChargeError::InvalidTopology(format!(
                    "bond {a}-{b} in '{name}' references an atom outside 0..{n}"
                )));
            }
            if a == b {
                return Err(ChargeError::InvalidTopology(format!(
                    "atom {a} in '{name}' is bonded to itself"
                )));
            }
            if bond.order() == 0 {
                return Err(ChargeError::InvalidTopology(format!(
                    "bond {a}-{b} in '{name}' has order 0"
                )));
            }
            if !seen.insert((a.min(b), a.max(b))) {
                return Err(ChargeError::InvalidTopology(format!(
                    "bond {a}-{b} in '{name}' is listed twice"
                )));
            }
        }

        for (index, atom) in atoms.iter_mut().enumerate() {
            atom.index = index;
            atom.molecule = id;
        }

        let mut max_bond_orders = vec![0u8; n];
        let mut neighbor_symbols: Vec<Vec<&str>> = vec![Vec::new(); n];
        for bond in &bonds {
            let (a, b) = (bond.first(), bond.second());
            max_bond_orders[a] = max_bond_orders[a].max(bond.order());
            max_bond_orders[b] = max_bond_orders[b].max(bond.order());
            neighbor_symbols[a].push(&atoms[b].element().symbol);
            neighbor_symbols[b].push(&atoms[a].element().symbol);
        }
        let bonded_elements = neighbor_symbols
            .into_iter()
            .map(|mut symbols| {
                symbols.sort_unstable();
                symbols.concat()
            })
            .collect();

        Ok(Self {
            id,
            name,
            atoms,
            bonds,
            max_bond_orders,
            bonded_elements,
            adjacency: None,
            bond_distances: None,
            distance_tree: OnceLock::new(),
        })
    }

    /// Identity of this molecule object.
    pub fn id(&self) -> MoleculeId {
        self.id
    }

    /// Molecule name as read from the input.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All atoms, in index order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// All bonds, in input order. Bond-type lookups use this order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub(crate) fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub(crate) fn bonds_mut(&mut self) -> &mut [Bond] {
        &mut self.bonds
    }

    /// Returns atom `index`, panicking if it is out of range.
    #[inline]
    pub fn atom(&self, index: usize) -> &Atom {
        &self.atoms[index]
    }

    /// Number of atoms.
    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Total molecular charge: the sum of formal charges.
    pub fn total_charge(&self) -> i32 {
        self.atoms.iter().map(Atom::formal_charge).sum()
    }

    /// Highest order among the bonds of `atom`, 0 for an isolated atom.
    #[inline]
    pub fn max_bond_order(&self, atom: usize) -> u8 {
        self.max_bond_orders[atom]
    }

    /// Sorted concatenation of the element symbols bonded to `atom`, e.g. `"CHH"`.
    #[inline]
    pub fn bonded_elements(&self, atom: usize) -> &str {
        &self.bonded_elements[atom]
    }

    /// Returns `true` once the derived structure behind `requirement` has been built.
    pub fn has_feature(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::BondInfo => self.adjacency.is_some(),
            Requirement::BondDistances => self.bond_distances.is_some(),
            Requirement::DistanceTree => self.atoms.is_empty() || self.distance_tree.get().is_some(),
        }
    }

    /// Builds the derived structures for every requirement in `requirements`.
    ///
    /// Bond distances imply bond info. Structures that already exist are kept.
    pub fn fulfill(&mut self, requirements: &[Requirement]) {
        for &requirement in requirements {
            match requirement {
                Requirement::BondInfo => self.build_bond_info(),
                Requirement::BondDistances => self.build_bond_distances(),
                Requirement::DistanceTree => {
                    if !self.atoms.is_empty() {
                        self.distance_tree();
                    }
                }
            }
        }
    }

    fn build_bond_info(&mut self) {
        if self.adjacency.is_some() {
            return;
        }
        let mut adjacency = vec![Vec::new(); self.atoms.len()];
        for bond in &self.bonds {
            adjacency[bond.first()].push((bond.second(), bond.order()));
            adjacency[bond.second()].push((bond.first(), bond.order()));
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }
        self.adjacency = Some(adjacency);
    }

    fn build_bond_distances(&mut self) {
        if self.bond_distances.is_some() {
            return;
        }
        self.build_bond_info();
        let n = self.atoms.len();
        let mut distances = SquareMatrix::filled(n, UNREACHABLE);
        let mut queue = VecDeque::new();
        for start in 0..n {
            let row = distances.row_mut(start);
            row[start] = 0;
            queue.clear();
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                let next_distance = row[current] + 1;
                for &(neighbor, _) in self.adjacency_of(current) {
                    if row[neighbor] == UNREACHABLE {
                        row[neighbor] = next_distance;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        self.bond_distances = Some(distances);
    }

    /// The immutable tree balances on construction, so planar input (every `z` equal, as in
    /// 2-D SDF records) is indexed without bucket overflow.
    fn distance_tree(&self) -> &ImmutableKdTree<f64, 3> {
        self.distance_tree.get_or_init(|| {
            let positions: Vec<[f64; 3]> = self.atoms.iter().map(Atom::position).collect();
            ImmutableKdTree::new_from_slice(&positions)
        })
    }

    fn adjacency_of(&self, atom: usize) -> &[(usize, u8)] {
        let adjacency = self
            .adjacency
            .as_ref()
            .unwrap_or_else(|| panic!("bond info of molecule '{}' was not built", self.name));
        &adjacency[atom]
    }

    fn bond_distance_table(&self) -> &SquareMatrix<i32> {
        self.bond_distances
            .as_ref()
            .unwrap_or_else(|| panic!("bond distances of molecule '{}' were not built", self.name))
    }

    /// Neighbors of `atom` with the order of the connecting bond, sorted by atom index.
    ///
    /// # Panics
    ///
    /// Panics if bond info has not been built.
    pub fn neighbors(&self, atom: usize) -> &[(usize, u8)] {
        self.adjacency_of(atom)
    }

    /// Returns `true` if atoms `i` and `j` share a bond. Requires bond info.
    pub fn bonded(&self, i: usize, j: usize) -> bool {
        self.adjacency_of(i).iter().any(|&(k, _)| k == j)
    }

    /// Order of the bond between `i` and `j`, or 0 if they are not bonded. Requires bond info.
    pub fn bond_order(&self, i: usize, j: usize) -> u8 {
        self.adjacency_of(i)
            .iter()
            .find(|&&(k, _)| k == j)
            .map_or(0, |&(_, order)| order)
    }

    /// Sum of the orders of all bonds of `atom`. Requires bond info.
    pub fn degree(&self, atom: usize) -> u32 {
        self.adjacency_of(atom)
            .iter()
            .map(|&(_, order)| order as u32)
            .sum()
    }

    /// Number of bonds between `i` and `j` on the shortest path, or `None` if the atoms are
    /// in disconnected fragments. Requires bond distances.
    pub fn bond_distance(&self, i: usize, j: usize) -> Option<u32> {
        let d = self.bond_distance_table()[(i, j)];
        (d != UNREACHABLE).then_some(d as u32)
    }

    /// All atoms exactly `k` bonds away from `atom`, in index order. Requires bond distances.
    pub fn k_bond_distance(&self, atom: usize, k: u32) -> Vec<usize> {
        let row = self.bond_distance_table().row(atom);
        row.iter()
            .enumerate()
            .filter(|&(_, &d)| d != UNREACHABLE && d as u32 == k)
            .map(|(j, _)| j)
            .collect()
    }

    /// All atoms at most `k` bonds away from `atom`, including `atom`, in index order.
    ///
    /// Runs a depth-limited breadth-first search, so it needs only bond info and stays cheap
    /// on large molecules.
    pub fn atoms_within_bonds(&self, atom: usize, k: u32) -> Vec<usize> {
        let mut depth = vec![None; self.atoms.len()];
        depth[atom] = Some(0u32);
        let mut found = vec![atom];
        let mut queue = VecDeque::from([atom]);
        while let Some(current) = queue.pop_front() {
            let d = depth[current].unwrap_or(0);
            if d == k {
                continue;
            }
            for &(neighbor, _) in self.adjacency_of(current) {
                if depth[neighbor].is_none() {
                    depth[neighbor] = Some(d + 1);
                    found.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        found.sort_unstable();
        found
    }

    /// All atoms within `radius` angstroms of `atom`.
    ///
    /// The k-d tree is built on first use if [`Requirement::DistanceTree`] was not fulfilled
    /// beforehand.
    ///
    /// # Arguments
    ///
    /// * `atom` - Index of the query atom.
    /// * `radius` - Search radius in angstroms; atoms exactly at the radius are included.
    ///
    /// # Returns
    ///
    /// The query atom first, then every other atom in range in index order.
    pub fn close_atoms(&self, atom: usize, radius: f64) -> Vec<usize> {
        let query = self.atoms[atom].position();
        let mut others: Vec<usize> = self
            .distance_tree()
            .within_unsorted::<SquaredEuclidean>(&query, radius * radius)
            .into_iter()
            .map(|neighbour| neighbour.item as usize)
            .filter(|&j| j != atom)
            .collect();
        others.sort_unstable();

        let mut result = Vec::with_capacity(others.len() + 1);
        result.push(atom);
        result.extend(others);
        result
    }

    /// Distance between atoms `i` and `j` in angstroms.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        geometry::distance(self.atoms[i].position(), self.atoms[j].position())
    }

    /// Distance from atom `atom` to the centre of bond `bond`.
    pub fn distance_to_bond(&self, atom: usize, bond: usize, weighted: bool) -> f64 {
        let center = self.bonds[bond].center(&self.atoms, weighted);
        geometry::distance(self.atoms[atom].position(), center)
    }

    /// Distance between the centres of bonds `a` and `b`.
    pub fn distance_between_bonds(&self, a: usize, b: usize, weighted: bool) -> f64 {
        geometry::distance(
            self.bonds[a].center(&self.atoms, weighted),
            self.bonds[b].center(&self.atoms, weighted),
        )
    }

    /// Number of atoms and bonds without an assigned type.
    pub fn unclassified_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.atom_type.is_none()).count()
            + self.bonds.iter().filter(|b| b.bond_type.is_none()).count()
    }
}

impl fmt::Debug for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Molecule")
            .field("name", &self.name)
            .field("atoms", &self.atoms.len())
            .field("bonds", &self.bonds.len())
            .field("bond_info", &self.adjacency.is_some())
            .field("bond_distances", &self.bond_distances.is_some())
            .field("distance_tree", &self.distance_tree.get().is_some())
            .finish()
    }
}
