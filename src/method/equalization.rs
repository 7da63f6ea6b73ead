//! Shared solver for the electronegativity equalization family.
//!
//! Each equalization method only describes its system for an arbitrary subset of atoms
//! ([`EqualizationModel::solve_fragment`]); this module decides which subsets to solve.
//! `full` solves the whole molecule at once. `cutoff` solves one fragment per atom,
//! consisting of every atom within a radius, and keeps the centre atom's charge. `cover`
//! solves fragments only around a dominating set of pivot atoms and averages the results over
//! their bonded neighbourhoods. Both approximate strategies finish by spreading the residual
//! total charge uniformly.

use super::options::{OptionKind, OptionSpec};
use super::Context;
use crate::error::ChargeError;
use crate::math::linalg;
use crate::model::{Molecule, Requirement};
use faer::{Col, Mat};
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Above this many atoms a `full` request is downgraded to `cutoff`.
pub const CUTOFF_THRESHOLD_ATOMS: usize = 20_000;

/// Above this many atoms a `full` request is downgraded to `cover`.
pub const COVER_THRESHOLD_ATOMS: usize = 100_000;

/// Atoms within this many bonds of a pivot take a share of its fragment solution.
const COVER_BOND_DEPTH: u32 = 2;

/// How an equalization system is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Full,
    Cutoff,
    Cover,
}

impl Strategy {
    /// The strategy name accepted by the `type` option.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Full => "full",
            Strategy::Cutoff => "cutoff",
            Strategy::Cover => "cover",
        }
    }

    /// The strategy actually used for a molecule of `atom_count` atoms.
    pub fn effective(self, atom_count: usize) -> Strategy {
        match self {
            Strategy::Full if atom_count > COVER_THRESHOLD_ATOMS => Strategy::Cover,
            Strategy::Full if atom_count > CUTOFF_THRESHOLD_ATOMS => Strategy::Cutoff,
            other => other,
        }
    }
}

impl FromStr for Strategy {
    type Err = ChargeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Strategy::Full),
            "cutoff" => Ok(Strategy::Cutoff),
            "cover" => Ok(Strategy::Cover),
            other => Err(ChargeError::InvalidOptionValue {
                option: "type".to_string(),
                value: other.to_string(),
                reason: "allowed values are full, cutoff, cover".to_string(),
            }),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter vectors of one molecule, resolved once and shared by all fragment solves.
pub(crate) struct Bound<'a> {
    pub molecule: &'a Molecule,
    pub common: &'a [f64],
    pub atom: Vec<&'a [f64]>,
}

/// A method that can build and solve its equalization system for a subset of atoms.
pub(crate) trait EqualizationModel: Sync {
    /// Charges of `atoms` (indices into the molecule) summing to `total_charge`, in the order
    /// of `atoms`.
    fn solve_fragment(
        &self,
        bound: &Bound<'_>,
        atoms: &[usize],
        total_charge: f64,
    ) -> Result<Vec<f64>, ChargeError>;
}

/// Options every equalization method accepts, followed by its own.
pub(crate) fn options_with(extra: &[OptionSpec]) -> Vec<OptionSpec> {
    let mut options = vec![
        OptionSpec {
            name: "type",
            description: "Type of a solver",
            kind: OptionKind::Str,
            default: "full",
            choices: &["full", "cutoff", "cover"],
        },
        OptionSpec {
            name: "radius",
            description: "Radius for cutoff",
            kind: OptionKind::Double,
            default: "12",
            choices: &[],
        },
    ];
    options.extend_from_slice(extra);
    options
}

pub(crate) fn requirements() -> Vec<Requirement> {
    vec![Requirement::DistanceTree, Requirement::BondInfo]
}

/// Solves `model` on `molecule` with the strategy selected in `ctx`.
pub(crate) fn solve<M: EqualizationModel>(
    model: &M,
    ctx: &Context<'_>,
    molecule: &Molecule,
) -> Result<Vec<f64>, ChargeError> {
    let bound = Bound {
        molecule,
        common: ctx.common()?,
        atom: ctx.atom_parameters(molecule)?,
    };
    let requested: Strategy = ctx.option_str("type")?.parse()?;
    let radius = ctx.option_f64("radius")?;
    let n = molecule.len();
    let total = molecule.total_charge() as f64;

    let strategy = requested.effective(n);
    if strategy != requested {
        warn!(
            molecule = molecule.name(),
            atoms = n,
            from = %requested,
            to = %strategy,
            "Molecule too large for a full equalization solve, switching strategy"
        );
    }

    match strategy {
        Strategy::Full => {
            let atoms: Vec<usize> = (0..n).collect();
            model.solve_fragment(&bound, &atoms, total)
        }
        Strategy::Cutoff => solve_cutoff(model, &bound, radius, total),
        Strategy::Cover => solve_cover(model, &bound, radius, total),
    }
}

fn fragment_charge(total: f64, fragment: usize, n: usize) -> f64 {
    total * fragment as f64 / n as f64
}

fn solve_cutoff<M: EqualizationModel>(
    model: &M,
    bound: &Bound<'_>,
    radius: f64,
    total: f64,
) -> Result<Vec<f64>, ChargeError> {
    let molecule = bound.molecule;
    let n = molecule.len();

    let mut charges = (0..n)
        .into_par_iter()
        .map(|i| centre_charge(model, bound, i, radius, total))
        .collect::<Result<Vec<f64>, ChargeError>>()?;

    redistribute_residual(&mut charges, total);
    Ok(charges)
}

/// Charge of atom `centre` from the fragment of all atoms within `radius` of it.
fn centre_charge<M: EqualizationModel>(
    model: &M,
    bound: &Bound<'_>,
    centre: usize,
    radius: f64,
    total: f64,
) -> Result<f64, ChargeError> {
    let molecule = bound.molecule;
    let fragment = molecule.close_atoms(centre, radius);
    let q = model.solve_fragment(
        bound,
        &fragment,
        fragment_charge(total, fragment.len(), molecule.len()),
    )?;
    Ok(q[0])
}

fn solve_cover<M: EqualizationModel>(
    model: &M,
    bound: &Bound<'_>,
    radius: f64,
    total: f64,
) -> Result<Vec<f64>, ChargeError> {
    let molecule = bound.molecule;
    let n = molecule.len();
    let pivots = select_pivots(molecule);
    debug!(molecule = molecule.name(), pivots = pivots.len(), "Selected cover pivots");

    let contributions = pivots
        .par_iter()
        .map(|&pivot| {
            let fragment = molecule.close_atoms(pivot, radius);
            let q = model.solve_fragment(
                bound,
                &fragment,
                fragment_charge(total, fragment.len(), n),
            )?;
            let shares: Vec<(usize, f64)> = molecule
                .atoms_within_bonds(pivot, COVER_BOND_DEPTH)
                .into_iter()
                .filter_map(|atom| {
                    fragment
                        .iter()
                        .position(|&f| f == atom)
                        .map(|position| (atom, q[position]))
                })
                .collect();
            Ok(shares)
        })
        .collect::<Result<Vec<_>, ChargeError>>()?;

    let mut sums = vec![0.0; n];
    let mut counts = vec![0u32; n];
    for (atom, q) in contributions.into_iter().flatten() {
        sums[atom] += q;
        counts[atom] += 1;
    }

    let mut charges = (0..n)
        .into_par_iter()
        .map(|i| match counts[i] {
            0 => centre_charge(model, bound, i, radius, total),
            c => Ok(sums[i] / c as f64),
        })
        .collect::<Result<Vec<f64>, ChargeError>>()?;

    redistribute_residual(&mut charges, total);
    Ok(charges)
}

/// Greedy independent dominating set over the bond graph, most highly bonded atoms first.
///
/// Ties are broken by atom index, so the selection is deterministic.
pub(crate) fn select_pivots(molecule: &Molecule) -> Vec<usize> {
    let n = molecule.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(molecule.degree(i)));

    let mut available = vec![true; n];
    let mut pivots = Vec::new();
    for atom in order {
        if !available[atom] {
            continue;
        }
        pivots.push(atom);
        available[atom] = false;
        for &(neighbor, _) in molecule.neighbors(atom) {
            available[neighbor] = false;
        }
    }
    pivots
}

/// Shifts every charge by the same amount so that they sum to `total`.
pub(crate) fn redistribute_residual(charges: &mut [f64], total: f64) {
    if charges.is_empty() {
        return;
    }
    let residual = total - charges.iter().sum::<f64>();
    let shift = residual / charges.len() as f64;
    for q in charges.iter_mut() {
        *q += shift;
    }
}

/// A dense `(n + 1) × (n + 1)` equalization system with the total-charge constraint in the
/// last row and column.
pub(crate) struct EqualizationSystem {
    n: usize,
    matrix: Mat<f64>,
    rhs: Col<f64>,
}

impl EqualizationSystem {
    pub fn new(n: usize, total_charge: f64) -> Self {
        let mut matrix = Mat::zeros(n + 1, n + 1);
        for k in 0..n {
            matrix[(n, k)] = 1.0;
            matrix[(k, n)] = 1.0;
        }
        let mut rhs = Col::zeros(n + 1);
        rhs[n] = total_charge;
        Self { n, matrix, rhs }
    }

    /// Builds the system for `atoms` from a self term `(diagonal, rhs)` per atom and a
    /// symmetric pair term, both given molecule atom indices.
    pub fn assemble(
        atoms: &[usize],
        total_charge: f64,
        self_term: impl Fn(usize) -> (f64, f64),
        pair_term: impl Fn(usize, usize) -> f64,
    ) -> Self {
        let mut system = Self::new(atoms.len(), total_charge);
        for (i, &a) in atoms.iter().enumerate() {
            let (diagonal, rhs) = self_term(a);
            system.matrix[(i, i)] = diagonal;
            system.rhs[i] = rhs;
            for (j, &b) in atoms.iter().enumerate().skip(i + 1) {
                let value = pair_term(a, b);
                system.matrix[(i, j)] = value;
                system.matrix[(j, i)] = value;
            }
        }
        system
    }

    /// Solves the system and returns the atomic charges without the multiplier.
    pub fn solve(&self) -> Result<Vec<f64>, ChargeError> {
        let mut solution = linalg::solve_dense(&self.matrix, &self.rhs)?;
        solution.truncate(self.n);
        Ok(solution)
    }
}
