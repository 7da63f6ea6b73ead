//! Iterative charge propagation along bonds.
//!
//! All three methods start from neutral atoms. Each iteration `α = 1, 2, …, iters − 1`
//! recomputes every atom's electronegativity from its current charge and then, bond by bond,
//! moves `damping^α · (χ_high − χ_low) / d` from the more to the less electronegative atom.
//! Charge only moves between bonded atoms, so the sum of charges stays zero.

use super::{Context, Method, MethodKind, MethodMetadata, OptionKind, OptionSpec, Signature};
use crate::error::ChargeError;
use crate::model::Molecule;

static PEOE_METADATA: MethodMetadata = MethodMetadata {
    name: "peoe",
    full_name: "Partial Equalization of Atomic Electronegativity",
    publication: Some("10.1016/0040-4020(80)80168-2"),
    kind: MethodKind::TwoD,
    priority: 120,
};

static MPEOE_METADATA: MethodMetadata = MethodMetadata {
    name: "mpeoe",
    full_name: "Modified Partial Equalization of Orbital Electronegativity",
    publication: None,
    kind: MethodKind::TwoD,
    priority: 110,
};

static GDAC_METADATA: MethodMetadata = MethodMetadata {
    name: "gdac",
    full_name: "Geometry-Dependent Atomic Charge",
    publication: None,
    kind: MethodKind::ThreeD,
    priority: 100,
};

/// Damping factor of PEOE, raised to the iteration index.
const PEOE_DAMPING: f64 = 0.5;

fn iteration_options() -> Vec<OptionSpec> {
    vec![OptionSpec {
        name: "iters",
        description: "Number of iterations",
        kind: OptionKind::Int,
        default: "7",
        choices: &[],
    }]
}

/// Runs the propagation loop.
///
/// `electronegativity(atom, q)` gives the instantaneous electronegativity of an atom carrying
/// charge `q`; `step(bond, low, high, alpha)` gives the factor `damping^α / d` for a bond
/// whose less electronegative end is `low`.
fn propagate(
    molecule: &Molecule,
    iters: i64,
    electronegativity: impl Fn(usize, f64) -> f64,
    step: impl Fn(usize, usize, usize, i32) -> f64,
) -> Vec<f64> {
    let n = molecule.len();
    let mut q = vec![0.0; n];
    let mut chi = vec![0.0; n];

    for alpha in 1..iters.max(1) {
        let alpha = alpha as i32;
        for (i, chi_i) in chi.iter_mut().enumerate() {
            *chi_i = electronegativity(i, q[i]);
        }
        for (b, bond) in molecule.bonds().iter().enumerate() {
            let (mut low, mut high) = (bond.first(), bond.second());
            if chi[low] > chi[high] {
                std::mem::swap(&mut low, &mut high);
            }
            let diff = step(b, low, high, alpha) * (chi[high] - chi[low]);
            q[low] += diff;
            q[high] -= diff;
        }
    }
    q
}

/// Gasteiger-Marsili PEOE with a quadratic electronegativity `χ = C q² + B q + A`.
///
/// The denominator is `A + B + C` of the less electronegative atom, or the common `dampH`
/// when that atom is hydrogen.
pub struct Peoe;

impl Method for Peoe {
    fn metadata(&self) -> &'static MethodMetadata {
        &PEOE_METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &["dampH"],
            atom: &["A", "B", "C"],
            bond: &[],
        }
    }

    fn options(&self) -> Vec<OptionSpec> {
        iteration_options()
    }

    fn calculate_charges(
        &self,
        ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        let damp_h = ctx.common()?[0];
        let p = ctx.atom_parameters(molecule)?;
        let iters = ctx.option_i64("iters")?;

        Ok(propagate(
            molecule,
            iters,
            |i, q| p[i][2] * q * q + p[i][1] * q + p[i][0],
            |_, low, _, alpha| {
                let d = if molecule.atom(low).element().is_hydrogen() {
                    damp_h
                } else {
                    p[low][0] + p[low][1] + p[low][2]
                };
                PEOE_DAMPING.powi(alpha) / d
            },
        ))
    }
}

/// Modified PEOE with a linear electronegativity and a per-bond damping factor `f`.
pub struct Mpeoe;

impl Method for Mpeoe {
    fn metadata(&self) -> &'static MethodMetadata {
        &MPEOE_METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &["Hplus"],
            atom: &["A", "B"],
            bond: &["f"],
        }
    }

    fn options(&self) -> Vec<OptionSpec> {
        iteration_options()
    }

    fn calculate_charges(
        &self,
        ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        let h_plus = ctx.common()?[0];
        let p = ctx.atom_parameters(molecule)?;
        let f = ctx.bond_parameters(molecule)?;
        let iters = ctx.option_i64("iters")?;

        Ok(propagate(
            molecule,
            iters,
            |i, q| p[i][1] * q + p[i][0],
            |b, low, _, alpha| {
                let d = if molecule.atom(low).element().is_hydrogen() {
                    h_plus
                } else {
                    p[low][0] + p[low][1]
                };
                f[b][0].powi(alpha) / d
            },
        ))
    }
}

/// Propagation damped by bond geometry: `f = 1 − R / (r_vdW,i + r_vdW,j)`.
pub struct Gdac;

impl Method for Gdac {
    fn metadata(&self) -> &'static MethodMetadata {
        &GDAC_METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &[],
            atom: &["A", "B"],
            bond: &[],
        }
    }

    fn options(&self) -> Vec<OptionSpec> {
        iteration_options()
    }

    fn calculate_charges(
        &self,
        ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        let p = ctx.atom_parameters(molecule)?;
        let iters = ctx.option_i64("iters")?;

        Ok(propagate(
            molecule,
            iters,
            |i, q| p[i][1] * q + p[i][0],
            |_, low, high, alpha| {
                let vdw = molecule.atom(low).element().vdw_radius
                    + molecule.atom(high).element().vdw_radius;
                let f = 1.0 - molecule.distance(low, high) / vdw;
                f.powi(alpha) / (p[low][0] + p[low][1])
            },
        ))
    }
}
