use super::{Context, Method, MethodKind, MethodMetadata, Signature};
use crate::error::ChargeError;
use crate::model::{Molecule, Requirement};

static METADATA: MethodMetadata = MethodMetadata {
    name: "charge2",
    full_name: "Charge2",
    publication: None,
    kind: MethodKind::TwoD,
    priority: 45,
};

/// Number of sweeps over the atoms.
const SWEEPS: usize = 10;

/// Electronegativity of hydrogen, the reference for the two- and three-bond terms.
const HYDROGEN_ELECTRONEGATIVITY: f64 = 7.17;

/// Additive charges from electronegativity differences over one, two and three bonds.
///
/// An atom's charge is the sum of
///
/// - `(χ_j − χ_i) / a` over its bonded neighbours, with `a1` for two second-period atoms,
///   `a2` when either atom is hydrogen and `a3` otherwise;
/// - `(χ_j − χ_H) P_i / b` over the atoms two bonds away;
/// - `(χ_j − χ_H) P_i / (b c)` over the atoms three bonds away.
///
/// The polarisability `P_i = P0_i (1 + alpha (q0_i − q_i))` follows the charge, so the
/// sweeps update charges in place and later atoms see the earlier atoms' new values.
pub struct Charge2;

impl Method for Charge2 {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &["a1", "a2", "a3", "b", "c", "alpha"],
            atom: &["chi", "P0", "q0"],
            bond: &[],
        }
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::BondDistances]
    }

    fn is_suitable_for_large_molecule(&self) -> bool {
        false
    }

    fn calculate_charges(
        &self,
        ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        let common = ctx.common()?;
        let (a1, a2, a3, b, c, alpha) = (
            common[0], common[1], common[2], common[3], common[4], common[5],
        );
        let p = ctx.atom_parameters(molecule)?;
        let n = molecule.len();

        let pair_divisor = |i: usize, j: usize| {
            let (ei, ej) = (molecule.atom(i).element(), molecule.atom(j).element());
            if ei.period == 2 && ej.period == 2 {
                a1
            } else if ei.is_hydrogen() || ej.is_hydrogen() {
                a2
            } else {
                a3
            }
        };

        let mut q = vec![0.0; n];
        for _ in 0..SWEEPS {
            for i in 0..n {
                let chi = p[i][0];
                let alpha_term: f64 = molecule
                    .k_bond_distance(i, 1)
                    .into_iter()
                    .map(|j| (p[j][0] - chi) / pair_divisor(i, j))
                    .sum();

                let polarisability = p[i][1] * (1.0 + alpha * (p[i][2] - q[i]));
                let reach = |k: u32| -> f64 {
                    molecule
                        .k_bond_distance(i, k)
                        .into_iter()
                        .map(|j| (p[j][0] - HYDROGEN_ELECTRONEGATIVITY) * polarisability / b)
                        .sum()
                };
                let beta_term = reach(2);
                let gamma_term = reach(3) / c;

                q[i] = alpha_term + beta_term + gamma_term;
            }
        }
        Ok(q)
    }
}
