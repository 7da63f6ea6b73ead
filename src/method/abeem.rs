use super::{Context, Method, MethodKind, MethodMetadata, Signature};
use crate::error::ChargeError;
use crate::math::linalg;
use crate::model::Molecule;
use faer::{Col, Mat};

static METADATA: MethodMetadata = MethodMetadata {
    name: "abeem",
    full_name: "Atom-Bond Electronegativity Equalization Method",
    publication: Some("10.1021/jp9711048"),
    kind: MethodKind::ThreeD,
    priority: 190,
};

/// Equalization over atoms and bond centres together.
///
/// The system has one unknown per atom, one per bond and the multiplier. Atoms carry `a`
/// (electronegativity), `b` (hardness) and `c` (coupling to their own bonds); bonds carry
/// `A` (electronegativity), `B` (hardness) and the couplings `C` and `D` to their second and
/// first atom. All other pairs interact through `k / R`, measured to covalent-radius weighted
/// bond centres. Bond charges are finally split evenly onto their atoms.
pub struct Abeem;

impl Method for Abeem {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &["k"],
            atom: &["a", "b", "c"],
            bond: &["A", "B", "C", "D"],
        }
    }

    fn is_suitable_for_large_molecule(&self) -> bool {
        false
    }

    fn calculate_charges(
        &self,
        ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        let k = ctx.common()?[0];
        let atom = ctx.atom_parameters(molecule)?;
        let bond = ctx.bond_parameters(molecule)?;
        let n = molecule.len();
        let bonds = molecule.bonds();
        let m = bonds.len();
        let size = n + m + 1;

        let mut matrix = Mat::<f64>::zeros(size, size);
        let mut rhs = Col::<f64>::zeros(size);

        for i in 0..n {
            matrix[(i, i)] = atom[i][1];
            rhs[i] = -atom[i][0];
            for j in (i + 1)..n {
                let off = k / molecule.distance(i, j);
                matrix[(i, j)] = off;
                matrix[(j, i)] = off;
            }
        }

        for i in 0..n {
            for (b, bond_atoms) in bonds.iter().enumerate() {
                matrix[(i, n + b)] = if bond_atoms.has_atom(i) {
                    atom[i][2]
                } else {
                    k / molecule.distance_to_bond(i, b, true)
                };
            }
        }

        for (b, bond_atoms) in bonds.iter().enumerate() {
            rhs[n + b] = -bond[b][0];
            for j in 0..n {
                matrix[(n + b, j)] = if bond_atoms.first() == j {
                    bond[b][3]
                } else if bond_atoms.second() == j {
                    bond[b][2]
                } else {
                    k / molecule.distance_to_bond(j, b, true)
                };
            }
        }

        for b in 0..m {
            matrix[(n + b, n + b)] = bond[b][1];
            for c in (b + 1)..m {
                let off = k / molecule.distance_between_bonds(b, c, true);
                matrix[(n + b, n + c)] = off;
                matrix[(n + c, n + b)] = off;
            }
        }

        for i in 0..(n + m) {
            matrix[(i, n + m)] = 1.0;
            matrix[(n + m, i)] = 1.0;
        }
        rhs[n + m] = molecule.total_charge() as f64;

        let solution = linalg::solve_dense(&matrix, &rhs)?;

        let mut q = solution[..n].to_vec();
        for (b, bond_atoms) in bonds.iter().enumerate() {
            q[bond_atoms.first()] += 0.5 * solution[n + b];
            q[bond_atoms.second()] += 0.5 * solution[n + b];
        }
        Ok(q)
    }
}
