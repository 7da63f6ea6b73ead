use super::{Context, Method, MethodKind, MethodMetadata, Signature};
use crate::error::ChargeError;
use crate::math::linalg;
use crate::model::Molecule;
use faer::{Col, Mat};

static METADATA: MethodMetadata = MethodMetadata {
    name: "delre",
    full_name: "Method of Del Re",
    publication: Some("10.1039/JR9580004031"),
    kind: MethodKind::TwoD,
    priority: 130,
};

/// Del Re's inductive model of sigma charges.
///
/// Solves for an effective electronegativity `d` per atom from
/// `d_i = δ_i + Σ γ d_j`, where a bond contributes `gammaA` to the row of its first atom and
/// `gammaB` to the row of its second. Each bond then transfers `(d_i − d_j) / (2 eps)` from
/// its first to its second atom.
pub struct DelRe;

impl Method for DelRe {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &[],
            atom: &["delta"],
            bond: &["eps", "gammaA", "gammaB"],
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
        let atom = ctx.atom_parameters(molecule)?;
        let bond = ctx.bond_parameters(molecule)?;
        let n = molecule.len();

        let mut matrix = Mat::<f64>::zeros(n, n);
        let mut rhs = Col::<f64>::zeros(n);
        for i in 0..n {
            matrix[(i, i)] = -1.0;
            rhs[i] = -atom[i][0];
        }
        for (b, bond_atoms) in molecule.bonds().iter().enumerate() {
            let (i, j) = (bond_atoms.first(), bond_atoms.second());
            matrix[(i, j)] = bond[b][1];
            matrix[(j, i)] = bond[b][2];
        }

        let d = linalg::solve_dense(&matrix, &rhs)?;

        let mut q = vec![0.0; n];
        for (b, bond_atoms) in molecule.bonds().iter().enumerate() {
            let (i, j) = (bond_atoms.first(), bond_atoms.second());
            let dq = (d[i] - d[j]) / (2.0 * bond[b][0]);
            q[i] -= dq;
            q[j] += dq;
        }
        Ok(q)
    }
}
