use super::{Context, Method, MethodKind, MethodMetadata, Signature};
use crate::error::ChargeError;
use crate::math::linalg;
use crate::model::Molecule;
use faer::Mat;

static METADATA: MethodMetadata = MethodMetadata {
    name: "kcm",
    full_name: "Kirchhoff Charge Model",
    publication: None,
    kind: MethodKind::TwoD,
    priority: 60,
};

/// Charges from a resistor-network analogy on the bond graph.
///
/// With the bond-atom incidence matrix `B` and bond conductances
/// `W = diag(1 / (J_i + J_j))`, the charges are `q = (Bᵀ W B + I)⁻¹ χ − χ`.
pub struct Kcm;

impl Method for Kcm {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &[],
            atom: &["electronegativity", "hardness"],
            bond: &[],
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
        let p = ctx.atom_parameters(molecule)?;
        let n = molecule.len();

        // Bᵀ W B is a weighted graph Laplacian.
        let mut matrix = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            matrix[(i, i)] = 1.0;
        }
        for bond in molecule.bonds() {
            let (i, j) = (bond.first(), bond.second());
            let w = 1.0 / (p[i][1] + p[j][1]);
            matrix[(i, i)] += w;
            matrix[(j, j)] += w;
            matrix[(i, j)] -= w;
            matrix[(j, i)] -= w;
        }

        let chi: Vec<f64> = p.iter().map(|v| v[0]).collect();
        let solution = linalg::solve_dense(&matrix, &linalg::column(&chi))?;
        Ok(solution.iter().zip(&chi).map(|(s, c)| s - c).collect())
    }
}
