use super::{Context, Method, MethodKind, MethodMetadata, Signature};
use crate::error::ChargeError;
use crate::math::linalg;
use crate::model::Molecule;
use faer::Mat;

static METADATA: MethodMetadata = MethodMetadata {
    name: "denr",
    full_name: "Dynamical Electronegativity Relaxation",
    publication: Some("10.1080/10629360701844142"),
    kind: MethodKind::TwoD,
    priority: 50,
};

/// Implicit relaxation of charges along the bond graph.
///
/// With the graph Laplacian `L`, `η = diag(hardness)` and step `s`, each of the `iterations`
/// steps solves `(I + s L η) q' = q − s L χ`, starting from neutral atoms.
pub struct Denr;

impl Method for Denr {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &["step", "iterations"],
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
        let common = ctx.common()?;
        let (step, iterations) = (common[0], common[1].round().max(0.0) as usize);
        let p = ctx.atom_parameters(molecule)?;
        let n = molecule.len();

        let mut matrix = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            matrix[(i, i)] = 1.0;
        }
        let mut tmp = vec![0.0; n];
        for bond in molecule.bonds() {
            let (i, j) = (bond.first(), bond.second());
            matrix[(i, i)] += step * p[i][1];
            matrix[(j, j)] += step * p[j][1];
            matrix[(i, j)] -= step * p[j][1];
            matrix[(j, i)] -= step * p[i][1];
            tmp[i] += step * (p[i][0] - p[j][0]);
            tmp[j] += step * (p[j][0] - p[i][0]);
        }

        linalg::iterate_dense(&matrix, vec![0.0; n], iterations, |q| {
            q.iter().zip(&tmp).map(|(q, t)| q - t).collect()
        })
    }
}
