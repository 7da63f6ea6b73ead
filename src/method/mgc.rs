use super::{Context, Method, MethodKind, MethodMetadata};
use crate::error::ChargeError;
use crate::math::linalg;
use crate::model::Molecule;
use faer::Mat;

static METADATA: MethodMetadata = MethodMetadata {
    name: "mgc",
    full_name: "Molecular Graph Charge",
    publication: Some("10.1002/poc.378"),
    kind: MethodKind::TwoD,
    priority: 70,
};

/// Parameter-free charges from the bond-order-weighted molecular graph.
///
/// Solves `S χ = χ⁰` with `S = I + L` (`L` the bond-order Laplacian, `χ⁰` the Pauling
/// electronegativities) and reports `(χ − χ⁰)` divided by the geometric mean of `χ⁰`.
pub struct Mgc;

impl Method for Mgc {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn is_suitable_for_molecule(&self, molecule: &Molecule) -> bool {
        molecule
            .atoms()
            .iter()
            .all(|atom| atom.element().electronegativity > 0.0)
    }

    fn is_suitable_for_large_molecule(&self) -> bool {
        false
    }

    fn calculate_charges(
        &self,
        _ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        let n = molecule.len();
        let x0: Vec<f64> = molecule
            .atoms()
            .iter()
            .map(|atom| atom.element().electronegativity)
            .collect();
        let geometric_mean = (x0.iter().map(|x| x.ln()).sum::<f64>() / n as f64).exp();

        let mut s = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            s[(i, i)] = 1.0;
        }
        for bond in molecule.bonds() {
            let (i, j) = (bond.first(), bond.second());
            let order = bond.order() as f64;
            s[(i, i)] += order;
            s[(j, j)] += order;
            s[(i, j)] -= order;
            s[(j, i)] -= order;
        }

        let chi = linalg::solve_dense(&s, &linalg::column(&x0))?;
        Ok(chi
            .iter()
            .zip(&x0)
            .map(|(c, x)| (c - x) / geometric_mean)
            .collect())
    }
}
