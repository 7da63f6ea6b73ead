use super::{Context, Method, MethodKind, MethodMetadata};
use crate::error::ChargeError;
use crate::model::Molecule;

static METADATA: MethodMetadata = MethodMetadata {
    name: "veem",
    full_name: "Valence Electrons Equalization Method",
    publication: Some("10.1088/1674-0068/24/01/31-39"),
    kind: MethodKind::TwoD,
    priority: 20,
};

/// Equalizes electronegativity weighted by valence electron counts.
///
/// The molecular electronegativity is `χ_eq = Σ vχ / Σ v`, and each atom receives
/// `v (χ_eq − χ) / χ_eq`. Defined only for main-group elements.
pub struct Veem;

impl Method for Veem {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn is_suitable_for_molecule(&self, molecule: &Molecule) -> bool {
        molecule
            .atoms()
            .iter()
            .all(|atom| atom.element().valence_electron_count().is_ok())
    }

    fn calculate_charges(
        &self,
        _ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        let terms = molecule
            .atoms()
            .iter()
            .map(|atom| {
                let element = atom.element();
                Ok((
                    element.valence_electron_count()? as f64,
                    element.electronegativity,
                ))
            })
            .collect::<Result<Vec<(f64, f64)>, ChargeError>>()?;

        let numerator: f64 = terms.iter().map(|(v, chi)| v * chi).sum();
        let denominator: f64 = terms.iter().map(|(v, _)| v).sum();
        let equalized = numerator / denominator;

        Ok(terms
            .iter()
            .map(|(v, chi)| v * (equalized - chi) / equalized)
            .collect())
    }
}
