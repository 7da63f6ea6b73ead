use super::equalization::EqualizationSystem;
use super::{Context, Method, MethodKind, MethodMetadata, Signature};
use crate::error::ChargeError;
use crate::math::constants::COULOMB_CONSTANT;
use crate::model::{Molecule, Requirement};

static METADATA: MethodMetadata = MethodMetadata {
    name: "tsef",
    full_name: "Topologically Symmetrical Energy Function",
    publication: Some("10.1080/10629360701844142"),
    kind: MethodKind::TwoD,
    priority: 40,
};

/// Attenuation factors for topological distances 1 to 6; longer paths use the last value.
const ATTENUATION: [f64; 6] = [0.556, 0.778, 1.0, 1.053, 1.087, 1.091];

fn attenuation(bond_distance: u32) -> f64 {
    let index = (bond_distance.max(1) as usize - 1).min(ATTENUATION.len() - 1);
    ATTENUATION[index]
}

/// Equalization where the interaction of two atoms depends only on the number of bonds
/// between them: `14.4 K(d) / (0.84 d + 0.46)`.
///
/// Atoms in disconnected fragments do not interact.
pub struct Tsef;

impl Method for Tsef {
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
        let p = ctx.atom_parameters(molecule)?;
        let atoms: Vec<usize> = (0..molecule.len()).collect();
        EqualizationSystem::assemble(
            &atoms,
            molecule.total_charge() as f64,
            |a| (p[a][1], -p[a][0]),
            |a, b| match molecule.bond_distance(a, b) {
                Some(d) => COULOMB_CONSTANT * attenuation(d) / (0.84 * d as f64 + 0.46),
                None => 0.0,
            },
        )
        .solve()
    }
}
