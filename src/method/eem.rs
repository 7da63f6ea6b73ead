use super::equalization::{self, Bound, EqualizationModel, EqualizationSystem};
use super::{Context, Method, MethodKind, MethodMetadata, OptionSpec, Signature};
use crate::error::ChargeError;
use crate::model::{Molecule, Requirement};

static METADATA: MethodMetadata = MethodMetadata {
    name: "eem",
    full_name: "Electronegativity Equalization Method",
    publication: Some("10.1021/ja00275a013"),
    kind: MethodKind::ThreeD,
    priority: 200,
};

/// Electronegativity equalization with a scaled bare Coulomb coupling `kappa / R`.
///
/// Atom parameters `A` (electronegativity) and `B` (hardness); common parameter `kappa`.
pub struct Eem;

impl EqualizationModel for Eem {
    fn solve_fragment(
        &self,
        bound: &Bound<'_>,
        atoms: &[usize],
        total_charge: f64,
    ) -> Result<Vec<f64>, ChargeError> {
        let kappa = bound.common[0];
        let p = &bound.atom;
        EqualizationSystem::assemble(
            atoms,
            total_charge,
            |a| (p[a][1], -p[a][0]),
            |a, b| kappa / bound.molecule.distance(a, b),
        )
        .solve()
    }
}

impl Method for Eem {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &["kappa"],
            atom: &["A", "B"],
            bond: &[],
        }
    }

    fn options(&self) -> Vec<OptionSpec> {
        equalization::options_with(&[])
    }

    fn requirements(&self) -> Vec<Requirement> {
        equalization::requirements()
    }

    fn calculate_charges(
        &self,
        ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        equalization::solve(self, ctx, molecule)
    }
}
