use super::equalization::{self, Bound, EqualizationModel, EqualizationSystem};
use super::{Context, Method, MethodKind, MethodMetadata, OptionSpec, Signature};
use crate::error::ChargeError;
use crate::model::{Molecule, Requirement};

static METADATA: MethodMetadata = MethodMetadata {
    name: "sfkeem",
    full_name: "Selfconsistent Functional Kernel Equalized Electronegativity Method",
    publication: Some("10.1021/ci050505e"),
    kind: MethodKind::ThreeD,
    priority: 180,
};

/// Equalization with a hyperbolic-secant kernel `2 sqrt(Bi Bj) / cosh(sigma R)`.
pub struct Sfkeem;

impl EqualizationModel for Sfkeem {
    fn solve_fragment(
        &self,
        bound: &Bound<'_>,
        atoms: &[usize],
        total_charge: f64,
    ) -> Result<Vec<f64>, ChargeError> {
        let sigma = bound.common[0];
        let p = &bound.atom;
        EqualizationSystem::assemble(
            atoms,
            total_charge,
            |a| (2.0 * p[a][1], -p[a][0]),
            |a, b| {
                let r = bound.molecule.distance(a, b);
                2.0 * (p[a][1] * p[b][1]).sqrt() / (sigma * r).cosh()
            },
        )
        .solve()
    }
}

impl Method for Sfkeem {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &["sigma"],
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
