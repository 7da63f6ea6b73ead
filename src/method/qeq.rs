use super::equalization::{self, Bound, EqualizationModel, EqualizationSystem};
use super::{Context, Method, MethodKind, MethodMetadata, OptionKind, OptionSpec, Signature};
use crate::error::ChargeError;
use crate::model::{Molecule, Requirement};
use crate::shielding::OverlapKernel;

static METADATA: MethodMetadata = MethodMetadata {
    name: "qeq",
    full_name: "Charge Equilibration",
    publication: Some("10.1021/j100161a070"),
    kind: MethodKind::ThreeD,
    priority: 170,
};

/// Charge equilibration with a selectable overlap kernel in place of `1/R`.
pub struct Qeq;

/// A QEq model with its kernel resolved from the options.
struct KernelModel(OverlapKernel);

impl EqualizationModel for KernelModel {
    fn solve_fragment(
        &self,
        bound: &Bound<'_>,
        atoms: &[usize],
        total_charge: f64,
    ) -> Result<Vec<f64>, ChargeError> {
        let p = &bound.atom;
        EqualizationSystem::assemble(
            atoms,
            total_charge,
            |a| (p[a][1], -p[a][0]),
            |a, b| {
                self.0
                    .evaluate(bound.molecule.distance(a, b), p[a][1], p[b][1])
            },
        )
        .solve()
    }
}

impl Method for Qeq {
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

    fn options(&self) -> Vec<OptionSpec> {
        equalization::options_with(&[OptionSpec {
            name: "overlap_term",
            description: "Overlap term",
            kind: OptionKind::Str,
            default: "Louwen-Vogt",
            choices: &OverlapKernel::NAMES,
        }])
    }

    fn requirements(&self) -> Vec<Requirement> {
        equalization::requirements()
    }

    fn calculate_charges(
        &self,
        ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        let kernel: OverlapKernel = ctx.option_str("overlap_term")?.parse()?;
        equalization::solve(&KernelModel(kernel), ctx, molecule)
    }
}
