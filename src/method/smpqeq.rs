use super::equalization::{self, Bound, EqualizationModel, EqualizationSystem};
use super::{Context, Method, MethodKind, MethodMetadata, OptionSpec, Signature};
use crate::error::ChargeError;
use crate::model::{Molecule, Requirement};

static METADATA: MethodMetadata = MethodMetadata {
    name: "smpqeq",
    full_name: "SMP/QEq",
    publication: None,
    kind: MethodKind::ThreeD,
    priority: 160,
};

/// Number of self-consistent sweeps over the charge-dependent hardness.
const SWEEPS: usize = 5;

/// Equalization with a hardness that is quadratic in the atom's own charge.
///
/// The energy of atom `i` is expanded to fourth order in its charge with coefficients
/// `first` to `fourth`; each sweep freezes the hardness at the charges of the previous sweep,
/// starting from neutral atoms.
pub struct SmpQeq;

impl EqualizationModel for SmpQeq {
    fn solve_fragment(
        &self,
        bound: &Bound<'_>,
        atoms: &[usize],
        total_charge: f64,
    ) -> Result<Vec<f64>, ChargeError> {
        let p = &bound.atom;
        // Assembled over fragment positions so the previous sweep's charges index directly.
        let local: Vec<usize> = (0..atoms.len()).collect();
        let mut q = vec![0.0; atoms.len()];
        for _ in 0..SWEEPS {
            let next = EqualizationSystem::assemble(
                &local,
                total_charge,
                |i| {
                    let (a, qa) = (atoms[i], q[i]);
                    let hardness = 2.0 * (p[a][1] + p[a][2] * qa + p[a][3] * qa * qa);
                    (hardness, -p[a][0])
                },
                |i, j| {
                    let (a, b) = (atoms[i], atoms[j]);
                    let gamma = 2.0 * (p[a][1] * p[b][1]).sqrt();
                    let r = bound.molecule.distance(a, b);
                    1.0 / (1.0 / gamma.powi(3) + r.powi(3)).cbrt()
                },
            )
            .solve()?;
            q = next;
        }
        Ok(q)
    }
}

impl Method for SmpQeq {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
    }

    fn signature(&self) -> Signature {
        Signature {
            common: &[],
            atom: &["first", "second", "third", "fourth"],
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
