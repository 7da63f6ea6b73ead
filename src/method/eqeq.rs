use super::equalization::{self, Bound, EqualizationModel, EqualizationSystem};
use super::{Context, Method, MethodKind, MethodMetadata, OptionSpec};
use crate::error::ChargeError;
use crate::math::constants::COULOMB_CONSTANT;
use crate::model::{Molecule, Requirement};

static METADATA: MethodMetadata = MethodMetadata {
    name: "eqeq",
    full_name: "Extended Charge Equilibration",
    publication: Some("10.1021/jz3008485"),
    kind: MethodKind::ThreeD,
    priority: 150,
};

/// Dielectric screening of the Coulomb term.
const LAMBDA: f64 = 1.2;

/// Electron affinity used for hydrogen instead of the tabulated value (eV).
const HYDROGEN_ELECTRON_AFFINITY: f64 = -2.0;

/// Parameter-free equalization: electronegativity and hardness come from the ionization
/// potential and electron affinity of each element.
pub struct Eqeq;

/// `(electronegativity, hardness)` of atom `atom`.
fn element_terms(molecule: &Molecule, atom: usize) -> (f64, f64) {
    let element = molecule.atom(atom).element();
    let ea = if element.is_hydrogen() {
        HYDROGEN_ELECTRON_AFFINITY
    } else {
        element.electron_affinity
    };
    let ip = element.ionization_potential;
    ((ip + ea) / 2.0, ip - ea)
}

impl EqualizationModel for Eqeq {
    fn solve_fragment(
        &self,
        bound: &Bound<'_>,
        atoms: &[usize],
        total_charge: f64,
    ) -> Result<Vec<f64>, ChargeError> {
        let molecule = bound.molecule;
        let k = COULOMB_CONSTANT;
        EqualizationSystem::assemble(
            atoms,
            total_charge,
            |a| {
                let (chi, j) = element_terms(molecule, a);
                (j, -chi)
            },
            |a, b| {
                let (_, ja) = element_terms(molecule, a);
                let (_, jb) = element_terms(molecule, b);
                let alpha = (ja * jb).sqrt() / k;
                let r = molecule.distance(a, b);
                let overlap =
                    (-alpha * alpha * r * r).exp() * (2.0 * alpha - alpha * alpha * r - 1.0 / r);
                LAMBDA * k / 2.0 * (1.0 / r + overlap)
            },
        )
        .solve()
    }
}

impl Method for Eqeq {
    fn metadata(&self) -> &'static MethodMetadata {
        &METADATA
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
