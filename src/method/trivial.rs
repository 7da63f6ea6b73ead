//! Methods that need no model: formal charges and all zeros.

use super::{Context, Method, MethodKind, MethodMetadata};
use crate::error::ChargeError;
use crate::model::Molecule;

static FORMAL_METADATA: MethodMetadata = MethodMetadata {
    name: "formal",
    full_name: "Formal charges",
    publication: None,
    kind: MethodKind::Other,
    priority: 10,
};

static DUMMY_METADATA: MethodMetadata = MethodMetadata {
    name: "dummy",
    full_name: "Dummy Method",
    publication: None,
    kind: MethodKind::Other,
    priority: 0,
};

/// Reports the formal charge of every atom.
pub struct Formal;

impl Method for Formal {
    fn metadata(&self) -> &'static MethodMetadata {
        &FORMAL_METADATA
    }

    fn calculate_charges(
        &self,
        _ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        Ok(molecule
            .atoms()
            .iter()
            .map(|atom| atom.formal_charge() as f64)
            .collect())
    }
}

/// Reports zero for every atom.
pub struct Dummy;

impl Method for Dummy {
    fn metadata(&self) -> &'static MethodMetadata {
        &DUMMY_METADATA
    }

    fn calculate_charges(
        &self,
        _ctx: &Context<'_>,
        molecule: &Molecule,
    ) -> Result<Vec<f64>, ChargeError> {
        Ok(vec![0.0; molecule.len()])
    }
}
