pub mod charges;
pub mod classify;
pub mod element;
pub mod error;
pub mod math;
pub mod method;
pub mod model;
pub mod params;
pub mod shielding;

pub use charges::Charges;
pub use classify::{AtomScheme, AtomTypeKey, BondScheme, BondTypeKey};
pub use element::{Element, PeriodicTable, periodic_table};
pub use error::ChargeError;
pub use method::{
    Calculator, Candidate, Context, Method, MethodKind, MethodMetadata, SetResult, Signature,
    Strategy, available_methods, best_parameters, load_method, suitable_methods,
};
pub use model::{Atom, Bond, Molecule, MoleculeSet, Requirement};
pub use params::Parameters;
