//! Physical constants and numerical thresholds shared by the charge models.

/// Coulomb constant `e² / (4πε₀)` in eV·Å.
///
/// Converts an interaction between two unit charges at a distance in angstroms into
/// electronvolts, the energy unit of all electronegativity and hardness parameters.
pub const COULOMB_CONSTANT: f64 = 14.4;

/// Distances below this value (in angstroms) are treated as coincident atoms.
///
/// Off-diagonal `1/R` terms are never evaluated for such pairs; the methods substitute
/// their finite short-range limit instead.
pub const DISTANCE_THRESHOLD: f64 = 1e-12;

/// Absolute tolerance on the total charge after a calculation.
pub const CHARGE_TOLERANCE: f64 = 1e-6;
