//! Screened Coulomb interactions between atomic charge distributions.
//!
//! Bare `1/R` coupling diverges for bonded atoms, so the equalization methods replace it with
//! kernels that stay finite as `R → 0`: the empirical overlap formulas of [`kernels`] for QEq,
//! and the Gaussian charge-cloud interaction of [`gaussian`] for split-charge equilibration.

pub mod gaussian;
pub mod kernels;

pub use kernels::OverlapKernel;
