//! Mathematical utilities and physical constants for the eqcharge library.
//!
//! Everything here is a pure function of its arguments: Euclidean geometry on atom
//! coordinates, the dense linear solve shared by every matrix-based method, and the
//! constants those methods agree on.

/// Physical constants and numerical thresholds.
pub mod constants;

/// Distances and centres in Cartesian space.
pub mod geometry;

/// Dense linear solves with error reporting instead of panics or silent NaNs.
pub mod linalg;
