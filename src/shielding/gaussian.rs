//! Coulomb interaction of two spherical Gaussian charge distributions.

use crate::math::constants::DISTANCE_THRESHOLD;
use libm::erf;
use std::f64::consts::PI;

/// Interaction of two Gaussian charges of widths `width1` and `width2` (Å) at distance `r`.
///
/// Evaluates `erf(r / d) / r` with `d = sqrt(2 w1² + 2 w2²)`, and its limit `2 / (sqrt(π) d)`
/// for coincident centres. Returns 0 if both widths vanish.
#[inline]
pub fn screened_potential(r: f64, width1: f64, width2: f64) -> f64 {
    let d = (2.0 * width1 * width1 + 2.0 * width2 * width2).sqrt();
    if d < DISTANCE_THRESHOLD {
        return if r > DISTANCE_THRESHOLD { 1.0 / r } else { 0.0 };
    }

    if r > DISTANCE_THRESHOLD {
        erf(r / d) / r
    } else {
        2.0 / (PI.sqrt() * d)
    }
}
