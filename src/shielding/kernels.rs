//! Empirical overlap kernels for the QEq off-diagonal coupling.

use crate::error::ChargeError;
use std::fmt;
use std::str::FromStr;

/// Scaling factor of the Nishimoto-Mataga-Weiss kernel.
const WEISS_FACTOR: f64 = 1.2;

/// Exponential attenuation of the DasGupta-Huzinaga kernel (1/Å).
const DASGUPTA_HUZINAGA_K: f64 = 0.4;

/// A short-range-corrected replacement for `1/R` parameterised by the hardness of both atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapKernel {
    NishimotoMataga,
    NishimotoMatagaWeiss,
    Ohno,
    OhnoKlopman,
    DasGuptaHuzinaga,
    #[default]
    LouwenVogt,
}

impl OverlapKernel {
    /// Every kernel, in option order.
    pub const ALL: [OverlapKernel; 6] = [
        OverlapKernel::NishimotoMataga,
        OverlapKernel::NishimotoMatagaWeiss,
        OverlapKernel::Ohno,
        OverlapKernel::OhnoKlopman,
        OverlapKernel::DasGuptaHuzinaga,
        OverlapKernel::LouwenVogt,
    ];

    /// Kernel names accepted by the `kernel` option, parallel to [`OverlapKernel::ALL`].
    pub const NAMES: [&'static str; 6] = [
        "Nishimoto-Mataga",
        "Nishimoto-Mataga-Weiss",
        "Ohno",
        "Ohno-Klopman",
        "DasGupta-Huzinaga",
        "Louwen-Vogt",
    ];

    /// The kernel's option name.
    pub fn as_str(self) -> &'static str {
        match self {
            OverlapKernel::NishimotoMataga => Self::NAMES[0],
            OverlapKernel::NishimotoMatagaWeiss => Self::NAMES[1],
            OverlapKernel::Ohno => Self::NAMES[2],
            OverlapKernel::OhnoKlopman => Self::NAMES[3],
            OverlapKernel::DasGuptaHuzinaga => Self::NAMES[4],
            OverlapKernel::LouwenVogt => Self::NAMES[5],
        }
    }

    /// Coupling of two atoms with hardness `ji` and `jj` at distance `r`.
    #[inline]
    pub fn evaluate(self, r: f64, ji: f64, jj: f64) -> f64 {
        match self {
            OverlapKernel::NishimotoMataga => 1.0 / (r + 2.0 / (ji + jj)),
            OverlapKernel::NishimotoMatagaWeiss => {
                WEISS_FACTOR / (r + 2.0 * WEISS_FACTOR / (ji + jj))
            }
            OverlapKernel::Ohno => 1.0 / (r * r + (2.0 / (ji + jj)).powi(2)).sqrt(),
            OverlapKernel::OhnoKlopman => {
                1.0 / (r * r + (1.0 / (2.0 * ji) + 1.0 / (2.0 * jj)).powi(2)).sqrt()
            }
            OverlapKernel::DasGuptaHuzinaga => {
                let damping = (DASGUPTA_HUZINAGA_K * r).exp();
                1.0 / (r + 1.0 / (ji / 2.0 * damping + jj / 2.0 * damping))
            }
            OverlapKernel::LouwenVogt => {
                let gamma = (ji + jj) / 2.0;
                1.0 / (1.0 / gamma.powi(3) + r.powi(3)).cbrt()
            }
        }
    }
}

impl FromStr for OverlapKernel {
    type Err = ChargeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ChargeError::InvalidOptionValue {
                option: "overlap_term".to_string(),
                value: s.to_string(),
                reason: format!("allowed values are {}", Self::NAMES.join(", ")),
            })
    }
}

impl fmt::Display for OverlapKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
