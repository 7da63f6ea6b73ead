use crate::error::ChargeError;
use faer::{Col, Mat, prelude::*};
use std::panic::{self, AssertUnwindSafe};

/// Solves `matrix · x = rhs` by LU decomposition with partial pivoting.
///
/// # Errors
///
/// Returns [`ChargeError::LinalgError`] if the decomposition panics or the solution
/// contains NaN or infinite entries, which is how a singular system shows up.
pub fn solve_dense(matrix: &Mat<f64>, rhs: &Col<f64>) -> Result<Vec<f64>, ChargeError> {
    let n = rhs.nrows();
    if matrix.nrows() != n || matrix.ncols() != n {
        return Err(ChargeError::LinalgError(format!(
            "system of size {}x{} does not match right-hand side of length {}",
            matrix.nrows(),
            matrix.ncols(),
            n
        )));
    }

    let solve_result = panic::catch_unwind(AssertUnwindSafe(|| matrix.partial_piv_lu().solve(rhs)));

    let solution = match solve_result {
        Ok(sol) => sol,
        Err(_) => {
            return Err(ChargeError::LinalgError(
                "Linear system solver panicked. Matrix might be singular.".to_string(),
            ));
        }
    };

    let values: Vec<f64> = (0..n).map(|i| solution[i]).collect();
    ensure_finite(&values)?;
    Ok(values)
}

/// Factorises `matrix` once and applies `x ← matrix⁻¹ · next_rhs(x)` `iterations` times,
/// starting from `initial`.
///
/// # Errors
///
/// Returns [`ChargeError::LinalgError`] under the same conditions as [`solve_dense`].
pub fn iterate_dense(
    matrix: &Mat<f64>,
    initial: Vec<f64>,
    iterations: usize,
    next_rhs: impl Fn(&[f64]) -> Vec<f64>,
) -> Result<Vec<f64>, ChargeError> {
    let n = initial.len();
    if matrix.nrows() != n || matrix.ncols() != n {
        return Err(ChargeError::LinalgError(format!(
            "system of size {}x{} does not match vector of length {}",
            matrix.nrows(),
            matrix.ncols(),
            n
        )));
    }

    let iterate_result = panic::catch_unwind(AssertUnwindSafe(|| {
        let lu = matrix.partial_piv_lu();
        let mut x = initial;
        for _ in 0..iterations {
            let rhs = column(&next_rhs(&x));
            let solution = lu.solve(&rhs);
            x = (0..n).map(|i| solution[i]).collect();
        }
        x
    }));

    let values = iterate_result.map_err(|_| {
        ChargeError::LinalgError(
            "Linear system solver panicked. Matrix might be singular.".to_string(),
        )
    })?;
    ensure_finite(&values)?;
    Ok(values)
}

/// Rejects vectors with NaN or infinite entries.
pub fn ensure_finite(values: &[f64]) -> Result<(), ChargeError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ChargeError::LinalgError(
            "Solution contains non-finite values. Matrix is singular or ill-conditioned."
                .to_string(),
        ))
    }
}

/// Builds a column vector from a slice.
pub fn column(values: &[f64]) -> Col<f64> {
    let mut col = Col::zeros(values.len());
    for (i, &v) in values.iter().enumerate() {
        col[i] = v;
    }
    col
}
