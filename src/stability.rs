//! Detection of kinematically unstable or numerically singular models.

use log::{debug, warn};
use nalgebra::DMatrix;

use crate::errors::InstabilityError;

/// 2-norm condition number, the ratio of the extreme singular values.
///
/// Returns infinity for a matrix with a zero singular value and NaN when the matrix
/// contains non-finite entries.
#[must_use]
pub fn condition_number(matrix: &DMatrix<f64>) -> f64 {
    if matrix.is_empty() {
        return f64::INFINITY;
    }
    if matrix.iter().any(|value| !value.is_finite()) {
        return f64::NAN;
    }
    let singular_values = matrix.singular_values();
    let largest = singular_values.max();
    let smallest = singular_values.min();
    if smallest == 0.0 {
        f64::INFINITY
    } else {
        largest / smallest
    }
}

/// Reject a reduced system that cannot be solved reliably.
///
/// Returns the condition number of `reduced` when it is within `limit`.
///
/// # Errors
///
/// Returns [`InstabilityError::FullyLocked`] when there are no free degrees of
/// freedom and [`InstabilityError::IllConditioned`] when the condition number
/// exceeds `limit` or cannot be evaluated.
pub fn check_stability(
    free_dofs: &[usize],
    reduced: &DMatrix<f64>,
    limit: f64,
) -> Result<f64, InstabilityError> {
    if free_dofs.is_empty() {
        warn!("every degree of freedom is restrained");
        return Err(InstabilityError::FullyLocked);
    }
    let condition_number = condition_number(reduced);
    debug!(
        "reduced stiffness {0}x{0} has condition number {1:e}",
        free_dofs.len(),
        condition_number
    );
    if condition_number.is_nan() || condition_number > limit {
        warn!("reduced stiffness is ill-conditioned ({condition_number:e} > {limit:e})");
        return Err(InstabilityError::IllConditioned { condition_number });
    }
    Ok(condition_number)
}
