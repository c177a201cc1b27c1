use activeset_types::{QpError, Result};
use nalgebra::{DMatrix, DVector};

/// Smallest accepted ratio between the smallest and largest singular value.
/// Matrices below it are treated as singular to working precision.
pub const SINGULAR_RTOL: f64 = 1e-12;

/// Check that a matrix is symmetric within `tolerance`
pub fn is_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }

    let n = matrix.nrows();
    (0..n).all(|row| (row + 1..n).all(|col| (matrix[(row, col)] - matrix[(col, row)]).abs() <= tolerance))
}

/// Validate that a matrix is symmetric positive definite.
/// Symmetry is checked with a tolerance relative to the largest entry;
/// definiteness via Cholesky.
pub fn validate_spd(matrix: &DMatrix<f64>, name: &str) -> Result<()> {
    let scale = matrix.amax().max(1.0);
    if !is_symmetric(matrix, 1e-10 * scale) {
        return Err(QpError::NotPositiveDefinite(format!("{} is not symmetric", name)));
    }

    if matrix.clone().cholesky().is_none() {
        return Err(QpError::NotPositiveDefinite(format!(
            "{} has a non-positive eigenvalue (Cholesky failed)",
            name
        )));
    }

    Ok(())
}

/// Fail with `SingularMatrix` when the singular value spread of `matrix`
/// exceeds working precision
pub fn ensure_nonsingular(matrix: &DMatrix<f64>, name: &str) -> Result<()> {
    if matrix.is_empty() {
        return Ok(());
    }

    let singular_values = matrix.clone().svd(false, false).singular_values;
    let s_max = singular_values.max();
    let s_min = singular_values.min();

    if s_max == 0.0 || s_min <= SINGULAR_RTOL * s_max {
        return Err(QpError::SingularMatrix(format!(
            "{} ({}x{}) is singular to working precision (sigma_min = {:e}, sigma_max = {:e})",
            name,
            matrix.nrows(),
            matrix.ncols(),
            s_min,
            s_max
        )));
    }

    Ok(())
}

/// Invert a square matrix, failing on numerical singularity instead of
/// producing inf/NaN entries
pub fn checked_inverse(matrix: &DMatrix<f64>, name: &str) -> Result<DMatrix<f64>> {
    ensure_nonsingular(matrix, name)?;
    matrix
        .clone()
        .try_inverse()
        .ok_or_else(|| QpError::SingularMatrix(format!("{} could not be inverted", name)))
}

/// Solve `matrix * x = rhs` via LU with the same singularity guard as
/// [`checked_inverse`]
pub fn checked_solve(matrix: &DMatrix<f64>, rhs: &DVector<f64>, name: &str) -> Result<DVector<f64>> {
    ensure_nonsingular(matrix, name)?;
    matrix
        .clone()
        .lu()
        .solve(rhs)
        .ok_or_else(|| QpError::SingularMatrix(format!("{} could not be factorized", name)))
}

/// Scatter `values[k]` into position `indices[k]` of a zero vector of length `len`
pub fn scatter(values: &[f64], indices: &[usize], len: usize) -> DVector<f64> {
    let mut full = DVector::zeros(len);
    for (&idx, &value) in indices.iter().zip(values) {
        full[idx] = value;
    }
    full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_of_reference_hessian() {
        let p = DMatrix::from_row_slice(2, 2, &[1.0, 0.4, 0.4, 2.0]);
        let p_inv = checked_inverse(&p, "P").unwrap();

        let identity = &p * &p_inv;
        assert!((identity - DMatrix::identity(2, 2)).amax() < 1e-12);
        assert!((p_inv[(0, 0)] - 2.0 / 1.84).abs() < 1e-12);
    }

    #[test]
    fn test_singular_matrix_is_rejected() {
        let p = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let err = checked_inverse(&p, "P").unwrap_err();
        assert!(matches!(err, QpError::SingularMatrix(ref msg) if msg.starts_with("P (2x2)")));

        let zero = DMatrix::<f64>::zeros(3, 3);
        assert!(ensure_nonsingular(&zero, "zero").is_err());
    }

    #[test]
    fn test_nearly_singular_matrix_is_rejected() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0 + 1e-15]);
        assert!(matches!(
            checked_solve(&m, &DVector::from_vec(vec![1.0, 2.0]), "M"),
            Err(QpError::SingularMatrix(_))
        ));
    }

    #[test]
    fn test_solve_matches_inverse() {
        let m = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let x = checked_solve(&m, &b, "M").unwrap();
        let x_inv = checked_inverse(&m, "M").unwrap() * &b;
        assert!((x - x_inv).amax() < 1e-12);
    }

    #[test]
    fn test_spd_validation() {
        let spd = DMatrix::from_row_slice(2, 2, &[1.0, 0.4, 0.4, 2.0]);
        assert!(validate_spd(&spd, "P").is_ok());

        let asymmetric = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.0, 1.0]);
        assert!(matches!(
            validate_spd(&asymmetric, "P"),
            Err(QpError::NotPositiveDefinite(ref msg)) if msg.contains("symmetric")
        ));

        let indefinite = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]);
        assert!(matches!(
            validate_spd(&indefinite, "P"),
            Err(QpError::NotPositiveDefinite(_))
        ));
    }

    #[test]
    fn test_scatter() {
        let full = scatter(&[0.5, 2.0], &[1, 3], 5);
        assert_eq!(full.as_slice(), &[0.0, 0.5, 0.0, 2.0, 0.0]);

        let empty = scatter(&[], &[], 3);
        assert_eq!(empty, DVector::zeros(3));
    }
}
