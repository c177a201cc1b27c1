use activeset_types::{QpError, Result};
use nalgebra::{DMatrix, DVector};

/// Require a square matrix, returning its order
pub fn check_square(matrix: &DMatrix<f64>, name: &str) -> Result<usize> {
    if matrix.nrows() != matrix.ncols() {
        return Err(QpError::DimensionMismatch(format!(
            "{} must be square, got {}x{}",
            name,
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    Ok(matrix.nrows())
}

/// Require an exact `rows x cols` shape
pub fn check_shape(matrix: &DMatrix<f64>, rows: usize, cols: usize, name: &str) -> Result<()> {
    if matrix.nrows() != rows || matrix.ncols() != cols {
        return Err(QpError::DimensionMismatch(format!(
            "{} must be {}x{}, got {}x{}",
            name,
            rows,
            cols,
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    Ok(())
}

pub fn check_len(vector: &DVector<f64>, len: usize, name: &str) -> Result<()> {
    if vector.len() != len {
        return Err(QpError::DimensionMismatch(format!(
            "{} must have length {}, got {}",
            name,
            len,
            vector.len()
        )));
    }
    Ok(())
}

/// Reject NaN and infinite entries, reporting the first offending position
pub fn ensure_finite<'a, I>(values: I, name: &str) -> Result<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    match values.into_iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(QpError::NonFinite(format!(
            "{} has a non-finite entry at flat index {}",
            name, idx
        ))),
        None => Ok(()),
    }
}
