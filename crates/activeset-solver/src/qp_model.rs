use activeset_linalg::{check_len, check_shape, check_square, checked_inverse, ensure_finite, validate_spd};
use activeset_types::{QpError, QpProblem, Result};
use nalgebra::{DMatrix, DVector};

/// QP model in inequality form:
/// minimize 0.5 * x^T P x + q^T x
/// subject to G x <= h
///
/// `(p, q)` is the objective, `(g, h)` the constraint set. A model with
/// zero constraints has `g` of shape `0 x n`.
#[derive(Debug, Clone, PartialEq)]
pub struct QpModel {
    /// Hessian matrix P (must be SPD)
    pub p: DMatrix<f64>,
    /// Linear term q
    pub q: DVector<f64>,
    /// Constraint matrix G
    pub g: DMatrix<f64>,
    /// Upper bounds h
    pub h: DVector<f64>,
}

impl QpModel {
    /// Create a new QP model
    pub fn new(p: DMatrix<f64>, q: DVector<f64>, g: DMatrix<f64>, h: DVector<f64>) -> Self {
        QpModel { p, q, g, h }
    }

    /// Model without inequality constraints
    pub fn unconstrained(p: DMatrix<f64>, q: DVector<f64>) -> Self {
        let n = q.len();
        QpModel { p, q, g: DMatrix::zeros(0, n), h: DVector::zeros(0) }
    }

    /// Build a model from its row-major file form
    pub fn from_problem(problem: &QpProblem) -> Result<Self> {
        let n = problem.num_vars();
        let p = matrix_from_rows(&problem.p, n, "P")?;
        let g = matrix_from_rows(&problem.g, n, "G")?;
        let model = QpModel {
            p,
            q: DVector::from_column_slice(&problem.q),
            g,
            h: DVector::from_column_slice(&problem.h),
        };
        model.validate()?;
        Ok(model)
    }

    /// Row-major file form of this model
    pub fn to_problem(&self) -> QpProblem {
        QpProblem::new(rows_of(&self.p), self.q.as_slice().to_vec(), rows_of(&self.g), self.h.as_slice().to_vec())
    }

    /// Get number of variables
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Get number of constraints
    pub fn num_constraints(&self) -> usize {
        self.h.len()
    }

    /// Validate model dimensions and reject non-finite data
    pub fn validate(&self) -> Result<()> {
        let n = check_square(&self.p, "P")?;
        if n == 0 {
            return Err(QpError::DimensionMismatch("P must be at least 1x1, got 0x0".to_string()));
        }
        check_len(&self.q, n, "q")?;

        check_shape(&self.g, self.g.nrows(), n, "G")?;
        check_len(&self.h, self.g.nrows(), "h")?;

        ensure_finite(self.p.iter(), "P")?;
        ensure_finite(self.q.iter(), "q")?;
        ensure_finite(self.g.iter(), "G")?;
        ensure_finite(self.h.iter(), "h")?;

        Ok(())
    }

    /// Validate the model and return P^-1.
    ///
    /// Order of checks: shapes, finiteness, singularity of P, then
    /// symmetry and positive definiteness of P.
    pub fn inverse_hessian(&self) -> Result<DMatrix<f64>> {
        self.validate()?;
        let p_inv = checked_inverse(&self.p, "P")?;
        validate_spd(&self.p, "P")?;
        Ok(p_inv)
    }

    /// Compute objective: 0.5 * x^T P x + q^T x
    pub fn objective(&self, x: &DVector<f64>) -> f64 {
        0.5 * x.dot(&(&self.p * x)) + self.q.dot(x)
    }

    /// Compute gradient: P x + q
    pub fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.p * x + &self.q
    }

    /// Constraint residual G x - h (positive entries are violations)
    pub fn residual(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.g * x - &self.h
    }
}

fn matrix_from_rows(rows: &[Vec<f64>], ncols_if_empty: usize, name: &str) -> Result<DMatrix<f64>> {
    let ncols = rows.first().map_or(ncols_if_empty, Vec::len);
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != ncols) {
        return Err(QpError::DimensionMismatch(format!(
            "{} row {} has {} entries, expected {}",
            name,
            idx,
            row.len(),
            ncols
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(rows.len(), ncols, &flat))
}

fn rows_of(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_problem_roundtrip() {
        let problem = QpProblem::new(
            vec![vec![1.0, 0.4], vec![0.4, 2.0]],
            vec![0.6, 1.2],
            vec![vec![-1.0, -2.0], vec![2.0, -1.0]],
            vec![1.0, 3.0],
        );

        let model = QpModel::from_problem(&problem).unwrap();
        assert_eq!(model.p[(0, 1)], 0.4);
        assert_eq!(model.g[(1, 0)], 2.0);
        assert_eq!(model.num_constraints(), 2);
        assert_eq!(model.to_problem(), problem);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let problem = QpProblem::new(vec![vec![1.0, 0.0], vec![0.0]], vec![0.0, 0.0], Vec::new(), Vec::new());
        let err = QpModel::from_problem(&problem).unwrap_err();
        assert!(matches!(err, QpError::DimensionMismatch(ref msg) if msg.contains("P row 1")));
    }

    #[test]
    fn test_empty_constraint_set_has_n_columns() {
        let problem = QpProblem::unconstrained(vec![vec![2.0, 0.0], vec![0.0, 2.0]], vec![1.0, 1.0]);
        let model = QpModel::from_problem(&problem).unwrap();
        assert_eq!(model.g.shape(), (0, 2));
        assert_eq!(model.num_constraints(), 0);
    }

    #[test]
    fn test_objective_and_gradient() {
        let model = QpModel::unconstrained(
            DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]),
            DVector::from_vec(vec![1.0, -1.0]),
        );
        let x = DVector::from_vec(vec![1.0, 1.0]);

        // 0.5 * (2 + 4) + (1 - 1)
        assert!((model.objective(&x) - 3.0).abs() < 1e-12);
        assert_eq!(model.gradient(&x).as_slice(), &[3.0, 3.0]);
    }

    #[test]
    fn test_non_finite_rejected() {
        let model = QpModel::unconstrained(DMatrix::identity(1, 1), DVector::from_vec(vec![f64::NAN]));
        assert!(matches!(model.validate(), Err(QpError::NonFinite(_))));
    }
}
