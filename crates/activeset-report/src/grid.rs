use activeset_solver::QpModel;
use activeset_types::{QpError, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Sampling window for a two-dimensional cost surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Lower end of both axes
    pub lo: f64,
    /// Upper end of both axes
    pub hi: f64,
    /// Points per axis
    pub resolution: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec { lo: -3.0, hi: 3.0, resolution: 101 }
    }
}

impl GridSpec {
    pub fn validate(&self) -> Result<()> {
        if self.resolution < 2 {
            return Err(QpError::ConfigError(format!(
                "grid resolution must be at least 2, got {}",
                self.resolution
            )));
        }
        if !(self.lo.is_finite() && self.hi.is_finite() && self.lo < self.hi) {
            return Err(QpError::ConfigError(format!(
                "grid range [{}, {}] is empty or not finite",
                self.lo, self.hi
            )));
        }
        Ok(())
    }

    /// Evenly spaced axis coordinates, both ends included
    pub fn axis(&self) -> Vec<f64> {
        let step = (self.hi - self.lo) / (self.resolution - 1) as f64;
        (0..self.resolution).map(|i| self.lo + step * i as f64).collect()
    }
}

/// Objective values sampled on a square grid.
/// `values[row][col]` is f at (axis[col], axis[row]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostGrid {
    pub axis: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

impl CostGrid {
    /// Evaluate 0.5 x^T P x + q^T x on the grid; only defined for n = 2
    pub fn sample(model: &QpModel, spec: &GridSpec) -> Result<Self> {
        spec.validate()?;
        model.validate()?;
        if model.num_vars() != 2 {
            return Err(QpError::DimensionMismatch(format!(
                "cost grid needs 2 variables, got {}",
                model.num_vars()
            )));
        }

        let axis = spec.axis();
        let values = axis
            .iter()
            .map(|&y| {
                axis.iter()
                    .map(|&x| model.objective(&DVector::from_vec(vec![x, y])))
                    .collect()
            })
            .collect();

        Ok(CostGrid { axis, values })
    }

    /// Grid point with the lowest sampled cost
    pub fn argmin(&self) -> Option<(f64, f64, f64)> {
        let mut best: Option<(f64, f64, f64)> = None;
        for (row, values) in self.values.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if best.map_or(true, |(_, _, b)| value < b) {
                    best = Some((self.axis[col], self.axis[row], value));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn test_default_axis_matches_reference_plot() {
        let axis = GridSpec::default().axis();
        assert_eq!(axis.len(), 101);
        assert_eq!(axis[0], -3.0);
        assert!((axis[50]).abs() < 1e-12);
        assert!((axis[100] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_specs() {
        assert!(GridSpec { resolution: 1, ..GridSpec::default() }.validate().is_err());
        assert!(GridSpec { lo: 1.0, hi: 1.0, resolution: 5 }.validate().is_err());
        assert!(GridSpec { lo: f64::NAN, hi: 1.0, resolution: 5 }.validate().is_err());
    }

    #[test]
    fn test_sample_rejects_three_variables() {
        let model = QpModel::unconstrained(DMatrix::identity(3, 3), DVector::zeros(3));
        let err = CostGrid::sample(&model, &GridSpec::default()).unwrap_err();
        assert!(matches!(err, QpError::DimensionMismatch(_)));
    }

    #[test]
    fn test_argmin_of_shifted_bowl() {
        // minimize (x - 1)^2 + (y + 1)^2
        let model = QpModel::unconstrained(
            DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, 2.0])),
            DVector::from_vec(vec![-2.0, 2.0]),
        );
        let spec = GridSpec { lo: -2.0, hi: 2.0, resolution: 5 };
        let grid = CostGrid::sample(&model, &spec).unwrap();

        let (x, y, value) = grid.argmin().unwrap();
        assert_eq!((x, y), (1.0, -1.0));
        assert!((value + 2.0).abs() < 1e-12);
    }
}
