use activeset_types::{QpError, Result};
use serde::{Deserialize, Serialize};

use crate::backend::QpSolution;
use crate::qp_model::QpModel;

/// First-order optimality residuals of a solution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KktReport {
    /// ||P x + q + G^T u_full||_inf
    pub stationarity: f64,
    /// max(0, max_i (G x - h)_i)
    pub primal_violation: f64,
    /// Smallest multiplier (0 when nothing is active)
    pub min_multiplier: f64,
    /// max over active i of |(G x)_i - h_i|
    pub complementarity: f64,
}

impl KktReport {
    pub fn evaluate(model: &QpModel, solution: &QpSolution) -> Result<Self> {
        let n = model.num_vars();
        let m = model.num_constraints();

        if solution.x.len() != n {
            return Err(QpError::DimensionMismatch(format!(
                "solution x must have length {}, got {}",
                n,
                solution.x.len()
            )));
        }
        if solution.multipliers.len() != solution.active_set.len() {
            return Err(QpError::DimensionMismatch(format!(
                "{} multipliers for {} active constraints",
                solution.multipliers.len(),
                solution.active_set.len()
            )));
        }
        if let Some(&idx) = solution.active_set.iter().find(|&&idx| idx >= m) {
            return Err(QpError::DimensionMismatch(format!(
                "active index {} out of range for {} constraints",
                idx, m
            )));
        }

        let x = solution.x_vector();
        let u_full = solution.full_multipliers(m);
        let residual = model.residual(&x);

        let stationarity = (model.gradient(&x) + model.g.transpose() * &u_full).amax();
        let primal_violation = residual.iter().copied().fold(0.0, f64::max);
        let min_multiplier = solution.multipliers.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let complementarity = solution
            .active_set
            .iter()
            .map(|&idx| residual[idx].abs())
            .fold(0.0, f64::max);

        Ok(KktReport {
            stationarity,
            primal_violation,
            min_multiplier,
            complementarity,
        })
    }

    /// Stationarity, primal feasibility, dual feasibility and complementary
    /// slackness all hold within `tolerance`
    pub fn satisfied(&self, tolerance: f64) -> bool {
        self.stationarity <= tolerance
            && self.primal_violation <= tolerance
            && self.min_multiplier >= -tolerance
            && self.complementarity <= tolerance
    }

    /// Largest of the four residuals, with a negative multiplier counted by
    /// its magnitude
    pub fn max_residual(&self) -> f64 {
        self.stationarity
            .max(self.primal_violation)
            .max(self.complementarity)
            .max((-self.min_multiplier).max(0.0))
    }
}
