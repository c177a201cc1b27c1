use activeset_linalg::scatter;
use activeset_types::Result;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::qp_model::QpModel;

/// Which algorithm produced (or should produce) a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverMethod {
    /// Single-iteration active set taken at the unconstrained optimum
    OneShot,
    /// Iterative dual active-set method
    ActiveSet,
    /// Clarabel interior-point reference
    Clarabel,
}

impl SolverMethod {
    pub fn all() -> &'static [SolverMethod] {
        &[SolverMethod::OneShot, SolverMethod::ActiveSet, SolverMethod::Clarabel]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverMethod::OneShot => "one-shot",
            SolverMethod::ActiveSet => "active-set",
            SolverMethod::Clarabel => "clarabel",
        }
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SolverMethod::all()
            .iter()
            .find(|method| method.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown solver method '{}' (expected one-shot, active-set or clarabel)", s))
    }
}

/// Solution from a QP backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QpSolution {
    /// Constrained minimizer x*
    pub x: Vec<f64>,
    /// Lagrange multipliers u*, aligned with `active_set`
    pub multipliers: Vec<f64>,
    /// Active constraint indices in ascending order
    pub active_set: Vec<usize>,
    /// f(x*)
    pub objective: f64,
    pub iterations: usize,
    pub method: SolverMethod,
}

impl QpSolution {
    pub fn x_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.x)
    }

    pub fn multiplier_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.multipliers)
    }

    /// Multipliers scattered over all `num_constraints`, zero for inactive rows
    pub fn full_multipliers(&self, num_constraints: usize) -> DVector<f64> {
        scatter(&self.multipliers, &self.active_set, num_constraints)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active_set.is_empty()
    }
}

/// Trait for QP solver backends
pub trait SolverBackend: Send + Sync {
    /// Solve a QP problem: minimize 0.5 * x^T P x + q^T x
    /// subject to G x <= h
    fn solve_qp(&self, model: &QpModel) -> Result<QpSolution>;

    fn method(&self) -> SolverMethod;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        for method in SolverMethod::all() {
            assert_eq!(method.to_string().parse::<SolverMethod>().unwrap(), *method);
        }
        assert!("simplex".parse::<SolverMethod>().is_err());
    }

    #[test]
    fn test_method_serializes_kebab_case() {
        let json = serde_json::to_string(&SolverMethod::OneShot).unwrap();
        assert_eq!(json, "\"one-shot\"");
    }

    #[test]
    fn test_full_multipliers() {
        let solution = QpSolution {
            x: vec![0.0, 0.0],
            multipliers: vec![0.25, 1.5],
            active_set: vec![0, 3],
            objective: 0.0,
            iterations: 1,
            method: SolverMethod::ActiveSet,
        };

        assert_eq!(solution.full_multipliers(5).as_slice(), &[0.25, 0.0, 0.0, 1.5, 0.0]);
        assert!(!solution.is_unconstrained());
    }
}
