use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Row-major description of a dense QP:
/// minimize 0.5 * x^T P x + q^T x
/// subject to G x <= h
///
/// This is the on-disk (JSON) form. Shapes are not checked here; the solver
/// crate validates them when it builds its model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QpProblem {
    /// Hessian P, one inner vector per row
    pub p: Vec<Vec<f64>>,
    /// Linear term q
    pub q: Vec<f64>,
    /// Constraint matrix G, one inner vector per row
    #[serde(default)]
    pub g: Vec<Vec<f64>>,
    /// Constraint bounds h
    #[serde(default)]
    pub h: Vec<f64>,
}

impl QpProblem {
    pub fn new(p: Vec<Vec<f64>>, q: Vec<f64>, g: Vec<Vec<f64>>, h: Vec<f64>) -> Self {
        QpProblem { p, q, g, h }
    }

    /// Problem without inequality constraints
    pub fn unconstrained(p: Vec<Vec<f64>>, q: Vec<f64>) -> Self {
        QpProblem { p, q, g: Vec::new(), h: Vec::new() }
    }

    /// Get number of variables (length of q)
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Get number of inequality constraints (length of h)
    pub fn num_constraints(&self) -> usize {
        self.h.len()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a problem file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
