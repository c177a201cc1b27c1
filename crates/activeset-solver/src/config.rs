use activeset_types::{QpError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::active_set::ActiveSetSolver;
use crate::backend::{SolverBackend, SolverMethod};
use crate::clarabel_backend::ClarabelSolver;
use crate::one_shot::OneShotSolver;

/// Configuration for building a solver backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Algorithm to run
    pub method: SolverMethod,

    /// Feasibility / step tolerance
    pub tolerance: f64,

    /// Iteration cap for iterative backends
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: SolverMethod::ActiveSet,
            tolerance: 1e-9,
            max_iterations: 500,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(QpError::ConfigError(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(QpError::ConfigError("max_iterations must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Build the backend selected by `config`
pub fn build_backend(config: &SolverConfig) -> Result<Box<dyn SolverBackend>> {
    config.validate()?;

    let backend: Box<dyn SolverBackend> = match config.method {
        SolverMethod::OneShot => Box::new(OneShotSolver::with_tolerance(config.tolerance)),
        SolverMethod::ActiveSet => Box::new(ActiveSetSolver::with_params(config.max_iterations, config.tolerance)),
        SolverMethod::Clarabel => Box::new(ClarabelSolver::with_params(config.max_iterations as u32, config.tolerance)),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = SolverConfig::from_json(r#"{ "method": "one-shot" }"#).unwrap();
        assert_eq!(config.method, SolverMethod::OneShot);
        assert_eq!(config.max_iterations, SolverConfig::default().max_iterations);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = SolverConfig::from_json(r#"{ "tolerance": -1.0 }"#).unwrap_err();
        assert!(matches!(err, QpError::ConfigError(_)));

        let config = SolverConfig { max_iterations: 0, ..SolverConfig::default() };
        assert!(build_backend(&config).is_err());
    }

    #[test]
    fn test_backend_matches_method() {
        for method in SolverMethod::all() {
            let config = SolverConfig { method: *method, ..SolverConfig::default() };
            assert_eq!(build_backend(&config).unwrap().method(), *method);
        }
    }
}
