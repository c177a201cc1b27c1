use activeset_solver::{KktReport, QpModel, QpSolution};
use activeset_types::{QpProblem, Result};
use serde::{Deserialize, Serialize};

use crate::grid::{CostGrid, GridSpec};
use crate::hashing::{compute_json_hash, HashRef};
use crate::region::feasible_polygon;

/// Everything a caller (or an external plotter) needs about one solve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub problem: QpProblem,
    pub solution: QpSolution,
    pub kkt: KktReport,
    /// Sampled cost surface, present for two-variable problems when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_grid: Option<CostGrid>,
    /// Feasible region inside the grid window, counter-clockwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feasible_region: Option<Vec<(f64, f64)>>,
    /// SHA256 of the JSON problem
    pub input_hash: HashRef,
    /// SHA256 of the JSON solution
    pub output_hash: HashRef,
}

impl SolveReport {
    /// Build a report; `grid` is only honoured for two-variable problems
    pub fn build(model: &QpModel, solution: QpSolution, grid: Option<&GridSpec>) -> Result<Self> {
        let problem = model.to_problem();
        let kkt = KktReport::evaluate(model, &solution)?;

        let (cost_grid, feasible_region) = match grid {
            Some(spec) if model.num_vars() == 2 => (
                Some(CostGrid::sample(model, spec)?),
                Some(feasible_polygon(model, spec)?),
            ),
            _ => (None, None),
        };

        Ok(SolveReport {
            input_hash: compute_json_hash(&problem)?,
            output_hash: compute_json_hash(&solution)?,
            problem,
            solution,
            kkt,
            cost_grid,
            feasible_region,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
