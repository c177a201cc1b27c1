use activeset_solver::{build_backend, KktReport, QpModel, QpSolution, SolverConfig, SolverMethod};
use activeset_types::{QpError, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::scenario::{OneShotOutcome, Scenario};

/// Clarabel is an interior-point method; its answers are only this close
const CLARABEL_TOLERANCE: f64 = 1e-5;

/// What happened when one backend ran a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunOutcome {
    Solved { solution: QpSolution, kkt: KktReport },
    Failed { error: String },
}

/// Result of a single backend on a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodRun {
    pub method: SolverMethod,
    pub outcome: RunOutcome,
    pub runtime_ms: f64,
}

/// Summary across backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSummary {
    pub total_runs: usize,
    pub solved_runs: usize,
    pub max_kkt_residual: f64,
    pub total_runtime_ms: f64,
    pub passed: bool,
    pub failure_reasons: Vec<String>,
}

/// Result of a scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimResult {
    pub scenario_name: String,
    pub runs: Vec<MethodRun>,
    pub summary: SimSummary,
}

/// Runs scenarios against a set of backends and checks expectations
pub struct SimRunner {
    methods: Vec<SolverMethod>,
    config: SolverConfig,
}

impl SimRunner {
    /// Runner over every backend with default settings
    pub fn new() -> Self {
        Self {
            methods: SolverMethod::all().to_vec(),
            config: SolverConfig::default(),
        }
    }

    pub fn with_methods(methods: Vec<SolverMethod>, config: SolverConfig) -> Self {
        Self { methods, config }
    }

    /// Run a scenario on every configured backend
    pub fn run_scenario(&self, scenario: &Scenario) -> Result<SimResult> {
        let model = QpModel::from_problem(&scenario.problem)?;
        let mut runs = Vec::with_capacity(self.methods.len());
        let mut failure_reasons = Vec::new();

        for &method in &self.methods {
            let backend = build_backend(&SolverConfig { method, ..self.config.clone() })?;

            let start = Instant::now();
            let result = backend.solve_qp(&model);
            let runtime_ms = start.elapsed().as_secs_f64() * 1000.0;

            let outcome = match result {
                Ok(solution) => {
                    let kkt = KktReport::evaluate(&model, &solution)?;
                    RunOutcome::Solved { solution, kkt }
                }
                Err(err) => RunOutcome::Failed { error: err.to_string() },
            };

            for reason in check_run(scenario, method, &outcome) {
                warn!(scenario = %scenario.config.name, %method, %reason, "expectation failed");
                failure_reasons.push(format!("{}: {}", method, reason));
            }

            runs.push(MethodRun { method, outcome, runtime_ms });
        }

        let summary = summarize(&runs, failure_reasons);
        info!(
            scenario = %scenario.config.name,
            passed = summary.passed,
            solved = summary.solved_runs,
            "scenario finished"
        );

        Ok(SimResult {
            scenario_name: scenario.config.name.clone(),
            runs,
            summary,
        })
    }

    /// Run every built-in scenario
    pub fn run_all(&self) -> Result<Vec<SimResult>> {
        Scenario::all().iter().map(|s| self.run_scenario(s)).collect()
    }
}

impl Default for SimRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn check_run(scenario: &Scenario, method: SolverMethod, outcome: &RunOutcome) -> Vec<String> {
    let expected = &scenario.expected;
    let mut reasons = Vec::new();

    if method == SolverMethod::OneShot {
        match (expected.one_shot, outcome) {
            (OneShotOutcome::Mismatch, RunOutcome::Failed { error }) => {
                if !error.starts_with(&QpError::ActiveSetMismatch(String::new()).to_string()) {
                    reasons.push(format!("expected an active set mismatch, got: {}", error));
                }
                return reasons;
            }
            (OneShotOutcome::Mismatch, RunOutcome::Solved { .. }) => {
                reasons.push("expected an active set mismatch, but the shortcut solved".to_string());
                return reasons;
            }
            (OneShotOutcome::Suboptimal, RunOutcome::Solved { kkt, .. }) => {
                if kkt.min_multiplier >= 0.0 {
                    reasons.push("expected a negative multiplier from the shortcut".to_string());
                }
                if kkt.primal_violation > expected.tolerance {
                    reasons.push(format!("shortcut point infeasible by {:e}", kkt.primal_violation));
                }
                return reasons;
            }
            _ => {}
        }
    }

    let (solution, kkt) = match outcome {
        RunOutcome::Solved { solution, kkt } => (solution, kkt),
        RunOutcome::Failed { error } => {
            reasons.push(format!("solve failed: {}", error));
            return reasons;
        }
    };

    let tolerance = match method {
        SolverMethod::Clarabel => CLARABEL_TOLERANCE,
        _ => expected.tolerance,
    };

    if !kkt.satisfied(tolerance) {
        reasons.push(format!("KKT residual {:e} exceeds {:e}", kkt.max_residual(), tolerance));
    }
    if solution.active_set != expected.active_set {
        reasons.push(format!(
            "active set {:?} != expected {:?}",
            solution.active_set, expected.active_set
        ));
    }
    let x_error = solution
        .x
        .iter()
        .zip(&expected.x)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    if x_error > tolerance {
        reasons.push(format!("x differs from expected by {:e}", x_error));
    }

    reasons
}

fn summarize(runs: &[MethodRun], failure_reasons: Vec<String>) -> SimSummary {
    let solved: Vec<&KktReport> = runs
        .iter()
        .filter_map(|run| match &run.outcome {
            RunOutcome::Solved { kkt, .. } => Some(kkt),
            RunOutcome::Failed { .. } => None,
        })
        .collect();

    SimSummary {
        total_runs: runs.len(),
        solved_runs: solved.len(),
        max_kkt_residual: solved.iter().map(|kkt| kkt.max_residual()).fold(0.0, f64::max),
        total_runtime_ms: runs.iter().map(|run| run.runtime_ms).sum(),
        passed: failure_reasons.is_empty(),
        failure_reasons,
    }
}
