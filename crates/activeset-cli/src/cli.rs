use activeset_report::{GridSpec, SolveReport};
use activeset_sim::{Scenario, SimRunner};
use activeset_solver::{build_backend, QpModel, SolverConfig, SolverMethod};
use activeset_types::{QpError, QpProblem, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Solve small dense QPs: minimize 0.5 x'Px + q'x subject to Gx <= h
#[derive(Debug, Parser)]
#[command(name = "activeset", version)]
pub struct Cli {
    /// JSON problem file with fields p, q, g, h
    #[arg(long, conflicts_with = "scenario")]
    pub problem: Option<PathBuf>,

    /// Built-in scenario to solve instead of a problem file
    #[arg(long)]
    pub scenario: Option<String>,

    /// JSON solver configuration; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// one-shot, active-set or clarabel
    #[arg(long)]
    pub method: Option<SolverMethod>,

    #[arg(long)]
    pub tolerance: Option<f64>,

    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Sample the cost surface on a RES x RES grid over [-3, 3]^2
    #[arg(long, value_name = "RES")]
    pub grid: Option<usize>,

    /// Run every built-in scenario on every backend and print the results
    #[arg(long, conflicts_with_all = ["problem", "scenario"])]
    pub all_scenarios: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    pub fn solver_config(&self) -> Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::load(path)?,
            None => SolverConfig::default(),
        };
        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_problem(&self) -> Result<QpProblem> {
        if let Some(path) = &self.problem {
            return QpProblem::load(path);
        }
        let name = self.scenario.as_deref().unwrap_or("reference_example");
        Scenario::by_name(name)
            .map(|scenario| scenario.problem)
            .ok_or_else(|| QpError::ConfigError(format!("unknown scenario '{}'", name)))
    }

    pub fn grid_spec(&self) -> Option<GridSpec> {
        self.grid.map(|resolution| GridSpec { resolution, ..GridSpec::default() })
    }
}

/// Execute the command and return the JSON document to print
pub fn run(cli: &Cli) -> Result<String> {
    let config = cli.solver_config()?;

    if cli.all_scenarios {
        let runner = SimRunner::with_methods(SolverMethod::all().to_vec(), config);
        let results = runner.run_all()?;
        return Ok(serde_json::to_string_pretty(&results)?);
    }

    let problem = cli.load_problem()?;
    let model = QpModel::from_problem(&problem)?;
    info!(
        method = %config.method,
        n = model.num_vars(),
        m = model.num_constraints(),
        "solving"
    );

    let backend = build_backend(&config)?;
    let solution = backend.solve_qp(&model)?;
    let report = SolveReport::build(&model, solution, cli.grid_spec().as_ref())?;
    report.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("activeset").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_solve_reference_example() {
        let cli = parse(&[]);
        let json = run(&cli).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(report["solution"]["active_set"], serde_json::json!([0]));
        assert_eq!(report["solution"]["method"], "active-set");
        assert!(report.get("cost_grid").is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&["--method", "one-shot", "--tolerance", "1e-7", "--max-iterations", "10"]);
        let config = cli.solver_config().unwrap();

        assert_eq!(config.method, SolverMethod::OneShot);
        assert_eq!(config.tolerance, 1e-7);
        assert_eq!(config.max_iterations, 10);
    }

    #[test]
    fn test_invalid_method_rejected_by_parser() {
        let result = Cli::try_parse_from(["activeset", "--method", "simplex"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_scenario() {
        let cli = parse(&["--scenario", "nope"]);
        assert!(matches!(run(&cli), Err(QpError::ConfigError(_))));
    }

    #[test]
    fn test_shortcut_failure_surfaces_as_error() {
        let cli = parse(&["--scenario", "shortcut_breaks", "--method", "one-shot"]);
        assert!(matches!(run(&cli), Err(QpError::ActiveSetMismatch(_))));
    }

    #[test]
    fn test_grid_output() {
        let cli = parse(&["--grid", "11"]);
        let json = run(&cli).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(report["cost_grid"]["axis"].as_array().unwrap().len(), 11);
        assert_eq!(report["feasible_region"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_all_scenarios_pass() {
        let cli = parse(&["--all-scenarios"]);
        let json = run(&cli).unwrap();
        let results: serde_json::Value = serde_json::from_str(&json).unwrap();

        for result in results.as_array().unwrap() {
            assert_eq!(result["summary"]["passed"], true, "{}", result["scenario_name"]);
        }
    }
}
