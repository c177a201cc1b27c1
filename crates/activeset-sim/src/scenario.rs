use activeset_types::QpProblem;
use serde::{Deserialize, Serialize};

/// What the one-shot shortcut is expected to do on a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OneShotOutcome {
    /// Active set at the unconstrained optimum is the optimal one
    Optimal,
    /// Returns a feasible point with a negative multiplier
    Suboptimal,
    /// Fails its feasibility post-check
    Mismatch,
}

/// Scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub description: String,
}

/// Expected outcomes for validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedOutcomes {
    /// Optimal active set, ascending
    pub active_set: Vec<usize>,
    /// Optimal point
    pub x: Vec<f64>,
    pub one_shot: OneShotOutcome,
    /// Tolerance for x and KKT residuals of the exact backends
    pub tolerance: f64,
}

/// Complete scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub problem: QpProblem,
    pub expected: ExpectedOutcomes,
}

impl Scenario {
    fn build(name: &str, description: &str, problem: QpProblem, expected: ExpectedOutcomes) -> Self {
        Scenario {
            config: ScenarioConfig {
                name: name.to_string(),
                description: description.to_string(),
            },
            problem,
            expected,
        }
    }

    /// The two-variable, five-constraint example whose unconstrained
    /// optimum violates only constraint 0
    pub fn reference_example() -> Self {
        Self::build(
            "reference_example",
            "2 variables, 5 constraints, one active at the optimum",
            QpProblem::new(
                vec![vec![1.0, 0.4], vec![0.4, 2.0]],
                vec![0.6, 1.2],
                vec![
                    vec![-1.0, -2.0],
                    vec![-2.0, -1.0],
                    vec![-1.0, 2.0],
                    vec![1.0, 1.0],
                    vec![2.0, -1.0],
                ],
                vec![1.0, 2.0, 6.0, 3.0, 3.0],
            ),
            ExpectedOutcomes {
                active_set: vec![0],
                x: vec![-3.0 / 11.0, -4.0 / 11.0],
                one_shot: OneShotOutcome::Optimal,
                tolerance: 1e-9,
            },
        )
    }

    /// Same objective with bounds loose enough that nothing binds
    pub fn unconstrained_interior() -> Self {
        let reference = Self::reference_example();
        Self::build(
            "unconstrained_interior",
            "unconstrained optimum already feasible",
            QpProblem::new(reference.problem.p, reference.problem.q, reference.problem.g, vec![10.0; 5]),
            ExpectedOutcomes {
                active_set: Vec::new(),
                x: vec![-0.72 / 1.84, -0.96 / 1.84],
                one_shot: OneShotOutcome::Optimal,
                tolerance: 1e-9,
            },
        )
    }

    /// minimize (x-2)^2 + (y-2)^2 over the unit box
    pub fn box_corner() -> Self {
        Self::build(
            "box_corner",
            "both upper bounds active at the corner (1, 1)",
            QpProblem::new(
                vec![vec![2.0, 0.0], vec![0.0, 2.0]],
                vec![-4.0, -4.0],
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0], vec![0.0, -1.0]],
                vec![1.0, 1.0, 0.0, 0.0],
            ),
            ExpectedOutcomes {
                active_set: vec![0, 1],
                x: vec![1.0, 1.0],
                one_shot: OneShotOutcome::Optimal,
                tolerance: 1e-9,
            },
        )
    }

    /// Projection onto the first violated constraint breaks a second one
    pub fn shortcut_breaks() -> Self {
        Self::build(
            "shortcut_breaks",
            "x0 <= 1 and x0 + x1 >= 1.5; only the first is violated at (2, 0)",
            QpProblem::new(
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                vec![-2.0, 0.0],
                vec![vec![1.0, 0.0], vec![-1.0, -1.0]],
                vec![1.0, -1.5],
            ),
            ExpectedOutcomes {
                active_set: vec![0, 1],
                x: vec![1.0, 0.5],
                one_shot: OneShotOutcome::Mismatch,
                tolerance: 1e-9,
            },
        )
    }

    /// A heavily scaled constraint is most violated at the start but slack
    /// at the optimum
    pub fn redundant_scaled() -> Self {
        Self::build(
            "redundant_scaled",
            "x0 >= 2 and 10 (x0 + x1) >= 10; only the first binds",
            QpProblem::new(
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                vec![0.0, 0.0],
                vec![vec![-1.0, 0.0], vec![-10.0, -10.0]],
                vec![-2.0, -10.0],
            ),
            ExpectedOutcomes {
                active_set: vec![0],
                x: vec![2.0, 0.0],
                one_shot: OneShotOutcome::Suboptimal,
                tolerance: 1e-9,
            },
        )
    }

    /// All built-in scenarios
    pub fn all() -> Vec<Scenario> {
        vec![
            Self::reference_example(),
            Self::unconstrained_interior(),
            Self::box_corner(),
            Self::shortcut_breaks(),
            Self::redundant_scaled(),
        ]
    }

    /// Look up a built-in scenario by name
    pub fn by_name(name: &str) -> Option<Scenario> {
        Self::all().into_iter().find(|s| s.config.name == name)
    }
}
