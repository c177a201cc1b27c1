mod scenario;
mod runner;

pub use scenario::{Scenario, ScenarioConfig, ExpectedOutcomes, OneShotOutcome};
pub use runner::{SimRunner, SimResult, SimSummary, MethodRun, RunOutcome};
