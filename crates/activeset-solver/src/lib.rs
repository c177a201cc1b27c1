mod qp_model;
mod backend;
mod config;
mod kkt;
mod one_shot;
mod active_set;
mod clarabel_backend;

pub use qp_model::QpModel;
pub use backend::{SolverBackend, QpSolution, SolverMethod};
pub use config::{build_backend, SolverConfig};
pub use kkt::KktReport;
pub use one_shot::{solve, OneShotSolver};
pub use active_set::ActiveSetSolver;
pub use clarabel_backend::ClarabelSolver;
