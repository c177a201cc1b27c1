use activeset_types::{QpError, Result};
use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use nalgebra::DMatrix;
use tracing::{debug, warn};

use crate::backend::{QpSolution, SolverBackend, SolverMethod};
use crate::qp_model::QpModel;

/// Clarabel interior-point backend, used as an independent reference for
/// the active-set solvers
pub struct ClarabelSolver {
    verbose: bool,
    max_iter: u32,
    tol_gap_abs: f64,
    tol_gap_rel: f64,
    /// Dual values above this mark a constraint as active
    active_tol: f64,
}

impl ClarabelSolver {
    /// Create a new Clarabel solver with default settings
    pub fn new() -> Self {
        ClarabelSolver {
            verbose: false,
            max_iter: 200,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            active_tol: 1e-6,
        }
    }

    /// Create solver with custom settings
    pub fn with_params(max_iter: u32, tolerance: f64) -> Self {
        ClarabelSolver {
            max_iter,
            tol_gap_abs: tolerance.max(1e-10),
            tol_gap_rel: tolerance.max(1e-10),
            ..Self::new()
        }
    }
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for ClarabelSolver {
    fn solve_qp(&self, model: &QpModel) -> Result<QpSolution> {
        let p_inv = model.inverse_hessian()?;
        let m = model.num_constraints();

        if m == 0 {
            let x = -(&p_inv * &model.q);
            return Ok(QpSolution {
                objective: model.objective(&x),
                x: x.as_slice().to_vec(),
                multipliers: Vec::new(),
                active_set: Vec::new(),
                iterations: 0,
                method: SolverMethod::Clarabel,
            });
        }

        // Clarabel format: G x + s = h, s in the nonnegative cone, i.e. G x <= h
        let p_csc = to_clarabel_csc_upper(&model.p);
        let g_csc = to_clarabel_csc(&model.g);
        let cones = [SupportedConeT::NonnegativeConeT(m)];

        let mut settings = DefaultSettings::default();
        settings.verbose = self.verbose;
        settings.max_iter = self.max_iter;
        settings.tol_gap_abs = self.tol_gap_abs;
        settings.tol_gap_rel = self.tol_gap_rel;

        let mut solver = DefaultSolver::new(&p_csc, model.q.as_slice(), &g_csc, model.h.as_slice(), &cones, settings);
        solver.solve();

        let status = solver.solution.status;
        debug!(?status, iterations = solver.info.iterations, "clarabel finished");

        match status {
            SolverStatus::Solved => {}
            SolverStatus::AlmostSolved => warn!("clarabel reached reduced accuracy only"),
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                return Err(QpError::Infeasible(format!("clarabel status {:?}", status)));
            }
            other => {
                return Err(QpError::ConvergenceFailed(format!("clarabel status {:?}", other)));
            }
        }

        let (active_set, multipliers): (Vec<usize>, Vec<f64>) = solver
            .solution
            .z
            .iter()
            .enumerate()
            .filter(|(_, &z)| z > self.active_tol)
            .map(|(i, &z)| (i, z))
            .unzip();

        let x = nalgebra::DVector::from_column_slice(&solver.solution.x);
        Ok(QpSolution {
            objective: model.objective(&x),
            x: solver.solution.x.clone(),
            multipliers,
            active_set,
            iterations: solver.info.iterations as usize,
            method: SolverMethod::Clarabel,
        })
    }

    fn method(&self) -> SolverMethod {
        SolverMethod::Clarabel
    }
}

/// Convert DMatrix to Clarabel CSC format (upper triangle only for P)
fn to_clarabel_csc_upper(mat: &DMatrix<f64>) -> CscMatrix<f64> {
    to_csc_filtered(mat, |row, col| row <= col)
}

/// Convert DMatrix to Clarabel CSC format (full matrix)
fn to_clarabel_csc(mat: &DMatrix<f64>) -> CscMatrix<f64> {
    to_csc_filtered(mat, |_, _| true)
}

fn to_csc_filtered(mat: &DMatrix<f64>, keep: impl Fn(usize, usize) -> bool) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    let sparsity_threshold = 1e-12;

    // Iterate column by column (CSC format)
    for col in 0..mat.ncols() {
        for row in 0..mat.nrows() {
            let val = mat[(row, col)];
            if keep(row, col) && val.abs() > sparsity_threshold {
                rowval.push(row);
                nzval.push(val);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix {
        m: mat.nrows(),
        n: mat.ncols(),
        colptr,
        rowval,
        nzval,
    }
}
