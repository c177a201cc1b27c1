use activeset_linalg::checked_solve;
use activeset_types::{QpError, Result};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::backend::{QpSolution, SolverBackend, SolverMethod};
use crate::qp_model::QpModel;

/// Single-iteration active-set solver.
///
/// Takes the constraints violated at the unconstrained optimum as the active
/// set and solves the equality-constrained KKT system on exactly those rows.
/// This is only correct when that set is also the active set at the
/// constrained optimum; when a previously inactive constraint ends up
/// violated the solve fails with `ActiveSetMismatch`.
pub struct OneShotSolver {
    tolerance: f64,
}

impl OneShotSolver {
    pub fn new() -> Self {
        OneShotSolver { tolerance: 1e-9 }
    }

    /// Tolerance used by the feasibility post-check on inactive rows, scaled by
    /// `1 + |h_i| + ‖G_i‖∞·‖x‖∞`
    pub fn with_tolerance(tolerance: f64) -> Self {
        OneShotSolver { tolerance }
    }

    /// Core procedure: returns (x*, active indices, u*)
    fn solve_kkt(&self, model: &QpModel) -> Result<(DVector<f64>, Vec<usize>, DVector<f64>)> {
        let p_inv = model.inverse_hessian()?;
        let x_unc = -(&p_inv * &model.q);

        let residual = model.residual(&x_unc);
        let active: Vec<usize> = residual
            .iter()
            .enumerate()
            .filter(|(_, &r)| r > 0.0)
            .map(|(i, _)| i)
            .collect();

        debug!(n = model.num_vars(), m = model.num_constraints(), active = ?active, "unconstrained optimum evaluated");

        if active.is_empty() {
            return Ok((x_unc, active, DVector::zeros(0)));
        }

        let g_a: DMatrix<f64> = model.g.select_rows(active.iter());
        let h_a: DVector<f64> = model.h.select_rows(active.iter());

        // (G_A P^-1 G_A^T) u = -(G_A P^-1 q + h_A)
        let p_inv_gt = &p_inv * g_a.transpose();
        let lhs = &g_a * &p_inv_gt;
        let rhs = -(&g_a * (&p_inv * &model.q) + &h_a);
        let u = checked_solve(&lhs, &rhs, "G_A * P^-1 * G_A^T")?;

        let x = -(&p_inv * (g_a.transpose() * &u + &model.q));
        Ok((x, active, u))
    }
}

impl Default for OneShotSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for OneShotSolver {
    fn solve_qp(&self, model: &QpModel) -> Result<QpSolution> {
        let (x, active_set, u) = self.solve_kkt(model)?;

        // Active rows hold with equality by construction; the rest are
        // checked against a tolerance scaled by the magnitude of G_i x and h_i
        let residual = model.residual(&x);
        let x_norm = x.amax();
        let violated: Vec<usize> = (0..model.num_constraints())
            .filter(|i| active_set.binary_search(i).is_err())
            .filter(|&i| {
                let scale = 1.0 + model.h[i].abs() + model.g.row(i).amax() * x_norm;
                residual[i] > self.tolerance * scale
            })
            .collect();
        if !violated.is_empty() {
            return Err(QpError::ActiveSetMismatch(format!(
                "constraints {:?} are violated after solving on active set {:?}",
                violated, active_set
            )));
        }

        if let Some(min_u) = u.iter().copied().reduce(f64::min) {
            if min_u < -self.tolerance {
                warn!(min_multiplier = min_u, active = ?active_set, "negative multiplier: point is feasible but not optimal");
            }
        }

        Ok(QpSolution {
            objective: model.objective(&x),
            x: x.as_slice().to_vec(),
            multipliers: u.as_slice().to_vec(),
            active_set,
            iterations: 1,
            method: SolverMethod::OneShot,
        })
    }

    fn method(&self) -> SolverMethod {
        SolverMethod::OneShot
    }
}

/// Solve `min 0.5 x^T P x + q^T x  s.t.  G x <= h` with the one-shot
/// active-set procedure, returning `(x*, u*)` where `u*` holds one
/// multiplier per active constraint.
pub fn solve(
    p: &DMatrix<f64>,
    q: &DVector<f64>,
    g: &DMatrix<f64>,
    h: &DVector<f64>,
) -> Result<(DVector<f64>, DVector<f64>)> {
    let model = QpModel::new(p.clone(), q.clone(), g.clone(), h.clone());
    let solution = OneShotSolver::new().solve_qp(&model)?;
    Ok((solution.x_vector(), solution.multiplier_vector()))
}
