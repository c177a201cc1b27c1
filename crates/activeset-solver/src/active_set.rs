use activeset_linalg::checked_solve;
use activeset_types::{QpError, Result};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::backend::{QpSolution, SolverBackend, SolverMethod};
use crate::qp_model::QpModel;

/// Iterative dual active-set solver (Goldfarb-Idnani).
///
/// Starts from the unconstrained minimizer with an empty working set, then
/// repeatedly picks the most violated constraint and moves along the
/// direction that keeps the working set tight while raising the new
/// multiplier. Constraints whose multipliers would turn negative are dropped
/// on the way. Every iterate is dual feasible, so the first primal feasible
/// iterate is optimal.
pub struct ActiveSetSolver {
    max_iters: usize,
    tolerance: f64,
}

/// Primal and dual step directions for adding one constraint
struct StepDirection {
    /// Change of x per unit of the new multiplier
    z: DVector<f64>,
    /// Decrease of the working-set multipliers per unit of the new multiplier
    r: DVector<f64>,
}

impl ActiveSetSolver {
    pub fn new() -> Self {
        ActiveSetSolver {
            max_iters: 500,
            tolerance: 1e-9,
        }
    }

    pub fn with_params(max_iters: usize, tolerance: f64) -> Self {
        ActiveSetSolver { max_iters, tolerance }
    }

    /// Index of the constraint with the largest row-normalized violation
    /// outside the working set (lowest index on ties). A row counts as
    /// violated when its distance to the boundary exceeds
    /// `tolerance * (1 + ‖x‖∞ + |h_i| / ‖G_i‖)`.
    fn most_violated(
        &self,
        model: &QpModel,
        x: &DVector<f64>,
        row_norms: &[f64],
        working: &[usize],
    ) -> Option<(usize, f64)> {
        let slack = &model.h - &model.g * x;
        let x_norm = x.amax();
        let mut worst: Option<(usize, f64)> = None;
        for (i, (&s, &norm)) in slack.iter().zip(row_norms).enumerate() {
            if working.contains(&i) {
                continue;
            }
            let violation = -s / norm;
            let threshold = self.tolerance * (1.0 + x_norm + model.h[i].abs() / norm);
            if violation > threshold && worst.map_or(true, |(_, w)| violation > w) {
                worst = Some((i, violation));
            }
        }
        worst
    }

    /// z = P^-1 (N^T r - g_p) with r = (N P^-1 N^T)^-1 N P^-1 g_p,
    /// where N holds the working-set rows of G
    fn step_direction(
        &self,
        p_inv: &DMatrix<f64>,
        g: &DMatrix<f64>,
        working: &[usize],
        g_p: &DVector<f64>,
    ) -> Result<StepDirection> {
        let p_inv_gp = p_inv * g_p;
        if working.is_empty() {
            return Ok(StepDirection {
                z: -p_inv_gp,
                r: DVector::zeros(0),
            });
        }

        let n: DMatrix<f64> = g.select_rows(working.iter());
        let p_inv_nt = p_inv * n.transpose();
        let m = &n * &p_inv_nt;
        let r = checked_solve(&m, &(&n * &p_inv_gp), "G_W * P^-1 * G_W^T")?;
        let z = &p_inv_nt * &r - p_inv_gp;

        Ok(StepDirection { z, r })
    }
}

impl Default for ActiveSetSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for ActiveSetSolver {
    fn solve_qp(&self, model: &QpModel) -> Result<QpSolution> {
        let p_inv = model.inverse_hessian()?;

        let mut x = -(&p_inv * &model.q);
        let mut working: Vec<usize> = Vec::new();
        let mut u: Vec<f64> = Vec::new();
        let mut iterations = 0;

        // Zero rows keep a unit norm so their slack is compared unscaled
        let row_norms: Vec<f64> = model
            .g
            .row_iter()
            .map(|row| {
                let norm = row.norm();
                if norm > 0.0 { norm } else { 1.0 }
            })
            .collect();

        loop {
            let Some((p, violation)) = self.most_violated(model, &x, &row_norms, &working) else {
                break;
            };
            let g_p: DVector<f64> = model.g.row(p).transpose();
            let mut u_p = 0.0;

            debug!(constraint = p, violation, working = ?working, "adding violated constraint");

            loop {
                iterations += 1;
                if iterations > self.max_iters {
                    return Err(QpError::ConvergenceFailed(format!(
                        "active-set method did not converge within {} iterations",
                        self.max_iters
                    )));
                }

                let step = self.step_direction(&p_inv, &model.g, &working, &g_p)?;

                // Largest step keeping the working-set multipliers non-negative
                let mut t_dual = f64::INFINITY;
                let mut blocking = None;
                for (k, &r_k) in step.r.iter().enumerate() {
                    if r_k > self.tolerance {
                        let ratio = u[k] / r_k;
                        if ratio < t_dual {
                            t_dual = ratio;
                            blocking = Some(k);
                        }
                    }
                }

                // Step that makes constraint p tight
                let t_primal = if step.z.amax() > self.tolerance {
                    (model.h[p] - g_p.dot(&x)) / g_p.dot(&step.z)
                } else {
                    f64::INFINITY
                };

                if t_primal.is_infinite() && t_dual.is_infinite() {
                    return Err(QpError::Infeasible(format!(
                        "constraint {} cannot be satisfied together with constraints {:?}",
                        p, working
                    )));
                }

                let t = t_primal.min(t_dual);
                if t.is_finite() {
                    x += &step.z * t;
                }
                for (u_k, &r_k) in u.iter_mut().zip(step.r.iter()) {
                    *u_k -= t * r_k;
                }
                u_p += t;

                match blocking {
                    Some(k) if t_dual < t_primal => {
                        debug!(constraint = working[k], "dropping constraint with vanishing multiplier");
                        working.remove(k);
                        u.remove(k);
                    }
                    _ => {
                        working.push(p);
                        u.push(u_p);
                        break;
                    }
                }
            }
        }

        let mut pairs: Vec<(usize, f64)> = working.into_iter().zip(u).collect();
        pairs.sort_by_key(|&(idx, _)| idx);
        let (active_set, multipliers): (Vec<usize>, Vec<f64>) = pairs.into_iter().unzip();

        let objective = model.objective(&x);
        info!(iterations, active = ?active_set, objective, "active-set solve complete");

        Ok(QpSolution {
            x: x.as_slice().to_vec(),
            multipliers,
            active_set,
            objective,
            iterations,
            method: SolverMethod::ActiveSet,
        })
    }

    fn method(&self) -> SolverMethod {
        SolverMethod::ActiveSet
    }
}
