use activeset_solver::QpModel;
use activeset_types::{QpError, Result};

use crate::grid::GridSpec;

/// Vertices of `{x : G x <= h}` clipped to the grid box, counter-clockwise.
///
/// Clips the box polygon against each half-plane in turn
/// (Sutherland-Hodgman). Returns an empty vector when the clipped region is
/// empty.
pub fn feasible_polygon(model: &QpModel, spec: &GridSpec) -> Result<Vec<(f64, f64)>> {
    spec.validate()?;
    model.validate()?;
    if model.num_vars() != 2 {
        return Err(QpError::DimensionMismatch(format!(
            "feasible polygon needs 2 variables, got {}",
            model.num_vars()
        )));
    }

    let (lo, hi) = (spec.lo, spec.hi);
    let mut polygon = vec![(lo, lo), (hi, lo), (hi, hi), (lo, hi)];

    for i in 0..model.num_constraints() {
        let (a, b, c) = (model.g[(i, 0)], model.g[(i, 1)], model.h[i]);
        polygon = clip(&polygon, a, b, c);
        if polygon.is_empty() {
            break;
        }
    }

    Ok(polygon)
}

/// Keep the part of `polygon` with a*x + b*y <= c
fn clip(polygon: &[(f64, f64)], a: f64, b: f64, c: f64) -> Vec<(f64, f64)> {
    let eps = 1e-12 * (1.0 + c.abs());
    let side = |(x, y): (f64, f64)| a * x + b * y - c;

    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (idx, &current) in polygon.iter().enumerate() {
        let previous = polygon[(idx + polygon.len() - 1) % polygon.len()];
        let (s_prev, s_cur) = (side(previous), side(current));

        if s_cur <= eps {
            if s_prev > eps {
                out.push(intersect(previous, current, s_prev, s_cur));
            }
            out.push(current);
        } else if s_prev <= eps {
            out.push(intersect(previous, current, s_prev, s_cur));
        }
    }

    let same = |p: &(f64, f64), q: &(f64, f64)| (p.0 - q.0).abs() < 1e-12 && (p.1 - q.1).abs() < 1e-12;
    out.dedup_by(|p, q| same(p, q));
    if out.len() > 1 && same(&out[0], &out[out.len() - 1]) {
        out.pop();
    }
    out
}

fn intersect(p: (f64, f64), q: (f64, f64), s_p: f64, s_q: f64) -> (f64, f64) {
    let t = s_p / (s_p - s_q);
    (p.0 + t * (q.0 - p.0), p.1 + t * (q.1 - p.1))
}
