// Report tests against the reference problem

#[cfg(test)]
mod tests {
    use crate::*;
    use activeset_solver::{ActiveSetSolver, OneShotSolver, QpModel, SolverBackend};
    use nalgebra::{DMatrix, DVector};

    fn reference_model() -> QpModel {
        QpModel::new(
            DMatrix::from_row_slice(2, 2, &[1.0, 0.4, 0.4, 2.0]),
            DVector::from_vec(vec![0.6, 1.2]),
            DMatrix::from_row_slice(5, 2, &[
                -1.0, -2.0,
                -2.0, -1.0,
                -1.0, 2.0,
                1.0, 1.0,
                2.0, -1.0,
            ]),
            DVector::from_vec(vec![1.0, 2.0, 6.0, 3.0, 3.0]),
        )
    }

    #[test]
    fn test_reference_region_matches_drawn_boundary() {
        // The constraint boundary of the reference example is the pentagon
        // (1,-1), (2,1), (0,3), (-2,2), (-1,0)
        let polygon = feasible_polygon(&reference_model(), &GridSpec::default()).unwrap();
        assert_eq!(polygon.len(), 5);

        for vertex in [(1.0, -1.0), (2.0, 1.0), (0.0, 3.0), (-2.0, 2.0), (-1.0, 0.0)] {
            assert!(
                polygon.iter().any(|p| (p.0 - vertex.0).abs() < 1e-9 && (p.1 - vertex.1).abs() < 1e-9),
                "missing {:?} in {:?}",
                vertex,
                polygon
            );
        }
    }

    #[test]
    fn test_grid_matches_direct_evaluation() {
        let model = reference_model();
        let spec = GridSpec { lo: -3.0, hi: 3.0, resolution: 7 };
        let grid = CostGrid::sample(&model, &spec).unwrap();

        assert_eq!(grid.values.len(), 7);
        for (row, &y) in grid.axis.iter().enumerate() {
            for (col, &x) in grid.axis.iter().enumerate() {
                let expected = model.objective(&DVector::from_vec(vec![x, y]));
                assert_eq!(grid.values[row][col], expected);
            }
        }
    }

    #[test]
    fn test_report_fingerprints_are_stable() {
        let model = reference_model();
        let backend = OneShotSolver::new();

        let first = SolveReport::build(&model, backend.solve_qp(&model).unwrap(), None).unwrap();
        let second = SolveReport::build(&model, backend.solve_qp(&model).unwrap(), None).unwrap();

        assert_eq!(first.input_hash, second.input_hash);
        assert_eq!(first.output_hash, second.output_hash);
    }

    #[test]
    fn test_fingerprint_changes_with_method() {
        let model = reference_model();
        let one_shot = SolveReport::build(&model, OneShotSolver::new().solve_qp(&model).unwrap(), None).unwrap();
        let active_set = SolveReport::build(&model, ActiveSetSolver::new().solve_qp(&model).unwrap(), None).unwrap();

        assert_eq!(one_shot.input_hash, active_set.input_hash);
        assert_ne!(one_shot.output_hash, active_set.output_hash);
    }

    #[test]
    fn test_full_report_includes_grid_and_region() {
        let model = reference_model();
        let solution = ActiveSetSolver::new().solve_qp(&model).unwrap();
        let report = SolveReport::build(&model, solution, Some(&GridSpec::default())).unwrap();

        let grid = report.cost_grid.as_ref().unwrap();
        assert_eq!(grid.values.len(), 101);
        assert_eq!(report.feasible_region.as_ref().unwrap().len(), 5);
        assert!(report.kkt.satisfied(1e-9));
    }
}
