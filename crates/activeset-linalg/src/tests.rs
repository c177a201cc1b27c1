// Property tests for the linear-algebra helpers

#[cfg(test)]
mod tests {
    use crate::*;
    use nalgebra::{DMatrix, DVector};
    use proptest::prelude::*;

    /// Diagonally dominant symmetric matrix, hence SPD
    fn spd_from(entries: &[f64], n: usize) -> DMatrix<f64> {
        let a = DMatrix::from_fn(n, n, |i, j| entries[(i * n + j) % entries.len()]);
        let sym = (&a + a.transpose()) * 0.5;
        let shift = sym.abs().row_sum().max() + 1.0;
        sym + DMatrix::identity(n, n) * shift
    }

    proptest! {
        #[test]
        fn prop_spd_matrices_validate_and_invert(
            entries in prop::collection::vec(-5.0f64..5.0, 9),
            n in 1usize..4,
        ) {
            let m = spd_from(&entries, n);
            prop_assert!(validate_spd(&m, "M").is_ok());

            let inv = checked_inverse(&m, "M").unwrap();
            let residual = (&m * &inv - DMatrix::identity(n, n)).amax();
            prop_assert!(residual < 1e-9);
        }

        #[test]
        fn prop_solve_residual_is_small(
            entries in prop::collection::vec(-5.0f64..5.0, 9),
            rhs in prop::collection::vec(-10.0f64..10.0, 3),
        ) {
            let m = spd_from(&entries, 3);
            let b = DVector::from_vec(rhs);
            let x = checked_solve(&m, &b, "M").unwrap();
            prop_assert!((&m * x - &b).amax() < 1e-9);
        }
    }

    #[test]
    fn test_symmetric_detection() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(is_symmetric(&m, 1e-12));
        assert!(!is_symmetric(&DMatrix::<f64>::zeros(2, 3), 1e-12));
    }
}
