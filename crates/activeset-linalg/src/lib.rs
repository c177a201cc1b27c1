mod checks;
mod matrix_utils;

pub use checks::{check_len, check_shape, check_square, ensure_finite};
pub use matrix_utils::{
    checked_inverse, checked_solve, ensure_nonsingular, is_symmetric, scatter, validate_spd,
    SINGULAR_RTOL,
};

#[cfg(test)]
mod tests;
