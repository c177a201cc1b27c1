mod error;
mod problem;

pub use error::{QpError, Result};
pub use problem::QpProblem;
