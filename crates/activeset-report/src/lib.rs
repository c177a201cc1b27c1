mod hashing;
mod grid;
mod region;
mod reporter;

pub use hashing::{compute_hash, compute_json_hash, HashRef};
pub use grid::{CostGrid, GridSpec};
pub use region::feasible_polygon;
pub use reporter::SolveReport;

#[cfg(test)]
mod tests;
