//! External tour-solver contract.
//!
//! The ordering algorithm itself lives outside this crate; the planner only
//! supplies a well-formed symmetric matrix and a start index, and checks the
//! returned tour for structural validity, never for optimality.

use std::fmt;
use std::time::Duration;

use crate::matrix::DistanceMatrix;

#[derive(Debug)]
pub enum SolverError {
    /// The solver itself failed; the message is surfaced verbatim.
    Failed(String),
    /// The returned sequence is not a permutation starting at the home index.
    InvalidTour(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Failed(detail) => f.write_str(detail),
            SolverError::InvalidTour(detail) => write!(f, "invalid tour: {detail}"),
        }
    }
}

impl std::error::Error for SolverError {}

/// A time-bounded tour solver over a distance matrix.
pub trait RouteSolver: Send + Sync {
    /// Returns a visiting order over `0..matrix.len()` beginning at `start`.
    ///
    /// The tour heuristically minimizes total edge cost within the worker and
    /// time budgets; it is not required to be optimal.
    fn solve(
        &self,
        matrix: &DistanceMatrix,
        start: usize,
        workers: usize,
        time_limit: Duration,
    ) -> Result<Vec<usize>, SolverError>;
}

/// Checks that `route` is a permutation of `0..size` beginning at `start`.
pub fn validate_tour(route: &[usize], size: usize, start: usize) -> Result<(), SolverError> {
    if route.len() != size {
        return Err(SolverError::InvalidTour(format!(
            "expected {size} stops, got {}",
            route.len()
        )));
    }
    if route.first() != Some(&start) {
        return Err(SolverError::InvalidTour(format!(
            "tour must begin at index {start}"
        )));
    }
    let mut seen = vec![false; size];
    for &index in route {
        if index >= size {
            return Err(SolverError::InvalidTour(format!(
                "index {index} out of range for {size} stops"
            )));
        }
        if seen[index] {
            return Err(SolverError::InvalidTour(format!("index {index} visited twice")));
        }
        seen[index] = true;
    }
    Ok(())
}
