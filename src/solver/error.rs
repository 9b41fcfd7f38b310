use std::error::Error;
use std::fmt;

use crate::puzzle::PuzzleError;

#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    InvalidParameter { name: &'static str, value: f64 },
    ActionOutOfRange { action_index: usize, actions: usize },
    /// Solver and environment were built for different grid sides.
    SideMismatch { solver: usize, env: usize },
    Puzzle(PuzzleError),
}

impl fmt::Display for SolverError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolverError::InvalidParameter { name, value } => {
                write!(formatter, "Invalid solver parameter {} = {}", name, value)
            }
            SolverError::ActionOutOfRange {
                action_index,
                actions,
            } => write!(
                formatter,
                "Action index {} out of range ({} legal actions)",
                action_index, actions
            ),
            SolverError::SideMismatch { solver, env } => write!(
                formatter,
                "Solver is configured for side {} but the environment uses side {}",
                solver, env
            ),
            SolverError::Puzzle(err) => write!(formatter, "{}", err),
        }
    }
}

impl Error for SolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SolverError::Puzzle(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PuzzleError> for SolverError {
    fn from(err: PuzzleError) -> Self {
        SolverError::Puzzle(err)
    }
}
