use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// Grid side of zero has no empty slot.
    EmptyGrid,
    /// `side * side` does not fit in a `usize`.
    GridTooLarge { side: usize },
    LengthMismatch { side: usize, len: usize },
    NotAPermutation,
    /// The position is not edge-adjacent to the empty slot.
    InvalidMove { position: usize, empty: usize },
    OutOfBounds { row: usize, col: usize },
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PuzzleError::EmptyGrid => write!(formatter, "Grid side must be at least 1"),
            PuzzleError::GridTooLarge { side } => {
                write!(formatter, "Grid side {} is too large", side)
            }
            PuzzleError::LengthMismatch { side, len } => write!(
                formatter,
                "Expected {} tiles for a {}x{} grid, got {}",
                side.saturating_mul(*side),
                side,
                side,
                len
            ),
            PuzzleError::NotAPermutation => {
                write!(formatter, "Tiles are not a permutation of 0..N-1")
            }
            PuzzleError::InvalidMove { position, empty } => write!(
                formatter,
                "Invalid move: position {} is not adjacent to the empty slot at {}",
                position, empty
            ),
            PuzzleError::OutOfBounds { row, col } => {
                write!(formatter, "Cell ({}, {}) is outside the grid", row, col)
            }
        }
    }
}

impl Error for PuzzleError {}
