//! Sliding-tile puzzle state: the grid, the empty slot, and legal moves.

mod board;
mod error;
mod position;

pub use board::{Board, ShuffleMode};
pub use error::PuzzleError;
pub use position::Position;
